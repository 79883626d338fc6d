//! Configuration for the folio splash binary.
//!
//! Configuration is written in TOML. Every section is optional:
//!
//! ```toml
//! [loading]
//! initial_floor_ms = 2000
//! settle_delay_ms = 800
//! sentinel_id = "initial-load"
//! # task_timeout_ms = 30000
//!
//! [splash]
//! type_interval_ms = 50
//! message_hold_ms = 1000
//! exit_ms = 500
//! messages = ["Initializing systems..."]
//!
//! [[assets]]
//! id = "robot-model"
//! load_ms = 1500
//! fail = false
//! ```
//!
//! Without `--config`, `folio.toml` in the working directory is used when it
//! exists and built-in defaults otherwise.

pub mod error;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use folio_loading::LoadingConfig;
use serde::Deserialize;

pub use self::error::{ConfigError, Result};
use crate::producer::AssetSpec;
use crate::splash::{MAX_LOG_LINES, SplashConfig};

/// File looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "folio.toml";

/// Parsed configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
	/// Aggregator timing constants.
	pub loading: LoadingConfig,
	/// Splash timings and content.
	pub splash: SplashConfig,
	/// Simulated asset loads started at launch.
	pub assets: Vec<AssetSpec>,
}

impl Config {
	/// Parses configuration from a TOML string.
	pub fn parse(input: &str) -> Result<Self> {
		Ok(toml::from_str(input)?)
	}

	/// Loads configuration from `path`, or from [`DEFAULT_CONFIG_FILE`] when
	/// it exists.
	///
	/// An explicit path must exist; a missing default file yields defaults.
	pub fn load(path: Option<&Path>) -> Result<Self> {
		let (path, required) = match path {
			Some(path) => (path.to_path_buf(), true),
			None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
		};

		let content = match std::fs::read_to_string(&path) {
			Ok(content) => content,
			Err(error) if !required && error.kind() == std::io::ErrorKind::NotFound => {
				tracing::debug!(path = %path.display(), "no config file, using defaults");
				return Ok(Self::default());
			}
			Err(error) => return Err(ConfigError::Io { path, error }),
		};

		let config = Self::parse(&content)?;
		tracing::debug!(path = %path.display(), assets = config.assets.len(), "loaded config");
		Ok(config)
	}

	/// Checks cross-field constraints.
	pub fn validate(&self) -> Result<()> {
		self.loading.validate()?;

		if self.splash.type_interval_ms == 0 {
			return Err(ConfigError::Invalid("splash.type_interval_ms must be greater than zero".into()));
		}
		if self.splash.log_lines > MAX_LOG_LINES {
			return Err(ConfigError::Invalid(format!(
				"splash.log_lines must be at most {MAX_LOG_LINES}, got {}",
				self.splash.log_lines
			)));
		}

		let mut seen = HashSet::new();
		for asset in &self.assets {
			if asset.id.is_empty() {
				return Err(ConfigError::Invalid("asset id must not be empty".into()));
			}
			if asset.id == self.loading.sentinel_id {
				return Err(ConfigError::Invalid(format!(
					"asset id '{}' is reserved for the initial floor",
					asset.id
				)));
			}
			if !seen.insert(asset.id.as_str()) {
				return Err(ConfigError::Invalid(format!("duplicate asset id '{}'", asset.id)));
			}
		}
		Ok(())
	}
}
