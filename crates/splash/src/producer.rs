//! Simulated asset producers.
//!
//! Each producer stands in for one heavy resource the site fetches before
//! revealing itself (the hero robot model, textures). A producer registers
//! with the aggregator when spawned and deregisters on every exit path; a
//! failed load degrades to placeholder geometry instead of stalling the
//! splash.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use folio_loading::LoadingAggregator;
use serde::Deserialize;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// One simulated asset load.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AssetSpec {
	/// Loading task id registered with the aggregator.
	pub id: String,
	/// Simulated download time in milliseconds.
	pub load_ms: u64,
	/// Whether the download fails.
	#[serde(default)]
	pub fail: bool,
}

impl AssetSpec {
	pub fn load_time(&self) -> Duration {
		Duration::from_millis(self.load_ms)
	}
}

/// Errors parsing an `ID=MS[:fail]` asset argument.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AssetSpecError {
	#[error("expected ID=MS[:fail], got '{0}'")]
	Syntax(String),
	#[error("asset id must not be empty")]
	EmptyId,
	#[error("invalid load time '{0}' (expected milliseconds)")]
	LoadTime(String),
	#[error("unknown asset flag '{0}' (expected 'fail')")]
	Flag(String),
}

impl FromStr for AssetSpec {
	type Err = AssetSpecError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let (id, rest) = s.split_once('=').ok_or_else(|| AssetSpecError::Syntax(s.to_string()))?;
		let id = id.trim();
		if id.is_empty() {
			return Err(AssetSpecError::EmptyId);
		}

		let (millis, flag) = match rest.split_once(':') {
			Some((millis, flag)) => (millis, Some(flag)),
			None => (rest, None),
		};
		let load_ms = millis
			.trim()
			.parse()
			.map_err(|_| AssetSpecError::LoadTime(millis.to_string()))?;
		let fail = match flag.map(str::trim) {
			None => false,
			Some("fail") => true,
			Some(other) => return Err(AssetSpecError::Flag(other.to_string())),
		};

		Ok(Self {
			id: id.to_string(),
			load_ms,
			fail,
		})
	}
}

/// What a producer ended up presenting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetOutcome {
	/// The asset loaded and is shown as-is.
	Loaded,
	/// The asset failed; placeholder geometry is shown instead.
	Placeholder,
}

#[derive(Debug, Error)]
#[error("asset '{id}' failed to load after {elapsed_ms}ms")]
struct FetchError {
	id: String,
	elapsed_ms: u64,
}

async fn fetch(spec: &AssetSpec) -> Result<(), FetchError> {
	tokio::time::sleep(spec.load_time()).await;
	if spec.fail {
		return Err(FetchError {
			id: spec.id.clone(),
			elapsed_ms: spec.load_ms,
		});
	}
	Ok(())
}

/// Starts one asset load.
///
/// The task is registered before this returns, so the splash cannot settle
/// in the gap before the spawned task first runs.
pub fn spawn_asset_load(aggregator: &LoadingAggregator, spec: AssetSpec) -> JoinHandle<AssetOutcome> {
	let guard = aggregator.track(spec.id.as_str());
	tokio::spawn(async move {
		let _guard = guard;
		info!(asset = %spec.id, load_ms = spec.load_ms, "loading asset");
		match fetch(&spec).await {
			Ok(()) => {
				info!(asset = %spec.id, "asset loaded");
				AssetOutcome::Loaded
			}
			Err(error) => {
				warn!(%error, "falling back to placeholder geometry");
				AssetOutcome::Placeholder
			}
		}
	})
}

/// Tally of asset loads taken once the app is ready.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSummary {
	pub loaded: usize,
	pub placeholders: usize,
	/// Loads still running at ready, or whose task died.
	pub abandoned: usize,
}

impl LoadSummary {
	pub fn total(&self) -> usize {
		self.loaded + self.placeholders + self.abandoned
	}
}

impl fmt::Display for LoadSummary {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} assets, {} placeholders", self.total(), self.placeholders)?;
		if self.abandoned > 0 {
			write!(f, ", {} abandoned", self.abandoned)?;
		}
		Ok(())
	}
}

/// Collects finished loads and aborts the ones still running.
///
/// Call after readiness; the counts end up in the printed summary, which
/// stays visible after the splash has swallowed the log output.
pub async fn collect_loads(loads: Vec<(String, JoinHandle<AssetOutcome>)>) -> LoadSummary {
	let mut summary = LoadSummary::default();
	for (id, load) in loads {
		if !load.is_finished() {
			warn!(asset = %id, "asset still loading after ready, abandoning");
			load.abort();
			summary.abandoned += 1;
			continue;
		}
		match load.await {
			Ok(AssetOutcome::Loaded) => summary.loaded += 1,
			Ok(AssetOutcome::Placeholder) => summary.placeholders += 1,
			Err(error) => {
				warn!(asset = %id, %error, "asset task failed");
				summary.abandoned += 1;
			}
		}
	}
	summary
}
