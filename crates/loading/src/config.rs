//! Timing and identity constants for the loading aggregator.

use std::time::Duration;

use serde::Deserialize;

use crate::error::{LoadingError, Result};

/// Default minimum splash duration.
pub const DEFAULT_INITIAL_FLOOR: Duration = Duration::from_millis(2000);

/// Default debounce between the last task clearing and readiness.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(800);

/// Default reserved identifier for the minimum-duration floor.
pub const DEFAULT_SENTINEL_ID: &str = "initial-load";

/// Configuration for a [`LoadingAggregator`](crate::LoadingAggregator).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadingConfig {
	/// Minimum time the splash screen is guaranteed visible.
	pub initial_floor: Duration,
	/// Debounce between `outstanding` emptying and `ready` flipping true.
	pub settle_delay: Duration,
	/// Reserved identifier held until the floor elapses.
	pub sentinel_id: String,
	/// Force-deregisters tasks still outstanding after this long.
	pub task_timeout: Option<Duration>,
}

impl Default for LoadingConfig {
	fn default() -> Self {
		Self {
			initial_floor: DEFAULT_INITIAL_FLOOR,
			settle_delay: DEFAULT_SETTLE_DELAY,
			sentinel_id: DEFAULT_SENTINEL_ID.to_string(),
			task_timeout: None,
		}
	}
}

impl LoadingConfig {
	/// Checks constraints that the aggregator relies on.
	pub fn validate(&self) -> Result<()> {
		if self.sentinel_id.is_empty() {
			return Err(LoadingError::InvalidConfig("sentinel_id must not be empty".into()));
		}
		if self.task_timeout == Some(Duration::ZERO) {
			return Err(LoadingError::InvalidConfig("task_timeout must be greater than zero".into()));
		}
		Ok(())
	}
}

/// On-disk shape of [`LoadingConfig`], durations in milliseconds.
#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawLoadingConfig {
	initial_floor_ms: u64,
	settle_delay_ms: u64,
	sentinel_id: String,
	task_timeout_ms: Option<u64>,
}

impl Default for RawLoadingConfig {
	fn default() -> Self {
		Self {
			initial_floor_ms: DEFAULT_INITIAL_FLOOR.as_millis() as u64,
			settle_delay_ms: DEFAULT_SETTLE_DELAY.as_millis() as u64,
			sentinel_id: DEFAULT_SENTINEL_ID.to_string(),
			task_timeout_ms: None,
		}
	}
}

impl From<RawLoadingConfig> for LoadingConfig {
	fn from(raw: RawLoadingConfig) -> Self {
		Self {
			initial_floor: Duration::from_millis(raw.initial_floor_ms),
			settle_delay: Duration::from_millis(raw.settle_delay_ms),
			sentinel_id: raw.sentinel_id,
			task_timeout: raw.task_timeout_ms.map(Duration::from_millis),
		}
	}
}

impl<'de> Deserialize<'de> for LoadingConfig {
	fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
	where
		D: serde::Deserializer<'de>,
	{
		RawLoadingConfig::deserialize(deserializer).map(Into::into)
	}
}
