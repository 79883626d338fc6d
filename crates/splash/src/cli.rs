use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::config::Config;
use crate::producer::AssetSpec;

#[derive(Parser, Debug)]
#[command(name = "folio")]
#[command(about = "Portfolio splash screen gated on asset loading")]
#[command(version)]
/// Command-line arguments.
pub struct Cli {
	/// Config file (defaults to ./folio.toml when present)
	#[arg(long, short = 'c', value_name = "PATH")]
	pub config: Option<PathBuf>,

	/// Simulated asset load, repeatable (e.g. robot=1500 or robot=1500:fail)
	#[arg(long = "asset", short = 'a', value_name = "ID=MS[:fail]")]
	pub assets: Vec<AssetSpec>,

	/// Minimum splash duration in milliseconds
	#[arg(long, value_name = "MS")]
	pub floor_ms: Option<u64>,

	/// Debounce after the last asset finishes, in milliseconds
	#[arg(long, value_name = "MS")]
	pub settle_ms: Option<u64>,

	/// Force-complete assets still loading after this many milliseconds
	#[arg(long, value_name = "MS")]
	pub task_timeout_ms: Option<u64>,

	/// Log to stderr instead of drawing the splash
	#[arg(long)]
	pub no_splash: bool,

	/// Verbose logging
	#[arg(short, long)]
	pub verbose: bool,
}

impl Cli {
	/// Applies command-line overrides on top of the file configuration.
	///
	/// Assets given on the command line are appended after configured ones.
	pub fn apply(&self, config: &mut Config) {
		if let Some(ms) = self.floor_ms {
			config.loading.initial_floor = Duration::from_millis(ms);
		}
		if let Some(ms) = self.settle_ms {
			config.loading.settle_delay = Duration::from_millis(ms);
		}
		if let Some(ms) = self.task_timeout_ms {
			config.loading.task_timeout = Some(Duration::from_millis(ms));
		}
		config.assets.extend(self.assets.iter().cloned());
	}
}

#[cfg(test)]
mod tests;
