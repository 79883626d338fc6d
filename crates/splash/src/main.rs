//! Folio splash binary.
//!
//! Starts the configured asset producers, shows the splash until the loading
//! aggregator reports ready, then prints a short summary.

use std::io::{self, Write as _};

use anyhow::Context as _;
use clap::Parser;
use folio_loading::LoadingAggregator;
use folio_splash::cli::Cli;
use folio_splash::config::Config;
use folio_splash::producer;
use folio_splash::splash::{self, LogBuffer};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	let cli = Cli::parse();

	let mut config = Config::load(cli.config.as_deref()).context("failed to load config")?;
	cli.apply(&mut config);
	config.validate()?;

	let log_buffer = (!cli.no_splash).then(|| LogBuffer::new(config.splash.log_lines));
	folio_splash::logging::setup_tracing(cli.verbose, log_buffer.clone())?;

	info!(assets = config.assets.len(), "starting folio");

	let aggregator = LoadingAggregator::new(config.loading.clone());
	let loads: Vec<_> = config
		.assets
		.iter()
		.map(|spec| (spec.id.clone(), producer::spawn_asset_load(&aggregator, spec.clone())))
		.collect();

	let mut signal = aggregator.subscribe();
	let waited = match log_buffer {
		Some(buffer) => {
			let mut stdout = io::stdout();
			let report = splash::run_splash(signal, &config.splash, &buffer, &mut stdout).await?;
			info!(frames = report.frames, "splash closed");
			report.waited
		}
		None => {
			let started = tokio::time::Instant::now();
			signal.wait_ready().await;
			started.elapsed()
		}
	};

	let summary = producer::collect_loads(loads).await;

	let mut stdout = io::stdout().lock();
	writeln!(stdout, "folio ready after {:.1}s ({summary})", waited.as_secs_f64())?;
	Ok(())
}
