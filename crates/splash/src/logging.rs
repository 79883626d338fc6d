//! Tracing setup for the folio binary.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::util::TryInitError;

use crate::splash::{LogBuffer, SplashLogLayer};

/// Directory for per-process log files, mainly for smoke testing.
pub const LOG_DIR_ENV: &str = "FOLIO_LOG_DIR";

fn default_filter(verbose: bool) -> EnvFilter {
	EnvFilter::try_from_default_env().unwrap_or_else(|_| {
		if verbose {
			EnvFilter::new("folio=debug,folio_splash=debug,folio_loading=debug,info")
		} else {
			EnvFilter::new("folio=info,folio_splash=info,folio_loading=info,warn")
		}
	})
}

/// Installs the global subscriber.
///
/// With a splash buffer, events feed the splash instead of stderr so the
/// loading view is not scribbled over. `FOLIO_LOG_DIR` additionally tees
/// everything into a per-process file.
pub fn setup_tracing(verbose: bool, splash: Option<LogBuffer>) -> Result<(), TryInitError> {
	let stderr_layer = splash
		.is_none()
		.then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr).with_target(false));
	let splash_layer = splash.map(SplashLogLayer::new);

	let file_layer = std::env::var(LOG_DIR_ENV)
		.ok()
		.map(PathBuf::from)
		.filter(|dir| std::fs::create_dir_all(dir).is_ok())
		.and_then(|dir| {
			let path = dir.join(format!("folio.{}.log", std::process::id()));
			OpenOptions::new().create(true).append(true).open(path).ok()
		})
		.map(|file| {
			tracing_subscriber::fmt::layer()
				.with_writer(Arc::new(file))
				.with_ansi(false)
				.with_target(true)
		});

	tracing_subscriber::registry()
		.with(default_filter(verbose))
		.with(stderr_layer)
		.with(splash_layer)
		.with(file_layer)
		.try_init()
}
