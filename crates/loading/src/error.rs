//! Error types for the loading aggregator.

use thiserror::Error;

/// Errors raised while preparing a loading aggregator.
///
/// Registration itself never fails; only configuration can be rejected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LoadingError {
	/// The configuration violates a constraint.
	#[error("invalid loading config: {0}")]
	InvalidConfig(String),
}

/// Result type for loading operations.
pub type Result<T> = std::result::Result<T, LoadingError>;
