//! Configuration error types.

use thiserror::Error;

/// Errors that can occur while loading or validating configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("validation error: {0}")]
	ValidationError(String),

	#[error("parse error: {0}")]
	ParseError(#[from] serde_json::Error),

	#[error("file error: {0}")]
	FileError(#[from] std::io::Error),
}
