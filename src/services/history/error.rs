//! Scan history error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HistoryError {
	#[error("history io error: {0}")]
	Io(#[from] std::io::Error),

	#[error("history serialization error: {0}")]
	Serialization(#[from] serde_json::Error),
}
