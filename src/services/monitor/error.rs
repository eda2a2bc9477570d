//! Monitor state machine error types.

use thiserror::Error;

use crate::models::MonitorStatus;

#[derive(Debug, Error)]
pub enum MonitorError {
	#[error("no monitor registered for chain {0}")]
	NotFound(String),

	#[error("invalid state transition for chain {chain}: monitor is {status}")]
	InvalidState {
		chain: String,
		status: MonitorStatus,
	},

	/// The forward cursor only moves forward; rescans use a dedicated path.
	#[error("cursor regression for chain {chain}: {attempted} < {current}")]
	CursorRegression {
		chain: String,
		current: u64,
		attempted: u64,
	},

	#[error("monitor store error: {0}")]
	Store(String),
}

impl From<std::io::Error> for MonitorError {
	fn from(err: std::io::Error) -> Self {
		Self::Store(err.to_string())
	}
}

impl From<serde_json::Error> for MonitorError {
	fn from(err: serde_json::Error) -> Self {
		Self::Store(err.to_string())
	}
}
