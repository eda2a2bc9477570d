//! Admin surface error types.
//!
//! These surface synchronously to the external API layer, which translates
//! them into transport-appropriate status codes.

use thiserror::Error;

use crate::models::Permission;
use crate::services::endpoints::EndpointError;
use crate::services::history::HistoryError;
use crate::services::monitor::MonitorError;
use crate::services::scanner::ScannerError;

#[derive(Debug, Error)]
pub enum AdminError {
	#[error("actor {actor} lacks permission {permission:?}")]
	Forbidden {
		actor: String,
		permission: Permission,
	},

	#[error(transparent)]
	Monitor(#[from] MonitorError),

	#[error(transparent)]
	Endpoint(#[from] EndpointError),

	#[error(transparent)]
	Scanner(#[from] ScannerError),

	#[error(transparent)]
	History(#[from] HistoryError),
}
