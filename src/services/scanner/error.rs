//! Scan scheduler error types.

use thiserror::Error;

use crate::services::blockchain::ChainClientError;
use crate::services::endpoints::EndpointError;
use crate::services::monitor::MonitorError;

#[derive(Debug, Error)]
pub enum ScannerError {
	#[error("rescan range too large: {requested} blocks requested, maximum is {max}")]
	RangeTooLarge { requested: u64, max: u64 },

	#[error("invalid block range: {from_block} > {to_block}")]
	InvalidRange { from_block: u64, to_block: u64 },

	#[error("no chain client configured for chain {0}")]
	MissingClient(String),

	#[error(transparent)]
	Monitor(#[from] MonitorError),

	#[error(transparent)]
	Endpoint(#[from] EndpointError),

	#[error(transparent)]
	Client(#[from] ChainClientError),
}
