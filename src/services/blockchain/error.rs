//! Chain client error types.

use std::time::Duration;

use thiserror::Error;

/// Errors surfaced by chain RPC calls.
///
/// These are absorbed by the scheduler into monitor state; they never crash
/// a scan loop.
#[derive(Debug, Error)]
pub enum ChainClientError {
	#[error("request failed: {0}")]
	Request(#[from] reqwest_middleware::Error),

	#[error("transport error: {0}")]
	Transport(#[from] reqwest::Error),

	#[error("request timed out after {0:?}")]
	Timeout(Duration),

	#[error("rpc error: {0}")]
	Rpc(String),

	#[error("malformed response: {0}")]
	MalformedResponse(String),
}
