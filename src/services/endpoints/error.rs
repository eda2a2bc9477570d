//! Endpoint pool error types.

use thiserror::Error;
use uuid::Uuid;

use crate::utils::CipherError;

#[derive(Debug, Error)]
pub enum EndpointError {
	#[error("rpc endpoint {0} not found")]
	NotFound(Uuid),

	#[error("no active rpc endpoint available for chain {0}")]
	NoAvailableEndpoint(String),

	#[error("cannot remove or deactivate the last active rpc endpoint for chain {0}")]
	LastActiveEndpoint(String),

	#[error("rpc endpoint health check failed: {0}")]
	EndpointUnhealthy(String),

	#[error(transparent)]
	Cipher(#[from] CipherError),

	#[error("endpoint store error: {0}")]
	Store(String),
}

impl From<std::io::Error> for EndpointError {
	fn from(err: std::io::Error) -> Self {
		Self::Store(err.to_string())
	}
}

impl From<serde_json::Error> for EndpointError {
	fn from(err: serde_json::Error) -> Self {
		Self::Store(err.to_string())
	}
}
