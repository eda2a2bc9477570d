//! Chain client port and the JSON-RPC HTTP implementation.
//!
//! The per-chain deposit parsing lives outside this crate; the client only
//! exposes the two orchestration-level calls the scheduler needs: fetching
//! the chain head and scanning a block range for raw deposit events.

use std::time::Duration;

use async_trait::async_trait;
use reqwest_middleware::ClientWithMiddleware;
use serde_json::{json, Value};

use super::error::ChainClientError;
use crate::models::RangeScan;
use crate::utils::{create_retryable_http_client, HttpRetryConfig};

/// Default timeout for liveness probes and head fetches.
pub const DEFAULT_RPC_TIMEOUT: Duration = Duration::from_secs(5);

/// Fallible, timeout-bounded view of a chain's RPC surface.
///
/// Implementations are addressed by endpoint URL per call so the endpoint
/// pool stays in charge of failover.
#[async_trait]
pub trait ChainClient: Send + Sync {
	/// Fetches the current chain head block number.
	async fn fetch_head_block(&self, endpoint_url: &str) -> Result<u64, ChainClientError>;

	/// Scans an inclusive block range for deposit events.
	async fn scan_range(
		&self,
		endpoint_url: &str,
		from_block: u64,
		to_block: u64,
	) -> Result<RangeScan, ChainClientError>;
}

/// JSON-RPC chain client over HTTP with retrying middleware.
#[derive(Clone, Debug)]
pub struct HttpChainClient {
	client: ClientWithMiddleware,
	head_method: String,
	logs_method: String,
	timeout: Duration,
}

impl HttpChainClient {
	pub fn new(head_method: &str, timeout: Duration) -> Result<Self, ChainClientError> {
		let client = create_retryable_http_client(&HttpRetryConfig::default(), timeout)?;
		Ok(Self {
			client,
			head_method: head_method.to_string(),
			logs_method: "eth_getLogs".to_string(),
			timeout,
		})
	}

	async fn send_rpc(
		&self,
		endpoint_url: &str,
		method: &str,
		params: Value,
	) -> Result<Value, ChainClientError> {
		let body = json!({
			"jsonrpc": "2.0",
			"id": 1,
			"method": method,
			"params": params,
		});

		let request = self
			.client
			.post(endpoint_url)
			.header("Content-Type", "application/json")
			.json(&body)
			.send();

		let response = tokio::time::timeout(self.timeout, request)
			.await
			.map_err(|_| ChainClientError::Timeout(self.timeout))??;

		let payload: Value = response.error_for_status()?.json().await?;

		if let Some(error) = payload.get("error") {
			return Err(ChainClientError::Rpc(error.to_string()));
		}

		payload
			.get("result")
			.cloned()
			.ok_or_else(|| ChainClientError::MalformedResponse("missing result field".to_string()))
	}
}

#[async_trait]
impl ChainClient for HttpChainClient {
	async fn fetch_head_block(&self, endpoint_url: &str) -> Result<u64, ChainClientError> {
		let result = self
			.send_rpc(endpoint_url, &self.head_method, json!([]))
			.await?;
		parse_block_number(&result)
	}

	async fn scan_range(
		&self,
		endpoint_url: &str,
		from_block: u64,
		to_block: u64,
	) -> Result<RangeScan, ChainClientError> {
		let params = json!([{
			"fromBlock": format!("{:#x}", from_block),
			"toBlock": format!("{:#x}", to_block),
		}]);
		let result = self.send_rpc(endpoint_url, &self.logs_method, params).await?;

		let raw_events = result
			.as_array()
			.cloned()
			.ok_or_else(|| {
				ChainClientError::MalformedResponse("expected an array of events".to_string())
			})?;

		Ok(RangeScan {
			deposits_found: raw_events.len() as u32,
			raw_events,
		})
	}
}

/// Parses a block number from a JSON-RPC result, accepting both hex-string
/// (`"0x10d4f"`) and plain numeric encodings.
fn parse_block_number(result: &Value) -> Result<u64, ChainClientError> {
	if let Some(number) = result.as_u64() {
		return Ok(number);
	}

	if let Some(text) = result.as_str() {
		let digits = text.trim_start_matches("0x");
		let radix = if text.starts_with("0x") { 16 } else { 10 };
		return u64::from_str_radix(digits, radix).map_err(|_| {
			ChainClientError::MalformedResponse(format!("unparseable block number: {}", text))
		});
	}

	Err(ChainClientError::MalformedResponse(format!(
		"unexpected head block payload: {}",
		result
	)))
}
