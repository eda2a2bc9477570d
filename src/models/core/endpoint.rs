//! RPC endpoint records for the per-chain endpoint pool.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single RPC provider endpoint for a chain.
///
/// `url` holds the ciphertext form; plaintext URLs only exist transiently
/// while a request is being issued. Usage counters are updated by the
/// scheduler after every request and by explicit health checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcEndpoint {
	pub id: Uuid,
	pub chain: String,
	/// Encrypted endpoint URL (hex-encoded nonce + ciphertext).
	pub url: String,
	pub provider_name: String,
	pub is_active: bool,
	pub is_primary: bool,
	/// Lower is more preferred among active endpoints.
	pub priority: i32,
	pub last_latency_ms: Option<u64>,
	pub uptime_percent_30d: f64,
	pub total_request_count: u64,
	pub error_count: u64,
	pub last_checked_at: Option<DateTime<Utc>>,
}

impl RpcEndpoint {
	pub fn new(
		chain: &str,
		encrypted_url: String,
		provider_name: &str,
		is_primary: bool,
		priority: i32,
	) -> Self {
		Self {
			id: Uuid::new_v4(),
			chain: chain.to_string(),
			url: encrypted_url,
			provider_name: provider_name.to_string(),
			is_active: true,
			is_primary,
			priority,
			last_latency_ms: None,
			uptime_percent_30d: 100.0,
			total_request_count: 0,
			error_count: 0,
			last_checked_at: None,
		}
	}
}

/// Endpoint read-model with the URL masked for display.
#[derive(Debug, Clone, Serialize)]
pub struct EndpointView {
	pub id: Uuid,
	pub chain: String,
	pub url: String,
	pub provider_name: String,
	pub is_active: bool,
	pub is_primary: bool,
	pub priority: i32,
	pub last_latency_ms: Option<u64>,
	pub uptime_percent_30d: f64,
	pub total_request_count: u64,
	pub error_count: u64,
	pub last_checked_at: Option<DateTime<Utc>>,
}

impl EndpointView {
	pub fn from_endpoint(endpoint: &RpcEndpoint, masked_url: String) -> Self {
		Self {
			id: endpoint.id,
			chain: endpoint.chain.clone(),
			url: masked_url,
			provider_name: endpoint.provider_name.clone(),
			is_active: endpoint.is_active,
			is_primary: endpoint.is_primary,
			priority: endpoint.priority,
			last_latency_ms: endpoint.last_latency_ms,
			uptime_percent_30d: endpoint.uptime_percent_30d,
			total_request_count: endpoint.total_request_count,
			error_count: endpoint.error_count,
			last_checked_at: endpoint.last_checked_at,
		}
	}
}

/// Input for creating a new endpoint through the admin surface.
#[derive(Debug, Clone, Deserialize)]
pub struct NewEndpoint {
	pub chain: String,
	pub url: String,
	pub provider_name: String,
	#[serde(default)]
	pub is_primary: bool,
	#[serde(default)]
	pub priority: i32,
}

/// Partial update of an endpoint's selection attributes.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EndpointUpdate {
	pub is_active: Option<bool>,
	pub is_primary: Option<bool>,
	pub priority: Option<i32>,
}

/// Result of probing a single endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
	pub latency_ms: Option<u64>,
	pub block_number: Option<u64>,
	pub healthy: bool,
	pub error: Option<String>,
}
