//! Retryable HTTP client construction.
//!
//! All outbound RPC traffic goes through a `reqwest-middleware` client with
//! exponential-backoff retry for transient failures.

use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{policies::ExponentialBackoff, Jitter, RetryTransientMiddleware};
use std::time::Duration;

/// Configuration for HTTP retry policies.
#[derive(Debug, Clone)]
pub struct HttpRetryConfig {
	/// Maximum number of retries for transient errors.
	pub max_retries: u32,
	/// Base duration for exponential backoff calculations.
	pub base_for_backoff: u32,
	/// Initial backoff duration before the first retry.
	pub initial_backoff: Duration,
	/// Maximum backoff duration for retries.
	pub max_backoff: Duration,
	/// Jitter to apply to the backoff duration.
	pub jitter: Jitter,
}

impl Default for HttpRetryConfig {
	fn default() -> Self {
		Self {
			max_retries: 3,
			base_for_backoff: 2,
			initial_backoff: Duration::from_millis(250),
			max_backoff: Duration::from_secs(10),
			jitter: Jitter::Full,
		}
	}
}

/// Creates a retryable HTTP client with sane pool and connect timeouts.
///
/// # Arguments
/// * `config` - Retry policy configuration
/// * `request_timeout` - Per-request timeout applied at the client level
pub fn create_retryable_http_client(
	config: &HttpRetryConfig,
	request_timeout: Duration,
) -> Result<ClientWithMiddleware, reqwest::Error> {
	let retry_policy = ExponentialBackoff::builder()
		.base(config.base_for_backoff)
		.retry_bounds(config.initial_backoff, config.max_backoff)
		.jitter(config.jitter)
		.build_with_max_retries(config.max_retries);

	let base_client = reqwest::Client::builder()
		.pool_max_idle_per_host(10)
		.pool_idle_timeout(Some(Duration::from_secs(90)))
		.connect_timeout(Duration::from_secs(10))
		.timeout(request_timeout)
		.build()?;

	Ok(ClientBuilder::new(base_client)
		.with(RetryTransientMiddleware::new_with_policy(retry_policy))
		.build())
}
