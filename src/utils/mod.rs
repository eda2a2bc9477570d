//! Utility modules for common functionality.
//!
//! - cipher: AES-GCM encryption for endpoint URLs at rest
//! - http: retryable HTTP client construction
//! - logging: tracing setup
//! - tests: builder helpers for tests

pub mod cipher;
pub mod http;
pub mod logging;
pub mod tests;

pub use cipher::{CipherError, UrlCipher, ENDPOINT_KEY_ENV};
pub use http::{create_retryable_http_client, HttpRetryConfig};
