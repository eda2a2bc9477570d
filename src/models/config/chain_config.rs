//! Chain definitions loaded from `config/chains/*.json`.
//!
//! Each file provisions one chain: scan batching, polling cadence, the
//! JSON-RPC method used for head fetches, and the initial endpoint seeds.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::ConfigError;
use super::ConfigLoader;

/// Default consecutive-failure threshold before a monitor flips to ERROR.
pub const DEFAULT_ERROR_THRESHOLD: u32 = 5;

fn default_error_threshold() -> u32 {
	DEFAULT_ERROR_THRESHOLD
}

fn default_head_method() -> String {
	"eth_blockNumber".to_string()
}

/// An endpoint seeded at provisioning time. The URL is plaintext here and
/// encrypted before it ever reaches the endpoint store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointSeed {
	pub url: String,
	pub provider_name: String,
	#[serde(default)]
	pub is_primary: bool,
	#[serde(default)]
	pub priority: i32,
}

/// Static definition of a monitored chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainConfig {
	/// Unique chain identifier (lowercase slug, e.g. `base`, `polygon`).
	pub chain: String,
	pub name: String,
	pub blocks_per_scan: u64,
	pub polling_interval_secs: u64,
	pub avg_block_time_secs: f64,
	#[serde(default = "default_error_threshold")]
	pub error_threshold: u32,
	/// JSON-RPC method used for head fetches and liveness probes.
	#[serde(default = "default_head_method")]
	pub head_method: String,
	#[serde(default)]
	pub endpoints: Vec<EndpointSeed>,
}

impl ConfigLoader for ChainConfig {
	fn load_all<T>(path: Option<&Path>) -> Result<T, ConfigError>
	where
		T: FromIterator<(String, Self)>,
	{
		let chain_dir = path.unwrap_or(Path::new("config/chains"));
		let mut pairs = Vec::new();

		if !chain_dir.exists() {
			return Err(ConfigError::FileError(std::io::Error::new(
				std::io::ErrorKind::NotFound,
				format!("chain config directory not found: {}", chain_dir.display()),
			)));
		}

		for entry in std::fs::read_dir(chain_dir)? {
			let path = entry?.path();
			if !Self::is_json_file(&path) {
				continue;
			}
			let config = Self::load_from_path(&path)?;
			pairs.push((config.chain.clone(), config));
		}

		Ok(T::from_iter(pairs))
	}

	fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
		let file = std::fs::File::open(path)?;
		let config: ChainConfig = serde_json::from_reader(file)?;

		config
			.validate()
			.map_err(ConfigError::ValidationError)?;

		Ok(config)
	}

	fn validate(&self) -> Result<(), String> {
		if !self
			.chain
			.chars()
			.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
			|| self.chain.is_empty()
		{
			return Err(
				"Chain slug must contain only lowercase letters, numbers, and underscores"
					.to_string(),
			);
		}

		if self.blocks_per_scan == 0 {
			return Err("blocks_per_scan must be greater than 0".to_string());
		}

		if self.polling_interval_secs == 0 {
			return Err("polling_interval_secs must be greater than 0".to_string());
		}

		if self.error_threshold == 0 {
			return Err("error_threshold must be greater than 0".to_string());
		}

		if !self
			.endpoints
			.iter()
			.all(|e| e.url.starts_with("http://") || e.url.starts_with("https://"))
		{
			return Err("All endpoint URLs must start with http:// or https://".to_string());
		}

		Ok(())
	}
}
