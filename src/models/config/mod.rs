//! Configuration loading for chain definitions.

use std::path::Path;

mod chain_config;
mod error;

pub use chain_config::{ChainConfig, EndpointSeed, DEFAULT_ERROR_THRESHOLD};
pub use error::ConfigError;

/// Common interface for loading configuration files.
pub trait ConfigLoader: Sized {
	fn load_all<T>(path: Option<&Path>) -> Result<T, ConfigError>
	where
		T: FromIterator<(String, Self)>;

	fn load_from_path(path: &Path) -> Result<Self, ConfigError>;

	fn validate(&self) -> Result<(), String>;

	fn is_json_file(path: &Path) -> bool {
		path.extension()
			.map(|ext| ext.to_string_lossy().to_lowercase() == "json")
			.unwrap_or(false)
	}
}
