//! Storage port for rpc endpoint rows.

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::error::EndpointError;
use crate::models::RpcEndpoint;

const ENDPOINT_FILE_SUFFIX: &str = "_endpoints.json";

/// Persistence port for endpoint rows, grouped by chain.
#[async_trait]
pub trait EndpointStore: Send + Sync {
	async fn load_all(&self) -> Result<HashMap<String, Vec<RpcEndpoint>>, EndpointError>;
	async fn save_chain(
		&self,
		chain: &str,
		endpoints: &[RpcEndpoint],
	) -> Result<(), EndpointError>;
}

/// File-backed store: one JSON document per chain under the data directory.
pub struct FileEndpointStore {
	storage_path: PathBuf,
}

impl FileEndpointStore {
	pub fn new(storage_path: impl Into<PathBuf>) -> Self {
		Self {
			storage_path: storage_path.into(),
		}
	}

	fn chain_file(&self, chain: &str) -> PathBuf {
		self.storage_path
			.join(format!("{}{}", chain, ENDPOINT_FILE_SUFFIX))
	}
}

impl Default for FileEndpointStore {
	fn default() -> Self {
		Self::new("data")
	}
}

#[async_trait]
impl EndpointStore for FileEndpointStore {
	async fn load_all(&self) -> Result<HashMap<String, Vec<RpcEndpoint>>, EndpointError> {
		let mut by_chain = HashMap::new();
		if !self.storage_path.exists() {
			return Ok(by_chain);
		}

		let mut entries = tokio::fs::read_dir(&self.storage_path).await?;
		while let Some(entry) = entries.next_entry().await? {
			let name = entry.file_name().to_string_lossy().to_string();
			let Some(chain) = name.strip_suffix(ENDPOINT_FILE_SUFFIX) else {
				continue;
			};
			let content = tokio::fs::read_to_string(entry.path()).await?;
			let endpoints: Vec<RpcEndpoint> = serde_json::from_str(&content)?;
			by_chain.insert(chain.to_string(), endpoints);
		}

		Ok(by_chain)
	}

	async fn save_chain(
		&self,
		chain: &str,
		endpoints: &[RpcEndpoint],
	) -> Result<(), EndpointError> {
		tokio::fs::create_dir_all(&self.storage_path).await?;
		let json = serde_json::to_string_pretty(endpoints)?;
		tokio::fs::write(self.chain_file(chain), json).await?;
		Ok(())
	}
}

/// In-memory store for tests and ephemeral deployments.
#[derive(Default)]
pub struct InMemoryEndpointStore {
	by_chain: Mutex<HashMap<String, Vec<RpcEndpoint>>>,
}

impl InMemoryEndpointStore {
	pub fn new() -> Self {
		Self::default()
	}
}

#[async_trait]
impl EndpointStore for InMemoryEndpointStore {
	async fn load_all(&self) -> Result<HashMap<String, Vec<RpcEndpoint>>, EndpointError> {
		Ok(self.by_chain.lock().await.clone())
	}

	async fn save_chain(
		&self,
		chain: &str,
		endpoints: &[RpcEndpoint],
	) -> Result<(), EndpointError> {
		self.by_chain
			.lock()
			.await
			.insert(chain.to_string(), endpoints.to_vec());
		Ok(())
	}
}
