//! Storage port for persisted monitor state.
//!
//! The registry operates on in-memory domain values and writes snapshots
//! through this port, so the state machine is testable without a database.

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::error::MonitorError;
use crate::models::ChainMonitor;

const MONITOR_FILE_SUFFIX: &str = "_monitor.json";

/// Persistence port for chain monitor rows, keyed by chain slug.
#[async_trait]
pub trait MonitorStateStore: Send + Sync {
	async fn load_all(&self) -> Result<HashMap<String, ChainMonitor>, MonitorError>;
	async fn save(&self, monitor: &ChainMonitor) -> Result<(), MonitorError>;
}

/// File-backed store: one JSON document per chain under the data directory.
pub struct FileMonitorStateStore {
	storage_path: PathBuf,
}

impl FileMonitorStateStore {
	pub fn new(storage_path: impl Into<PathBuf>) -> Self {
		Self {
			storage_path: storage_path.into(),
		}
	}

	fn chain_file(&self, chain: &str) -> PathBuf {
		self.storage_path
			.join(format!("{}{}", chain, MONITOR_FILE_SUFFIX))
	}
}

impl Default for FileMonitorStateStore {
	fn default() -> Self {
		Self::new("data")
	}
}

#[async_trait]
impl MonitorStateStore for FileMonitorStateStore {
	async fn load_all(&self) -> Result<HashMap<String, ChainMonitor>, MonitorError> {
		let mut monitors = HashMap::new();
		if !self.storage_path.exists() {
			return Ok(monitors);
		}

		let mut entries = tokio::fs::read_dir(&self.storage_path).await?;
		while let Some(entry) = entries.next_entry().await? {
			let name = entry.file_name().to_string_lossy().to_string();
			if !name.ends_with(MONITOR_FILE_SUFFIX) {
				continue;
			}
			let content = tokio::fs::read_to_string(entry.path()).await?;
			let monitor: ChainMonitor = serde_json::from_str(&content)?;
			monitors.insert(monitor.chain.clone(), monitor);
		}

		Ok(monitors)
	}

	async fn save(&self, monitor: &ChainMonitor) -> Result<(), MonitorError> {
		tokio::fs::create_dir_all(&self.storage_path).await?;
		let json = serde_json::to_string_pretty(monitor)?;
		tokio::fs::write(self.chain_file(&monitor.chain), json).await?;
		Ok(())
	}
}

/// In-memory store for tests and ephemeral deployments.
#[derive(Default)]
pub struct InMemoryMonitorStateStore {
	monitors: Mutex<HashMap<String, ChainMonitor>>,
}

impl InMemoryMonitorStateStore {
	pub fn new() -> Self {
		Self::default()
	}
}

#[async_trait]
impl MonitorStateStore for InMemoryMonitorStateStore {
	async fn load_all(&self) -> Result<HashMap<String, ChainMonitor>, MonitorError> {
		Ok(self.monitors.lock().await.clone())
	}

	async fn save(&self, monitor: &ChainMonitor) -> Result<(), MonitorError> {
		self.monitors
			.lock()
			.await
			.insert(monitor.chain.clone(), monitor.clone());
		Ok(())
	}
}
