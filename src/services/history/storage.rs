//! Storage port for the append-only scan history.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use super::error::HistoryError;
use crate::models::ScanRecord;

/// Persistence port for scan attempt records.
///
/// Records are immutable once appended and ordered by creation time.
#[async_trait]
pub trait ScanHistoryStore: Send + Sync {
	async fn append(&self, record: &ScanRecord) -> Result<(), HistoryError>;

	/// Most recent records for a chain, newest first, at most `limit`.
	async fn recent(&self, chain: &str, limit: usize) -> Result<Vec<ScanRecord>, HistoryError>;
}

/// File-backed history store: one JSON-lines file per chain under the data
/// directory.
pub struct FileScanHistoryStore {
	storage_path: PathBuf,
}

impl FileScanHistoryStore {
	pub fn new(storage_path: impl Into<PathBuf>) -> Self {
		Self {
			storage_path: storage_path.into(),
		}
	}

	fn chain_file(&self, chain: &str) -> PathBuf {
		self.storage_path.join(format!("{}_scan_history.jsonl", chain))
	}
}

impl Default for FileScanHistoryStore {
	fn default() -> Self {
		Self::new("data")
	}
}

#[async_trait]
impl ScanHistoryStore for FileScanHistoryStore {
	async fn append(&self, record: &ScanRecord) -> Result<(), HistoryError> {
		tokio::fs::create_dir_all(&self.storage_path).await?;

		let mut line = serde_json::to_string(record)?;
		line.push('\n');

		let mut file = tokio::fs::OpenOptions::new()
			.create(true)
			.append(true)
			.open(self.chain_file(&record.chain))
			.await?;
		file.write_all(line.as_bytes()).await?;
		Ok(())
	}

	async fn recent(&self, chain: &str, limit: usize) -> Result<Vec<ScanRecord>, HistoryError> {
		let path = self.chain_file(chain);
		if !path.exists() {
			return Ok(Vec::new());
		}

		let content = tokio::fs::read_to_string(path).await?;
		let mut records = content
			.lines()
			.filter(|line| !line.trim().is_empty())
			.map(serde_json::from_str::<ScanRecord>)
			.collect::<Result<Vec<_>, _>>()?;

		records.reverse();
		records.truncate(limit);
		Ok(records)
	}
}

/// In-memory history store for tests and ephemeral deployments.
#[derive(Default)]
pub struct InMemoryScanHistoryStore {
	records: Mutex<Vec<ScanRecord>>,
}

impl InMemoryScanHistoryStore {
	pub fn new() -> Self {
		Self::default()
	}
}

#[async_trait]
impl ScanHistoryStore for InMemoryScanHistoryStore {
	async fn append(&self, record: &ScanRecord) -> Result<(), HistoryError> {
		self.records.lock().await.push(record.clone());
		Ok(())
	}

	async fn recent(&self, chain: &str, limit: usize) -> Result<Vec<ScanRecord>, HistoryError> {
		let records = self.records.lock().await;
		Ok(records
			.iter()
			.rev()
			.filter(|r| r.chain == chain)
			.take(limit)
			.cloned()
			.collect())
	}
}
