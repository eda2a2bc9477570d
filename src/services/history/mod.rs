//! Append-only ledger of scan attempts.
//!
//! Every scan attempt (forward or rescan) produces exactly one record. The
//! ledger exists for observability and operator audit; the scheduler never
//! reads it back for decision-making.

mod error;
mod storage;

use std::sync::Arc;

pub use error::HistoryError;
pub use storage::{FileScanHistoryStore, InMemoryScanHistoryStore, ScanHistoryStore};

use crate::models::ScanRecord;

/// Default page size for history reads from the admin surface.
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

/// Thin service over the history store.
pub struct ScanLedger {
	store: Arc<dyn ScanHistoryStore>,
}

impl ScanLedger {
	pub fn new(store: Arc<dyn ScanHistoryStore>) -> Self {
		Self { store }
	}

	/// Appends a record. Persistence failures are logged and swallowed: the
	/// ledger is observability, not a transactional participant in scan
	/// state.
	pub async fn append(&self, record: ScanRecord) {
		if let Err(e) = self.store.append(&record).await {
			tracing::warn!(
				chain = %record.chain,
				error = %e,
				"failed to append scan history record"
			);
		}
	}

	/// Most recent records for a chain, newest first.
	pub async fn recent(
		&self,
		chain: &str,
		limit: Option<usize>,
	) -> Result<Vec<ScanRecord>, HistoryError> {
		self.store
			.recent(chain, limit.unwrap_or(DEFAULT_HISTORY_LIMIT))
			.await
	}
}
