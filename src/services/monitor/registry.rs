//! Per-chain monitor registry and state machine.
//!
//! The registry owns one single-writer state handle per chain: the scan
//! loop and admin operations both serialize on it for the duration of a
//! state transition, never across network I/O. Transitions append to the
//! scan ledger where the contract requires it, and the resulting snapshot
//! is persisted through the storage port.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{Mutex, RwLock};

use super::error::MonitorError;
use super::storage::MonitorStateStore;
use crate::models::{ChainMonitor, MonitorStatus, ScanRange, ScanRecord};
use crate::services::history::ScanLedger;

/// Registry of chain monitors keyed by chain slug.
pub struct MonitorRegistry {
	monitors: RwLock<HashMap<String, Arc<Mutex<ChainMonitor>>>>,
	store: Arc<dyn MonitorStateStore>,
	ledger: Arc<ScanLedger>,
}

impl MonitorRegistry {
	pub fn new(store: Arc<dyn MonitorStateStore>, ledger: Arc<ScanLedger>) -> Self {
		Self {
			monitors: RwLock::new(HashMap::new()),
			store,
			ledger,
		}
	}

	/// Registers a monitor at provisioning time. Existing entries are left
	/// untouched so persisted cursors survive re-registration.
	pub async fn register(&self, monitor: ChainMonitor) {
		let mut monitors = self.monitors.write().await;
		monitors
			.entry(monitor.chain.clone())
			.or_insert_with(|| Arc::new(Mutex::new(monitor)));
	}

	/// Chains currently registered.
	pub async fn chains(&self) -> Vec<String> {
		self.monitors.read().await.keys().cloned().collect()
	}

	async fn handle(&self, chain: &str) -> Result<Arc<Mutex<ChainMonitor>>, MonitorError> {
		self.monitors
			.read()
			.await
			.get(chain)
			.cloned()
			.ok_or_else(|| MonitorError::NotFound(chain.to_string()))
	}

	/// Point-in-time copy of a monitor's state.
	pub async fn snapshot(&self, chain: &str) -> Result<ChainMonitor, MonitorError> {
		let handle = self.handle(chain).await?;
		let monitor = handle.lock().await;
		Ok(monitor.clone())
	}

	/// Point-in-time copies of every monitor, sorted by chain for stable
	/// listings.
	pub async fn snapshot_all(&self) -> Vec<ChainMonitor> {
		let handles: Vec<_> = {
			let monitors = self.monitors.read().await;
			monitors.values().cloned().collect()
		};

		let mut snapshots = Vec::with_capacity(handles.len());
		for handle in handles {
			snapshots.push(handle.lock().await.clone());
		}
		snapshots.sort_by(|a, b| a.chain.cmp(&b.chain));
		snapshots
	}

	/// Records a successful forward scan that advanced the cursor to
	/// `new_cursor`.
	///
	/// Rejects cursor regression: the forward cursor never decreases, and
	/// historical reprocessing goes through the rescan path instead. Resets
	/// the error counters, updates cumulative totals, recovers the monitor
	/// from `Syncing`/`Error` to `Running`, and appends a success row to the
	/// ledger.
	pub async fn record_successful_scan(
		&self,
		chain: &str,
		new_cursor: u64,
		deposits_found: u32,
		duration_ms: u64,
	) -> Result<ChainMonitor, MonitorError> {
		let handle = self.handle(chain).await?;

		let (snapshot, range) = {
			let mut monitor = handle.lock().await;

			if new_cursor < monitor.last_scanned_block {
				return Err(MonitorError::CursorRegression {
					chain: chain.to_string(),
					current: monitor.last_scanned_block,
					attempted: new_cursor,
				});
			}

			let range = ScanRange::new(monitor.last_scanned_block + 1, new_cursor);
			let advanced = new_cursor - monitor.last_scanned_block;

			monitor.last_scanned_block = new_cursor;
			monitor.last_scan_at = Some(Utc::now());
			monitor.consecutive_errors = 0;
			monitor.last_error_message = None;
			monitor.total_deposits_detected += deposits_found as u64;
			monitor.total_blocks_scanned += advanced;
			if matches!(
				monitor.status,
				MonitorStatus::Syncing | MonitorStatus::Error
			) {
				monitor.status = MonitorStatus::Running;
			}

			(monitor.clone(), range)
		};

		self.ledger
			.append(ScanRecord::success(chain, range, deposits_found, duration_ms))
			.await;
		self.persist(&snapshot).await;
		Ok(snapshot)
	}

	/// Records a failed scan attempt over `attempted_range`.
	///
	/// Increments the consecutive-error counter and flips the monitor to
	/// `Error` once the chain-configured threshold is crossed. The cursor is
	/// never advanced. When the failure happened before a range could be
	/// computed (head fetch, endpoint selection), the single block after the
	/// cursor stands in as the attempted range.
	pub async fn record_failed_scan(
		&self,
		chain: &str,
		attempted_range: Option<ScanRange>,
		error_message: &str,
	) -> Result<ChainMonitor, MonitorError> {
		let handle = self.handle(chain).await?;

		let (snapshot, range) = {
			let mut monitor = handle.lock().await;

			let range = attempted_range.unwrap_or_else(|| {
				ScanRange::new(monitor.last_scanned_block + 1, monitor.last_scanned_block + 1)
			});

			monitor.consecutive_errors += 1;
			monitor.last_scan_at = Some(Utc::now());
			monitor.last_error_at = Some(Utc::now());
			monitor.last_error_message = Some(error_message.to_string());
			if monitor.consecutive_errors >= monitor.error_threshold
				&& monitor.status != MonitorStatus::Paused
			{
				monitor.status = MonitorStatus::Error;
			}

			(monitor.clone(), range)
		};

		if snapshot.status == MonitorStatus::Error {
			tracing::error!(
				chain,
				consecutive_errors = snapshot.consecutive_errors,
				"monitor entered ERROR state; explicit resume required"
			);
		}

		self.ledger
			.append(ScanRecord::failure(chain, range, error_message))
			.await;
		self.persist(&snapshot).await;
		Ok(snapshot)
	}

	/// Pauses a monitor. Valid from `Running`, `Error` and `Syncing`.
	///
	/// Returns the before/after snapshots for the caller's audit trail.
	pub async fn pause(
		&self,
		chain: &str,
	) -> Result<(ChainMonitor, ChainMonitor), MonitorError> {
		let handle = self.handle(chain).await?;

		let (before, after) = {
			let mut monitor = handle.lock().await;
			if monitor.status == MonitorStatus::Paused {
				return Err(MonitorError::InvalidState {
					chain: chain.to_string(),
					status: monitor.status,
				});
			}
			let before = monitor.clone();
			monitor.status = MonitorStatus::Paused;
			(before, monitor.clone())
		};

		self.persist(&after).await;
		Ok((before, after))
	}

	/// Resumes a paused monitor, or manually unsticks one in `Error`.
	/// Resets the consecutive-error counter either way.
	pub async fn resume(
		&self,
		chain: &str,
	) -> Result<(ChainMonitor, ChainMonitor), MonitorError> {
		let handle = self.handle(chain).await?;

		let (before, after) = {
			let mut monitor = handle.lock().await;
			if !matches!(monitor.status, MonitorStatus::Paused | MonitorStatus::Error) {
				return Err(MonitorError::InvalidState {
					chain: chain.to_string(),
					status: monitor.status,
				});
			}
			let before = monitor.clone();
			monitor.status = MonitorStatus::Running;
			monitor.consecutive_errors = 0;
			(before, monitor.clone())
		};

		self.persist(&after).await;
		Ok((before, after))
	}

	/// Updates the observed chain head after a successful head fetch.
	pub async fn refresh_head(&self, chain: &str, head: u64) -> Result<(), MonitorError> {
		let handle = self.handle(chain).await?;

		let snapshot = {
			let mut monitor = handle.lock().await;
			monitor.latest_known_block = Some(head);
			monitor.clone()
		};

		self.persist(&snapshot).await;
		Ok(())
	}

	/// Best-effort persistence of a state snapshot. Store failures are
	/// logged and swallowed; the in-memory state machine stays
	/// authoritative so a transient disk error cannot wedge a scan loop.
	async fn persist(&self, snapshot: &ChainMonitor) {
		if let Err(e) = self.store.save(snapshot).await {
			tracing::warn!(chain = %snapshot.chain, error = %e, "failed to persist monitor state");
		}
	}
}
