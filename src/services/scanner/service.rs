//! Per-chain scan loops.
//!
//! One long-lived task per chain, each owning an explicit ticker. Loops are
//! fault-isolated: a chain's persistent failure is absorbed into its
//! monitor state and never terminates the scheduler or another chain's
//! loop. Pause takes effect before the next cycle; an iteration already in
//! flight completes and its effects are applied.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::error::ScannerError;
use crate::models::{MonitorStatus, RangeScan, ScanRange};
use crate::services::blockchain::ChainClient;
use crate::services::endpoints::EndpointPool;
use crate::services::history::ScanLedger;
use crate::services::monitor::MonitorRegistry;

/// Callback receiving deposits found in a scanned range. The settlement
/// ingestion pipeline lives outside this crate.
pub type DepositHandler = Arc<dyn Fn(&str, &RangeScan) + Send + Sync>;

/// Outcome of a single scan cycle, mainly for logging and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
	/// Monitor is paused or errored; nothing was attempted.
	Skipped(MonitorStatus),
	/// Cursor already at the chain head; no scan, no history row.
	CaughtUp,
	/// Range scanned and cursor advanced.
	Scanned { range: ScanRange, deposits_found: u32 },
	/// Attempt failed and was recorded against the monitor.
	Failed,
}

/// Scheduler owning one polling loop per chain.
pub struct ScanScheduler {
	registry: Arc<MonitorRegistry>,
	pool: Arc<EndpointPool>,
	ledger: Arc<ScanLedger>,
	clients: HashMap<String, Arc<dyn ChainClient>>,
	deposit_handler: DepositHandler,
	shutdown: watch::Sender<bool>,
	tasks: Mutex<HashMap<String, JoinHandle<()>>>,
}

impl ScanScheduler {
	pub fn new(
		registry: Arc<MonitorRegistry>,
		pool: Arc<EndpointPool>,
		ledger: Arc<ScanLedger>,
		clients: HashMap<String, Arc<dyn ChainClient>>,
		deposit_handler: DepositHandler,
	) -> Self {
		let (shutdown, _) = watch::channel(false);
		Self {
			registry,
			pool,
			ledger,
			clients,
			deposit_handler,
			shutdown,
			tasks: Mutex::new(HashMap::new()),
		}
	}

	pub(crate) fn client_for(&self, chain: &str) -> Result<Arc<dyn ChainClient>, ScannerError> {
		self.clients
			.get(chain)
			.cloned()
			.ok_or_else(|| ScannerError::MissingClient(chain.to_string()))
	}

	/// Starts the polling loop for a chain. The first cycle runs
	/// immediately, subsequent cycles at the monitor's polling interval.
	pub async fn start_chain_watcher(&self, chain: &str) -> Result<(), ScannerError> {
		let snapshot = self.registry.snapshot(chain).await?;
		let client = self.client_for(chain)?;

		let registry = self.registry.clone();
		let pool = self.pool.clone();
		let deposit_handler = self.deposit_handler.clone();
		let mut shutdown_rx = self.shutdown.subscribe();
		let chain_name = chain.to_string();
		let interval_secs = snapshot.polling_interval_secs.max(1);

		let handle = tokio::spawn(async move {
			let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs));
			ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

			loop {
				tokio::select! {
					_ = ticker.tick() => {
						match run_scan_cycle(
							&registry,
							&pool,
							client.as_ref(),
							&deposit_handler,
							&chain_name,
						)
						.await
						{
							Ok(outcome) => {
								tracing::debug!(chain = %chain_name, outcome = ?outcome, "scan cycle complete");
							}
							Err(e) => {
								// Registry-level failures (e.g. monitor deregistered);
								// scan failures are already absorbed into CycleOutcome.
								tracing::error!(chain = %chain_name, error = %e, "scan cycle error");
							}
						}
					}
					changed = shutdown_rx.changed() => {
						if changed.is_err() || *shutdown_rx.borrow() {
							break;
						}
					}
				}
			}
			tracing::info!(chain = %chain_name, "scan loop stopped");
		});

		self.tasks.lock().await.insert(chain.to_string(), handle);
		tracing::info!(chain, interval_secs, "scheduled scan loop");
		Ok(())
	}

	/// Stops a single chain's loop.
	pub async fn stop_chain_watcher(&self, chain: &str) {
		if let Some(handle) = self.tasks.lock().await.remove(chain) {
			handle.abort();
			tracing::info!(chain, "scan loop aborted");
		}
	}

	/// Signals all loops to stop and waits for them to drain.
	pub async fn shutdown(&self) {
		let _ = self.shutdown.send(true);
		let handles: Vec<JoinHandle<()>> = self
			.tasks
			.lock()
			.await
			.drain()
			.map(|(_, handle)| handle)
			.collect();
		for result in futures::future::join_all(handles).await {
			if let Err(e) = result {
				if !e.is_cancelled() {
					tracing::error!(error = %e, "scan loop join error");
				}
			}
		}
	}

	/// Runs one scan cycle for a chain immediately, outside its ticker.
	pub async fn scan_chain_once(&self, chain: &str) -> Result<CycleOutcome, ScannerError> {
		let client = self.client_for(chain)?;
		run_scan_cycle(
			&self.registry,
			&self.pool,
			client.as_ref(),
			&self.deposit_handler,
			chain,
		)
		.await
	}

	pub(crate) fn registry(&self) -> &Arc<MonitorRegistry> {
		&self.registry
	}

	pub(crate) fn pool(&self) -> &Arc<EndpointPool> {
		&self.pool
	}

	pub(crate) fn ledger(&self) -> &Arc<ScanLedger> {
		&self.ledger
	}

	pub(crate) fn deposit_handler(&self) -> &DepositHandler {
		&self.deposit_handler
	}
}

/// One polling iteration for a chain.
///
/// Monitor state is only held across transitions; endpoint selection, head
/// fetch and the range scan all happen between lock acquisitions. Transient
/// failures are recorded against the monitor and absorbed; only
/// registry-level errors (unknown chain) propagate.
async fn run_scan_cycle(
	registry: &MonitorRegistry,
	pool: &EndpointPool,
	client: &dyn ChainClient,
	deposit_handler: &DepositHandler,
	chain: &str,
) -> Result<CycleOutcome, ScannerError> {
	let snapshot = registry.snapshot(chain).await?;

	// Paused chains wait for resume; errored chains wait for an explicit
	// operator resume rather than retrying into the same failure.
	if matches!(snapshot.status, MonitorStatus::Paused | MonitorStatus::Error) {
		return Ok(CycleOutcome::Skipped(snapshot.status));
	}

	// NoAvailableEndpoint (and any other selection failure) fails this
	// attempt through the normal error path rather than crashing the loop.
	let selected = match pool.select(chain).await {
		Ok(selected) => selected,
		Err(e) => {
			registry
				.record_failed_scan(chain, None, &e.to_string())
				.await?;
			return Ok(CycleOutcome::Failed);
		}
	};

	let cycle_started = Instant::now();
	let head = match client.fetch_head_block(&selected.url).await {
		Ok(head) => {
			let latency = cycle_started.elapsed().as_millis() as u64;
			pool.record_usage(chain, selected.id, Some(latency), true).await;
			head
		}
		Err(e) => {
			pool.record_usage(chain, selected.id, None, false).await;
			registry
				.record_failed_scan(chain, None, &e.to_string())
				.await?;
			return Ok(CycleOutcome::Failed);
		}
	};

	registry.refresh_head(chain, head).await?;

	let from_block = snapshot.last_scanned_block + 1;
	let to_block = (snapshot.last_scanned_block + snapshot.blocks_per_scan).min(head);
	if to_block < from_block {
		return Ok(CycleOutcome::CaughtUp);
	}
	let range = ScanRange::new(from_block, to_block);

	match client.scan_range(&selected.url, from_block, to_block).await {
		Ok(scan) => {
			pool.record_usage(chain, selected.id, None, true).await;
			(deposit_handler)(chain, &scan);
			let duration_ms = cycle_started.elapsed().as_millis() as u64;
			registry
				.record_successful_scan(chain, to_block, scan.deposits_found, duration_ms)
				.await?;
			Ok(CycleOutcome::Scanned {
				range,
				deposits_found: scan.deposits_found,
			})
		}
		Err(e) => {
			pool.record_usage(chain, selected.id, None, false).await;
			registry
				.record_failed_scan(chain, Some(range), &e.to_string())
				.await?;
			Ok(CycleOutcome::Failed)
		}
	}
}
