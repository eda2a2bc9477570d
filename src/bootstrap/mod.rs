//! Bootstrap module for wiring the monitoring stack together.
//!
//! Loads chain configurations, merges persisted monitor state with config
//! seeds, hydrates the endpoint pool, and assembles the scheduler and the
//! admin surface around shared, ownership-explicit components.

use std::collections::HashMap;
use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::{
	models::{ChainConfig, ChainMonitor, ConfigLoader},
	services::{
		admin::AdminService,
		audit::{AuditSink, TracingAuditSink},
		blockchain::{ChainClient, HttpChainClient, DEFAULT_RPC_TIMEOUT},
		endpoints::{EndpointPool, FileEndpointStore},
		history::{FileScanHistoryStore, ScanLedger},
		monitor::{FileMonitorStateStore, MonitorRegistry, MonitorStateStore},
		scanner::{DepositHandler, ScanScheduler},
	},
	utils::UrlCipher,
};

/// Type alias for handling ServiceResult
pub type Result<T> = std::result::Result<T, Box<dyn Error>>;

/// The assembled monitoring stack.
pub struct MonitoringStack {
	pub registry: Arc<MonitorRegistry>,
	pub pool: Arc<EndpointPool>,
	pub scheduler: Arc<ScanScheduler>,
	pub admin: Arc<AdminService>,
	pub chains: Vec<String>,
}

/// Initializes all services for the deposit monitor.
///
/// # Arguments
/// * `config_path` - Directory of chain config files (default `config/chains`)
/// * `data_path` - Directory for persisted state (default `data`)
/// * `deposit_handler` - Callback receiving deposits found by scans
pub async fn initialize_services(
	config_path: Option<&Path>,
	data_path: Option<&Path>,
	deposit_handler: DepositHandler,
) -> Result<MonitoringStack> {
	let configs: HashMap<String, ChainConfig> = ChainConfig::load_all(config_path)?;
	if configs.is_empty() {
		return Err("no chain configurations found".into());
	}

	let data_dir: PathBuf = data_path.unwrap_or(Path::new("data")).to_path_buf();
	let cipher = UrlCipher::from_env()?;

	let monitor_store: Arc<dyn MonitorStateStore> =
		Arc::new(FileMonitorStateStore::new(&data_dir));
	let ledger = Arc::new(ScanLedger::new(Arc::new(FileScanHistoryStore::new(
		&data_dir,
	))));

	// Persisted cursors survive restarts; batching and cadence always come
	// from config so operators can retune without editing state files.
	let persisted = monitor_store.load_all().await?;
	let registry = Arc::new(MonitorRegistry::new(monitor_store, ledger.clone()));
	for config in configs.values() {
		let mut monitor = persisted.get(&config.chain).cloned().unwrap_or_else(|| {
			ChainMonitor::seed(
				&config.chain,
				config.blocks_per_scan,
				config.polling_interval_secs,
				config.avg_block_time_secs,
				config.error_threshold,
			)
		});
		monitor.blocks_per_scan = config.blocks_per_scan;
		monitor.polling_interval_secs = config.polling_interval_secs;
		monitor.avg_block_time_secs = config.avg_block_time_secs;
		monitor.error_threshold = config.error_threshold;
		registry.register(monitor).await;
	}

	let default_probe: Arc<dyn ChainClient> = Arc::new(HttpChainClient::new(
		"eth_blockNumber",
		DEFAULT_RPC_TIMEOUT,
	)?);
	let pool = Arc::new(EndpointPool::new(
		Arc::new(FileEndpointStore::new(&data_dir)),
		cipher,
		default_probe,
	));
	pool.hydrate().await?;

	let mut clients: HashMap<String, Arc<dyn ChainClient>> = HashMap::new();
	for config in configs.values() {
		let client: Arc<dyn ChainClient> = Arc::new(HttpChainClient::new(
			&config.head_method,
			DEFAULT_RPC_TIMEOUT,
		)?);
		pool.register_probe(&config.chain, client.clone()).await;
		pool.seed_chain(&config.chain, &config.endpoints).await?;
		clients.insert(config.chain.clone(), client);
	}

	let scheduler = Arc::new(ScanScheduler::new(
		registry.clone(),
		pool.clone(),
		ledger.clone(),
		clients,
		deposit_handler,
	));

	let audit: Arc<dyn AuditSink> = Arc::new(TracingAuditSink);
	let admin = Arc::new(AdminService::new(
		registry.clone(),
		pool.clone(),
		scheduler.clone(),
		ledger,
		audit,
	));

	let mut chains: Vec<String> = configs.keys().cloned().collect();
	chains.sort();

	Ok(MonitoringStack {
		registry,
		pool,
		scheduler,
		admin,
		chains,
	})
}

/// Creates the default deposit handler: logs findings and hands raw events
/// to downstream settlement ingestion (out of process here).
pub fn create_deposit_handler() -> DepositHandler {
	Arc::new(|chain, scan| {
		if scan.deposits_found > 0 {
			tracing::info!(
				chain,
				deposits_found = scan.deposits_found,
				"deposits detected; forwarding to settlement ingestion"
			);
		}
	})
}
