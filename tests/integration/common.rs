//! Shared harness building a full in-memory monitoring stack.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use deposit_monitor::models::{ChainMonitor, EndpointSeed};
use deposit_monitor::services::admin::AdminService;
use deposit_monitor::services::audit::AuditSink;
use deposit_monitor::services::blockchain::ChainClient;
use deposit_monitor::services::endpoints::{EndpointPool, InMemoryEndpointStore};
use deposit_monitor::services::history::{InMemoryScanHistoryStore, ScanLedger};
use deposit_monitor::services::monitor::{InMemoryMonitorStateStore, MonitorRegistry};
use deposit_monitor::services::scanner::ScanScheduler;
use deposit_monitor::utils::UrlCipher;

pub struct TestStack {
	pub registry: Arc<MonitorRegistry>,
	pub pool: Arc<EndpointPool>,
	pub scheduler: Arc<ScanScheduler>,
	pub admin: Arc<AdminService>,
	pub history: Arc<InMemoryScanHistoryStore>,
	/// (chain, deposits_found) per deposit-handler invocation.
	pub deposits: Arc<Mutex<Vec<(String, u32)>>>,
}

pub fn seed(url: &str, is_primary: bool, priority: i32) -> EndpointSeed {
	EndpointSeed {
		url: url.to_string(),
		provider_name: "test-provider".to_string(),
		is_primary,
		priority,
	}
}

/// Builds a stack around the given monitor, chain client and audit sink.
/// Endpoints are seeded through the pool so URLs land encrypted.
pub async fn build_stack(
	monitor: ChainMonitor,
	endpoints: &[EndpointSeed],
	client: Arc<dyn ChainClient>,
	audit: Arc<dyn AuditSink>,
) -> TestStack {
	let chain = monitor.chain.clone();

	let history = Arc::new(InMemoryScanHistoryStore::new());
	let ledger = Arc::new(ScanLedger::new(history.clone()));

	let registry = Arc::new(MonitorRegistry::new(
		Arc::new(InMemoryMonitorStateStore::new()),
		ledger.clone(),
	));
	registry.register(monitor).await;

	let pool = Arc::new(EndpointPool::new(
		Arc::new(InMemoryEndpointStore::new()),
		UrlCipher::from_secret("integration-test-secret"),
		client.clone(),
	));
	pool.seed_chain(&chain, endpoints).await.unwrap();

	let deposits: Arc<Mutex<Vec<(String, u32)>>> = Arc::new(Mutex::new(Vec::new()));
	let handler_sink = deposits.clone();

	let mut clients: HashMap<String, Arc<dyn ChainClient>> = HashMap::new();
	clients.insert(chain.clone(), client);

	let scheduler = Arc::new(ScanScheduler::new(
		registry.clone(),
		pool.clone(),
		ledger.clone(),
		clients,
		Arc::new(move |chain: &str, scan: &deposit_monitor::models::RangeScan| {
			handler_sink
				.lock()
				.unwrap()
				.push((chain.to_string(), scan.deposits_found));
		}),
	));

	let admin = Arc::new(AdminService::new(
		registry.clone(),
		pool.clone(),
		scheduler.clone(),
		ledger,
		audit,
	));

	TestStack {
		registry,
		pool,
		scheduler,
		admin,
		history,
		deposits,
	}
}
