//! Admin control surface behavior: authorization, audit trail, guards.

use std::sync::Arc;

use deposit_monitor::models::{
	Actor, ActorType, EndpointUpdate, MonitorStatus, NewEndpoint, Permission, RangeScan,
};
use deposit_monitor::services::admin::AdminError;
use deposit_monitor::services::history::ScanHistoryStore;
use deposit_monitor::services::audit::AuditError;
use deposit_monitor::services::endpoints::EndpointError;
use deposit_monitor::services::monitor::MonitorError;
use deposit_monitor::services::scanner::ScannerError;
use deposit_monitor::utils::tests::MonitorBuilder;
use serde_json::json;

use super::common::{build_stack, seed};
use super::mocks::{MockAuditSink, MockChainClient};

fn operator() -> Actor {
	Actor::new(
		"admin-1",
		ActorType::Admin,
		&[
			Permission::ViewMonitoring,
			Permission::ManageMonitors,
			Permission::ManageEndpoints,
		],
	)
}

fn viewer() -> Actor {
	Actor::new("viewer-1", ActorType::Admin, &[Permission::ViewMonitoring])
}

fn running_monitor() -> deposit_monitor::models::ChainMonitor {
	MonitorBuilder::new()
		.chain("base")
		.status(MonitorStatus::Running)
		.cursor(1000)
		.build()
}

fn idle_client() -> MockChainClient {
	let mut client = MockChainClient::new();
	client.expect_fetch_head_block().returning(|_| Ok(123_456));
	client
		.expect_scan_range()
		.returning(|_, _, _| Ok(RangeScan::default()));
	client
}

#[tokio::test]
async fn pause_emits_exactly_one_audit_entry() {
	let mut audit = MockAuditSink::new();
	audit
		.expect_log()
		.times(1)
		.withf(|entry| {
			entry.entity_type == "ChainMonitor"
				&& entry.entity_id == "base"
				&& entry.metadata["action"] == json!("pause")
				&& entry.metadata["reason"] == json!("maintenance window")
		})
		.returning(|_| Ok(()));

	let stack = build_stack(
		running_monitor(),
		&[seed("https://rpc.example", true, 0)],
		Arc::new(idle_client()),
		Arc::new(audit),
	)
	.await;

	let view = stack
		.admin
		.pause_monitor(&operator(), "base", "maintenance window")
		.await
		.unwrap();
	assert_eq!(view.status, MonitorStatus::Paused);
}

#[tokio::test]
async fn pause_on_paused_monitor_fails_without_audit() {
	let mut audit = MockAuditSink::new();
	audit.expect_log().never();

	let monitor = MonitorBuilder::new()
		.chain("base")
		.status(MonitorStatus::Paused)
		.build();
	let stack = build_stack(
		monitor,
		&[seed("https://rpc.example", true, 0)],
		Arc::new(idle_client()),
		Arc::new(audit),
	)
	.await;

	let result = stack.admin.pause_monitor(&operator(), "base", "again").await;
	assert!(matches!(
		result,
		Err(AdminError::Monitor(MonitorError::InvalidState { .. }))
	));
}

#[tokio::test]
async fn resume_on_running_monitor_fails() {
	let mut audit = MockAuditSink::new();
	audit.expect_log().never();

	let stack = build_stack(
		running_monitor(),
		&[seed("https://rpc.example", true, 0)],
		Arc::new(idle_client()),
		Arc::new(audit),
	)
	.await;

	let result = stack.admin.resume_monitor(&operator(), "base").await;
	assert!(matches!(
		result,
		Err(AdminError::Monitor(MonitorError::InvalidState { .. }))
	));
}

#[tokio::test]
async fn audit_sink_failure_does_not_roll_back_the_state_change() {
	let mut audit = MockAuditSink::new();
	audit
		.expect_log()
		.times(1)
		.returning(|_| Err(AuditError::Sink("store unavailable".to_string())));

	let stack = build_stack(
		running_monitor(),
		&[seed("https://rpc.example", true, 0)],
		Arc::new(idle_client()),
		Arc::new(audit),
	)
	.await;

	let view = stack
		.admin
		.pause_monitor(&operator(), "base", "maintenance")
		.await
		.unwrap();
	assert_eq!(view.status, MonitorStatus::Paused);
	assert_eq!(
		stack.registry.snapshot("base").await.unwrap().status,
		MonitorStatus::Paused
	);
}

#[tokio::test]
async fn unknown_chain_is_rejected_with_not_found() {
	let mut audit = MockAuditSink::new();
	audit.expect_log().never();

	let stack = build_stack(
		running_monitor(),
		&[seed("https://rpc.example", true, 0)],
		Arc::new(idle_client()),
		Arc::new(audit),
	)
	.await;

	let result = stack
		.admin
		.pause_monitor(&operator(), "dogecoin", "nope")
		.await;
	assert!(matches!(
		result,
		Err(AdminError::Monitor(MonitorError::NotFound(_)))
	));
}

#[tokio::test]
async fn missing_permission_is_forbidden_before_any_state_change() {
	let mut audit = MockAuditSink::new();
	audit.expect_log().never();

	let stack = build_stack(
		running_monitor(),
		&[seed("https://rpc.example", true, 0)],
		Arc::new(idle_client()),
		Arc::new(audit),
	)
	.await;

	let result = stack.admin.pause_monitor(&viewer(), "base", "nope").await;
	assert!(matches!(result, Err(AdminError::Forbidden { .. })));
	assert_eq!(
		stack.registry.snapshot("base").await.unwrap().status,
		MonitorStatus::Running
	);
}

#[tokio::test]
async fn rescan_over_the_cap_never_reaches_the_chain() {
	let mut client = MockChainClient::new();
	client.expect_fetch_head_block().never();
	client.expect_scan_range().never();

	let mut audit = MockAuditSink::new();
	audit.expect_log().never();

	let stack = build_stack(
		running_monitor(),
		&[seed("https://rpc.example", true, 0)],
		Arc::new(client),
		Arc::new(audit),
	)
	.await;

	let result = stack
		.admin
		.rescan_blocks(&operator(), "base", 1000, 12_001, "too much")
		.await;
	assert!(matches!(
		result,
		Err(AdminError::Scanner(ScannerError::RangeTooLarge { .. }))
	));
}

#[tokio::test]
async fn rescan_does_not_move_the_forward_cursor() {
	let mut client = MockChainClient::new();
	client.expect_fetch_head_block().never();
	client
		.expect_scan_range()
		.withf(|_, from, to| *from == 1000 && *to == 2000)
		.returning(|_, _, _| {
			Ok(RangeScan {
				deposits_found: 3,
				raw_events: vec![json!({"tx": "0x01"})],
			})
		});

	let mut audit = MockAuditSink::new();
	audit
		.expect_log()
		.times(1)
		.withf(|entry| {
			entry.metadata["action"] == json!("rescan")
				&& entry.metadata["from_block"] == json!(1000)
				&& entry.metadata["to_block"] == json!(2000)
				&& entry.metadata["reason"] == json!("missed blocks during RPC downtime")
		})
		.returning(|_| Ok(()));

	let monitor = MonitorBuilder::new()
		.chain("base")
		.status(MonitorStatus::Running)
		.cursor(5000)
		.build();
	let stack = build_stack(
		monitor,
		&[seed("https://rpc.example", true, 0)],
		Arc::new(client),
		Arc::new(audit),
	)
	.await;

	let receipt = stack
		.admin
		.rescan_blocks(
			&operator(),
			"base",
			1000,
			2000,
			"missed blocks during RPC downtime",
		)
		.await
		.unwrap();
	assert_eq!(receipt.deposits_found, 3);

	// Cursor untouched; the attempt still left a ledger row.
	assert_eq!(
		stack
			.registry
			.snapshot("base")
			.await
			.unwrap()
			.last_scanned_block,
		5000
	);
	let rows = stack.history.recent("base", 10).await.unwrap();
	assert_eq!(rows.len(), 1);
	assert_eq!(rows[0].from_block, 1000);
	assert_eq!(rows[0].to_block, 2000);

	// Rescan deposits flow to the same handler as forward scans.
	assert_eq!(
		*stack.deposits.lock().unwrap(),
		vec![("base".to_string(), 3)]
	);
}

#[tokio::test]
async fn list_monitors_exposes_derived_fields() {
	let monitor = MonitorBuilder::new()
		.chain("base")
		.status(MonitorStatus::Running)
		.cursor(1000)
		.head(1025)
		.build();
	let stack = build_stack(
		monitor,
		&[seed("https://rpc.example", true, 0)],
		Arc::new(idle_client()),
		Arc::new(MockAuditSink::new()),
	)
	.await;

	let views = stack.admin.list_monitors(&viewer()).await.unwrap();
	assert_eq!(views.len(), 1);
	let view = &views[0];
	assert_eq!(view.block_lag, 25);
	assert_eq!(
		view.health_status,
		deposit_monitor::models::HealthStatus::Warning
	);
	assert_eq!(view.estimated_sync_time, "5m");
}

#[tokio::test]
async fn endpoint_lifecycle_with_audit_and_guards() {
	let mut audit = MockAuditSink::new();
	// add + update + delete each audit exactly once.
	audit.expect_log().times(3).returning(|_| Ok(()));

	let stack = build_stack(
		running_monitor(),
		&[seed("https://first.example/v2/0123456789abcdef", true, 0)],
		Arc::new(idle_client()),
		Arc::new(audit),
	)
	.await;

	let added = stack
		.admin
		.add_endpoint(
			&operator(),
			NewEndpoint {
				chain: "base".to_string(),
				url: "https://second.example/v2/feedfacecafebeef42".to_string(),
				provider_name: "backup".to_string(),
				is_primary: false,
				priority: 1,
			},
		)
		.await
		.unwrap();
	assert_eq!(added.url, "https://second.example/v2/feed***ef42");

	stack
		.admin
		.update_endpoint(
			&operator(),
			added.id,
			EndpointUpdate {
				is_active: None,
				is_primary: Some(true),
				priority: None,
			},
		)
		.await
		.unwrap();

	stack
		.admin
		.delete_endpoint(&operator(), added.id)
		.await
		.unwrap();

	// Listing masks the remaining seeded endpoint's key segment.
	let listed = stack.admin.list_endpoints(&viewer()).await.unwrap();
	assert_eq!(listed.len(), 1);
	assert_eq!(listed[0].url, "https://first.example/v2/0123***cdef");
}

#[tokio::test]
async fn deleting_the_last_active_endpoint_is_rejected() {
	let mut audit = MockAuditSink::new();
	audit.expect_log().never();

	let stack = build_stack(
		running_monitor(),
		&[seed("https://only.example", true, 0)],
		Arc::new(idle_client()),
		Arc::new(audit),
	)
	.await;

	let endpoints = stack.admin.list_endpoints(&viewer()).await.unwrap();
	let result = stack
		.admin
		.delete_endpoint(&operator(), endpoints[0].id)
		.await;
	assert!(matches!(
		result,
		Err(AdminError::Endpoint(EndpointError::LastActiveEndpoint(_)))
	));
}

#[tokio::test]
async fn scan_history_reads_newest_first_with_limit() {
	let mut client = MockChainClient::new();
	let mut heads = (0..3u64).map(|i| Ok(1010 + i * 10)).collect::<Vec<_>>().into_iter();
	client
		.expect_fetch_head_block()
		.returning(move |_| heads.next().unwrap());
	client
		.expect_scan_range()
		.returning(|_, _, _| Ok(RangeScan::default()));

	let stack = build_stack(
		running_monitor(),
		&[seed("https://rpc.example", true, 0)],
		Arc::new(client),
		Arc::new(MockAuditSink::new()),
	)
	.await;

	for _ in 0..3 {
		stack.scheduler.scan_chain_once("base").await.unwrap();
	}

	let history = stack
		.admin
		.get_scan_history(&viewer(), "base", Some(2))
		.await
		.unwrap();
	assert_eq!(history.len(), 2);
	assert!(history[0].to_block > history[1].to_block);
}
