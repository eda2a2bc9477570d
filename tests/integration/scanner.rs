//! Scan cycle and scheduler behavior against mock chain clients.

use std::sync::Arc;

use deposit_monitor::models::{MonitorStatus, RangeScan, ScanRange};
use deposit_monitor::services::history::ScanHistoryStore;
use deposit_monitor::services::scanner::CycleOutcome;
use serde_json::json;

use super::common::{build_stack, seed};
use super::mocks::{MockAuditSink, MockChainClient};
use deposit_monitor::utils::tests::MonitorBuilder;

fn running_monitor(cursor: u64, blocks_per_scan: u64) -> deposit_monitor::models::ChainMonitor {
	MonitorBuilder::new()
		.chain("base")
		.status(MonitorStatus::Running)
		.cursor(cursor)
		.blocks_per_scan(blocks_per_scan)
		.build()
}

#[tokio::test]
async fn scan_range_is_capped_by_chain_head() {
	let mut client = MockChainClient::new();
	client.expect_fetch_head_block().returning(|_| Ok(1050));
	client
		.expect_scan_range()
		.withf(|_, from, to| *from == 1001 && *to == 1050)
		.returning(|_, _, _| {
			Ok(RangeScan {
				deposits_found: 2,
				raw_events: vec![json!({"tx": "0xaa"}), json!({"tx": "0xbb"})],
			})
		});

	let stack = build_stack(
		running_monitor(1000, 100),
		&[seed("https://rpc.example", true, 0)],
		Arc::new(client),
		Arc::new(MockAuditSink::new()),
	)
	.await;

	let outcome = stack.scheduler.scan_chain_once("base").await.unwrap();
	assert_eq!(
		outcome,
		CycleOutcome::Scanned {
			range: ScanRange::new(1001, 1050),
			deposits_found: 2,
		}
	);

	let monitor = stack.registry.snapshot("base").await.unwrap();
	assert_eq!(monitor.last_scanned_block, 1050);
	assert_eq!(monitor.latest_known_block, Some(1050));
	assert_eq!(monitor.block_lag(), 0);
	assert_eq!(monitor.total_deposits_detected, 2);

	// Deposits were forwarded to the handler exactly once.
	assert_eq!(
		*stack.deposits.lock().unwrap(),
		vec![("base".to_string(), 2)]
	);
}

#[tokio::test]
async fn scan_range_is_capped_by_batch_size() {
	let mut client = MockChainClient::new();
	client.expect_fetch_head_block().returning(|_| Ok(1500));
	client
		.expect_scan_range()
		.withf(|_, from, to| *from == 1001 && *to == 1100)
		.returning(|_, _, _| Ok(RangeScan::default()));

	let stack = build_stack(
		running_monitor(1000, 100),
		&[seed("https://rpc.example", true, 0)],
		Arc::new(client),
		Arc::new(MockAuditSink::new()),
	)
	.await;

	let outcome = stack.scheduler.scan_chain_once("base").await.unwrap();
	assert_eq!(
		outcome,
		CycleOutcome::Scanned {
			range: ScanRange::new(1001, 1100),
			deposits_found: 0,
		}
	);

	// Lag remains: head 1500, cursor 1100.
	let monitor = stack.registry.snapshot("base").await.unwrap();
	assert_eq!(monitor.block_lag(), 400);
}

#[tokio::test]
async fn caught_up_cycle_emits_no_history_row() {
	let mut client = MockChainClient::new();
	client.expect_fetch_head_block().returning(|_| Ok(1000));
	client.expect_scan_range().never();

	let stack = build_stack(
		running_monitor(1000, 100),
		&[seed("https://rpc.example", true, 0)],
		Arc::new(client),
		Arc::new(MockAuditSink::new()),
	)
	.await;

	let outcome = stack.scheduler.scan_chain_once("base").await.unwrap();
	assert_eq!(outcome, CycleOutcome::CaughtUp);
	assert!(stack.history.recent("base", 10).await.unwrap().is_empty());
}

#[tokio::test]
async fn paused_chain_is_skipped_without_touching_the_network() {
	let mut client = MockChainClient::new();
	client.expect_fetch_head_block().never();
	client.expect_scan_range().never();

	let monitor = MonitorBuilder::new()
		.chain("base")
		.status(MonitorStatus::Paused)
		.cursor(1000)
		.build();
	let stack = build_stack(
		monitor,
		&[seed("https://rpc.example", true, 0)],
		Arc::new(client),
		Arc::new(MockAuditSink::new()),
	)
	.await;

	let outcome = stack.scheduler.scan_chain_once("base").await.unwrap();
	assert_eq!(outcome, CycleOutcome::Skipped(MonitorStatus::Paused));
}

#[tokio::test]
async fn errored_chain_requires_explicit_resume() {
	let mut client = MockChainClient::new();
	client.expect_fetch_head_block().never();
	client.expect_scan_range().never();

	let monitor = MonitorBuilder::new()
		.chain("base")
		.status(MonitorStatus::Error)
		.consecutive_errors(5)
		.build();
	let stack = build_stack(
		monitor,
		&[seed("https://rpc.example", true, 0)],
		Arc::new(client),
		Arc::new(MockAuditSink::new()),
	)
	.await;

	let outcome = stack.scheduler.scan_chain_once("base").await.unwrap();
	assert_eq!(outcome, CycleOutcome::Skipped(MonitorStatus::Error));
}

#[tokio::test]
async fn head_fetch_failure_is_recorded_against_monitor_and_endpoint() {
	let mut client = MockChainClient::new();
	client.expect_fetch_head_block().returning(|_| {
		Err(deposit_monitor::services::blockchain::ChainClientError::Rpc(
			"boom".to_string(),
		))
	});
	client.expect_scan_range().never();

	let stack = build_stack(
		running_monitor(1000, 100),
		&[seed("https://rpc.example", true, 0)],
		Arc::new(client),
		Arc::new(MockAuditSink::new()),
	)
	.await;

	let outcome = stack.scheduler.scan_chain_once("base").await.unwrap();
	assert_eq!(outcome, CycleOutcome::Failed);

	let monitor = stack.registry.snapshot("base").await.unwrap();
	assert_eq!(monitor.consecutive_errors, 1);
	assert!(monitor.last_error_message.is_some());
	// Cursor untouched by the failure.
	assert_eq!(monitor.last_scanned_block, 1000);

	let rows = stack.history.recent("base", 10).await.unwrap();
	assert_eq!(rows.len(), 1);
	assert!(rows[0].error.is_some());

	let endpoints = stack.pool.list().await;
	assert_eq!(endpoints[0].error_count, 1);
}

#[tokio::test]
async fn repeated_failures_flip_monitor_to_error_then_skip() {
	let mut client = MockChainClient::new();
	client.expect_fetch_head_block().times(5).returning(|_| {
		Err(deposit_monitor::services::blockchain::ChainClientError::Rpc(
			"unreachable".to_string(),
		))
	});
	client.expect_scan_range().never();

	let stack = build_stack(
		running_monitor(1000, 100),
		&[seed("https://rpc.example", true, 0)],
		Arc::new(client),
		Arc::new(MockAuditSink::new()),
	)
	.await;

	for _ in 0..5 {
		let outcome = stack.scheduler.scan_chain_once("base").await.unwrap();
		assert_eq!(outcome, CycleOutcome::Failed);
	}

	let monitor = stack.registry.snapshot("base").await.unwrap();
	assert_eq!(monitor.status, MonitorStatus::Error);

	// The sixth cycle skips entirely; the mock would panic if the head
	// fetch were attempted again.
	let outcome = stack.scheduler.scan_chain_once("base").await.unwrap();
	assert_eq!(outcome, CycleOutcome::Skipped(MonitorStatus::Error));
}

#[tokio::test]
async fn missing_endpoints_route_through_failed_scan() {
	let mut client = MockChainClient::new();
	client.expect_fetch_head_block().never();
	client.expect_scan_range().never();

	let stack = build_stack(
		running_monitor(1000, 100),
		&[],
		Arc::new(client),
		Arc::new(MockAuditSink::new()),
	)
	.await;

	let outcome = stack.scheduler.scan_chain_once("base").await.unwrap();
	assert_eq!(outcome, CycleOutcome::Failed);

	let monitor = stack.registry.snapshot("base").await.unwrap();
	assert_eq!(monitor.consecutive_errors, 1);
	assert!(monitor
		.last_error_message
		.unwrap()
		.contains("no active rpc endpoint"));
}

#[tokio::test]
async fn resumed_chain_scans_on_the_next_cycle() {
	let mut client = MockChainClient::new();
	client.expect_fetch_head_block().returning(|_| Ok(1010));
	client
		.expect_scan_range()
		.returning(|_, _, _| Ok(RangeScan::default()));

	let monitor = MonitorBuilder::new()
		.chain("base")
		.status(MonitorStatus::Paused)
		.cursor(1000)
		.blocks_per_scan(100)
		.build();
	let stack = build_stack(
		monitor,
		&[seed("https://rpc.example", true, 0)],
		Arc::new(client),
		Arc::new(MockAuditSink::new()),
	)
	.await;

	assert_eq!(
		stack.scheduler.scan_chain_once("base").await.unwrap(),
		CycleOutcome::Skipped(MonitorStatus::Paused)
	);

	stack.registry.resume("base").await.unwrap();

	assert_eq!(
		stack.scheduler.scan_chain_once("base").await.unwrap(),
		CycleOutcome::Scanned {
			range: ScanRange::new(1001, 1010),
			deposits_found: 0,
		}
	);
}

#[tokio::test]
async fn success_after_failures_resets_error_counter() {
	let mut client = MockChainClient::new();
	let mut heads = vec![
		Err(deposit_monitor::services::blockchain::ChainClientError::Rpc(
			"flaky".to_string(),
		)),
		Ok(1020),
	]
	.into_iter();
	client
		.expect_fetch_head_block()
		.returning(move |_| heads.next().unwrap());
	client
		.expect_scan_range()
		.returning(|_, _, _| Ok(RangeScan::default()));

	let stack = build_stack(
		running_monitor(1000, 100),
		&[seed("https://rpc.example", true, 0)],
		Arc::new(client),
		Arc::new(MockAuditSink::new()),
	)
	.await;

	assert_eq!(
		stack.scheduler.scan_chain_once("base").await.unwrap(),
		CycleOutcome::Failed
	);
	assert_eq!(
		stack
			.registry
			.snapshot("base")
			.await
			.unwrap()
			.consecutive_errors,
		1
	);

	assert!(matches!(
		stack.scheduler.scan_chain_once("base").await.unwrap(),
		CycleOutcome::Scanned { .. }
	));
	let monitor = stack.registry.snapshot("base").await.unwrap();
	assert_eq!(monitor.consecutive_errors, 0);
	assert!(monitor.last_error_message.is_none());
}
