//! Monitor state machine properties.

use std::sync::Arc;

use deposit_monitor::models::{MonitorStatus, ScanRange};
use deposit_monitor::services::history::{InMemoryScanHistoryStore, ScanLedger};
use deposit_monitor::services::monitor::{InMemoryMonitorStateStore, MonitorRegistry};
use deposit_monitor::utils::tests::MonitorBuilder;
use proptest::prelude::*;

fn runtime() -> tokio::runtime::Runtime {
	tokio::runtime::Builder::new_current_thread()
		.enable_all()
		.build()
		.expect("tokio runtime")
}

async fn fresh_registry() -> MonitorRegistry {
	let registry = MonitorRegistry::new(
		Arc::new(InMemoryMonitorStateStore::new()),
		Arc::new(ScanLedger::new(Arc::new(InMemoryScanHistoryStore::new()))),
	);
	registry
		.register(
			MonitorBuilder::new()
				.chain("base")
				.status(MonitorStatus::Running)
				.cursor(0)
				.build(),
		)
		.await;
	registry
}

proptest! {
	/// The forward cursor is non-decreasing across any interleaving of
	/// successful scans and failures; failures never move it.
	#[test]
	fn cursor_is_monotonically_non_decreasing(
		steps in prop::collection::vec((any::<bool>(), 0u64..500), 1..25),
	) {
		runtime().block_on(async {
			let registry = fresh_registry().await;
			let mut previous = 0u64;

			for (succeed, advance) in steps {
				if succeed {
					let after = registry
						.record_successful_scan("base", previous + advance, 0, 10)
						.await
						.unwrap();
					prop_assert!(after.last_scanned_block >= previous);
					previous = after.last_scanned_block;
				} else {
					registry
						.record_failed_scan(
							"base",
							Some(ScanRange::new(previous + 1, previous + advance + 1)),
							"transient failure",
						)
						.await
						.unwrap();
				}

				let snapshot = registry.snapshot("base").await.unwrap();
				prop_assert_eq!(snapshot.last_scanned_block, previous);
			}
			Ok(())
		})?;
	}

	/// A successful scan always clears the error counters, whatever came
	/// before it.
	#[test]
	fn success_always_resets_error_state(failures in 0u32..12) {
		runtime().block_on(async {
			let registry = fresh_registry().await;

			for _ in 0..failures {
				registry
					.record_failed_scan("base", Some(ScanRange::new(1, 10)), "boom")
					.await
					.unwrap();
			}

			let after = registry
				.record_successful_scan("base", 10, 1, 15)
				.await
				.unwrap();
			prop_assert_eq!(after.consecutive_errors, 0);
			prop_assert!(after.last_error_message.is_none());
			prop_assert_eq!(after.status, MonitorStatus::Running);
			Ok(())
		})?;
	}

	/// Attempting to move the cursor backwards is always rejected,
	/// regardless of how far ahead it is.
	#[test]
	fn cursor_regression_is_always_rejected(cursor in 1u64..100_000, delta in 1u64..1000) {
		runtime().block_on(async {
			let registry = fresh_registry().await;
			registry.record_successful_scan("base", cursor, 0, 10).await.unwrap();

			let attempted = cursor.saturating_sub(delta);
			let result = registry
				.record_successful_scan("base", attempted, 0, 10)
				.await;
			prop_assert!(result.is_err());

			let snapshot = registry.snapshot("base").await.unwrap();
			prop_assert_eq!(snapshot.last_scanned_block, cursor);
			Ok(())
		})?;
	}
}
