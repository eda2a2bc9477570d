//! Out-of-band rescans of historical block ranges.
//!
//! A rescan re-processes an already-scanned range without ever touching the
//! forward cursor, so catch-up scanning and reprocessing cannot interfere.
//! The range is hard-capped; the cap is enforced before any network call.

use std::time::Instant;

use serde::Serialize;

use super::error::ScannerError;
use super::service::ScanScheduler;
use crate::models::{ScanRange, ScanRecord};

/// Hard cap on the size of a rescan range.
pub const MAX_RESCAN_BLOCKS: u64 = 10_000;

/// Result of a completed rescan.
#[derive(Debug, Clone, Serialize)]
pub struct RescanReceipt {
	pub chain: String,
	pub from_block: u64,
	pub to_block: u64,
	pub deposits_found: u32,
	pub duration_ms: u64,
}

impl ScanScheduler {
	/// Re-processes `[from_block, to_block]` on a chain.
	///
	/// Rejects ranges above [`MAX_RESCAN_BLOCKS`] without partial
	/// execution. Deposits found are forwarded to the deposit handler and
	/// the attempt is appended to the scan ledger; `last_scanned_block` is
	/// never modified.
	pub async fn rescan_blocks(
		&self,
		chain: &str,
		from_block: u64,
		to_block: u64,
	) -> Result<RescanReceipt, ScannerError> {
		if to_block < from_block {
			return Err(ScannerError::InvalidRange {
				from_block,
				to_block,
			});
		}
		if to_block - from_block > MAX_RESCAN_BLOCKS {
			return Err(ScannerError::RangeTooLarge {
				requested: to_block - from_block,
				max: MAX_RESCAN_BLOCKS,
			});
		}

		// Unknown chains are rejected before any endpoint is touched.
		self.registry().snapshot(chain).await?;

		let client = self.client_for(chain)?;
		let selected = self.pool().select(chain).await?;
		let range = ScanRange::new(from_block, to_block);

		let started = Instant::now();
		match client.scan_range(&selected.url, from_block, to_block).await {
			Ok(scan) => {
				let duration_ms = started.elapsed().as_millis() as u64;
				self.pool()
					.record_usage(chain, selected.id, Some(duration_ms), true)
					.await;
				(self.deposit_handler())(chain, &scan);
				self.ledger()
					.append(ScanRecord::success(
						chain,
						range,
						scan.deposits_found,
						duration_ms,
					))
					.await;

				tracing::info!(
					chain,
					from_block,
					to_block,
					deposits_found = scan.deposits_found,
					"rescan complete"
				);

				Ok(RescanReceipt {
					chain: chain.to_string(),
					from_block,
					to_block,
					deposits_found: scan.deposits_found,
					duration_ms,
				})
			}
			Err(e) => {
				self.pool()
					.record_usage(chain, selected.id, None, false)
					.await;
				self.ledger()
					.append(ScanRecord::failure(chain, range, &e.to_string()))
					.await;
				Err(ScannerError::Client(e))
			}
		}
	}
}
