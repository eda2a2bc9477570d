//! Scan ranges, scan attempt records and range-scan results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An inclusive block range targeted by a scan attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanRange {
	pub from_block: u64,
	pub to_block: u64,
}

impl ScanRange {
	pub fn new(from_block: u64, to_block: u64) -> Self {
		Self {
			from_block,
			to_block,
		}
	}

	/// Number of blocks covered by the range.
	pub fn len(&self) -> u64 {
		self.to_block.saturating_sub(self.from_block) + 1
	}

	pub fn is_empty(&self) -> bool {
		self.to_block < self.from_block
	}
}

impl std::fmt::Display for ScanRange {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "[{}, {}]", self.from_block, self.to_block)
	}
}

/// Append-only record of a single scan attempt.
///
/// Immutable once written; purely for observability and operator audit,
/// never read back by the scheduler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanRecord {
	pub chain: String,
	pub from_block: u64,
	pub to_block: u64,
	pub deposits_found: u32,
	pub duration_ms: u64,
	pub error: Option<String>,
	pub created_at: DateTime<Utc>,
}

impl ScanRecord {
	pub fn success(chain: &str, range: ScanRange, deposits_found: u32, duration_ms: u64) -> Self {
		Self {
			chain: chain.to_string(),
			from_block: range.from_block,
			to_block: range.to_block,
			deposits_found,
			duration_ms,
			error: None,
			created_at: Utc::now(),
		}
	}

	pub fn failure(chain: &str, range: ScanRange, error: &str) -> Self {
		Self {
			chain: chain.to_string(),
			from_block: range.from_block,
			to_block: range.to_block,
			deposits_found: 0,
			duration_ms: 0,
			error: Some(error.to_string()),
			created_at: Utc::now(),
		}
	}
}

/// Result of scanning a block range on a chain.
///
/// `raw_events` carries the unparsed provider payloads; interpreting them
/// into settlement-ready deposits happens behind the deposit handler.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RangeScan {
	pub deposits_found: u32,
	pub raw_events: Vec<serde_json::Value>,
}
