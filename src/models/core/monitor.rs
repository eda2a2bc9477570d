//! Per-chain monitor state.
//!
//! A [`ChainMonitor`] tracks the scan cursor and health of a single chain.
//! Health classification and sync estimates are derived on every read and
//! never persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a chain monitor.
///
/// `Syncing` is the initial state before the first successful scan. `Error`
/// is entered after repeated scan failures and only left through an explicit
/// resume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MonitorStatus {
	Running,
	Paused,
	Error,
	Syncing,
}

impl std::fmt::Display for MonitorStatus {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let s = match self {
			Self::Running => "RUNNING",
			Self::Paused => "PAUSED",
			Self::Error => "ERROR",
			Self::Syncing => "SYNCING",
		};
		write!(f, "{}", s)
	}
}

/// Derived health classification, computed fresh from lag and error counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HealthStatus {
	Healthy,
	Warning,
	Critical,
}

/// Block lag below which a monitor is considered healthy.
pub const HEALTHY_LAG_THRESHOLD: u64 = 10;
/// Block lag at or above which a monitor is considered critical.
pub const CRITICAL_LAG_THRESHOLD: u64 = 50;
/// Consecutive error count above which a monitor is considered critical.
pub const CRITICAL_ERROR_THRESHOLD: u32 = 3;

/// Scan cursor and health state for a single chain.
///
/// One instance exists per supported chain. The forward cursor
/// `last_scanned_block` is monotonically non-decreasing; rescans of
/// historical ranges never touch it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainMonitor {
	pub chain: String,
	pub last_scanned_block: u64,
	pub latest_known_block: Option<u64>,
	pub status: MonitorStatus,
	pub last_scan_at: Option<DateTime<Utc>>,
	pub last_error_at: Option<DateTime<Utc>>,
	pub last_error_message: Option<String>,
	pub consecutive_errors: u32,
	/// Consecutive failures before the monitor flips to `Error`.
	pub error_threshold: u32,
	pub blocks_per_scan: u64,
	pub polling_interval_secs: u64,
	pub avg_block_time_secs: f64,
	pub total_deposits_detected: u64,
	pub total_blocks_scanned: u64,
}

impl ChainMonitor {
	/// Seeds a monitor for a newly provisioned chain, starting in `Syncing`.
	pub fn seed(
		chain: &str,
		blocks_per_scan: u64,
		polling_interval_secs: u64,
		avg_block_time_secs: f64,
		error_threshold: u32,
	) -> Self {
		Self {
			chain: chain.to_string(),
			last_scanned_block: 0,
			latest_known_block: None,
			status: MonitorStatus::Syncing,
			last_scan_at: None,
			last_error_at: None,
			last_error_message: None,
			consecutive_errors: 0,
			error_threshold,
			blocks_per_scan,
			polling_interval_secs,
			avg_block_time_secs,
			total_deposits_detected: 0,
			total_blocks_scanned: 0,
		}
	}

	/// Blocks between the observed chain head and the cursor.
	///
	/// Always derived, never stored. Zero until the first head fetch, and
	/// saturating so a head observed behind the cursor (stale endpoint)
	/// never produces a negative lag.
	pub fn block_lag(&self) -> u64 {
		self.latest_known_block
			.map(|head| head.saturating_sub(self.last_scanned_block))
			.unwrap_or(0)
	}

	/// Classifies monitor health from block lag and consecutive errors.
	pub fn health_status(&self) -> HealthStatus {
		let lag = self.block_lag();
		if lag >= CRITICAL_LAG_THRESHOLD || self.consecutive_errors > CRITICAL_ERROR_THRESHOLD {
			HealthStatus::Critical
		} else if lag >= HEALTHY_LAG_THRESHOLD || self.consecutive_errors >= 1 {
			HealthStatus::Warning
		} else {
			HealthStatus::Healthy
		}
	}

	/// Estimated time to catch up to the chain head at the current polling
	/// cadence, formatted for display.
	pub fn estimated_sync_time(&self) -> String {
		format_duration_secs(self.block_lag() * self.polling_interval_secs)
	}

	/// Humanized time since the last scan attempt, or `"never"`.
	pub fn scan_age(&self, now: DateTime<Utc>) -> String {
		match self.last_scan_at {
			Some(at) => {
				let secs = (now - at).num_seconds().max(0) as u64;
				format_duration_secs(secs)
			}
			None => "never".to_string(),
		}
	}
}

/// Formats a duration in whole seconds as `Ns`, `Nm` or `Nh`.
pub fn format_duration_secs(secs: u64) -> String {
	if secs < 60 {
		format!("{}s", secs)
	} else if secs < 3600 {
		format!("{}m", secs / 60)
	} else {
		format!("{}h", secs / 3600)
	}
}

/// Read-model of a monitor enriched with derived fields, as exposed to the
/// administrative API layer.
#[derive(Debug, Clone, Serialize)]
pub struct MonitorView {
	pub chain: String,
	pub status: MonitorStatus,
	pub last_scanned_block: u64,
	pub latest_known_block: Option<u64>,
	pub block_lag: u64,
	pub last_scan_at: Option<DateTime<Utc>>,
	pub scan_age: String,
	pub polling_interval_secs: u64,
	pub total_deposits_detected: u64,
	pub total_blocks_scanned: u64,
	pub consecutive_errors: u32,
	pub last_error_message: Option<String>,
	pub estimated_sync_time: String,
	pub health_status: HealthStatus,
}

impl MonitorView {
	pub fn from_monitor(monitor: &ChainMonitor, now: DateTime<Utc>) -> Self {
		Self {
			chain: monitor.chain.clone(),
			status: monitor.status,
			last_scanned_block: monitor.last_scanned_block,
			latest_known_block: monitor.latest_known_block,
			block_lag: monitor.block_lag(),
			last_scan_at: monitor.last_scan_at,
			scan_age: monitor.scan_age(now),
			polling_interval_secs: monitor.polling_interval_secs,
			total_deposits_detected: monitor.total_deposits_detected,
			total_blocks_scanned: monitor.total_blocks_scanned,
			consecutive_errors: monitor.consecutive_errors,
			last_error_message: monitor.last_error_message.clone(),
			estimated_sync_time: monitor.estimated_sync_time(),
			health_status: monitor.health_status(),
		}
	}
}
