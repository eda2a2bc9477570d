//! Scan scheduling: per-chain polling loops and rescans.

mod error;
mod rescan;
mod service;

pub use error::ScannerError;
pub use rescan::{RescanReceipt, MAX_RESCAN_BLOCKS};
pub use service::{CycleOutcome, DepositHandler, ScanScheduler};
