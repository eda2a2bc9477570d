//! Multi-chain deposit monitoring core.
//!
//! Continuously scans blockchain networks for incoming deposits through
//! per-chain cursors tracked by a health state machine, backed by a pool of
//! redundant RPC endpoints with deterministic failover, and administered
//! through audited pause/resume/rescan operations.
//!
//! # Architecture
//! - `models`: plain domain values and chain configuration loading
//! - `services::endpoints`: endpoint pool, failover selection, health checks
//! - `services::monitor`: per-chain cursor state machine
//! - `services::history`: append-only ledger of scan attempts
//! - `services::scanner`: per-chain polling loops and rescans
//! - `services::admin`: authorized, audited control surface
//! - `bootstrap`: service wiring

pub mod bootstrap;
pub mod models;
pub mod services;
pub mod utils;
