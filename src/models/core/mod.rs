//! Core domain models for the monitoring subsystem.
//!
//! Plain values, deliberately decoupled from any persistence layer: the
//! state machine and services operate on these and go through storage ports
//! to load/save them.

mod audit;
mod endpoint;
mod monitor;
mod scan;

pub use audit::{Actor, ActorType, AuditAction, AuditEntry, Permission};
pub use endpoint::{EndpointUpdate, EndpointView, HealthReport, NewEndpoint, RpcEndpoint};
pub use monitor::{
	format_duration_secs, ChainMonitor, HealthStatus, MonitorStatus, MonitorView,
	CRITICAL_ERROR_THRESHOLD, CRITICAL_LAG_THRESHOLD, HEALTHY_LAG_THRESHOLD,
};
pub use scan::{RangeScan, ScanRange, ScanRecord};
