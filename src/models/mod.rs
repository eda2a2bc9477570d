//! Domain models and configuration loading.

mod config;
mod core;

pub use config::{ChainConfig, ConfigError, ConfigLoader, EndpointSeed, DEFAULT_ERROR_THRESHOLD};
pub use core::{
	format_duration_secs, Actor, ActorType, AuditAction, AuditEntry, ChainMonitor, EndpointUpdate,
	EndpointView, HealthReport, HealthStatus, MonitorStatus, MonitorView, NewEndpoint, Permission,
	RangeScan, RpcEndpoint, ScanRange, ScanRecord, CRITICAL_ERROR_THRESHOLD,
	CRITICAL_LAG_THRESHOLD, HEALTHY_LAG_THRESHOLD,
};
