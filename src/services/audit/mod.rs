//! Audit sink port.
//!
//! The admin control surface emits one audit entry per mutating operation.
//! Emission is fire-and-forget: failures are logged by the caller and never
//! propagated, and never roll back the underlying state change.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::AuditEntry;

#[derive(Debug, Error)]
pub enum AuditError {
	#[error("audit sink rejected entry: {0}")]
	Sink(String),
}

/// Destination for audit trail entries. The production store lives outside
/// this crate; [`TracingAuditSink`] adapts the trail onto structured logs.
#[async_trait]
pub trait AuditSink: Send + Sync {
	async fn log(&self, entry: AuditEntry) -> Result<(), AuditError>;
}

/// Audit sink that writes entries as structured tracing events.
#[derive(Debug, Default)]
pub struct TracingAuditSink;

#[async_trait]
impl AuditSink for TracingAuditSink {
	async fn log(&self, entry: AuditEntry) -> Result<(), AuditError> {
		tracing::info!(
			entity_type = %entry.entity_type,
			entity_id = %entry.entity_id,
			action = ?entry.action,
			actor_id = %entry.actor_id,
			actor_type = ?entry.actor_type,
			metadata = %entry.metadata,
			"audit"
		);
		Ok(())
	}
}
