//! Administrative control surface.
//!
//! Thin orchestration over the registry, endpoint pool, scheduler and
//! ledger. Every mutating operation performs an explicit capability check,
//! applies the state change, and emits exactly one audit entry. Audit
//! emission is best-effort observability: a sink failure is logged and
//! never rolls back the state change.

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use super::error::AdminError;
use crate::models::{
	Actor, AuditAction, AuditEntry, EndpointUpdate, EndpointView, HealthReport, MonitorView,
	NewEndpoint, Permission, ScanRecord,
};
use crate::services::audit::AuditSink;
use crate::services::endpoints::EndpointPool;
use crate::services::history::ScanLedger;
use crate::services::monitor::MonitorRegistry;
use crate::services::scanner::{RescanReceipt, ScanScheduler, ScannerError, MAX_RESCAN_BLOCKS};

const MONITOR_ENTITY: &str = "ChainMonitor";
const ENDPOINT_ENTITY: &str = "RpcEndpoint";

pub struct AdminService {
	registry: Arc<MonitorRegistry>,
	pool: Arc<EndpointPool>,
	scheduler: Arc<ScanScheduler>,
	ledger: Arc<ScanLedger>,
	audit: Arc<dyn AuditSink>,
}

impl AdminService {
	pub fn new(
		registry: Arc<MonitorRegistry>,
		pool: Arc<EndpointPool>,
		scheduler: Arc<ScanScheduler>,
		ledger: Arc<ScanLedger>,
		audit: Arc<dyn AuditSink>,
	) -> Self {
		Self {
			registry,
			pool,
			scheduler,
			ledger,
			audit,
		}
	}

	fn authorize(&self, actor: &Actor, permission: Permission) -> Result<(), AdminError> {
		if actor.has(permission) {
			Ok(())
		} else {
			Err(AdminError::Forbidden {
				actor: actor.id.clone(),
				permission,
			})
		}
	}

	async fn emit_audit(&self, entry: AuditEntry) {
		if let Err(e) = self.audit.log(entry).await {
			tracing::warn!(error = %e, "audit emission failed");
		}
	}

	/// Enriched view of every monitor.
	pub async fn list_monitors(&self, actor: &Actor) -> Result<Vec<MonitorView>, AdminError> {
		self.authorize(actor, Permission::ViewMonitoring)?;
		let now = Utc::now();
		Ok(self
			.registry
			.snapshot_all()
			.await
			.iter()
			.map(|monitor| MonitorView::from_monitor(monitor, now))
			.collect())
	}

	/// Pauses a chain's monitor. The scheduler skips the chain from its
	/// next tick onwards; an iteration already in flight completes.
	pub async fn pause_monitor(
		&self,
		actor: &Actor,
		chain: &str,
		reason: &str,
	) -> Result<MonitorView, AdminError> {
		self.authorize(actor, Permission::ManageMonitors)?;
		let (before, after) = self.registry.pause(chain).await?;

		self.emit_audit(AuditEntry {
			entity_type: MONITOR_ENTITY.to_string(),
			entity_id: chain.to_string(),
			action: AuditAction::Update,
			actor_id: actor.id.clone(),
			actor_type: actor.actor_type,
			before_state: Some(json!({ "status": before.status })),
			after_state: Some(json!({ "status": after.status })),
			metadata: json!({ "action": "pause", "reason": reason }),
		})
		.await;

		Ok(MonitorView::from_monitor(&after, Utc::now()))
	}

	/// Resumes a paused or errored monitor. The chain becomes eligible
	/// again at its next scheduled tick; no immediate scan is triggered.
	pub async fn resume_monitor(
		&self,
		actor: &Actor,
		chain: &str,
	) -> Result<MonitorView, AdminError> {
		self.authorize(actor, Permission::ManageMonitors)?;
		let (before, after) = self.registry.resume(chain).await?;

		self.emit_audit(AuditEntry {
			entity_type: MONITOR_ENTITY.to_string(),
			entity_id: chain.to_string(),
			action: AuditAction::Update,
			actor_id: actor.id.clone(),
			actor_type: actor.actor_type,
			before_state: Some(json!({
				"status": before.status,
				"consecutive_errors": before.consecutive_errors,
			})),
			after_state: Some(json!({
				"status": after.status,
				"consecutive_errors": after.consecutive_errors,
			})),
			metadata: json!({ "action": "resume" }),
		})
		.await;

		Ok(MonitorView::from_monitor(&after, Utc::now()))
	}

	/// Triggers a bounded rescan of a historical range.
	///
	/// The audit entry is tagged with the requested range and reason so
	/// operators can tell reprocessing apart from forward catch-up scans in
	/// the otherwise uniform scan history.
	pub async fn rescan_blocks(
		&self,
		actor: &Actor,
		chain: &str,
		from_block: u64,
		to_block: u64,
		reason: &str,
	) -> Result<RescanReceipt, AdminError> {
		self.authorize(actor, Permission::ManageMonitors)?;

		if to_block < from_block {
			return Err(ScannerError::InvalidRange {
				from_block,
				to_block,
			}
			.into());
		}
		if to_block - from_block > MAX_RESCAN_BLOCKS {
			return Err(ScannerError::RangeTooLarge {
				requested: to_block - from_block,
				max: MAX_RESCAN_BLOCKS,
			}
			.into());
		}
		self.registry.snapshot(chain).await.map_err(ScannerError::from)?;

		// Audit the accepted request before execution; a scan failure after
		// this point still leaves its trace in both trails.
		self.emit_audit(AuditEntry {
			entity_type: MONITOR_ENTITY.to_string(),
			entity_id: chain.to_string(),
			action: AuditAction::Update,
			actor_id: actor.id.clone(),
			actor_type: actor.actor_type,
			before_state: None,
			after_state: None,
			metadata: json!({
				"action": "rescan",
				"from_block": from_block,
				"to_block": to_block,
				"reason": reason,
			}),
		})
		.await;

		Ok(self
			.scheduler
			.rescan_blocks(chain, from_block, to_block)
			.await?)
	}

	/// Most recent scan attempts for a chain, newest first.
	pub async fn get_scan_history(
		&self,
		actor: &Actor,
		chain: &str,
		limit: Option<usize>,
	) -> Result<Vec<ScanRecord>, AdminError> {
		self.authorize(actor, Permission::ViewMonitoring)?;
		self.registry.snapshot(chain).await?;
		Ok(self.ledger.recent(chain, limit).await?)
	}

	/// All endpoints across chains, URLs masked.
	pub async fn list_endpoints(&self, actor: &Actor) -> Result<Vec<EndpointView>, AdminError> {
		self.authorize(actor, Permission::ViewMonitoring)?;
		Ok(self.pool.list().await)
	}

	pub async fn add_endpoint(
		&self,
		actor: &Actor,
		new: NewEndpoint,
	) -> Result<EndpointView, AdminError> {
		self.authorize(actor, Permission::ManageEndpoints)?;
		let chain = new.chain.clone();
		let provider = new.provider_name.clone();
		let view = self.pool.add(new).await?;

		self.emit_audit(AuditEntry {
			entity_type: ENDPOINT_ENTITY.to_string(),
			entity_id: view.id.to_string(),
			action: AuditAction::Create,
			actor_id: actor.id.clone(),
			actor_type: actor.actor_type,
			before_state: None,
			after_state: Some(json!({
				"is_active": view.is_active,
				"is_primary": view.is_primary,
				"priority": view.priority,
			})),
			metadata: json!({ "chain": chain, "provider_name": provider }),
		})
		.await;

		Ok(view)
	}

	pub async fn update_endpoint(
		&self,
		actor: &Actor,
		id: Uuid,
		update: EndpointUpdate,
	) -> Result<(), AdminError> {
		self.authorize(actor, Permission::ManageEndpoints)?;
		let requested = json!({
			"is_active": update.is_active,
			"is_primary": update.is_primary,
			"priority": update.priority,
		});
		let (before, after) = self.pool.update(id, update).await?;

		self.emit_audit(AuditEntry {
			entity_type: ENDPOINT_ENTITY.to_string(),
			entity_id: id.to_string(),
			action: AuditAction::Update,
			actor_id: actor.id.clone(),
			actor_type: actor.actor_type,
			before_state: Some(json!({
				"is_active": before.is_active,
				"is_primary": before.is_primary,
				"priority": before.priority,
			})),
			after_state: Some(json!({
				"is_active": after.is_active,
				"is_primary": after.is_primary,
				"priority": after.priority,
			})),
			metadata: requested,
		})
		.await;

		Ok(())
	}

	pub async fn delete_endpoint(&self, actor: &Actor, id: Uuid) -> Result<(), AdminError> {
		self.authorize(actor, Permission::ManageEndpoints)?;
		let removed = self.pool.remove(id).await?;

		self.emit_audit(AuditEntry {
			entity_type: ENDPOINT_ENTITY.to_string(),
			entity_id: id.to_string(),
			action: AuditAction::Delete,
			actor_id: actor.id.clone(),
			actor_type: actor.actor_type,
			before_state: Some(json!({
				"is_active": removed.is_active,
				"is_primary": removed.is_primary,
				"priority": removed.priority,
			})),
			after_state: None,
			metadata: json!({ "chain": removed.chain }),
		})
		.await;

		Ok(())
	}

	/// On-demand liveness probe of a single endpoint. Updates the
	/// endpoint's latency and error counters; diagnostic only, no audit
	/// entry.
	pub async fn health_check_endpoint(
		&self,
		actor: &Actor,
		id: Uuid,
	) -> Result<HealthReport, AdminError> {
		self.authorize(actor, Permission::ManageEndpoints)?;
		Ok(self.pool.health_check(id).await?)
	}
}
