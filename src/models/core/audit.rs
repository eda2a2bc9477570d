//! Audit trail and authorization primitives for the admin surface.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Kind of mutation recorded in the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AuditAction {
	Create,
	Update,
	Delete,
}

/// Who performed an audited action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ActorType {
	Admin,
	System,
}

/// Capabilities checked by the admin control surface.
///
/// Authorization is an explicit check inside the service rather than a
/// framework-level guard, so the contract is testable without any web layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Permission {
	ViewMonitoring,
	ManageMonitors,
	ManageEndpoints,
}

/// An authenticated caller of the admin surface.
#[derive(Debug, Clone)]
pub struct Actor {
	pub id: String,
	pub actor_type: ActorType,
	pub permissions: HashSet<Permission>,
}

impl Actor {
	pub fn new(id: &str, actor_type: ActorType, permissions: &[Permission]) -> Self {
		Self {
			id: id.to_string(),
			actor_type,
			permissions: permissions.iter().copied().collect(),
		}
	}

	pub fn has(&self, permission: Permission) -> bool {
		self.permissions.contains(&permission)
	}
}

/// A single audit trail entry, emitted once per mutating admin operation.
#[derive(Debug, Clone, Serialize)]
pub struct AuditEntry {
	pub entity_type: String,
	pub entity_id: String,
	pub action: AuditAction,
	pub actor_id: String,
	pub actor_type: ActorType,
	pub before_state: Option<serde_json::Value>,
	pub after_state: Option<serde_json::Value>,
	pub metadata: serde_json::Value,
}
