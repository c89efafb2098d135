//! Audit log entity model and DTOs.

use serde::Serialize;
use sqlx::FromRow;

use intake_core::types::{DbId, Timestamp};

/// A row from the `audit_logs` table. Written only by event-bus
/// subscribers, never inline by the mutating operation.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AuditLog {
    pub id: DbId,
    pub organization_id: DbId,
    pub action: String,
    pub entity: String,
    pub entity_id: String,
    pub details: Option<String>,
    pub created_at: Timestamp,
}

/// DTO for recording an audit entry.
#[derive(Debug, Clone)]
pub struct NewAuditLog {
    pub organization_id: DbId,
    pub action: String,
    pub entity: String,
    pub entity_id: String,
    pub details: Option<String>,
}
