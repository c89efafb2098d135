//! Onboarding template entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use intake_core::types::{DbId, Timestamp};

/// A row from the `onboarding_templates` table.
///
/// `steps` is the raw JSON document; parse it with
/// `intake_core::template::parse_steps` where typed access is needed.
/// `version` is monotonic within a (name, service_type) lineage; exactly
/// one row per lineage has `is_active = true`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Template {
    pub id: DbId,
    pub organization_id: DbId,
    pub name: String,
    pub service_type: String,
    pub version: i32,
    pub steps: serde_json::Value,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new template (version 1, active).
#[derive(Debug, Clone, Deserialize)]
pub struct NewTemplate {
    pub organization_id: DbId,
    pub name: String,
    pub service_type: String,
    pub steps: serde_json::Value,
}

/// DTO for a live in-place edit of the current row. Does not change the
/// version; visible to sessions still pinned to the row.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTemplate {
    pub name: Option<String>,
    pub service_type: Option<String>,
    pub steps: Option<serde_json::Value>,
}
