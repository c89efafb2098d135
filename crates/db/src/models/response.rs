//! Onboarding response entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use intake_core::types::{DbId, Timestamp};

/// A row from the `onboarding_responses` table.
///
/// Unique per (session_id, step_id, field_id); writes are upserts with
/// last-committed-wins semantics.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Response {
    pub id: DbId,
    pub session_id: DbId,
    pub step_id: String,
    pub field_id: String,
    pub value: Option<serde_json::Value>,
    pub updated_at: Timestamp,
}

/// One field's answer within a step submission.
#[derive(Debug, Clone, Deserialize)]
pub struct FieldAnswer {
    pub field_id: String,
    pub value: serde_json::Value,
}
