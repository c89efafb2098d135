//! Onboarding session entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use intake_core::types::{DbId, Timestamp};

/// A row from the `onboarding_sessions` table.
///
/// `template_id` is pinned at creation and never changes. `status` holds a
/// `SessionStatus` wire string; `completion_percentage` is derived, not
/// authoritative.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Session {
    pub id: DbId,
    pub organization_id: DbId,
    pub client_id: DbId,
    pub template_id: DbId,
    #[serde(skip_serializing)]
    pub token: String,
    pub status: String,
    pub completion_percentage: i32,
    pub expires_at: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new session (status starts at DRAFT).
#[derive(Debug, Clone)]
pub struct NewSession {
    pub organization_id: DbId,
    pub client_id: DbId,
    pub template_id: DbId,
    pub token: String,
    pub expires_at: Timestamp,
}

/// Admin request to start a session for a client and service type.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSessionRequest {
    pub organization_id: DbId,
    pub client_id: DbId,
    pub service_type: String,
}
