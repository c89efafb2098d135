//! File upload entity model and DTOs.

use serde::Serialize;
use sqlx::FromRow;

use intake_core::types::{DbId, Timestamp};

/// A row from the `file_uploads` table. Immutable once created; the row is
/// only inserted after the physical storage write succeeded.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct FileUpload {
    pub id: DbId,
    pub organization_id: DbId,
    pub session_id: DbId,
    pub url: String,
    pub file_name: String,
    pub file_type: String,
    pub size_bytes: i64,
    pub created_at: Timestamp,
}

/// DTO for recording a stored upload.
#[derive(Debug, Clone)]
pub struct NewFileUpload {
    pub organization_id: DbId,
    pub session_id: DbId,
    pub url: String,
    pub file_name: String,
    pub file_type: String,
    pub size_bytes: i64,
}
