//! Repository for the `file_uploads` table.

use sqlx::PgPool;

use intake_core::types::DbId;

use crate::models::file_upload::{FileUpload, NewFileUpload};

/// Column list for `file_uploads` queries.
const COLUMNS: &str = "id, organization_id, session_id, url, file_name, \
     file_type, size_bytes, created_at";

/// Provides insert and retrieval for file attachment metadata.
pub struct FileUploadRepo;

impl FileUploadRepo {
    /// Record a stored upload. Called only after the physical storage
    /// write succeeded.
    pub async fn create(pool: &PgPool, input: &NewFileUpload) -> Result<FileUpload, sqlx::Error> {
        let query = format!(
            "INSERT INTO file_uploads \
                 (organization_id, session_id, url, file_name, file_type, size_bytes) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, FileUpload>(&query)
            .bind(input.organization_id)
            .bind(input.session_id)
            .bind(&input.url)
            .bind(&input.file_name)
            .bind(&input.file_type)
            .bind(input.size_bytes)
            .fetch_one(pool)
            .await
    }

    /// All attachments for a session, oldest first.
    pub async fn list_for_session(
        pool: &PgPool,
        session_id: DbId,
    ) -> Result<Vec<FileUpload>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM file_uploads \
             WHERE session_id = $1 \
             ORDER BY created_at"
        );
        sqlx::query_as::<_, FileUpload>(&query)
            .bind(session_id)
            .fetch_all(pool)
            .await
    }

    /// Number of attachments for a session (risk scoring input).
    pub async fn count_for_session(pool: &PgPool, session_id: DbId) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM file_uploads WHERE session_id = $1")
                .bind(session_id)
                .fetch_one(pool)
                .await?;
        Ok(count)
    }
}
