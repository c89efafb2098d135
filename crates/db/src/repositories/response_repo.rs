//! Repository for the `onboarding_responses` table.

use sqlx::PgPool;

use intake_core::types::DbId;

use crate::models::response::Response;

/// Column list for `onboarding_responses` queries.
const COLUMNS: &str = "id, session_id, step_id, field_id, value, updated_at";

/// Provides upsert and retrieval for session answers.
pub struct ResponseRepo;

impl ResponseRepo {
    /// Upsert one answer keyed by (session_id, step_id, field_id).
    /// Last committed write wins; no duplicate rows.
    pub async fn upsert(
        pool: &PgPool,
        session_id: DbId,
        step_id: &str,
        field_id: &str,
        value: &serde_json::Value,
    ) -> Result<Response, sqlx::Error> {
        let query = format!(
            "INSERT INTO onboarding_responses (session_id, step_id, field_id, value) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT (session_id, step_id, field_id) \
             DO UPDATE SET value = EXCLUDED.value, updated_at = now() \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Response>(&query)
            .bind(session_id)
            .bind(step_id)
            .bind(field_id)
            .bind(value)
            .fetch_one(pool)
            .await
    }

    /// All answers for a session, oldest write first.
    pub async fn list_for_session(
        pool: &PgPool,
        session_id: DbId,
    ) -> Result<Vec<Response>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM onboarding_responses \
             WHERE session_id = $1 \
             ORDER BY id"
        );
        sqlx::query_as::<_, Response>(&query)
            .bind(session_id)
            .fetch_all(pool)
            .await
    }
}
