//! Repository for the `audit_logs` table.

use sqlx::PgPool;

use intake_core::types::DbId;

use crate::models::audit::{AuditLog, NewAuditLog};

/// Column list for `audit_logs` queries.
const COLUMNS: &str = "id, organization_id, action, entity, entity_id, details, created_at";

/// Provides insert and retrieval for audit entries.
pub struct AuditRepo;

impl AuditRepo {
    /// Record an audit entry.
    pub async fn create(pool: &PgPool, input: &NewAuditLog) -> Result<AuditLog, sqlx::Error> {
        let query = format!(
            "INSERT INTO audit_logs (organization_id, action, entity, entity_id, details) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AuditLog>(&query)
            .bind(input.organization_id)
            .bind(&input.action)
            .bind(&input.entity)
            .bind(&input.entity_id)
            .bind(&input.details)
            .fetch_one(pool)
            .await
    }

    /// Recent audit entries for an organization, newest first.
    pub async fn list_for_organization(
        pool: &PgPool,
        organization_id: DbId,
        limit: i64,
    ) -> Result<Vec<AuditLog>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM audit_logs \
             WHERE organization_id = $1 \
             ORDER BY created_at DESC \
             LIMIT $2"
        );
        sqlx::query_as::<_, AuditLog>(&query)
            .bind(organization_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}
