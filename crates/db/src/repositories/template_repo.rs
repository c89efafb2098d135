//! Repository for the `onboarding_templates` table.

use sqlx::PgPool;

use intake_core::types::DbId;

use crate::models::template::{NewTemplate, Template, UpdateTemplate};

/// Column list for `onboarding_templates` queries.
const COLUMNS: &str = "id, organization_id, name, service_type, version, \
     steps, is_active, created_at, updated_at";

/// Provides CRUD and versioning operations for onboarding templates.
pub struct TemplateRepo;

impl TemplateRepo {
    /// Insert a new template at version 1, active.
    pub async fn create(pool: &PgPool, input: &NewTemplate) -> Result<Template, sqlx::Error> {
        let query = format!(
            "INSERT INTO onboarding_templates (organization_id, name, service_type, steps) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Template>(&query)
            .bind(input.organization_id)
            .bind(&input.name)
            .bind(&input.service_type)
            .bind(&input.steps)
            .fetch_one(pool)
            .await
    }

    /// Find a template by ID within an organization.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
        organization_id: DbId,
    ) -> Result<Option<Template>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM onboarding_templates \
             WHERE id = $1 AND organization_id = $2"
        );
        sqlx::query_as::<_, Template>(&query)
            .bind(id)
            .bind(organization_id)
            .fetch_optional(pool)
            .await
    }

    /// List all templates for an organization, most recently updated first.
    pub async fn list(pool: &PgPool, organization_id: DbId) -> Result<Vec<Template>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM onboarding_templates \
             WHERE organization_id = $1 \
             ORDER BY updated_at DESC"
        );
        sqlx::query_as::<_, Template>(&query)
            .bind(organization_id)
            .fetch_all(pool)
            .await
    }

    /// Find the active template for a service type.
    pub async fn find_active(
        pool: &PgPool,
        organization_id: DbId,
        service_type: &str,
    ) -> Result<Option<Template>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM onboarding_templates \
             WHERE organization_id = $1 AND service_type = $2 AND is_active \
             ORDER BY version DESC \
             LIMIT 1"
        );
        sqlx::query_as::<_, Template>(&query)
            .bind(organization_id)
            .bind(service_type)
            .fetch_optional(pool)
            .await
    }

    /// List all active templates for an organization.
    pub async fn list_active(
        pool: &PgPool,
        organization_id: DbId,
    ) -> Result<Vec<Template>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM onboarding_templates \
             WHERE organization_id = $1 AND is_active \
             ORDER BY service_type, version DESC"
        );
        sqlx::query_as::<_, Template>(&query)
            .bind(organization_id)
            .fetch_all(pool)
            .await
    }

    /// Live in-place edit of the current row. Does not change the version.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        organization_id: DbId,
        input: &UpdateTemplate,
    ) -> Result<Option<Template>, sqlx::Error> {
        let query = format!(
            "UPDATE onboarding_templates SET \
                 name = COALESCE($3, name), \
                 service_type = COALESCE($4, service_type), \
                 steps = COALESCE($5, steps), \
                 updated_at = now() \
             WHERE id = $1 AND organization_id = $2 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Template>(&query)
            .bind(id)
            .bind(organization_id)
            .bind(&input.name)
            .bind(&input.service_type)
            .bind(&input.steps)
            .fetch_optional(pool)
            .await
    }

    /// Create the next version of a template in one transaction: the source
    /// row is deactivated and a copy is inserted with `version + 1`, active.
    /// Sessions pinned to the source row are unaffected.
    pub async fn version(
        pool: &PgPool,
        id: DbId,
        organization_id: DbId,
    ) -> Result<Option<Template>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let deactivate = format!(
            "UPDATE onboarding_templates SET is_active = false, updated_at = now() \
             WHERE id = $1 AND organization_id = $2 \
             RETURNING {COLUMNS}"
        );
        let Some(source) = sqlx::query_as::<_, Template>(&deactivate)
            .bind(id)
            .bind(organization_id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            tx.rollback().await?;
            return Ok(None);
        };

        let insert = format!(
            "INSERT INTO onboarding_templates \
                 (organization_id, name, service_type, version, steps, is_active) \
             VALUES ($1, $2, $3, $4, $5, true) \
             RETURNING {COLUMNS}"
        );
        let next = sqlx::query_as::<_, Template>(&insert)
            .bind(source.organization_id)
            .bind(&source.name)
            .bind(&source.service_type)
            .bind(source.version + 1)
            .bind(&source.steps)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(next))
    }

    /// Delete a template row.
    pub async fn delete(
        pool: &PgPool,
        id: DbId,
        organization_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM onboarding_templates WHERE id = $1 AND organization_id = $2",
        )
        .bind(id)
        .bind(organization_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
