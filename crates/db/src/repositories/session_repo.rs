//! Repository for the `onboarding_sessions` table.

use sqlx::PgPool;

use intake_core::types::{DbId, Timestamp};

use crate::models::session::{NewSession, Session};

/// Column list for `onboarding_sessions` queries.
const COLUMNS: &str = "id, organization_id, client_id, template_id, token, \
     status, completion_percentage, expires_at, created_at, updated_at";

/// Provides CRUD operations for onboarding sessions.
pub struct SessionRepo;

impl SessionRepo {
    /// Insert a new session (status DRAFT, completion 0).
    pub async fn create(pool: &PgPool, input: &NewSession) -> Result<Session, sqlx::Error> {
        let query = format!(
            "INSERT INTO onboarding_sessions \
                 (organization_id, client_id, template_id, token, expires_at) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Session>(&query)
            .bind(input.organization_id)
            .bind(input.client_id)
            .bind(input.template_id)
            .bind(&input.token)
            .bind(input.expires_at)
            .fetch_one(pool)
            .await
    }

    /// Find a session by ID within an organization.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
        organization_id: DbId,
    ) -> Result<Option<Session>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM onboarding_sessions \
             WHERE id = $1 AND organization_id = $2"
        );
        sqlx::query_as::<_, Session>(&query)
            .bind(id)
            .bind(organization_id)
            .fetch_optional(pool)
            .await
    }

    /// Find a session by its public token.
    pub async fn find_by_token(
        pool: &PgPool,
        token: &str,
    ) -> Result<Option<Session>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM onboarding_sessions WHERE token = $1");
        sqlx::query_as::<_, Session>(&query)
            .bind(token)
            .fetch_optional(pool)
            .await
    }

    /// List sessions for an organization, newest first.
    pub async fn list(pool: &PgPool, organization_id: DbId) -> Result<Vec<Session>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM onboarding_sessions \
             WHERE organization_id = $1 \
             ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Session>(&query)
            .bind(organization_id)
            .fetch_all(pool)
            .await
    }

    /// Update the status of a session.
    pub async fn update_status(
        pool: &PgPool,
        id: DbId,
        status: &str,
    ) -> Result<Option<Session>, sqlx::Error> {
        let query = format!(
            "UPDATE onboarding_sessions SET status = $2, updated_at = now() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Session>(&query)
            .bind(id)
            .bind(status)
            .fetch_optional(pool)
            .await
    }

    /// Update the derived completion percentage.
    pub async fn update_completion(
        pool: &PgPool,
        id: DbId,
        completion_percentage: i32,
    ) -> Result<Option<Session>, sqlx::Error> {
        let query = format!(
            "UPDATE onboarding_sessions SET completion_percentage = $2, updated_at = now() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Session>(&query)
            .bind(id)
            .bind(completion_percentage)
            .fetch_optional(pool)
            .await
    }

    /// Update status and grant a fresh expiry window (administrative
    /// reopen).
    pub async fn update_status_and_expiry(
        pool: &PgPool,
        id: DbId,
        status: &str,
        expires_at: Timestamp,
    ) -> Result<Option<Session>, sqlx::Error> {
        let query = format!(
            "UPDATE onboarding_sessions \
             SET status = $2, expires_at = $3, updated_at = now() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Session>(&query)
            .bind(id)
            .bind(status)
            .bind(expires_at)
            .fetch_optional(pool)
            .await
    }
}
