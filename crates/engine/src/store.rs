//! Persistence ports.
//!
//! Every service receives these traits at construction (no ambient
//! database handle). [`crate::pg`] backs them with PostgreSQL via
//! `intake-db`; [`crate::memory`] backs them with in-process maps for
//! tests and local development. All ports speak `CoreError`; absence is an
//! `Option`, not an error.

use intake_core::types::{DbId, Timestamp};
use intake_core::CoreError;
use intake_db::models::audit::{AuditLog, NewAuditLog};
use intake_db::models::file_upload::{FileUpload, NewFileUpload};
use intake_db::models::response::Response;
use intake_db::models::session::{NewSession, Session};
use intake_db::models::template::{NewTemplate, Template, UpdateTemplate};

/// Versioned template rows.
#[async_trait::async_trait]
pub trait TemplateStore: Send + Sync {
    async fn create(&self, input: &NewTemplate) -> Result<Template, CoreError>;

    async fn find_by_id(
        &self,
        id: DbId,
        organization_id: DbId,
    ) -> Result<Option<Template>, CoreError>;

    async fn list(&self, organization_id: DbId) -> Result<Vec<Template>, CoreError>;

    async fn find_active(
        &self,
        organization_id: DbId,
        service_type: &str,
    ) -> Result<Option<Template>, CoreError>;

    async fn list_active(&self, organization_id: DbId) -> Result<Vec<Template>, CoreError>;

    async fn update(
        &self,
        id: DbId,
        organization_id: DbId,
        input: &UpdateTemplate,
    ) -> Result<Option<Template>, CoreError>;

    /// Atomic versioning: deactivate the source row and insert its copy at
    /// `version + 1` as one transaction. History referenced by pinned
    /// sessions is never mutated.
    async fn version(
        &self,
        id: DbId,
        organization_id: DbId,
    ) -> Result<Option<Template>, CoreError>;

    async fn delete(&self, id: DbId, organization_id: DbId) -> Result<bool, CoreError>;
}

/// Session rows.
#[async_trait::async_trait]
pub trait SessionStore: Send + Sync {
    async fn create(&self, input: &NewSession) -> Result<Session, CoreError>;

    async fn find_by_id(
        &self,
        id: DbId,
        organization_id: DbId,
    ) -> Result<Option<Session>, CoreError>;

    async fn find_by_token(&self, token: &str) -> Result<Option<Session>, CoreError>;

    async fn list(&self, organization_id: DbId) -> Result<Vec<Session>, CoreError>;

    async fn update_status(&self, id: DbId, status: &str) -> Result<Option<Session>, CoreError>;

    async fn update_completion(
        &self,
        id: DbId,
        completion_percentage: i32,
    ) -> Result<Option<Session>, CoreError>;

    async fn update_status_and_expiry(
        &self,
        id: DbId,
        status: &str,
        expires_at: Timestamp,
    ) -> Result<Option<Session>, CoreError>;
}

/// Per-field answers, upsert keyed by (session_id, step_id, field_id).
#[async_trait::async_trait]
pub trait ResponseStore: Send + Sync {
    async fn upsert(
        &self,
        session_id: DbId,
        step_id: &str,
        field_id: &str,
        value: &serde_json::Value,
    ) -> Result<Response, CoreError>;

    async fn list_for_session(&self, session_id: DbId) -> Result<Vec<Response>, CoreError>;
}

/// File attachment metadata rows.
#[async_trait::async_trait]
pub trait AttachmentStore: Send + Sync {
    async fn create(&self, input: &NewFileUpload) -> Result<FileUpload, CoreError>;

    async fn list_for_session(&self, session_id: DbId) -> Result<Vec<FileUpload>, CoreError>;

    async fn count_for_session(&self, session_id: DbId) -> Result<i64, CoreError>;
}

/// Audit log rows, written by event subscribers.
#[async_trait::async_trait]
pub trait AuditStore: Send + Sync {
    async fn create(&self, input: &NewAuditLog) -> Result<AuditLog, CoreError>;

    async fn list_for_organization(
        &self,
        organization_id: DbId,
        limit: i64,
    ) -> Result<Vec<AuditLog>, CoreError>;
}
