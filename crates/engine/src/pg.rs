//! PostgreSQL port adapters.
//!
//! Thin wrappers that carry the pool and translate `sqlx::Error` into the
//! domain taxonomy: unique violations become `Conflict`, everything else
//! `Internal`.

use intake_core::types::{DbId, Timestamp};
use intake_core::CoreError;
use intake_db::models::audit::{AuditLog, NewAuditLog};
use intake_db::models::file_upload::{FileUpload, NewFileUpload};
use intake_db::models::response::Response;
use intake_db::models::session::{NewSession, Session};
use intake_db::models::template::{NewTemplate, Template, UpdateTemplate};
use intake_db::repositories::{
    AuditRepo, FileUploadRepo, ResponseRepo, SessionRepo, TemplateRepo,
};
use intake_db::DbPool;

use crate::store::{AttachmentStore, AuditStore, ResponseStore, SessionStore, TemplateStore};

fn map_db_err(e: sqlx::Error) -> CoreError {
    if let sqlx::Error::Database(ref db) = e {
        // 23505 = unique_violation
        if db.code().as_deref() == Some("23505") {
            return CoreError::Conflict(db.message().to_string());
        }
    }
    CoreError::Internal(e.to_string())
}

#[derive(Clone)]
pub struct PgTemplateStore {
    pool: DbPool,
}

impl PgTemplateStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl TemplateStore for PgTemplateStore {
    async fn create(&self, input: &NewTemplate) -> Result<Template, CoreError> {
        TemplateRepo::create(&self.pool, input).await.map_err(map_db_err)
    }

    async fn find_by_id(
        &self,
        id: DbId,
        organization_id: DbId,
    ) -> Result<Option<Template>, CoreError> {
        TemplateRepo::find_by_id(&self.pool, id, organization_id)
            .await
            .map_err(map_db_err)
    }

    async fn list(&self, organization_id: DbId) -> Result<Vec<Template>, CoreError> {
        TemplateRepo::list(&self.pool, organization_id)
            .await
            .map_err(map_db_err)
    }

    async fn find_active(
        &self,
        organization_id: DbId,
        service_type: &str,
    ) -> Result<Option<Template>, CoreError> {
        TemplateRepo::find_active(&self.pool, organization_id, service_type)
            .await
            .map_err(map_db_err)
    }

    async fn list_active(&self, organization_id: DbId) -> Result<Vec<Template>, CoreError> {
        TemplateRepo::list_active(&self.pool, organization_id)
            .await
            .map_err(map_db_err)
    }

    async fn update(
        &self,
        id: DbId,
        organization_id: DbId,
        input: &UpdateTemplate,
    ) -> Result<Option<Template>, CoreError> {
        TemplateRepo::update(&self.pool, id, organization_id, input)
            .await
            .map_err(map_db_err)
    }

    async fn version(
        &self,
        id: DbId,
        organization_id: DbId,
    ) -> Result<Option<Template>, CoreError> {
        TemplateRepo::version(&self.pool, id, organization_id)
            .await
            .map_err(map_db_err)
    }

    async fn delete(&self, id: DbId, organization_id: DbId) -> Result<bool, CoreError> {
        TemplateRepo::delete(&self.pool, id, organization_id)
            .await
            .map_err(map_db_err)
    }
}

#[derive(Clone)]
pub struct PgSessionStore {
    pool: DbPool,
}

impl PgSessionStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl SessionStore for PgSessionStore {
    async fn create(&self, input: &NewSession) -> Result<Session, CoreError> {
        SessionRepo::create(&self.pool, input).await.map_err(map_db_err)
    }

    async fn find_by_id(
        &self,
        id: DbId,
        organization_id: DbId,
    ) -> Result<Option<Session>, CoreError> {
        SessionRepo::find_by_id(&self.pool, id, organization_id)
            .await
            .map_err(map_db_err)
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<Session>, CoreError> {
        SessionRepo::find_by_token(&self.pool, token)
            .await
            .map_err(map_db_err)
    }

    async fn list(&self, organization_id: DbId) -> Result<Vec<Session>, CoreError> {
        SessionRepo::list(&self.pool, organization_id)
            .await
            .map_err(map_db_err)
    }

    async fn update_status(&self, id: DbId, status: &str) -> Result<Option<Session>, CoreError> {
        SessionRepo::update_status(&self.pool, id, status)
            .await
            .map_err(map_db_err)
    }

    async fn update_completion(
        &self,
        id: DbId,
        completion_percentage: i32,
    ) -> Result<Option<Session>, CoreError> {
        SessionRepo::update_completion(&self.pool, id, completion_percentage)
            .await
            .map_err(map_db_err)
    }

    async fn update_status_and_expiry(
        &self,
        id: DbId,
        status: &str,
        expires_at: Timestamp,
    ) -> Result<Option<Session>, CoreError> {
        SessionRepo::update_status_and_expiry(&self.pool, id, status, expires_at)
            .await
            .map_err(map_db_err)
    }
}

#[derive(Clone)]
pub struct PgResponseStore {
    pool: DbPool,
}

impl PgResponseStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl ResponseStore for PgResponseStore {
    async fn upsert(
        &self,
        session_id: DbId,
        step_id: &str,
        field_id: &str,
        value: &serde_json::Value,
    ) -> Result<Response, CoreError> {
        ResponseRepo::upsert(&self.pool, session_id, step_id, field_id, value)
            .await
            .map_err(map_db_err)
    }

    async fn list_for_session(&self, session_id: DbId) -> Result<Vec<Response>, CoreError> {
        ResponseRepo::list_for_session(&self.pool, session_id)
            .await
            .map_err(map_db_err)
    }
}

#[derive(Clone)]
pub struct PgAttachmentStore {
    pool: DbPool,
}

impl PgAttachmentStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl AttachmentStore for PgAttachmentStore {
    async fn create(&self, input: &NewFileUpload) -> Result<FileUpload, CoreError> {
        FileUploadRepo::create(&self.pool, input)
            .await
            .map_err(map_db_err)
    }

    async fn list_for_session(&self, session_id: DbId) -> Result<Vec<FileUpload>, CoreError> {
        FileUploadRepo::list_for_session(&self.pool, session_id)
            .await
            .map_err(map_db_err)
    }

    async fn count_for_session(&self, session_id: DbId) -> Result<i64, CoreError> {
        FileUploadRepo::count_for_session(&self.pool, session_id)
            .await
            .map_err(map_db_err)
    }
}

#[derive(Clone)]
pub struct PgAuditStore {
    pool: DbPool,
}

impl PgAuditStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl AuditStore for PgAuditStore {
    async fn create(&self, input: &NewAuditLog) -> Result<AuditLog, CoreError> {
        AuditRepo::create(&self.pool, input).await.map_err(map_db_err)
    }

    async fn list_for_organization(
        &self,
        organization_id: DbId,
        limit: i64,
    ) -> Result<Vec<AuditLog>, CoreError> {
        AuditRepo::list_for_organization(&self.pool, organization_id, limit)
            .await
            .map_err(map_db_err)
    }
}
