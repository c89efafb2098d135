//! In-memory port adapters.
//!
//! Behavioral twins of the PostgreSQL adapters, backed by mutex-guarded
//! maps. Used by the engine test suites and by `--ephemeral` local runs;
//! they uphold the same uniqueness rules the schema enforces.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::Mutex;

use chrono::Utc;

use intake_core::types::{DbId, Timestamp};
use intake_core::CoreError;
use intake_db::models::audit::{AuditLog, NewAuditLog};
use intake_db::models::file_upload::{FileUpload, NewFileUpload};
use intake_db::models::response::Response;
use intake_db::models::session::{NewSession, Session};
use intake_db::models::template::{NewTemplate, Template, UpdateTemplate};

use crate::storage::{ObjectStorage, StoredObject};
use crate::store::{AttachmentStore, AuditStore, ResponseStore, SessionStore, TemplateStore};

fn poisoned() -> CoreError {
    CoreError::Internal("memory store mutex poisoned".into())
}

// ---------------------------------------------------------------------------
// Templates
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MemoryTemplateStore {
    rows: Mutex<HashMap<DbId, Template>>,
    next_id: AtomicI64,
}

impl MemoryTemplateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl TemplateStore for MemoryTemplateStore {
    async fn create(&self, input: &NewTemplate) -> Result<Template, CoreError> {
        let mut rows = self.rows.lock().map_err(|_| poisoned())?;
        if rows.values().any(|t| {
            t.organization_id == input.organization_id
                && t.service_type == input.service_type
                && t.is_active
        }) {
            return Err(CoreError::Conflict(
                "active template already exists for this service type".into(),
            ));
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let now = Utc::now();
        let row = Template {
            id,
            organization_id: input.organization_id,
            name: input.name.clone(),
            service_type: input.service_type.clone(),
            version: 1,
            steps: input.steps.clone(),
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        rows.insert(id, row.clone());
        Ok(row)
    }

    async fn find_by_id(
        &self,
        id: DbId,
        organization_id: DbId,
    ) -> Result<Option<Template>, CoreError> {
        let rows = self.rows.lock().map_err(|_| poisoned())?;
        Ok(rows
            .get(&id)
            .filter(|t| t.organization_id == organization_id)
            .cloned())
    }

    async fn list(&self, organization_id: DbId) -> Result<Vec<Template>, CoreError> {
        let rows = self.rows.lock().map_err(|_| poisoned())?;
        let mut out: Vec<Template> = rows
            .values()
            .filter(|t| t.organization_id == organization_id)
            .cloned()
            .collect();
        out.sort_by_key(|t| t.id);
        Ok(out)
    }

    async fn find_active(
        &self,
        organization_id: DbId,
        service_type: &str,
    ) -> Result<Option<Template>, CoreError> {
        let rows = self.rows.lock().map_err(|_| poisoned())?;
        Ok(rows
            .values()
            .find(|t| {
                t.organization_id == organization_id
                    && t.service_type == service_type
                    && t.is_active
            })
            .cloned())
    }

    async fn list_active(&self, organization_id: DbId) -> Result<Vec<Template>, CoreError> {
        let rows = self.rows.lock().map_err(|_| poisoned())?;
        let mut out: Vec<Template> = rows
            .values()
            .filter(|t| t.organization_id == organization_id && t.is_active)
            .cloned()
            .collect();
        out.sort_by_key(|t| t.id);
        Ok(out)
    }

    async fn update(
        &self,
        id: DbId,
        organization_id: DbId,
        input: &UpdateTemplate,
    ) -> Result<Option<Template>, CoreError> {
        let mut rows = self.rows.lock().map_err(|_| poisoned())?;
        let Some(row) = rows
            .get_mut(&id)
            .filter(|t| t.organization_id == organization_id)
        else {
            return Ok(None);
        };
        if let Some(name) = &input.name {
            row.name = name.clone();
        }
        if let Some(service_type) = &input.service_type {
            row.service_type = service_type.clone();
        }
        if let Some(steps) = &input.steps {
            row.steps = steps.clone();
        }
        row.updated_at = Utc::now();
        Ok(Some(row.clone()))
    }

    async fn version(
        &self,
        id: DbId,
        organization_id: DbId,
    ) -> Result<Option<Template>, CoreError> {
        let mut rows = self.rows.lock().map_err(|_| poisoned())?;
        let Some(source) = rows
            .get(&id)
            .filter(|t| t.organization_id == organization_id)
            .cloned()
        else {
            return Ok(None);
        };
        if let Some(old) = rows.get_mut(&id) {
            old.is_active = false;
            old.updated_at = Utc::now();
        }
        let new_id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let now = Utc::now();
        let row = Template {
            id: new_id,
            version: source.version + 1,
            is_active: true,
            created_at: now,
            updated_at: now,
            ..source
        };
        rows.insert(new_id, row.clone());
        Ok(Some(row))
    }

    async fn delete(&self, id: DbId, organization_id: DbId) -> Result<bool, CoreError> {
        let mut rows = self.rows.lock().map_err(|_| poisoned())?;
        let found = rows
            .get(&id)
            .is_some_and(|t| t.organization_id == organization_id);
        if found {
            rows.remove(&id);
        }
        Ok(found)
    }
}

// ---------------------------------------------------------------------------
// Sessions
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MemorySessionStore {
    rows: Mutex<HashMap<DbId, Session>>,
    next_id: AtomicI64,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl SessionStore for MemorySessionStore {
    async fn create(&self, input: &NewSession) -> Result<Session, CoreError> {
        let mut rows = self.rows.lock().map_err(|_| poisoned())?;
        if rows.values().any(|s| s.token == input.token) {
            return Err(CoreError::Conflict("session token already exists".into()));
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let now = Utc::now();
        let row = Session {
            id,
            organization_id: input.organization_id,
            client_id: input.client_id,
            template_id: input.template_id,
            token: input.token.clone(),
            status: "DRAFT".into(),
            completion_percentage: 0,
            expires_at: input.expires_at,
            created_at: now,
            updated_at: now,
        };
        rows.insert(id, row.clone());
        Ok(row)
    }

    async fn find_by_id(
        &self,
        id: DbId,
        organization_id: DbId,
    ) -> Result<Option<Session>, CoreError> {
        let rows = self.rows.lock().map_err(|_| poisoned())?;
        Ok(rows
            .get(&id)
            .filter(|s| s.organization_id == organization_id)
            .cloned())
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<Session>, CoreError> {
        let rows = self.rows.lock().map_err(|_| poisoned())?;
        Ok(rows.values().find(|s| s.token == token).cloned())
    }

    async fn list(&self, organization_id: DbId) -> Result<Vec<Session>, CoreError> {
        let rows = self.rows.lock().map_err(|_| poisoned())?;
        let mut out: Vec<Session> = rows
            .values()
            .filter(|s| s.organization_id == organization_id)
            .cloned()
            .collect();
        out.sort_by_key(|s| s.id);
        Ok(out)
    }

    async fn update_status(&self, id: DbId, status: &str) -> Result<Option<Session>, CoreError> {
        let mut rows = self.rows.lock().map_err(|_| poisoned())?;
        Ok(rows.get_mut(&id).map(|s| {
            s.status = status.to_string();
            s.updated_at = Utc::now();
            s.clone()
        }))
    }

    async fn update_completion(
        &self,
        id: DbId,
        completion_percentage: i32,
    ) -> Result<Option<Session>, CoreError> {
        let mut rows = self.rows.lock().map_err(|_| poisoned())?;
        Ok(rows.get_mut(&id).map(|s| {
            s.completion_percentage = completion_percentage;
            s.updated_at = Utc::now();
            s.clone()
        }))
    }

    async fn update_status_and_expiry(
        &self,
        id: DbId,
        status: &str,
        expires_at: Timestamp,
    ) -> Result<Option<Session>, CoreError> {
        let mut rows = self.rows.lock().map_err(|_| poisoned())?;
        Ok(rows.get_mut(&id).map(|s| {
            s.status = status.to_string();
            s.expires_at = expires_at;
            s.updated_at = Utc::now();
            s.clone()
        }))
    }
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MemoryResponseStore {
    rows: Mutex<HashMap<(DbId, String, String), Response>>,
    next_id: AtomicI64,
}

impl MemoryResponseStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl ResponseStore for MemoryResponseStore {
    async fn upsert(
        &self,
        session_id: DbId,
        step_id: &str,
        field_id: &str,
        value: &serde_json::Value,
    ) -> Result<Response, CoreError> {
        let mut rows = self.rows.lock().map_err(|_| poisoned())?;
        let key = (session_id, step_id.to_string(), field_id.to_string());
        let now = Utc::now();
        if let Some(row) = rows.get_mut(&key) {
            row.value = Some(value.clone());
            row.updated_at = now;
            return Ok(row.clone());
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let row = Response {
            id,
            session_id,
            step_id: step_id.to_string(),
            field_id: field_id.to_string(),
            value: Some(value.clone()),
            updated_at: now,
        };
        rows.insert(key, row.clone());
        Ok(row)
    }

    async fn list_for_session(&self, session_id: DbId) -> Result<Vec<Response>, CoreError> {
        let rows = self.rows.lock().map_err(|_| poisoned())?;
        let mut out: Vec<Response> = rows
            .values()
            .filter(|r| r.session_id == session_id)
            .cloned()
            .collect();
        out.sort_by_key(|r| r.id);
        Ok(out)
    }
}

// ---------------------------------------------------------------------------
// Attachments
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MemoryAttachmentStore {
    rows: Mutex<HashMap<DbId, FileUpload>>,
    next_id: AtomicI64,
}

impl MemoryAttachmentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl AttachmentStore for MemoryAttachmentStore {
    async fn create(&self, input: &NewFileUpload) -> Result<FileUpload, CoreError> {
        let mut rows = self.rows.lock().map_err(|_| poisoned())?;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let row = FileUpload {
            id,
            organization_id: input.organization_id,
            session_id: input.session_id,
            url: input.url.clone(),
            file_name: input.file_name.clone(),
            file_type: input.file_type.clone(),
            size_bytes: input.size_bytes,
            created_at: Utc::now(),
        };
        rows.insert(id, row.clone());
        Ok(row)
    }

    async fn list_for_session(&self, session_id: DbId) -> Result<Vec<FileUpload>, CoreError> {
        let rows = self.rows.lock().map_err(|_| poisoned())?;
        let mut out: Vec<FileUpload> = rows
            .values()
            .filter(|f| f.session_id == session_id)
            .cloned()
            .collect();
        out.sort_by_key(|f| f.id);
        Ok(out)
    }

    async fn count_for_session(&self, session_id: DbId) -> Result<i64, CoreError> {
        let rows = self.rows.lock().map_err(|_| poisoned())?;
        Ok(rows.values().filter(|f| f.session_id == session_id).count() as i64)
    }
}

// ---------------------------------------------------------------------------
// Audit log
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MemoryAuditStore {
    rows: Mutex<Vec<AuditLog>>,
    next_id: AtomicI64,
}

impl MemoryAuditStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl AuditStore for MemoryAuditStore {
    async fn create(&self, input: &NewAuditLog) -> Result<AuditLog, CoreError> {
        let mut rows = self.rows.lock().map_err(|_| poisoned())?;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let row = AuditLog {
            id,
            organization_id: input.organization_id,
            action: input.action.clone(),
            entity: input.entity.clone(),
            entity_id: input.entity_id.clone(),
            details: input.details.clone(),
            created_at: Utc::now(),
        };
        rows.push(row.clone());
        Ok(row)
    }

    async fn list_for_organization(
        &self,
        organization_id: DbId,
        limit: i64,
    ) -> Result<Vec<AuditLog>, CoreError> {
        let rows = self.rows.lock().map_err(|_| poisoned())?;
        Ok(rows
            .iter()
            .rev()
            .filter(|a| a.organization_id == organization_id)
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }
}

// ---------------------------------------------------------------------------
// Object storage
// ---------------------------------------------------------------------------

/// Holds stored blobs in memory and counts `put` attempts, so tests can
/// assert that a rejected upload never reached storage.
#[derive(Default)]
pub struct MemoryObjectStorage {
    objects: Mutex<Vec<(String, Vec<u8>)>>,
    put_calls: AtomicUsize,
}

impl MemoryObjectStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `put` calls made so far, successful or not.
    pub fn put_calls(&self) -> usize {
        self.put_calls.load(Ordering::SeqCst)
    }

    pub fn object_count(&self) -> usize {
        self.objects.lock().map(|o| o.len()).unwrap_or(0)
    }
}

#[async_trait::async_trait]
impl ObjectStorage for MemoryObjectStorage {
    async fn put(&self, file_name: &str, bytes: &[u8]) -> Result<StoredObject, CoreError> {
        self.put_calls.fetch_add(1, Ordering::SeqCst);
        let n = {
            let mut objects = self.objects.lock().map_err(|_| poisoned())?;
            objects.push((file_name.to_string(), bytes.to_vec()));
            objects.len()
        };
        Ok(StoredObject {
            url: format!("memory://uploads/{n}-{file_name}"),
            file_name: format!("{n}-{file_name}"),
            size_bytes: bytes.len() as i64,
        })
    }
}
