//! File attachment gateway.
//!
//! Order of operations is fixed: writability guard, MIME allow-list,
//! size cap, physical storage write, then the metadata record. Nothing
//! touches storage until every validation passed; a metadata failure
//! after a successful storage write is reported as an inconsistency with
//! the orphaned URL, never silently dropped.

use std::sync::Arc;

use tracing::error;

use intake_core::upload::{validate_mime_type, validate_size};
use intake_core::CoreError;
use intake_db::models::file_upload::{FileUpload, NewFileUpload};
use intake_events::{DomainEvent, EventBus, EventName};

use crate::session::ResolvedSession;
use crate::storage::ObjectStorage;
use crate::store::AttachmentStore;

#[derive(Clone)]
pub struct FileGateway {
    attachments: Arc<dyn AttachmentStore>,
    storage: Arc<dyn ObjectStorage>,
    bus: Arc<EventBus>,
    max_bytes: usize,
}

impl FileGateway {
    pub fn new(
        attachments: Arc<dyn AttachmentStore>,
        storage: Arc<dyn ObjectStorage>,
        bus: Arc<EventBus>,
        max_bytes: usize,
    ) -> Self {
        Self {
            attachments,
            storage,
            bus,
            max_bytes,
        }
    }

    /// Accept one upload for a writable session.
    pub async fn accept(
        &self,
        resolved: &ResolvedSession,
        file_name: &str,
        mime_type: &str,
        bytes: &[u8],
    ) -> Result<FileUpload, CoreError> {
        resolved.guard_writable()?;
        validate_mime_type(mime_type)?;
        validate_size(bytes.len(), self.max_bytes)?;

        let stored = self.storage.put(file_name, bytes).await?;

        let row = match self
            .attachments
            .create(&NewFileUpload {
                organization_id: resolved.session.organization_id,
                session_id: resolved.session.id,
                url: stored.url.clone(),
                file_name: file_name.to_string(),
                file_type: mime_type.to_string(),
                size_bytes: stored.size_bytes,
            })
            .await
        {
            Ok(row) => row,
            Err(e) => {
                error!(url = %stored.url, error = %e, "upload metadata write failed after storage write");
                return Err(CoreError::MetadataInconsistency {
                    url: stored.url,
                    detail: e.to_string(),
                });
            }
        };

        self.bus
            .emit(
                DomainEvent::new(
                    EventName::FileUploaded,
                    resolved.session.id,
                    resolved.session.organization_id,
                )
                .with_payload(serde_json::json!({
                    "file_id": row.id,
                    "file_name": row.file_name,
                    "size_bytes": row.size_bytes,
                })),
            )
            .await;

        Ok(row)
    }

    pub async fn list_for_session(
        &self,
        session_id: intake_core::types::DbId,
    ) -> Result<Vec<FileUpload>, CoreError> {
        self.attachments.list_for_session(session_id).await
    }
}
