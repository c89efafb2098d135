//! File gateway behavior: validation ordering, storage, metadata.

mod common;

use std::sync::Arc;

use assert_matches::assert_matches;

use intake_core::CoreError;
use intake_db::models::file_upload::{FileUpload, NewFileUpload};
use intake_engine::store::AttachmentStore;
use intake_engine::FileGateway;
use intake_events::EventName;

use common::{Counter, Harness};

#[tokio::test]
async fn accepted_upload_stores_bytes_then_records_metadata() {
    let h = Harness::new();
    let uploaded = Counter::subscribed(&h.bus, EventName::FileUploaded);
    let token = h.seed_session("web-development").await;
    let resolved = h.manager.resolve_by_token(&token).await.unwrap();

    let row = h
        .gateway
        .accept(&resolved, "brief.pdf", "application/pdf", b"%PDF-1.4 brief")
        .await
        .unwrap();

    assert_eq!(row.file_name, "brief.pdf");
    assert_eq!(row.file_type, "application/pdf");
    assert_eq!(row.size_bytes, 14);
    assert!(row.url.starts_with("memory://"));
    assert_eq!(h.storage.object_count(), 1);
    assert_eq!(uploaded.hits(), 1);

    let count = h
        .attachments
        .count_for_session(resolved.session.id)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn disallowed_mime_never_reaches_storage() {
    let h = Harness::new();
    let token = h.seed_session("web-development").await;
    let resolved = h.manager.resolve_by_token(&token).await.unwrap();

    let err = h
        .gateway
        .accept(&resolved, "setup.exe", "application/x-msdownload", b"MZ")
        .await
        .unwrap_err();
    assert_matches!(err, CoreError::Validation(_));
    assert_eq!(h.storage.put_calls(), 0);
    assert!(h
        .gateway
        .list_for_session(resolved.session.id)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn oversized_upload_never_reaches_storage() {
    let h = Harness::new();
    let token = h.seed_session("web-development").await;
    let resolved = h.manager.resolve_by_token(&token).await.unwrap();

    let body = vec![0u8; 12 * 1024 * 1024];
    let err = h
        .gateway
        .accept(&resolved, "huge.pdf", "application/pdf", &body)
        .await
        .unwrap_err();
    assert_matches!(err, CoreError::Validation(_));
    assert_eq!(h.storage.put_calls(), 0);
}

#[tokio::test]
async fn upload_at_exactly_the_cap_is_accepted() {
    let h = Harness::new();
    let token = h.seed_session("web-development").await;
    let resolved = h.manager.resolve_by_token(&token).await.unwrap();

    let body = vec![0u8; 10 * 1024 * 1024];
    h.gateway
        .accept(&resolved, "limit.pdf", "application/pdf", &body)
        .await
        .unwrap();
    assert_eq!(h.storage.object_count(), 1);
}

/// Metadata store that always fails, for exercising the orphaned-object
/// path.
struct BrokenAttachmentStore;

#[async_trait::async_trait]
impl AttachmentStore for BrokenAttachmentStore {
    async fn create(&self, _input: &NewFileUpload) -> Result<FileUpload, CoreError> {
        Err(CoreError::Internal("metadata write refused".into()))
    }

    async fn list_for_session(&self, _session_id: i64) -> Result<Vec<FileUpload>, CoreError> {
        Ok(Vec::new())
    }

    async fn count_for_session(&self, _session_id: i64) -> Result<i64, CoreError> {
        Ok(0)
    }
}

#[tokio::test]
async fn metadata_failure_after_storage_write_is_surfaced() {
    let h = Harness::new();
    let token = h.seed_session("web-development").await;
    let resolved = h.manager.resolve_by_token(&token).await.unwrap();

    let gateway = FileGateway::new(
        Arc::new(BrokenAttachmentStore),
        h.storage.clone(),
        h.bus.clone(),
        10 * 1024 * 1024,
    );
    let err = gateway
        .accept(&resolved, "brief.pdf", "application/pdf", b"%PDF-1.4")
        .await
        .unwrap_err();

    // The stored object is orphaned; the error names it.
    assert_matches!(err, CoreError::MetadataInconsistency { ref url, .. } if url.starts_with("memory://"));
    assert_eq!(h.storage.object_count(), 1);
}
