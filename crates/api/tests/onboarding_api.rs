//! Public wizard surface: resolution, autosave, submit, uploads.

mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};

use intake_engine::store::{AuditStore, SessionStore};

use common::{
    body_json, complete_session, get, multipart_file, put_json, seed_session, upload, ORG,
};

#[tokio::test]
async fn wizard_resolves_with_steps_and_status() {
    let app = common::build_test_app();
    let (_, _, token) = seed_session(&app, "web-development").await;

    let response = get(&app, &format!("/onboarding/{token}")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "DRAFT");
    assert_eq!(json["data"]["completion_percentage"], 0);
    assert_eq!(json["data"]["steps"][0]["id"], "basics");
    assert_eq!(json["data"]["template_name"], "web-development intake");
}

#[tokio::test]
async fn unknown_token_returns_404_with_opaque_error() {
    let app = common::build_test_app();
    seed_session(&app, "web-development").await;

    let response = get(&app, "/onboarding/not-a-real-token").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = body_json(response).await;
    assert_eq!(json["error"], "Invalid onboarding link");
    assert_eq!(json["code"], "INVALID_TOKEN");
}

#[tokio::test]
async fn saving_a_step_starts_the_session_and_tracks_completion() {
    let app = common::build_test_app();
    let (_, _, token) = seed_session(&app, "web-development").await;

    let response = put_json(
        &app,
        &format!("/onboarding/{token}"),
        serde_json::json!({
            "step_id": "basics",
            "responses": [{ "field_id": "company", "value": "Acme" }],
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "IN_PROGRESS");
    assert_eq!(json["data"]["completion_percentage"], 50);

    // Saved answers come back on the next resolution.
    let response = get(&app, &format!("/onboarding/{token}")).await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["responses"]["basics"]["company"], "Acme");
}

#[tokio::test]
async fn empty_autosave_does_not_start_the_session() {
    let app = common::build_test_app();
    let (_, _, token) = seed_session(&app, "web-development").await;

    let response = put_json(
        &app,
        &format!("/onboarding/{token}"),
        serde_json::json!({ "step_id": "basics", "responses": [] }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "DRAFT");

    let entries = app.audit.list_for_organization(ORG, 100).await.unwrap();
    assert!(entries.iter().all(|e| e.action != "session:started"));
}

#[tokio::test]
async fn premature_submit_is_rejected_with_validation_error() {
    let app = common::build_test_app();
    let (_, _, token) = seed_session(&app, "web-development").await;

    let response = put_json(
        &app,
        &format!("/onboarding/{token}"),
        serde_json::json!({
            "step_id": "basics",
            "responses": [{ "field_id": "company", "value": "Acme" }],
            "submit": true,
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");

    // The session stays writable.
    let response = get(&app, &format!("/onboarding/{token}")).await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "IN_PROGRESS");
}

#[tokio::test]
async fn full_lifecycle_ends_completed() {
    let app = common::build_test_app();
    let (_, _, token) = seed_session(&app, "web-development").await;

    complete_session(&app, &token).await;

    let response = get(&app, &format!("/onboarding/{token}")).await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "COMPLETED");
    assert_eq!(json["data"]["completion_percentage"], 100);

    // Completed means locked for writes.
    let response = put_json(
        &app,
        &format!("/onboarding/{token}"),
        serde_json::json!({
            "step_id": "basics",
            "responses": [{ "field_id": "company", "value": "Changed" }],
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Session is locked");
}

#[tokio::test]
async fn expired_link_returns_410() {
    let app = common::build_test_app();
    let (_, session_id, token) = seed_session(&app, "web-development").await;

    app.sessions
        .update_status_and_expiry(session_id, "IN_PROGRESS", Utc::now() - Duration::hours(1))
        .await
        .unwrap();

    let response = get(&app, &format!("/onboarding/{token}")).await;
    assert_eq!(response.status(), StatusCode::GONE);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Link expired");
}

// ---------------------------------------------------------------------------
// Uploads
// ---------------------------------------------------------------------------

#[tokio::test]
async fn upload_happy_path_returns_201() {
    let app = common::build_test_app();
    let (_, _, token) = seed_session(&app, "web-development").await;

    let body = multipart_file("brief.pdf", "application/pdf", b"%PDF-1.4 brief");
    let response = upload(&app, &token, body).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    // The upload body is the bare attachment record, not a data envelope.
    let json = body_json(response).await;
    assert_eq!(json["file_name"], "brief.pdf");
    assert!(json["url"].as_str().unwrap().starts_with("memory://"));
    assert!(json["id"].is_i64());
    assert!(json.get("data").is_none());
    assert_eq!(app.storage.object_count(), 1);
}

#[tokio::test]
async fn upload_to_unknown_token_returns_404() {
    let app = common::build_test_app();
    seed_session(&app, "web-development").await;

    let body = multipart_file("brief.pdf", "application/pdf", b"%PDF-1.4");
    let response = upload(&app, "nope", body).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(app.storage.put_calls(), 0);
}

#[tokio::test]
async fn upload_to_expired_session_returns_410() {
    let app = common::build_test_app();
    let (_, session_id, token) = seed_session(&app, "web-development").await;
    app.sessions
        .update_status_and_expiry(session_id, "IN_PROGRESS", Utc::now() - Duration::hours(1))
        .await
        .unwrap();

    let body = multipart_file("brief.pdf", "application/pdf", b"%PDF-1.4");
    let response = upload(&app, &token, body).await;
    assert_eq!(response.status(), StatusCode::GONE);
    assert_eq!(app.storage.put_calls(), 0);
}

#[tokio::test]
async fn upload_to_locked_session_returns_403() {
    let app = common::build_test_app();
    let (_, _, token) = seed_session(&app, "web-development").await;
    complete_session(&app, &token).await;

    let body = multipart_file("brief.pdf", "application/pdf", b"%PDF-1.4");
    let response = upload(&app, &token, body).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(app.storage.put_calls(), 0);
}

#[tokio::test]
async fn upload_with_disallowed_mime_returns_400() {
    let app = common::build_test_app();
    let (_, _, token) = seed_session(&app, "web-development").await;

    let body = multipart_file("setup.exe", "application/x-msdownload", b"MZ");
    let response = upload(&app, &token, body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(app.storage.put_calls(), 0);
}

#[tokio::test]
async fn oversized_upload_returns_400_without_touching_storage() {
    let app = common::build_test_app();
    let (_, _, token) = seed_session(&app, "web-development").await;

    let body = multipart_file("huge.pdf", "application/pdf", &vec![0u8; 12 * 1024 * 1024]);
    let response = upload(&app, &token, body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(app.storage.put_calls(), 0);
}

#[tokio::test]
async fn upload_without_file_field_returns_400() {
    let app = common::build_test_app();
    let (_, _, token) = seed_session(&app, "web-development").await;

    let body = format!("--{}--\r\n", common::BOUNDARY).into_bytes();
    let response = upload(&app, &token, body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
