//! Test harness: the production router over in-memory ports.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use intake_api::config::ServerConfig;
use intake_api::router::build_app_router;
use intake_api::state::AppState;
use intake_api::subscribers;
use intake_engine::memory::{
    MemoryAttachmentStore, MemoryAuditStore, MemoryObjectStorage, MemoryResponseStore,
    MemorySessionStore, MemoryTemplateStore,
};
use intake_engine::{
    AllowAll, EngineConfig, FileGateway, ResponseService, SessionManager, TemplateRegistry,
};
use intake_events::EventBus;

pub const ORG: i64 = 1;

/// The app under test plus direct handles to its in-memory ports, for
/// seeding and assertions the HTTP surface does not expose.
pub struct TestApp {
    pub router: Router,
    pub sessions: Arc<MemorySessionStore>,
    pub storage: Arc<MemoryObjectStorage>,
    pub audit: Arc<MemoryAuditStore>,
}

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        upload_dir: "./uploads".to_string(),
        upload_base_url: "/uploads".to_string(),
        engine: EngineConfig::default(),
    }
}

/// Build the full production router backed by in-memory ports, with the
/// standard subscriber set registered. Mirrors `main.rs` exactly apart
/// from the port adapters.
pub fn build_test_app() -> TestApp {
    let config = test_config();

    let templates = Arc::new(MemoryTemplateStore::new());
    let sessions = Arc::new(MemorySessionStore::new());
    let responses = Arc::new(MemoryResponseStore::new());
    let attachments = Arc::new(MemoryAttachmentStore::new());
    let audit = Arc::new(MemoryAuditStore::new());
    let storage = Arc::new(MemoryObjectStorage::new());

    let bus = Arc::new(EventBus::new());
    subscribers::register_subscribers(&bus, audit.clone());

    let registry = TemplateRegistry::new(templates.clone());
    let manager = SessionManager::new(
        sessions.clone(),
        templates.clone(),
        responses.clone(),
        attachments.clone(),
        bus.clone(),
        config.engine.clone(),
    );
    let response_service = ResponseService::new(responses.clone(), bus.clone());
    let gateway = FileGateway::new(
        attachments.clone(),
        storage.clone(),
        bus.clone(),
        config.engine.max_upload_bytes,
    );

    let state = AppState {
        registry,
        manager,
        responses: response_service,
        gateway,
        audit: audit.clone(),
        authorizer: Arc::new(AllowAll),
        bus,
        pool: None,
        config: Arc::new(config.clone()),
    };

    TestApp {
        router: build_app_router(state, &config),
        sessions,
        storage,
        audit,
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn get(app: &TestApp, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.router.clone().oneshot(request).await.unwrap()
}

pub async fn put_json(app: &TestApp, uri: &str, body: serde_json::Value) -> Response<Body> {
    let request = Request::builder()
        .method(Method::PUT)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.router.clone().oneshot(request).await.unwrap()
}

/// Admin request with the trusted identity headers set.
pub async fn admin(
    app: &TestApp,
    method: Method,
    uri: &str,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("x-actor-id", "1")
        .header("x-organization-id", ORG.to_string())
        .header("content-type", "application/json");
    let request = match body {
        Some(json) => builder.body(Body::from(json.to_string())).unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.router.clone().oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Multipart
// ---------------------------------------------------------------------------

pub const BOUNDARY: &str = "intake-test-boundary-7MA4YWxkTrZu0gW";

/// Hand-built multipart body with a single `file` field.
pub fn multipart_file(file_name: &str, content_type: &str, bytes: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; \
             filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub async fn upload(app: &TestApp, token: &str, body: Vec<u8>) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(format!("/onboarding/{token}/upload"))
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();
    app.router.clone().oneshot(request).await.unwrap()
}

// ---------------------------------------------------------------------------
// Seeding through the admin API
// ---------------------------------------------------------------------------

pub fn steps_fixture() -> serde_json::Value {
    serde_json::json!([
        {
            "id": "basics",
            "title": "Basics",
            "fields": [
                { "id": "company", "label": "Company name", "type": "text", "required": true },
                { "id": "size", "label": "Team size", "type": "number", "required": false }
            ]
        },
        {
            "id": "goals",
            "title": "Goals",
            "fields": [
                { "id": "primary_goal", "label": "Primary goal", "type": "textarea", "required": true }
            ]
        }
    ])
}

/// Create a template and a session via the admin API; returns
/// (template_id, session_id, token).
pub async fn seed_session(app: &TestApp, service_type: &str) -> (i64, i64, String) {
    let response = admin(
        app,
        Method::POST,
        "/api/v1/admin/templates",
        Some(serde_json::json!({
            "name": format!("{service_type} intake"),
            "service_type": service_type,
            "steps": steps_fixture(),
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let template = body_json(response).await;
    let template_id = template["data"]["id"].as_i64().unwrap();

    let response = admin(
        app,
        Method::POST,
        "/api/v1/admin/sessions",
        Some(serde_json::json!({
            "client_id": 7,
            "service_type": service_type,
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    let session_id = created["data"]["session"]["id"].as_i64().unwrap();
    let token = created["data"]["token"].as_str().unwrap().to_string();

    (template_id, session_id, token)
}

/// Save both required fields and submit through the public API.
pub async fn complete_session(app: &TestApp, token: &str) {
    let response = put_json(
        app,
        &format!("/onboarding/{token}"),
        serde_json::json!({
            "step_id": "basics",
            "responses": [{ "field_id": "company", "value": "Acme" }],
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = put_json(
        app,
        &format!("/onboarding/{token}"),
        serde_json::json!({
            "step_id": "goals",
            "responses": [{ "field_id": "primary_goal", "value": "Launch" }],
            "submit": true,
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}
