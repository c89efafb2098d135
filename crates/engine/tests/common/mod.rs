//! Shared harness for the engine test suites: in-memory ports wired into
//! the real services.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use intake_core::CoreError;
use intake_db::models::session::CreateSessionRequest;
use intake_db::models::template::NewTemplate;
use intake_engine::memory::{
    MemoryAttachmentStore, MemoryObjectStorage, MemoryResponseStore, MemorySessionStore,
    MemoryTemplateStore,
};
use intake_engine::{
    EngineConfig, FileGateway, ResponseService, SessionManager, TemplateRegistry,
};
use intake_events::{DomainEvent, EventBus, EventHandler, EventName};

pub const ORG: i64 = 1;
pub const CLIENT: i64 = 7;

pub struct Harness {
    pub templates: Arc<MemoryTemplateStore>,
    pub sessions: Arc<MemorySessionStore>,
    pub response_store: Arc<MemoryResponseStore>,
    pub attachments: Arc<MemoryAttachmentStore>,
    pub storage: Arc<MemoryObjectStorage>,
    pub bus: Arc<EventBus>,
    pub registry: TemplateRegistry,
    pub manager: SessionManager,
    pub responses: ResponseService,
    pub gateway: FileGateway,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        let templates = Arc::new(MemoryTemplateStore::new());
        let sessions = Arc::new(MemorySessionStore::new());
        let response_store = Arc::new(MemoryResponseStore::new());
        let attachments = Arc::new(MemoryAttachmentStore::new());
        let storage = Arc::new(MemoryObjectStorage::new());
        let bus = Arc::new(EventBus::new());

        let registry = TemplateRegistry::new(templates.clone());
        let manager = SessionManager::new(
            sessions.clone(),
            templates.clone(),
            response_store.clone(),
            attachments.clone(),
            bus.clone(),
            config.clone(),
        );
        let responses = ResponseService::new(response_store.clone(), bus.clone());
        let gateway = FileGateway::new(
            attachments.clone(),
            storage.clone(),
            bus.clone(),
            config.max_upload_bytes,
        );

        Self {
            templates,
            sessions,
            response_store,
            attachments,
            storage,
            bus,
            registry,
            manager,
            responses,
            gateway,
        }
    }

    /// Create the standard two-step template for `service_type` and a
    /// session pinned to it, returning the session token.
    pub async fn seed_session(&self, service_type: &str) -> String {
        self.registry
            .create(template_fixture(service_type))
            .await
            .expect("create template");
        let session = self
            .manager
            .create_session(&CreateSessionRequest {
                organization_id: ORG,
                client_id: CLIENT,
                service_type: service_type.to_string(),
            })
            .await
            .expect("create session");
        session.token
    }
}

/// Two steps, three fields, two of them required.
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

pub fn template_fixture(service_type: &str) -> NewTemplate {
    NewTemplate {
        organization_id: ORG,
        name: format!("{service_type} intake"),
        service_type: service_type.to_string(),
        steps: steps_fixture(),
    }
}

/// Counts deliveries of one event name.
pub struct Counter {
    hits: AtomicUsize,
}

impl Counter {
    pub fn subscribed(bus: &EventBus, name: EventName) -> Arc<Self> {
        let counter = Arc::new(Self {
            hits: AtomicUsize::new(0),
        });
        bus.subscribe(name, counter.clone());
        counter
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl EventHandler for Counter {
    fn name(&self) -> &'static str {
        "test-counter"
    }

    async fn handle(&self, _event: &DomainEvent) -> Result<(), CoreError> {
        self.hits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
