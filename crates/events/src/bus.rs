//! Event bus: typed names, envelope, and dispatch.
//!
//! Publishers call [`EventBus::emit`] only after their state-changing write
//! has committed. Delivery is synchronous per subscriber in registration
//! order; a handler failure is logged and absorbed. It never reaches the
//! publisher and never rolls back the committed change that triggered it.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use intake_core::types::DbId;
use intake_core::CoreError;

// ---------------------------------------------------------------------------
// EventName
// ---------------------------------------------------------------------------

/// Lifecycle events published by the session manager and file gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventName {
    SessionCreated,
    SessionStarted,
    SessionCompleted,
    SessionApproved,
    ResponseSaved,
    FileUploaded,
}

impl EventName {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SessionCreated => "SESSION_CREATED",
            Self::SessionStarted => "SESSION_STARTED",
            Self::SessionCompleted => "SESSION_COMPLETED",
            Self::SessionApproved => "SESSION_APPROVED",
            Self::ResponseSaved => "RESPONSE_SAVED",
            Self::FileUploaded => "FILE_UPLOADED",
        }
    }
}

// ---------------------------------------------------------------------------
// DomainEvent
// ---------------------------------------------------------------------------

/// A lifecycle event. Every event names the session and organization it
/// belongs to; event-specific fields ride in the JSON payload.
#[derive(Debug, Clone, Serialize)]
pub struct DomainEvent {
    pub name: EventName,
    pub session_id: DbId,
    pub organization_id: DbId,
    /// Event-specific fields (e.g. `file_id`, `step_id`).
    pub payload: serde_json::Value,
    /// When the event was created (UTC).
    pub timestamp: DateTime<Utc>,
}

impl DomainEvent {
    /// Create an event with an empty payload.
    pub fn new(name: EventName, session_id: DbId, organization_id: DbId) -> Self {
        Self {
            name,
            session_id,
            organization_id,
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    /// Set the event-specific payload.
    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

// ---------------------------------------------------------------------------
// EventHandler
// ---------------------------------------------------------------------------

/// A subscriber. Handlers are registered at startup and invoked for every
/// emit of the event name they subscribed to, at most once per emit.
#[async_trait::async_trait]
pub trait EventHandler: Send + Sync {
    /// Name used in dispatch-failure logs.
    fn name(&self) -> &'static str;

    async fn handle(&self, event: &DomainEvent) -> Result<(), CoreError>;
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// In-process publish/subscribe hub.
///
/// An explicit instance owned by the composition root and passed by
/// reference to publishers; there is no process-wide default.
#[derive(Default)]
pub struct EventBus {
    handlers: RwLock<HashMap<EventName, Vec<Arc<dyn EventHandler>>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for an event name. Registration order is the
    /// delivery order within that name.
    pub fn subscribe(&self, name: EventName, handler: Arc<dyn EventHandler>) {
        self.handlers
            .write()
            .expect("event handler registry poisoned")
            .entry(name)
            .or_default()
            .push(handler);
    }

    /// Deliver `event` to each registered subscriber, in registration
    /// order. Handler failures are logged and absorbed. Returns the number
    /// of handlers that received the event.
    pub async fn emit(&self, event: DomainEvent) -> usize {
        // Snapshot under the lock, dispatch outside it.
        let snapshot: Vec<Arc<dyn EventHandler>> = self
            .handlers
            .read()
            .expect("event handler registry poisoned")
            .get(&event.name)
            .cloned()
            .unwrap_or_default();

        for handler in &snapshot {
            if let Err(e) = handler.handle(&event).await {
                tracing::error!(
                    event = event.name.as_str(),
                    handler = handler.name(),
                    session_id = event.session_id,
                    error = %e,
                    "Event handler failed"
                );
            }
        }

        snapshot.len()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
