//! Event-bus subscribers wired at startup.
//!
//! Audit rows are written only here, never inline by the mutating
//! operation; a subscriber failure is absorbed by the bus and never
//! surfaces to the request that emitted the event.

use std::sync::Arc;

use intake_core::CoreError;
use intake_db::models::audit::NewAuditLog;
use intake_engine::store::AuditStore;
use intake_events::{DomainEvent, EventBus, EventHandler, EventName};

/// Writes one audit row per lifecycle event.
pub struct AuditWriter {
    audit: Arc<dyn AuditStore>,
}

impl AuditWriter {
    pub fn new(audit: Arc<dyn AuditStore>) -> Self {
        Self { audit }
    }

    fn action(name: EventName) -> &'static str {
        match name {
            EventName::SessionCreated => "session:created",
            EventName::SessionStarted => "session:started",
            EventName::SessionCompleted => "session:completed",
            EventName::SessionApproved => "session:approved",
            EventName::ResponseSaved => "response:saved",
            EventName::FileUploaded => "file:uploaded",
        }
    }
}

#[async_trait::async_trait]
impl EventHandler for AuditWriter {
    fn name(&self) -> &'static str {
        "audit-writer"
    }

    async fn handle(&self, event: &DomainEvent) -> Result<(), CoreError> {
        let details = if event.payload.as_object().is_some_and(|o| o.is_empty()) {
            None
        } else {
            Some(event.payload.to_string())
        };
        self.audit
            .create(&NewAuditLog {
                organization_id: event.organization_id,
                action: Self::action(event.name).to_string(),
                entity: "onboarding_session".to_string(),
                entity_id: event.session_id.to_string(),
                details,
            })
            .await?;
        Ok(())
    }
}

/// Logs completions for the downstream kickoff automation, which consumes
/// them out of process.
pub struct KickoffNotifier;

#[async_trait::async_trait]
impl EventHandler for KickoffNotifier {
    fn name(&self) -> &'static str {
        "kickoff-notifier"
    }

    async fn handle(&self, event: &DomainEvent) -> Result<(), CoreError> {
        tracing::info!(
            session_id = event.session_id,
            organization_id = event.organization_id,
            "Onboarding completed, ready for project kickoff"
        );
        Ok(())
    }
}

/// Register the standard subscriber set. Registration order is delivery
/// order.
pub fn register_subscribers(bus: &EventBus, audit: Arc<dyn AuditStore>) {
    let writer = Arc::new(AuditWriter::new(audit));
    for name in [
        EventName::SessionCreated,
        EventName::SessionStarted,
        EventName::SessionCompleted,
        EventName::SessionApproved,
        EventName::ResponseSaved,
        EventName::FileUploaded,
    ] {
        bus.subscribe(name, writer.clone());
    }
    bus.subscribe(EventName::SessionCompleted, Arc::new(KickoffNotifier));
}
