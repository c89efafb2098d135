//! Field-level response autosave.

use std::sync::Arc;

use chrono::Utc;

use intake_core::template::find_field;
use intake_core::value::{validate_value, FieldValue};
use intake_core::CoreError;
use intake_db::models::response::{FieldAnswer, Response};
use intake_events::{DomainEvent, EventBus, EventName};

use crate::session::ResolvedSession;
use crate::store::ResponseStore;

/// Saves per-field answers against a writable session. Every answer is
/// validated against the session's pinned template before it is stored.
#[derive(Clone)]
pub struct ResponseService {
    responses: Arc<dyn ResponseStore>,
    bus: Arc<EventBus>,
}

impl ResponseService {
    pub fn new(responses: Arc<dyn ResponseStore>, bus: Arc<EventBus>) -> Self {
        Self { responses, bus }
    }

    /// Upsert one answer. Last committed write wins; saving the same
    /// field again replaces the value, never duplicates the row.
    pub async fn save_response(
        &self,
        resolved: &ResolvedSession,
        step_id: &str,
        answer: &FieldAnswer,
    ) -> Result<Response, CoreError> {
        resolved.guard_writable()?;

        let steps = resolved.steps()?;
        let field = find_field(&steps, step_id, &answer.field_id).ok_or_else(|| {
            CoreError::Validation(format!(
                "unknown field {}.{}",
                step_id, answer.field_id
            ))
        })?;

        let value = FieldValue::from_json(&answer.value)?;
        validate_value(field, &value)?;

        let row = self
            .responses
            .upsert(resolved.session.id, step_id, &answer.field_id, &answer.value)
            .await?;

        self.bus
            .emit(
                DomainEvent::new(
                    EventName::ResponseSaved,
                    resolved.session.id,
                    resolved.session.organization_id,
                )
                .with_payload(serde_json::json!({
                    "step_id": step_id,
                    "field_id": answer.field_id,
                    "saved_at": Utc::now(),
                })),
            )
            .await;

        Ok(row)
    }

    /// Apply a whole step's answers in order. Answers are independent
    /// upserts: a failure partway through leaves the earlier writes
    /// committed and reports the first error.
    pub async fn save_step_responses(
        &self,
        resolved: &ResolvedSession,
        step_id: &str,
        answers: &[FieldAnswer],
    ) -> Result<Vec<Response>, CoreError> {
        let mut rows = Vec::with_capacity(answers.len());
        for answer in answers {
            rows.push(self.save_response(resolved, step_id, answer).await?);
        }
        Ok(rows)
    }
}
