//! Session lifecycle: creation, token resolution, status transitions,
//! completion tracking, risk scoring.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::warn;
use uuid::Uuid;

use intake_core::completion::{completion_percentage, missing_required, AnsweredField};
use intake_core::risk::{score, RiskInput, RiskScore};
use intake_core::session::{guard_writable, is_expired, SessionStatus};
use intake_core::template::{parse_steps, required_fields, required_file_fields, TemplateSteps};
use intake_core::types::DbId;
use intake_core::value::FieldValue;
use intake_core::CoreError;
use intake_db::models::response::Response;
use intake_db::models::session::{CreateSessionRequest, NewSession, Session};
use intake_db::models::template::Template;
use intake_events::{DomainEvent, EventBus, EventName};

use crate::config::EngineConfig;
use crate::store::{AttachmentStore, ResponseStore, SessionStore, TemplateStore};

/// A session resolved through its token or id, with its pinned template
/// already loaded and its status parsed.
#[derive(Debug, Clone)]
pub struct ResolvedSession {
    pub session: Session,
    pub template: Template,
    pub status: SessionStatus,
    /// True when the TTL has elapsed and the status does not override the
    /// clock (COMPLETED and APPROVED do). The stored status may lag; expiry
    /// is evaluated lazily.
    pub expired: bool,
}

impl ResolvedSession {
    /// Typed steps of the pinned template.
    pub fn steps(&self) -> Result<TemplateSteps, CoreError> {
        parse_steps(&self.template.steps)
    }

    /// Err unless the session accepts writes. Locked wins over expired.
    pub fn guard_writable(&self) -> Result<(), CoreError> {
        guard_writable(self.status, self.session.expires_at, Utc::now())
    }
}

/// Orchestrates the session state machine over the persistence ports and
/// emits lifecycle events after each committed change.
#[derive(Clone)]
pub struct SessionManager {
    sessions: Arc<dyn SessionStore>,
    templates: Arc<dyn TemplateStore>,
    responses: Arc<dyn ResponseStore>,
    attachments: Arc<dyn AttachmentStore>,
    bus: Arc<EventBus>,
    config: EngineConfig,
}

impl SessionManager {
    pub fn new(
        sessions: Arc<dyn SessionStore>,
        templates: Arc<dyn TemplateStore>,
        responses: Arc<dyn ResponseStore>,
        attachments: Arc<dyn AttachmentStore>,
        bus: Arc<EventBus>,
        config: EngineConfig,
    ) -> Self {
        Self {
            sessions,
            templates,
            responses,
            attachments,
            bus,
            config,
        }
    }

    // -----------------------------------------------------------------------
    // Creation and resolution
    // -----------------------------------------------------------------------

    /// Create a DRAFT session pinned to the currently active template for
    /// the requested service type, with a fresh token and TTL.
    pub async fn create_session(
        &self,
        req: &CreateSessionRequest,
    ) -> Result<Session, CoreError> {
        let template = self
            .templates
            .find_active(req.organization_id, &req.service_type)
            .await?
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "no active template for service type {}",
                    req.service_type
                ))
            })?;

        let session = self
            .sessions
            .create(&NewSession {
                organization_id: req.organization_id,
                client_id: req.client_id,
                template_id: template.id,
                token: Uuid::new_v4().to_string(),
                expires_at: Utc::now() + Duration::days(self.config.session_ttl_days),
            })
            .await?;

        self.bus
            .emit(DomainEvent::new(
                EventName::SessionCreated,
                session.id,
                session.organization_id,
            ))
            .await;

        Ok(session)
    }

    /// Resolve a session by its public token.
    ///
    /// Expiry is evaluated against the clock, not the stored status. When
    /// the clock says expired but the row still carries a live status, the
    /// EXPIRED flag is written back advisorily; a write-back failure is
    /// logged and ignored because the resolved view is already correct.
    pub async fn resolve_by_token(&self, token: &str) -> Result<ResolvedSession, CoreError> {
        let session = self
            .sessions
            .find_by_token(token)
            .await?
            .ok_or(CoreError::InvalidToken)?;
        self.resolve(session).await
    }

    /// Resolve a session by id within an organization (admin surface).
    pub async fn resolve_by_id(
        &self,
        id: DbId,
        organization_id: DbId,
    ) -> Result<ResolvedSession, CoreError> {
        let session = self
            .sessions
            .find_by_id(id, organization_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "session",
                id,
            })?;
        self.resolve(session).await
    }

    async fn resolve(&self, mut session: Session) -> Result<ResolvedSession, CoreError> {
        let status = SessionStatus::from_str_db(&session.status)?;
        // Locked statuses froze the session before the clock ran out; they
        // keep their stored status and never read as expired.
        let expired = !status.is_locked() && is_expired(status, session.expires_at, Utc::now());

        if expired && status != SessionStatus::Expired {
            match self
                .sessions
                .update_status(session.id, SessionStatus::Expired.as_str())
                .await
            {
                Ok(Some(updated)) => session = updated,
                Ok(None) => {}
                Err(e) => {
                    warn!(session_id = session.id, error = %e, "expiry write-back failed");
                }
            }
        }

        let template = self
            .templates
            .find_by_id(session.template_id, session.organization_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "template",
                id: session.template_id,
            })?;

        let status = if expired { SessionStatus::Expired } else { status };
        Ok(ResolvedSession {
            session,
            template,
            status,
            expired,
        })
    }

    pub async fn list(&self, organization_id: DbId) -> Result<Vec<Session>, CoreError> {
        self.sessions.list(organization_id).await
    }

    pub async fn responses_for(&self, session_id: DbId) -> Result<Vec<Response>, CoreError> {
        self.responses.list_for_session(session_id).await
    }

    // -----------------------------------------------------------------------
    // Transitions
    // -----------------------------------------------------------------------

    /// DRAFT to IN_PROGRESS on first client activity. A no-op for a
    /// session already in progress.
    pub async fn mark_started(&self, resolved: &ResolvedSession) -> Result<Session, CoreError> {
        resolved.guard_writable()?;
        if resolved.status == SessionStatus::InProgress {
            return Ok(resolved.session.clone());
        }
        resolved
            .status
            .validate_transition(SessionStatus::InProgress)?;

        let session = self
            .sessions
            .update_status(resolved.session.id, SessionStatus::InProgress.as_str())
            .await?
            .ok_or(CoreError::NotFound {
                entity: "session",
                id: resolved.session.id,
            })?;

        self.bus
            .emit(DomainEvent::new(
                EventName::SessionStarted,
                session.id,
                session.organization_id,
            ))
            .await;

        Ok(session)
    }

    /// Recompute the derived completion percentage from stored responses
    /// and persist it.
    pub async fn recompute_completion(
        &self,
        resolved: &ResolvedSession,
    ) -> Result<Session, CoreError> {
        let steps = resolved.steps()?;
        let answers = self.answered_fields(resolved.session.id).await?;
        let pct = completion_percentage(&steps, &answers);

        self.sessions
            .update_completion(resolved.session.id, i32::from(pct))
            .await?
            .ok_or(CoreError::NotFound {
                entity: "session",
                id: resolved.session.id,
            })
    }

    /// IN_PROGRESS to COMPLETED. Requires every required field answered;
    /// a premature submit is a validation error naming the gaps.
    pub async fn mark_complete(&self, resolved: &ResolvedSession) -> Result<Session, CoreError> {
        resolved.guard_writable()?;
        resolved
            .status
            .validate_transition(SessionStatus::Completed)?;

        let steps = resolved.steps()?;
        let answers = self.answered_fields(resolved.session.id).await?;
        let missing = missing_required(&steps, &answers);
        if !missing.is_empty() {
            let names: Vec<String> = missing
                .iter()
                .map(|(step, field)| format!("{step}.{field}"))
                .collect();
            return Err(CoreError::Validation(format!(
                "required fields not answered: {}",
                names.join(", ")
            )));
        }

        self.sessions
            .update_completion(resolved.session.id, 100)
            .await?;
        let session = self
            .sessions
            .update_status(resolved.session.id, SessionStatus::Completed.as_str())
            .await?
            .ok_or(CoreError::NotFound {
                entity: "session",
                id: resolved.session.id,
            })?;

        self.bus
            .emit(DomainEvent::new(
                EventName::SessionCompleted,
                session.id,
                session.organization_id,
            ))
            .await;

        Ok(session)
    }

    /// COMPLETED to APPROVED (admin). An approved session never reports
    /// expired, regardless of the clock.
    pub async fn approve(&self, id: DbId, organization_id: DbId) -> Result<Session, CoreError> {
        let resolved = self.resolve_by_id(id, organization_id).await?;
        resolved
            .status
            .validate_transition(SessionStatus::Approved)?;

        let session = self
            .sessions
            .update_status(id, SessionStatus::Approved.as_str())
            .await?
            .ok_or(CoreError::NotFound {
                entity: "session",
                id,
            })?;

        self.bus
            .emit(DomainEvent::new(
                EventName::SessionApproved,
                session.id,
                session.organization_id,
            ))
            .await;

        Ok(session)
    }

    /// Admin reopen: COMPLETED or EXPIRED back to IN_PROGRESS with a
    /// fresh TTL, so the client link works again.
    pub async fn reopen(&self, id: DbId, organization_id: DbId) -> Result<Session, CoreError> {
        let resolved = self.resolve_by_id(id, organization_id).await?;
        resolved
            .status
            .validate_transition(SessionStatus::InProgress)?;

        self.sessions
            .update_status_and_expiry(
                id,
                SessionStatus::InProgress.as_str(),
                Utc::now() + Duration::days(self.config.session_ttl_days),
            )
            .await?
            .ok_or(CoreError::NotFound {
                entity: "session",
                id,
            })
    }

    // -----------------------------------------------------------------------
    // Risk
    // -----------------------------------------------------------------------

    /// Assemble the scorer's input from the session, its pinned template,
    /// and its stored responses and attachments.
    pub async fn score_risk(&self, resolved: &ResolvedSession) -> Result<RiskScore, CoreError> {
        let steps = resolved.steps()?;
        let answers = self.answered_fields(resolved.session.id).await?;
        let required = required_fields(&steps);
        let missing = missing_required(&steps, &answers);
        let uploads = self
            .attachments
            .count_for_session(resolved.session.id)
            .await?;

        let input = RiskInput {
            service_type: &resolved.template.service_type,
            created_at: resolved.session.created_at,
            now: Utc::now(),
            completion_percentage: completion_percentage(&steps, &answers),
            required_fields_total: required.len(),
            required_fields_missing: missing.len(),
            required_file_fields: required_file_fields(&steps),
            uploaded_file_count: uploads.max(0) as usize,
        };
        Ok(score(&input, &self.config.risk_weights))
    }

    /// Stored responses as typed answers. Rows whose value no longer
    /// parses are skipped rather than failing the whole read.
    async fn answered_fields(&self, session_id: DbId) -> Result<Vec<AnsweredField>, CoreError> {
        let rows = self.responses.list_for_session(session_id).await?;
        Ok(rows
            .into_iter()
            .filter_map(|row| {
                let raw = row.value?;
                let value = FieldValue::from_json(&raw).ok()?;
                Some(AnsweredField {
                    step_id: row.step_id,
                    field_id: row.field_id,
                    value,
                })
            })
            .collect())
    }
}
