//! Admin session management: creation, review, approval, reopening.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use intake_core::risk::RiskScore;
use intake_core::types::DbId;
use intake_db::models::file_upload::FileUpload;
use intake_db::models::session::{CreateSessionRequest, Session};
use intake_engine::Permission;

use crate::error::AppResult;
use crate::middleware::AdminActor;
use crate::response::DataResponse;
use crate::state::AppState;

/// Create body; the organization comes from the actor.
#[derive(Debug, Deserialize)]
pub struct StartSessionRequest {
    pub client_id: DbId,
    pub service_type: String,
}

/// The one place the raw token crosses the admin surface: the operator
/// needs it to hand the link to the client.
#[derive(Debug, Serialize)]
pub struct CreatedSession {
    pub token: String,
    pub session: Session,
}

/// POST /sessions -- start onboarding for a client against the active
/// template for the service type.
async fn create_session(
    State(state): State<AppState>,
    actor: AdminActor,
    Json(body): Json<StartSessionRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<CreatedSession>>)> {
    actor.require(&state, Permission::ManageSessions).await?;
    let session = state
        .manager
        .create_session(&CreateSessionRequest {
            organization_id: actor.organization_id(),
            client_id: body.client_id,
            service_type: body.service_type,
        })
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: CreatedSession {
                token: session.token.clone(),
                session,
            },
        }),
    ))
}

/// GET /sessions -- all sessions for the organization, newest first.
async fn list_sessions(
    State(state): State<AppState>,
    actor: AdminActor,
) -> AppResult<Json<DataResponse<Vec<Session>>>> {
    actor.require(&state, Permission::ViewSessions).await?;
    let sessions = state.manager.list(actor.organization_id()).await?;
    Ok(Json(DataResponse { data: sessions }))
}

/// Review payload: the session with its answers grouped by step, its
/// attachments, and a freshly computed risk score.
#[derive(Debug, Serialize)]
pub struct SessionDetail {
    pub session: Session,
    pub status: &'static str,
    pub template_name: String,
    pub template_version: i32,
    pub responses: Value,
    pub attachments: Vec<FileUpload>,
    pub risk: RiskScore,
}

/// GET /sessions/{id}
async fn get_session(
    State(state): State<AppState>,
    actor: AdminActor,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<SessionDetail>>> {
    actor.require(&state, Permission::ViewSessions).await?;
    let resolved = state
        .manager
        .resolve_by_id(id, actor.organization_id())
        .await?;

    let rows = state.manager.responses_for(resolved.session.id).await?;
    let mut grouped: Map<String, Value> = Map::new();
    for row in rows {
        let step = grouped
            .entry(row.step_id)
            .or_insert_with(|| Value::Object(Map::new()));
        if let (Value::Object(fields), Some(value)) = (step, row.value) {
            fields.insert(row.field_id, value);
        }
    }

    let attachments = state.gateway.list_for_session(resolved.session.id).await?;
    let risk = state.manager.score_risk(&resolved).await?;

    Ok(Json(DataResponse {
        data: SessionDetail {
            status: resolved.status.as_str(),
            template_name: resolved.template.name.clone(),
            template_version: resolved.template.version,
            responses: Value::Object(grouped),
            attachments,
            risk,
            session: resolved.session,
        },
    }))
}

/// POST /sessions/{id}/approve -- COMPLETED to APPROVED.
async fn approve_session(
    State(state): State<AppState>,
    actor: AdminActor,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Session>>> {
    actor.require(&state, Permission::ManageSessions).await?;
    let session = state.manager.approve(id, actor.organization_id()).await?;
    Ok(Json(DataResponse { data: session }))
}

/// POST /sessions/{id}/reopen -- back to IN_PROGRESS with a fresh window.
async fn reopen_session(
    State(state): State<AppState>,
    actor: AdminActor,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Session>>> {
    actor.require(&state, Permission::ManageSessions).await?;
    let session = state.manager.reopen(id, actor.organization_id()).await?;
    Ok(Json(DataResponse { data: session }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/sessions", post(create_session).get(list_sessions))
        .route("/sessions/{id}", get(get_session))
        .route("/sessions/{id}/approve", post(approve_session))
        .route("/sessions/{id}/reopen", post(reopen_session))
}
