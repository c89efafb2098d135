//! Public token-addressed wizard routes.
//!
//! No authentication: possession of the token is the capability. The
//! error mapping never reveals whether a token is unknown or malformed.

use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use intake_core::types::{DbId, Timestamp};
use intake_core::CoreError;
use intake_db::models::response::FieldAnswer;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Uploads are validated against the 10 MiB cap by the gateway; the body
/// limit only has to admit an oversized candidate plus multipart framing
/// so the cap produces a 400, not a transport error.
const UPLOAD_BODY_LIMIT: usize = 32 * 1024 * 1024;

/// Wizard payload for the client UI.
#[derive(Debug, Serialize)]
pub struct WizardView {
    pub template_name: String,
    pub service_type: String,
    pub status: &'static str,
    pub completion_percentage: i32,
    pub expires_at: Timestamp,
    pub steps: Value,
    /// Existing answers grouped by step: `{step_id: {field_id: value}}`.
    pub responses: Value,
}

/// GET /onboarding/{token} -- resolve the wizard for a client link.
async fn get_wizard(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> AppResult<Json<DataResponse<WizardView>>> {
    let resolved = state.manager.resolve_by_token(&token).await?;
    if resolved.expired {
        return Err(AppError::Core(CoreError::Expired));
    }

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

    Ok(Json(DataResponse {
        data: WizardView {
            template_name: resolved.template.name.clone(),
            service_type: resolved.template.service_type.clone(),
            status: resolved.status.as_str(),
            completion_percentage: resolved.session.completion_percentage,
            expires_at: resolved.session.expires_at,
            steps: resolved.template.steps.clone(),
            responses: Value::Object(grouped),
        },
    }))
}

/// PUT /onboarding/{token} request body: one step's answers, optionally
/// submitting the whole session.
#[derive(Debug, Deserialize)]
pub struct SaveStepRequest {
    pub step_id: String,
    pub responses: Vec<FieldAnswer>,
    #[serde(default)]
    pub submit: bool,
}

#[derive(Debug, Serialize)]
pub struct SaveStepResult {
    pub status: String,
    pub completion_percentage: i32,
}

/// PUT /onboarding/{token} -- autosave a step, recompute completion, and
/// optionally submit.
async fn save_step(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(body): Json<SaveStepRequest>,
) -> AppResult<Json<DataResponse<SaveStepResult>>> {
    let resolved = state.manager.resolve_by_token(&token).await?;
    state
        .responses
        .save_step_responses(&resolved, &body.step_id, &body.responses)
        .await?;

    // The first saved response starts the session; an empty autosave does
    // not.
    if !body.responses.is_empty() {
        state.manager.mark_started(&resolved).await?;
    }

    // Re-resolve so the status transition and the saved answers are visible
    // below.
    let resolved = state.manager.resolve_by_token(&token).await?;

    let session = if body.submit {
        state.manager.mark_complete(&resolved).await?
    } else {
        state.manager.recompute_completion(&resolved).await?
    };

    Ok(Json(DataResponse {
        data: SaveStepResult {
            status: session.status,
            completion_percentage: session.completion_percentage,
        },
    }))
}

#[derive(Debug, Serialize)]
pub struct UploadResult {
    pub id: DbId,
    pub url: String,
    pub file_name: String,
}

/// POST /onboarding/{token}/upload -- accept one multipart file field.
async fn upload_file(
    State(state): State<AppState>,
    Path(token): Path<String>,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<UploadResult>)> {
    let resolved = state.manager.resolve_by_token(&token).await?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| AppError::BadRequest("file field has no filename".into()))?;
        let mime_type = field
            .content_type()
            .map(str::to_string)
            .ok_or_else(|| AppError::BadRequest("file field has no content type".into()))?;
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;

        let row = state
            .gateway
            .accept(&resolved, &file_name, &mime_type, &bytes)
            .await?;

        return Ok((
            StatusCode::CREATED,
            Json(UploadResult {
                id: row.id,
                url: row.url,
                file_name: row.file_name,
            }),
        ));
    }

    Err(AppError::BadRequest("missing multipart field 'file'".into()))
}

/// Mount the public wizard routes (root-level, not under `/api/v1`).
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/onboarding/{token}", get(get_wizard).put(save_step))
        .route(
            "/onboarding/{token}/upload",
            post(upload_file).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
}
