//! Admin template management: CRUD plus versioning.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;

use intake_core::types::DbId;
use intake_db::models::template::{NewTemplate, Template, UpdateTemplate};
use intake_engine::Permission;

use crate::error::AppResult;
use crate::middleware::AdminActor;
use crate::response::DataResponse;
use crate::state::AppState;

/// Create body; the organization comes from the actor, not the payload.
#[derive(Debug, Deserialize)]
pub struct CreateTemplateRequest {
    pub name: String,
    pub service_type: String,
    pub steps: serde_json::Value,
}

/// POST /templates -- create a version-1 active template.
async fn create_template(
    State(state): State<AppState>,
    actor: AdminActor,
    Json(body): Json<CreateTemplateRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Template>>)> {
    actor.require(&state, Permission::ManageTemplates).await?;
    let template = state
        .registry
        .create(NewTemplate {
            organization_id: actor.organization_id(),
            name: body.name,
            service_type: body.service_type,
            steps: body.steps,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: template })))
}

/// GET /templates -- all templates for the organization, every version.
async fn list_templates(
    State(state): State<AppState>,
    actor: AdminActor,
) -> AppResult<Json<DataResponse<Vec<Template>>>> {
    actor.require(&state, Permission::ManageTemplates).await?;
    let templates = state.registry.list(actor.organization_id()).await?;
    Ok(Json(DataResponse { data: templates }))
}

/// GET /templates/{id}
async fn get_template(
    State(state): State<AppState>,
    actor: AdminActor,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Template>>> {
    actor.require(&state, Permission::ManageTemplates).await?;
    let template = state.registry.get(id, actor.organization_id()).await?;
    Ok(Json(DataResponse { data: template }))
}

/// PUT /templates/{id} -- live in-place edit, version unchanged.
async fn update_template(
    State(state): State<AppState>,
    actor: AdminActor,
    Path(id): Path<DbId>,
    Json(body): Json<UpdateTemplate>,
) -> AppResult<Json<DataResponse<Template>>> {
    actor.require(&state, Permission::ManageTemplates).await?;
    let template = state
        .registry
        .update(id, actor.organization_id(), body)
        .await?;
    Ok(Json(DataResponse { data: template }))
}

/// POST /templates/{id}/version -- publish the next version.
async fn version_template(
    State(state): State<AppState>,
    actor: AdminActor,
    Path(id): Path<DbId>,
) -> AppResult<(StatusCode, Json<DataResponse<Template>>)> {
    actor.require(&state, Permission::ManageTemplates).await?;
    let template = state
        .registry
        .publish_version(id, actor.organization_id())
        .await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: template })))
}

/// DELETE /templates/{id}
async fn delete_template(
    State(state): State<AppState>,
    actor: AdminActor,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    actor.require(&state, Permission::ManageTemplates).await?;
    state.registry.delete(id, actor.organization_id()).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/templates", post(create_template).get(list_templates))
        .route(
            "/templates/{id}",
            get(get_template)
                .put(update_template)
                .delete(delete_template),
        )
        .route("/templates/{id}/version", post(version_template))
}
