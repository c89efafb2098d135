//! Admin read access to the audit trail.

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use intake_db::models::audit::AuditLog;
use intake_engine::store::AuditStore;
use intake_engine::Permission;

use crate::error::AppResult;
use crate::middleware::AdminActor;
use crate::response::DataResponse;
use crate::state::AppState;

const DEFAULT_LIMIT: i64 = 100;

#[derive(Debug, Deserialize)]
pub struct AuditQuery {
    pub limit: Option<i64>,
}

/// GET /audit -- newest entries first, capped by `limit`.
async fn list_audit(
    State(state): State<AppState>,
    actor: AdminActor,
    Query(query): Query<AuditQuery>,
) -> AppResult<Json<DataResponse<Vec<AuditLog>>>> {
    actor.require(&state, Permission::ViewAuditLog).await?;
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, 1000);
    let entries = state
        .audit
        .list_for_organization(actor.organization_id(), limit)
        .await?;
    Ok(Json(DataResponse { data: entries }))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/audit", get(list_audit))
}
