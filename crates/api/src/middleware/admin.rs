//! Admin actor extraction.
//!
//! Authentication terminates upstream (gateway or reverse proxy); the
//! authenticated principal arrives as trusted headers. Permission checks
//! still go through the injected [`Authorizer`] per request, so the core
//! never encodes permission logic.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use intake_core::CoreError;
use intake_engine::{ActorContext, Authorizer, Permission};

use crate::error::AppError;
use crate::state::AppState;

const ACTOR_HEADER: &str = "x-actor-id";
const ORG_HEADER: &str = "x-organization-id";

/// The acting admin, parsed from the trusted identity headers.
///
/// ```ignore
/// async fn handler(actor: AdminActor, ...) -> AppResult<Json<()>> {
///     actor.require(&state, Permission::ManageTemplates).await?;
///     ...
/// }
/// ```
pub struct AdminActor(pub ActorContext);

impl AdminActor {
    /// Check a permission against the injected authorizer.
    pub async fn require(
        &self,
        state: &AppState,
        permission: Permission,
    ) -> Result<(), AppError> {
        state.authorizer.require(&self.0, permission).await?;
        Ok(())
    }

    pub fn organization_id(&self) -> i64 {
        self.0.organization_id
    }
}

fn header_id(parts: &Parts, name: &str) -> Result<i64, AppError> {
    parts
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
        .ok_or_else(|| {
            AppError::Core(CoreError::Forbidden(format!(
                "missing or invalid {name} header"
            )))
        })
}

impl FromRequestParts<AppState> for AdminActor {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let actor_id = header_id(parts, ACTOR_HEADER)?;
        let organization_id = header_id(parts, ORG_HEADER)?;
        Ok(AdminActor(ActorContext {
            actor_id,
            organization_id,
        }))
    }
}
