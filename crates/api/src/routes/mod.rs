pub mod audit;
pub mod health;
pub mod onboarding;
pub mod sessions;
pub mod templates;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1/admin` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /templates                    CRUD + versioning
/// /sessions                     create / list / review / approve / reopen
/// /audit                        read the audit trail
/// ```
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .merge(templates::router())
        .merge(sessions::router())
        .merge(audit::router())
}
