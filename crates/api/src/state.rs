use std::sync::Arc;

use intake_engine::store::AuditStore;
use intake_engine::{
    Authorizer, FileGateway, ResponseService, SessionManager, TemplateRegistry,
};
use intake_events::EventBus;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via
/// `State<AppState>`.
///
/// Cheaply cloneable: the services carry their ports behind `Arc`. The
/// pool is optional so the router can also run against the in-memory
/// ports (tests, ephemeral local mode).
#[derive(Clone)]
pub struct AppState {
    pub registry: TemplateRegistry,
    pub manager: SessionManager,
    pub responses: ResponseService,
    pub gateway: FileGateway,
    pub audit: Arc<dyn AuditStore>,
    pub authorizer: Arc<dyn Authorizer>,
    pub bus: Arc<EventBus>,
    pub pool: Option<intake_db::DbPool>,
    pub config: Arc<ServerConfig>,
}
