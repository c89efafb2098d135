use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use intake_api::config::ServerConfig;
use intake_api::router::build_app_router;
use intake_api::state::AppState;
use intake_api::subscribers;
use intake_engine::pg::{
    PgAttachmentStore, PgAuditStore, PgResponseStore, PgSessionStore, PgTemplateStore,
};
use intake_engine::storage::LocalObjectStorage;
use intake_engine::{
    AllowAll, FileGateway, ResponseService, SessionManager, TemplateRegistry,
};
use intake_events::EventBus;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "intake_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = intake_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    intake_db::health_check(&pool)
        .await
        .expect("Database health check failed");

    intake_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Ports ---
    let templates = Arc::new(PgTemplateStore::new(pool.clone()));
    let sessions = Arc::new(PgSessionStore::new(pool.clone()));
    let responses = Arc::new(PgResponseStore::new(pool.clone()));
    let attachments = Arc::new(PgAttachmentStore::new(pool.clone()));
    let audit = Arc::new(PgAuditStore::new(pool.clone()));
    let storage = Arc::new(LocalObjectStorage::new(
        config.upload_dir.clone(),
        config.upload_base_url.clone(),
    ));

    // --- Event bus and subscribers ---
    let bus = Arc::new(EventBus::new());
    subscribers::register_subscribers(&bus, audit.clone());
    tracing::info!("Event bus created, subscribers registered");

    // --- Services ---
    let registry = TemplateRegistry::new(templates.clone());
    let manager = SessionManager::new(
        sessions.clone(),
        templates.clone(),
        responses.clone(),
        attachments.clone(),
        bus.clone(),
        config.engine.clone(),
    );
    let response_service = ResponseService::new(responses.clone(), bus.clone());
    let gateway = FileGateway::new(
        attachments.clone(),
        storage,
        bus.clone(),
        config.engine.max_upload_bytes,
    );

    // --- App state ---
    let state = AppState {
        registry,
        manager,
        responses: response_service,
        gateway,
        audit,
        authorizer: Arc::new(AllowAll),
        bus,
        pool: Some(pool),
        config: Arc::new(config.clone()),
    };

    // --- Router ---
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .expect("Invalid bind address");
    tracing::info!(%addr, "Starting intake API server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
