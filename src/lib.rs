//! Status Dashboard - service status tracking backend
//!
//! Records the operational status of a set of named services over time,
//! serves the latest and historical status to a public status page, and
//! accepts new status updates from clients holding an API key.
//!
//! # Architecture
//!
//! - **Web Framework**: Axum (async HTTP server)
//! - **Database**: PostgreSQL with sqlx, or an in-memory store when no database is configured
//! - **Authentication**: Bearer API keys, stored as SHA-256 hashes
//! - **Format**: JSON requests/responses
//!
//! # Startup Flow
//!
//! 1. Load configuration from environment variables
//! 2. Create database connection pool and run migrations (when configured)
//! 3. Build HTTP router with routes and middleware
//! 4. Start server on configured address

pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod state;
pub mod store;

use std::sync::Arc;

use axum::{
    Router,
    http::Method,
    middleware as axum_middleware,
    routing::{get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    config::Config,
    state::AppState,
    store::{MemoryStore, PgStore, StatusStore},
};

/// Build the HTTP router.
///
/// # Routes
///
/// Public (no authentication):
/// - `GET /` - status overview
/// - `GET /service/{id}` - service detail
/// - `GET /api/service/{id}/history` - service history JSON
/// - `GET /api/health` - health check
///
/// Authenticated with `Authorization: Bearer <key>`:
/// - `POST /api/status-updates`, `GET /api/status-updates`, `GET /api/status-updates/{id}`
/// - `GET /api/services`, `GET /api/services/{id}`, `GET /api/services/{id}/history`
pub fn app(state: AppState) -> Router {
    let authenticated_routes = Router::new()
        .route(
            "/api/status-updates",
            post(handlers::status_updates::create_status_update)
                .get(handlers::status_updates::list_status_updates),
        )
        .route(
            "/api/status-updates/{id}",
            get(handlers::status_updates::get_status_update),
        )
        .route("/api/services", get(handlers::services::list_services))
        .route("/api/services/{id}", get(handlers::services::get_service))
        .route(
            "/api/services/{id}/history",
            get(handlers::services::get_service_history),
        )
        // Apply authentication middleware to all routes in this group
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::auth_middleware,
        ));

    // Status page data may be fetched from the browser on another origin
    let public_routes = Router::new()
        .route("/", get(handlers::public::status_overview))
        .route("/service/{id}", get(handlers::public::service_detail))
        .route(
            "/api/service/{id}/history",
            get(handlers::public::service_history_json),
        )
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET]),
        );

    Router::new()
        .route("/api/health", get(handlers::health::health_check))
        .merge(public_routes)
        .merge(authenticated_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Open the configured store: PostgreSQL when `DATABASE_URL` is set,
/// otherwise an in-memory store.
pub async fn open_store(config: &Config) -> anyhow::Result<Arc<dyn StatusStore>> {
    match config.database_url.as_deref() {
        Some(database_url) => Ok(Arc::new(connect_pg(config, database_url).await?)),
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory store (data is lost on restart)");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

/// Connect to PostgreSQL and bring the schema up to date.
pub async fn connect_pg(config: &Config, database_url: &str) -> anyhow::Result<PgStore> {
    let pool = db::create_pool(database_url, config.database_max_connections).await?;
    tracing::info!("Database pool created");

    db::run_migrations(&pool).await?;
    tracing::info!("Database migrations complete");

    Ok(PgStore::new(pool))
}

/// Run the HTTP server until Ctrl-C.
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let store = open_store(&config).await?;
    let app = app(AppState::new(store));

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
