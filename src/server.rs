/// Server setup and initialization
///
/// Wires together session storage, the demo workflows and the playground routes.
/// Provides the main application factory function for creating the Axum app.

use crate::{
    api::get_workflow_router,
    config::Config,
    workflow::{
        builtin::{EchoWorkflow, WordStreamWorkflow},
        storage::SqliteWorkflowStorage,
        Workflow,
    },
};
use anyhow::Result;
use axum::{routing::get, Router};
use std::{sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

/// Create the Axum application for a fixed set of workflows
///
/// Adds the health check and request tracing around the playground router.
pub fn create_app(workflows: Vec<Arc<dyn Workflow>>) -> Router {
    Router::new()
        // Health check endpoint
        .route("/healthz", get(health_check))
        // Workflow playground routes
        .merge(get_workflow_router(workflows))
        .layer(TraceLayer::new_for_http())
}

/// Build the bundled demo workflows
///
/// The echo workflow persists its sessions to SQLite under the configured data dir.
pub async fn default_workflows(config: &Config) -> Result<Vec<Arc<dyn Workflow>>> {
    tracing::info!("📁 Ensuring data directory exists: {}", config.storage.data_dir);
    std::fs::create_dir_all(&config.storage.data_dir)
        .map_err(|e| anyhow::anyhow!("Failed to create data directory: {}", e))?;

    let storage = SqliteWorkflowStorage::open(config.storage.sessions_db_path())
        .await
        .map_err(|e| anyhow::anyhow!("Failed to open session database: {}", e))?;

    let workflows: Vec<Arc<dyn Workflow>> = vec![
        Arc::new(EchoWorkflow::new(Arc::new(storage))),
        Arc::new(WordStreamWorkflow::new(Duration::from_millis(150))),
    ];
    Ok(workflows)
}

/// Start the HTTP server with the given configuration
///
/// Creates the application and starts the Axum server on the configured address and port.
pub async fn start_server(config: Config) -> Result<()> {
    // Initialize tracing subscriber for logging (RUST_LOG overrides the default level)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_thread_ids(true)
        .with_level(true)
        .init();

    tracing::info!("Starting workflow playground...");

    let workflows = default_workflows(&config).await?;
    let app = create_app(workflows);

    // Bind to the configured address
    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&bind_addr).await?;

    tracing::info!("Server listening on http://{}", bind_addr);

    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

/// Health check endpoint handler
async fn health_check() -> &'static str {
    "ok"
}
