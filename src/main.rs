/// Workflow Playground server
///
/// Main entry point. Loads configuration from the environment and serves the
/// playground with the bundled demo workflows.

use workflow_playground::{config::Config, server::start_server};

/// Application entry point
///
/// The server provides:
/// - Workflow playground API at /workflow_playground/*
/// - Health check at /healthz
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration (defaults to 0.0.0.0:7777 and ./data)
    let config = Config::default();

    start_server(config).await?;

    Ok(())
}
