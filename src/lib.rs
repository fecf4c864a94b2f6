/// Workflow Playground: browse, run and inspect registered workflows over HTTP
///
/// This library provides the playground router, the workflow abstraction it
/// routes over, and session storage backends workflows can persist into.

// Core configuration and setup
pub mod config;

// Workflow layer - workflow trait, catalog, memory, storage and sessions
pub mod workflow;

// HTTP API layer - playground endpoints under /workflow_playground
pub mod api;

// Server setup and initialization
pub mod server;

// Re-export commonly used types for external consumers
pub use api::{get_workflow_router, PlaygroundError};
pub use server::{create_app, start_server};
pub use workflow::{RunOutput, RunResponse, RunReturnType, Workflow, WorkflowSession, WorkflowStorage};
