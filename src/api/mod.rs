/// HTTP API Layer
///
/// This module provides the workflow playground endpoints. It handles:
/// - Workflow listing, input schema and capability config
/// - Running workflows as JSON or server-sent event streams
/// - Browsing, renaming and deleting persisted sessions

// Playground endpoints under /workflow_playground
pub mod playground;

// Error type shared by the handlers
pub mod error;

// Re-export router builders
pub use error::PlaygroundError;
pub use playground::{create_playground_routes, get_workflow_router, PLAYGROUND_PREFIX};
