/// Error types for the playground API
///
/// Lookup failures are deliberate 404s with fixed messages. Anything a workflow
/// or its storage raises is passed through untouched as a bare 500.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use thiserror::Error;

/// Result type alias for playground handlers
pub type Result<T> = std::result::Result<T, PlaygroundError>;

#[derive(Debug, Error)]
pub enum PlaygroundError {
    /// No registered workflow has the requested ID
    #[error("Workflow not found")]
    WorkflowNotFound,

    /// The workflow exists but has no storage attached
    #[error("Workflow does not have storage enabled")]
    StorageNotEnabled,

    /// Storage has no session with the requested ID (for this user)
    #[error("Session not found")]
    SessionNotFound,

    /// Failure raised by a workflow run or a storage call
    #[error(transparent)]
    Delegate(#[from] anyhow::Error),
}

impl PlaygroundError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            PlaygroundError::WorkflowNotFound
            | PlaygroundError::StorageNotEnabled
            | PlaygroundError::SessionNotFound => StatusCode::NOT_FOUND,
            PlaygroundError::Delegate(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for PlaygroundError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match self {
            PlaygroundError::Delegate(_) => (status, "Internal Server Error").into_response(),
            not_found => (status, Json(json!({ "detail": not_found.to_string() }))).into_response(),
        }
    }
}
