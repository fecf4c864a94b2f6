/// Workflow playground REST API endpoints
///
/// Lets a client list the registered workflows, inspect their input schema and
/// configuration, run them (plain JSON or a server-sent event stream) and browse
/// the sessions their storage has persisted. Every handler is lookup, then
/// delegate to the workflow or its storage, then shape the result.

use crate::{
    api::error::{PlaygroundError, Result},
    workflow::{
        session::{session_title, WorkflowSession},
        storage::WorkflowStorage,
        types::{RunInput, RunOutput, RunReturnType, Workflow},
        WorkflowCatalog,
    },
};
use axum::{
    extract::{Path, State},
    response::{
        sse::{Event as SseEvent, Sse},
        IntoResponse, Json, Response,
    },
    routing::{get, post},
    Router,
};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

/// Path prefix all playground routes are nested under
pub const PLAYGROUND_PREFIX: &str = "/workflow_playground";

/// Shared router state: the immutable workflow catalog
pub type PlaygroundState = Arc<WorkflowCatalog>;

/// Request body for session endpoints
#[derive(Debug, Default, Deserialize)]
pub struct WorkflowSessionsRequest {
    pub user_id: Option<String>,
}

/// Request body for renaming a session
#[derive(Debug, Deserialize)]
pub struct WorkflowRenameRequest {
    pub name: String,
    pub user_id: Option<String>,
}

/// Entry of the workflow listing
#[derive(Debug, Serialize)]
pub struct WorkflowSummary {
    pub id: String,
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Capability kinds attached to a workflow
#[derive(Debug, Serialize)]
pub struct WorkflowConfig {
    pub memory: Option<&'static str>,
    pub storage: Option<&'static str>,
}

/// Entry of the session listing
#[derive(Debug, Serialize)]
pub struct WorkflowSessionSummary {
    pub title: String,
    pub session_id: String,
    pub session_name: Option<Value>,
    pub created_at: Option<i64>,
}

impl From<&WorkflowSession> for WorkflowSessionSummary {
    fn from(session: &WorkflowSession) -> Self {
        Self {
            title: session_title(session),
            session_id: session.session_id.clone(),
            session_name: session.session_name().cloned(),
            created_at: session.created_at,
        }
    }
}

/// Build the playground router for a fixed set of workflows
///
/// The workflows are indexed once here and never change afterwards.
pub fn get_workflow_router(workflows: Vec<Arc<dyn Workflow>>) -> Router {
    let catalog = Arc::new(WorkflowCatalog::new(workflows));
    Router::new().nest(PLAYGROUND_PREFIX, create_playground_routes().with_state(catalog))
}

/// Create playground routes (relative to `PLAYGROUND_PREFIX`)
pub fn create_playground_routes() -> Router<PlaygroundState> {
    Router::new()
        .route("/status", get(workflow_status))
        .route("/workflows", get(get_workflows))
        .route("/workflow/input_fields/{workflow_id}", get(get_input_fields))
        .route("/workflow/config/{workflow_id}", get(get_config))
        .route("/workflow/run/{workflow_id}", post(run_workflow))
        .route("/workflow/session/all/{workflow_id}", post(get_all_workflow_sessions))
        .route(
            "/workflow/{workflow_id}/session/{session_id}",
            post(get_workflow_session).delete(delete_workflow_session),
        )
        .route(
            "/workflow/{workflow_id}/session/{session_id}/rename",
            post(rename_workflow_session),
        )
}

fn find_workflow<'a>(catalog: &'a WorkflowCatalog, workflow_id: &str) -> Result<&'a Arc<dyn Workflow>> {
    catalog.get(workflow_id).ok_or_else(|| {
        tracing::debug!("🔍 Unknown workflow requested: {}", workflow_id);
        PlaygroundError::WorkflowNotFound
    })
}

fn find_storage(catalog: &WorkflowCatalog, workflow_id: &str) -> Result<Arc<dyn WorkflowStorage>> {
    find_workflow(catalog, workflow_id)?
        .storage()
        .ok_or(PlaygroundError::StorageNotEnabled)
}

/// GET /workflow_playground/status
async fn workflow_status() -> Json<Value> {
    Json(json!({ "workflow_playground": "available" }))
}

/// GET /workflow_playground/workflows
/// Returns: [{ "id": "...", "name": "...", "description": "..." }] in registration order
async fn get_workflows(State(catalog): State<PlaygroundState>) -> Json<Vec<WorkflowSummary>> {
    Json(
        catalog
            .iter()
            .map(|workflow| WorkflowSummary {
                id: workflow.workflow_id().to_string(),
                name: workflow.name().map(str::to_string),
                description: workflow.description().map(str::to_string),
            })
            .collect(),
    )
}

/// GET /workflow_playground/workflow/input_fields/:workflow_id
/// Returns the run parameter schema with the workflow's id, name and description merged in
async fn get_input_fields(
    State(catalog): State<PlaygroundState>,
    Path(workflow_id): Path<String>,
) -> Result<Json<Value>> {
    let workflow = find_workflow(&catalog, &workflow_id)?;

    let mut fields = workflow.run_parameters().to_json_map();
    fields.insert("workflow_id".to_string(), json!(workflow.workflow_id()));
    fields.insert("name".to_string(), json!(workflow.name()));
    fields.insert("description".to_string(), json!(workflow.description()));

    Ok(Json(Value::Object(fields)))
}

/// GET /workflow_playground/workflow/config/:workflow_id
/// Returns: { "memory": "WorkflowMemory" | null, "storage": "SqliteWorkflowStorage" | null }
async fn get_config(
    State(catalog): State<PlaygroundState>,
    Path(workflow_id): Path<String>,
) -> Result<Json<WorkflowConfig>> {
    let workflow = find_workflow(&catalog, &workflow_id)?;

    Ok(Json(WorkflowConfig {
        memory: workflow.memory().map(|kind| kind.as_str()),
        storage: workflow.storage().map(|storage| storage.kind().as_str()),
    }))
}

/// POST /workflow_playground/workflow/run/:workflow_id
/// Body: JSON object of named run arguments
///
/// Single-result workflows answer with the run's JSON value. Iterator workflows
/// answer with `text/event-stream`, one event per produced response; the stream
/// is pulled lazily and dropped when the client goes away.
async fn run_workflow(
    State(catalog): State<PlaygroundState>,
    Path(workflow_id): Path<String>,
    Json(input): Json<RunInput>,
) -> Result<Response> {
    let workflow = find_workflow(&catalog, &workflow_id)?;
    let declared = workflow.run_return_type();

    tracing::info!("🚀 Running workflow: {} ({:?})", workflow_id, declared);

    match (declared, workflow.run(input).await?) {
        (RunReturnType::RunResponse, RunOutput::Single(value)) => Ok(Json(value).into_response()),
        (RunReturnType::Iterator, RunOutput::Stream(responses)) => {
            let events = responses.map(|response| {
                response.and_then(|r| SseEvent::default().json_data(r).map_err(anyhow::Error::from))
            });
            Ok(Sse::new(events).into_response())
        }
        (declared, output) => Err(PlaygroundError::Delegate(anyhow::anyhow!(
            "Workflow '{}' declared {:?} but produced {:?}",
            workflow_id,
            declared,
            output
        ))),
    }
}

/// POST /workflow_playground/workflow/session/all/:workflow_id
/// Body: { "user_id": "..." }
/// Returns: [{ "title": "...", "session_id": "...", "session_name": ..., "created_at": ... }]
async fn get_all_workflow_sessions(
    State(catalog): State<PlaygroundState>,
    Path(workflow_id): Path<String>,
    Json(body): Json<WorkflowSessionsRequest>,
) -> Result<Json<Vec<WorkflowSessionSummary>>> {
    let storage = find_storage(&catalog, &workflow_id)?;

    let sessions = storage.get_all_sessions(body.user_id.as_deref(), None).await?;

    Ok(Json(sessions.iter().map(WorkflowSessionSummary::from).collect()))
}

/// POST /workflow_playground/workflow/:workflow_id/session/:session_id
/// Body: { "user_id": "..." }
async fn get_workflow_session(
    State(catalog): State<PlaygroundState>,
    Path((workflow_id, session_id)): Path<(String, String)>,
    Json(body): Json<WorkflowSessionsRequest>,
) -> Result<Json<WorkflowSession>> {
    let storage = find_storage(&catalog, &workflow_id)?;

    let session = storage
        .read(&session_id, body.user_id.as_deref())
        .await?
        .ok_or(PlaygroundError::SessionNotFound)?;

    Ok(Json(session))
}

/// POST /workflow_playground/workflow/:workflow_id/session/:session_id/rename
/// Body: { "name": "...", "user_id": "..." }
async fn rename_workflow_session(
    State(catalog): State<PlaygroundState>,
    Path((workflow_id, session_id)): Path<(String, String)>,
    Json(body): Json<WorkflowRenameRequest>,
) -> Result<Json<WorkflowSession>> {
    let storage = find_storage(&catalog, &workflow_id)?;

    let mut session = storage
        .read(&session_id, body.user_id.as_deref())
        .await?
        .ok_or(PlaygroundError::SessionNotFound)?;

    session.set_session_name(body.name);
    let stored = storage
        .upsert(&session)
        .await?
        .ok_or(PlaygroundError::SessionNotFound)?;

    tracing::info!("✏️ Renamed session {} of workflow {}", session_id, workflow_id);

    Ok(Json(stored))
}

/// DELETE /workflow_playground/workflow/:workflow_id/session/:session_id
/// Body: { "user_id": "..." }
/// Returns: { "message": "Session deleted" }
async fn delete_workflow_session(
    State(catalog): State<PlaygroundState>,
    Path((workflow_id, session_id)): Path<(String, String)>,
    Json(body): Json<WorkflowSessionsRequest>,
) -> Result<Json<Value>> {
    let storage = find_storage(&catalog, &workflow_id)?;

    storage
        .read(&session_id, body.user_id.as_deref())
        .await?
        .ok_or(PlaygroundError::SessionNotFound)?;

    if !storage.delete_session(&session_id).await? {
        return Err(PlaygroundError::SessionNotFound);
    }

    tracing::info!("🗑️ Deleted session {} of workflow {}", session_id, workflow_id);

    Ok(Json(json!({ "message": "Session deleted" })))
}
