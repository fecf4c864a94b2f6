/// Core workflow type definitions
///
/// Defines the `Workflow` abstraction the playground routes over: identity,
/// declared run parameters, declared return shape and the run operation itself.

use crate::workflow::{memory::MemoryKind, storage::WorkflowStorage};
use anyhow::Result;
use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;

/// Named arguments passed to `Workflow::run`
pub type RunInput = Map<String, Value>;

/// A registered unit of work that the playground can describe and run
///
/// Implementations own their execution and persistence. The playground only
/// reads the declared metadata and forwards calls, so implementations must be
/// safe to invoke concurrently.
#[async_trait]
pub trait Workflow: Send + Sync {
    /// Unique workflow identifier (e.g., "wf-echo")
    fn workflow_id(&self) -> &str;

    /// Human-readable workflow name
    fn name(&self) -> Option<&str> {
        None
    }

    /// Short description shown in workflow listings
    fn description(&self) -> Option<&str> {
        None
    }

    /// Kind of memory attached to this workflow, if any
    fn memory(&self) -> Option<MemoryKind> {
        None
    }

    /// Session storage attached to this workflow, if any
    fn storage(&self) -> Option<Arc<dyn WorkflowStorage>> {
        None
    }

    /// Declared parameters accepted by `run`
    fn run_parameters(&self) -> &RunParameters;

    /// Declared shape of the value produced by `run`
    fn run_return_type(&self) -> RunReturnType;

    /// Execute the workflow with the given named arguments
    async fn run(&self, input: RunInput) -> Result<RunOutput>;
}

/// Declared result shape of a workflow run
///
/// Fixed when the workflow is constructed; the playground decides between a
/// plain JSON body and an event stream from this tag alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunReturnType {
    /// A single `RunResponse`-like value
    RunResponse,
    /// A lazy sequence of `RunResponse` values
    Iterator,
}

/// Value produced by `Workflow::run`
pub enum RunOutput {
    /// One JSON value, returned as the response body
    Single(Value),
    /// A finite, non-restartable sequence of responses
    Stream(BoxStream<'static, Result<RunResponse>>),
}

impl std::fmt::Debug for RunOutput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunOutput::Single(value) => f.debug_tuple("Single").field(value).finish(),
            RunOutput::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

/// One declared parameter of a workflow's run operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunParameter {
    /// Parameter name as accepted in the run input object
    pub name: String,
    /// Default value used when the parameter is omitted
    pub default: Option<Value>,
    /// Type annotation shown to clients (e.g., "str", "int")
    pub annotation: String,
    /// Whether the parameter must be supplied
    pub required: bool,
}

impl RunParameter {
    /// Required parameter with no default
    pub fn required(name: impl Into<String>, annotation: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default: None,
            annotation: annotation.into(),
            required: true,
        }
    }

    /// Optional parameter with a default value
    pub fn optional(name: impl Into<String>, annotation: impl Into<String>, default: Value) -> Self {
        Self {
            name: name.into(),
            default: Some(default),
            annotation: annotation.into(),
            required: false,
        }
    }
}

/// Ordered parameter schema of a workflow's run operation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunParameters {
    params: Vec<RunParameter>,
}

impl RunParameters {
    pub fn new(params: Vec<RunParameter>) -> Self {
        Self { params }
    }

    pub fn iter(&self) -> impl Iterator<Item = &RunParameter> {
        self.params.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Render the schema as a fresh JSON object keyed by parameter name
    ///
    /// Callers are free to mutate the returned map; the declared schema is untouched.
    pub fn to_json_map(&self) -> Map<String, Value> {
        self.params
            .iter()
            .map(|param| {
                let value = serde_json::to_value(param).unwrap_or(Value::Null);
                (param.name.clone(), value)
            })
            .collect()
    }
}

impl FromIterator<RunParameter> for RunParameters {
    fn from_iter<I: IntoIterator<Item = RunParameter>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Kind of event carried by a `RunResponse`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunEvent {
    RunStarted,
    RunResponse,
    RunCompleted,
}

/// Unit of output produced by a workflow run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResponse {
    pub run_id: Option<String>,
    pub workflow_id: Option<String>,
    pub session_id: Option<String>,
    pub event: RunEvent,
    pub content: Option<Value>,
    pub content_type: String,
    /// Unix timestamp (seconds)
    pub created_at: i64,
}

impl RunResponse {
    /// Response event with string content stamped with the current time
    pub fn new(event: RunEvent, content: Option<Value>) -> Self {
        Self {
            run_id: None,
            workflow_id: None,
            session_id: None,
            event,
            content,
            content_type: "str".to_string(),
            created_at: chrono::Utc::now().timestamp(),
        }
    }

    pub fn with_run(mut self, run_id: &str, workflow_id: &str, session_id: &str) -> Self {
        self.run_id = Some(run_id.to_string());
        self.workflow_id = Some(workflow_id.to_string());
        self.session_id = Some(session_id.to_string());
        self
    }
}
