/// Persisted workflow sessions and their display titles

use crate::workflow::memory::WorkflowMemory;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const UNNAMED_SESSION: &str = "Unnamed session";

/// One persisted run session of a workflow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowSession {
    /// Session UUID
    pub session_id: String,
    /// ID of the workflow that owns this session
    pub workflow_id: Option<String>,
    /// ID of the user interacting with this workflow
    pub user_id: Option<String>,
    /// Serialized `WorkflowMemory`
    pub memory: Option<Value>,
    pub workflow_data: Option<Map<String, Value>>,
    pub user_data: Option<Map<String, Value>>,
    /// Session metadata; may carry a user-given `session_name`
    pub session_data: Option<Map<String, Value>>,
    /// Unix timestamp (seconds) of creation
    pub created_at: Option<i64>,
    /// Unix timestamp (seconds) of the last update
    pub updated_at: Option<i64>,
}

impl WorkflowSession {
    pub fn new(session_id: impl Into<String>, workflow_id: impl Into<String>, user_id: Option<String>) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            session_id: session_id.into(),
            workflow_id: Some(workflow_id.into()),
            user_id,
            memory: None,
            workflow_data: None,
            user_data: None,
            session_data: None,
            created_at: Some(now),
            updated_at: Some(now),
        }
    }

    /// User-given session name from `session_data`, if any
    pub fn session_name(&self) -> Option<&Value> {
        self.session_data.as_ref().and_then(|data| data.get("session_name"))
    }

    pub fn set_session_name(&mut self, name: impl Into<String>) {
        self.session_data
            .get_or_insert_with(Map::new)
            .insert("session_name".to_string(), Value::String(name.into()));
    }
}

/// Derive a display title for a session
///
/// Uses the stored session name, then the first string argument of the first
/// recorded run, then a fixed placeholder.
pub fn session_title(session: &WorkflowSession) -> String {
    if let Some(name) = session.session_name().and_then(Value::as_str) {
        return name.to_string();
    }

    let memory = WorkflowMemory::from_value(session.memory.as_ref());
    memory
        .runs
        .first()
        .and_then(|run| run.input.values().find_map(Value::as_str))
        .filter(|text| !text.trim().is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| UNNAMED_SESSION.to_string())
}
