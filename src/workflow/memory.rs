/// Workflow memory capability
///
/// Memory is the per-session record of runs a workflow keeps while it executes.
/// It is persisted into `WorkflowSession::memory` by workflows that have storage.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Known memory capability kinds reported by the config endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemoryKind {
    WorkflowMemory,
}

impl MemoryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemoryKind::WorkflowMemory => "WorkflowMemory",
        }
    }
}

/// A single recorded run: the named arguments and what the run produced
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowRun {
    pub input: Map<String, Value>,
    pub response: Option<Value>,
}

/// Ordered run history of one workflow session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowMemory {
    pub runs: Vec<WorkflowRun>,
}

impl WorkflowMemory {
    pub fn add_run(&mut self, run: WorkflowRun) {
        self.runs.push(run);
    }

    /// Restore memory from a stored session value, falling back to empty memory
    pub fn from_value(value: Option<&Value>) -> Self {
        value
            .and_then(|v| serde_json::from_value(v.clone()).ok())
            .unwrap_or_default()
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}
