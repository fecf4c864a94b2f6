/// Built-in demo workflows
///
/// Two small workflows so a fresh server has something to show:
/// - `EchoWorkflow`: single response, records every run in its session storage
/// - `WordStreamWorkflow`: streams a message back one word per event, no storage

use crate::workflow::{
    memory::{MemoryKind, WorkflowMemory, WorkflowRun},
    session::WorkflowSession,
    storage::WorkflowStorage,
    types::{RunEvent, RunInput, RunOutput, RunParameter, RunParameters, RunResponse, RunReturnType, Workflow},
};
use anyhow::Result;
use async_trait::async_trait;
use futures::{stream, StreamExt};
use serde_json::{json, Value};
use std::{sync::Arc, time::Duration};

/// Shared parameter list for the demo workflows
fn message_parameters() -> RunParameters {
    RunParameters::new(vec![
        RunParameter::required("message", "str"),
        RunParameter::optional("session_id", "str", Value::Null),
        RunParameter::optional("user_id", "str", Value::Null),
    ])
}

fn required_str<'a>(input: &'a RunInput, key: &str) -> Result<&'a str> {
    input
        .get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| anyhow::anyhow!("Missing required string argument '{}'", key))
}

fn optional_str(input: &RunInput, key: &str) -> Option<String> {
    input.get(key).and_then(Value::as_str).map(str::to_string)
}

/// Echoes the message back and appends the run to the session's memory
pub struct EchoWorkflow {
    storage: Arc<dyn WorkflowStorage>,
    params: RunParameters,
}

impl EchoWorkflow {
    pub const ID: &'static str = "wf-echo";

    pub fn new(storage: Arc<dyn WorkflowStorage>) -> Self {
        Self {
            storage,
            params: message_parameters(),
        }
    }
}

#[async_trait]
impl Workflow for EchoWorkflow {
    fn workflow_id(&self) -> &str {
        Self::ID
    }

    fn name(&self) -> Option<&str> {
        Some("Echo")
    }

    fn description(&self) -> Option<&str> {
        Some("Replies with the message it was given and remembers every run")
    }

    fn memory(&self) -> Option<MemoryKind> {
        Some(MemoryKind::WorkflowMemory)
    }

    fn storage(&self) -> Option<Arc<dyn WorkflowStorage>> {
        Some(Arc::clone(&self.storage))
    }

    fn run_parameters(&self) -> &RunParameters {
        &self.params
    }

    fn run_return_type(&self) -> RunReturnType {
        RunReturnType::RunResponse
    }

    async fn run(&self, mut input: RunInput) -> Result<RunOutput> {
        let message = required_str(&input, "message")?.to_string();
        let user_id = optional_str(&input, "user_id");
        let session_id = optional_str(&input, "session_id").unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        let run_id = uuid::Uuid::new_v4().to_string();

        // Session routing keys are not part of what the user asked for
        input.remove("session_id");
        input.remove("user_id");

        let mut session = match self.storage.read(&session_id, None).await? {
            Some(existing) => existing,
            None => WorkflowSession::new(&session_id, Self::ID, user_id.clone()),
        };

        let response = RunResponse::new(RunEvent::RunResponse, Some(json!(message)))
            .with_run(&run_id, Self::ID, &session_id);

        let mut memory = WorkflowMemory::from_value(session.memory.as_ref());
        memory.add_run(WorkflowRun {
            input,
            response: Some(json!(message)),
        });
        session.memory = Some(memory.to_value());
        self.storage.upsert(&session).await?;

        tracing::debug!("📝 Recorded echo run {} in session {}", run_id, session_id);

        Ok(RunOutput::Single(serde_json::to_value(response)?))
    }
}

/// Streams the message back one word per response
pub struct WordStreamWorkflow {
    /// Pause before each event is produced
    delay: Duration,
    params: RunParameters,
}

impl WordStreamWorkflow {
    pub const ID: &'static str = "wf-word-stream";

    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            params: message_parameters(),
        }
    }
}

#[async_trait]
impl Workflow for WordStreamWorkflow {
    fn workflow_id(&self) -> &str {
        Self::ID
    }

    fn name(&self) -> Option<&str> {
        Some("Word Stream")
    }

    fn description(&self) -> Option<&str> {
        Some("Streams the message back one word at a time")
    }

    fn run_parameters(&self) -> &RunParameters {
        &self.params
    }

    fn run_return_type(&self) -> RunReturnType {
        RunReturnType::Iterator
    }

    async fn run(&self, input: RunInput) -> Result<RunOutput> {
        let message = required_str(&input, "message")?;
        let session_id = optional_str(&input, "session_id").unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        let run_id = uuid::Uuid::new_v4().to_string();

        let stamp = |response: RunResponse| response.with_run(&run_id, Self::ID, &session_id);

        let mut events = vec![stamp(RunResponse::new(RunEvent::RunStarted, None))];
        events.extend(
            message
                .split_whitespace()
                .map(|word| stamp(RunResponse::new(RunEvent::RunResponse, Some(json!(word))))),
        );
        events.push(stamp(RunResponse::new(RunEvent::RunCompleted, None)));

        let delay = self.delay;
        let responses = stream::iter(events)
            .then(move |response| async move {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                Ok::<_, anyhow::Error>(response)
            })
            .boxed();

        Ok(RunOutput::Stream(responses))
    }
}
