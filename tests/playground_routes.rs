//! Router tests for the workflow playground
//!
//! Each test builds the playground router over hand-written workflows and drives
//! it with `oneshot`, so no listener or database file is involved.

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use futures::{stream, StreamExt};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};
use tower::ServiceExt;
use workflow_playground::{
    get_workflow_router,
    workflow::{
        InMemoryWorkflowStorage, MemoryKind, RunEvent, RunInput, RunOutput, RunParameter, RunParameters,
        RunResponse, RunReturnType, Workflow, WorkflowSession, WorkflowStorage,
    },
};

// ===========================================================================
// Test workflows
// ===========================================================================

/// Returns a fixed value (or echoes its input when no value is set)
struct FixedWorkflow {
    id: &'static str,
    value: Option<Value>,
    storage: Option<Arc<dyn WorkflowStorage>>,
    memory: Option<MemoryKind>,
    params: RunParameters,
}

impl FixedWorkflow {
    fn new(id: &'static str) -> Self {
        Self {
            id,
            value: None,
            storage: None,
            memory: None,
            params: RunParameters::new(vec![
                RunParameter::required("topic", "str"),
                RunParameter::optional("count", "int", json!(3)),
            ]),
        }
    }

    fn returning(mut self, value: Value) -> Self {
        self.value = Some(value);
        self
    }

    fn with_storage(mut self, storage: Arc<dyn WorkflowStorage>) -> Self {
        self.storage = Some(storage);
        self.memory = Some(MemoryKind::WorkflowMemory);
        self
    }
}

#[async_trait]
impl Workflow for FixedWorkflow {
    fn workflow_id(&self) -> &str {
        self.id
    }

    fn name(&self) -> Option<&str> {
        Some("Fixed")
    }

    fn description(&self) -> Option<&str> {
        Some("Answers with a fixed value")
    }

    fn memory(&self) -> Option<MemoryKind> {
        self.memory
    }

    fn storage(&self) -> Option<Arc<dyn WorkflowStorage>> {
        self.storage.clone()
    }

    fn run_parameters(&self) -> &RunParameters {
        &self.params
    }

    fn run_return_type(&self) -> RunReturnType {
        RunReturnType::RunResponse
    }

    async fn run(&self, input: RunInput) -> anyhow::Result<RunOutput> {
        Ok(RunOutput::Single(self.value.clone().unwrap_or(Value::Object(input))))
    }
}

/// Streams one response per word given at construction, counting every pull
struct WordsWorkflow {
    id: &'static str,
    words: Vec<&'static str>,
    endless: bool,
    pulled: Arc<AtomicUsize>,
    params: RunParameters,
}

impl WordsWorkflow {
    fn new(id: &'static str, words: Vec<&'static str>) -> Self {
        Self {
            id,
            words,
            endless: false,
            pulled: Arc::new(AtomicUsize::new(0)),
            params: RunParameters::default(),
        }
    }
}

#[async_trait]
impl Workflow for WordsWorkflow {
    fn workflow_id(&self) -> &str {
        self.id
    }

    fn run_parameters(&self) -> &RunParameters {
        &self.params
    }

    fn run_return_type(&self) -> RunReturnType {
        RunReturnType::Iterator
    }

    async fn run(&self, _input: RunInput) -> anyhow::Result<RunOutput> {
        let pulled = Arc::clone(&self.pulled);
        let words: Vec<String> = self.words.iter().map(|w| w.to_string()).collect();
        let source = if self.endless {
            stream::iter(words).cycle().boxed()
        } else {
            stream::iter(words).boxed()
        };

        let responses = source
            .map(move |word| {
                pulled.fetch_add(1, Ordering::SeqCst);
                Ok::<_, anyhow::Error>(RunResponse::new(RunEvent::RunResponse, Some(json!(word))))
            })
            .boxed();
        Ok(RunOutput::Stream(responses))
    }
}

/// Always fails inside run
struct FailingWorkflow {
    params: RunParameters,
}

#[async_trait]
impl Workflow for FailingWorkflow {
    fn workflow_id(&self) -> &str {
        "wf-failing"
    }

    fn run_parameters(&self) -> &RunParameters {
        &self.params
    }

    fn run_return_type(&self) -> RunReturnType {
        RunReturnType::RunResponse
    }

    async fn run(&self, _input: RunInput) -> anyhow::Result<RunOutput> {
        Err(anyhow::anyhow!("model provider unavailable"))
    }
}

/// Produces one response, then fails mid-stream
struct BrokenStreamWorkflow {
    params: RunParameters,
}

#[async_trait]
impl Workflow for BrokenStreamWorkflow {
    fn workflow_id(&self) -> &str {
        "wf-broken-stream"
    }

    fn run_parameters(&self) -> &RunParameters {
        &self.params
    }

    fn run_return_type(&self) -> RunReturnType {
        RunReturnType::Iterator
    }

    async fn run(&self, _input: RunInput) -> anyhow::Result<RunOutput> {
        let items = vec![
            Ok(RunResponse::new(RunEvent::RunResponse, Some(json!("A")))),
            Err(anyhow::anyhow!("connection to model lost")),
            Ok(RunResponse::new(RunEvent::RunResponse, Some(json!("never sent")))),
        ];
        Ok(RunOutput::Stream(stream::iter(items).boxed()))
    }
}

/// Declares a stream but hands back a single value
struct MismatchedWorkflow {
    params: RunParameters,
}

#[async_trait]
impl Workflow for MismatchedWorkflow {
    fn workflow_id(&self) -> &str {
        "wf-mismatched"
    }

    fn run_parameters(&self) -> &RunParameters {
        &self.params
    }

    fn run_return_type(&self) -> RunReturnType {
        RunReturnType::Iterator
    }

    async fn run(&self, _input: RunInput) -> anyhow::Result<RunOutput> {
        Ok(RunOutput::Single(json!({"content": "not a stream"})))
    }
}

// ===========================================================================
// Helpers
// ===========================================================================

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
    (status, value)
}

fn session(id: &str, user: &str, created_at: i64) -> WorkflowSession {
    let mut session = WorkflowSession::new(id, "wf-stored", Some(user.to_string()));
    session.created_at = Some(created_at);
    session
}

async fn seeded_storage() -> Arc<InMemoryWorkflowStorage> {
    let storage = Arc::new(InMemoryWorkflowStorage::new());

    let mut named = session("s-named", "u1", 100);
    named.set_session_name("Quarterly report");
    storage.upsert(&named).await.unwrap();

    let mut from_run = session("s-run", "u1", 200);
    from_run.memory = Some(json!({"runs": [{"input": {"topic": "rust traits"}, "response": "ok"}]}));
    storage.upsert(&from_run).await.unwrap();

    storage.upsert(&session("s-other-user", "u2", 300)).await.unwrap();
    storage
}

async fn stored_app() -> (Router, Arc<InMemoryWorkflowStorage>) {
    let storage = seeded_storage().await;
    let app = get_workflow_router(vec![
        Arc::new(FixedWorkflow::new("wf-stored").with_storage(storage.clone())),
        Arc::new(FixedWorkflow::new("wf-plain")),
    ]);
    (app, storage)
}

// ===========================================================================
// Metadata endpoints
// ===========================================================================

#[tokio::test]
async fn status_reports_available() {
    let app = get_workflow_router(Vec::new());
    let (status, body) = send(&app, "GET", "/workflow_playground/status", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"workflow_playground": "available"}));
}

#[tokio::test]
async fn workflows_are_listed_in_registration_order() {
    let app = get_workflow_router(vec![
        Arc::new(FixedWorkflow::new("wf-b")),
        Arc::new(WordsWorkflow::new("wf-a", vec![])),
        Arc::new(FixedWorkflow::new("wf-c")),
    ]);
    let (status, body) = send(&app, "GET", "/workflow_playground/workflows", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([
            {"id": "wf-b", "name": "Fixed", "description": "Answers with a fixed value"},
            {"id": "wf-a", "name": null, "description": null},
            {"id": "wf-c", "name": "Fixed", "description": "Answers with a fixed value"}
        ])
    );
}

#[tokio::test]
async fn empty_catalog_lists_nothing() {
    let app = get_workflow_router(Vec::new());
    let (status, body) = send(&app, "GET", "/workflow_playground/workflows", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn input_fields_merge_identity_into_schema() {
    let app = get_workflow_router(vec![Arc::new(FixedWorkflow::new("wf-fixed"))]);
    let uri = "/workflow_playground/workflow/input_fields/wf-fixed";

    let (status, body) = send(&app, "GET", uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["workflow_id"], "wf-fixed");
    assert_eq!(body["name"], "Fixed");
    assert_eq!(body["description"], "Answers with a fixed value");
    assert_eq!(body["topic"], json!({"name": "topic", "default": null, "annotation": "str", "required": true}));
    assert_eq!(body["count"]["default"], 3);

    // Asking twice gives the same answer: the declared schema is never mutated
    let (_, again) = send(&app, "GET", uri, None).await;
    assert_eq!(again, body);
}

#[tokio::test]
async fn config_reports_capability_kinds() {
    let (app, _) = stored_app().await;

    let (status, body) = send(&app, "GET", "/workflow_playground/workflow/config/wf-stored", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"memory": "WorkflowMemory", "storage": "InMemoryWorkflowStorage"}));

    let (status, body) = send(&app, "GET", "/workflow_playground/workflow/config/wf-plain", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"memory": null, "storage": null}));
}

#[tokio::test]
async fn unknown_workflow_is_not_found_everywhere() {
    let (app, storage) = stored_app().await;
    let user = Some(json!({"user_id": "u1"}));

    let calls = [
        ("GET", "/workflow_playground/workflow/input_fields/nope", None),
        ("GET", "/workflow_playground/workflow/config/nope", None),
        ("POST", "/workflow_playground/workflow/run/nope", Some(json!({}))),
        ("POST", "/workflow_playground/workflow/session/all/nope", user.clone()),
        ("POST", "/workflow_playground/workflow/nope/session/s-named", user.clone()),
        (
            "POST",
            "/workflow_playground/workflow/nope/session/s-named/rename",
            Some(json!({"name": "x", "user_id": "u1"})),
        ),
        ("DELETE", "/workflow_playground/workflow/nope/session/s-named", user.clone()),
    ];

    for (method, uri, body) in calls {
        let (status, body) = send(&app, method, uri, body).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{} {}", method, uri);
        assert_eq!(body, json!({"detail": "Workflow not found"}), "{} {}", method, uri);
    }

    // No side effects on storage
    assert_eq!(storage.get_all_sessions(None, None).await.unwrap().len(), 3);
}

// ===========================================================================
// Running workflows
// ===========================================================================

#[tokio::test]
async fn single_result_run_returns_the_value() {
    let result = json!({"content": "done", "event": "RunResponse", "metrics": {"tokens": 12}});
    let app = get_workflow_router(vec![Arc::new(FixedWorkflow::new("wf-fixed").returning(result.clone()))]);

    let (status, body) = send(&app, "POST", "/workflow_playground/workflow/run/wf-fixed", Some(json!({"topic": "x"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, result);
}

#[tokio::test]
async fn run_input_is_passed_as_named_arguments() {
    let app = get_workflow_router(vec![Arc::new(FixedWorkflow::new("wf-echo"))]);
    let input = json!({"topic": "streams", "count": 5, "unknown": [1, 2]});

    let (status, body) = send(&app, "POST", "/workflow_playground/workflow/run/wf-echo", Some(input.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, input);
}

#[tokio::test]
async fn iterator_run_streams_one_event_per_response() {
    let app = get_workflow_router(vec![Arc::new(WordsWorkflow::new("wf-words", vec!["A", "B", "C"]))]);

    let request = Request::builder()
        .method("POST")
        .uri("/workflow_playground/workflow/run/wf-words")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{}"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap().to_string();
    assert!(content_type.starts_with("text/event-stream"), "got {}", content_type);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    let events: Vec<Value> = text
        .split("\n\n")
        .filter(|chunk| !chunk.trim().is_empty())
        .map(|chunk| serde_json::from_str(chunk.strip_prefix("data: ").unwrap()).unwrap())
        .collect();

    let contents: Vec<&Value> = events.iter().map(|event| &event["content"]).collect();
    assert_eq!(contents, vec![&json!("A"), &json!("B"), &json!("C")]);
    assert!(events.iter().all(|event| event["event"] == "RunResponse"));
}

#[tokio::test]
async fn dropping_the_stream_stops_pulling_responses() {
    let mut workflow = WordsWorkflow::new("wf-endless", vec!["tick"]);
    workflow.endless = true;
    let pulled = Arc::clone(&workflow.pulled);
    let app = get_workflow_router(vec![Arc::new(workflow)]);

    let request = Request::builder()
        .method("POST")
        .uri("/workflow_playground/workflow/run/wf-endless")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{}"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(pulled.load(Ordering::SeqCst), 0, "nothing is produced before the body is read");

    let mut body = response.into_body();
    let frame = body.frame().await.unwrap().unwrap();
    let data = frame.into_data().unwrap();
    assert!(std::str::from_utf8(&data).unwrap().starts_with("data: "));
    assert_eq!(pulled.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn stream_error_aborts_the_event_stream() {
    let app = get_workflow_router(vec![Arc::new(BrokenStreamWorkflow { params: RunParameters::default() })]);

    let request = Request::builder()
        .method("POST")
        .uri("/workflow_playground/workflow/run/wf-broken-stream")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{}"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let mut body = response.into_body();
    let data = body.frame().await.unwrap().unwrap().into_data().unwrap();
    let first = std::str::from_utf8(&data).unwrap();
    let event: Value = serde_json::from_str(first.trim().strip_prefix("data: ").unwrap()).unwrap();
    assert_eq!(event["content"], "A");

    assert!(matches!(body.frame().await, Some(Err(_))), "the body must fail after the first event");
}

#[tokio::test]
async fn run_output_contradicting_declared_type_is_internal_error() {
    let app = get_workflow_router(vec![Arc::new(MismatchedWorkflow { params: RunParameters::default() })]);

    let (status, _) = send(&app, "POST", "/workflow_playground/workflow/run/wf-mismatched", Some(json!({}))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn run_failures_surface_as_internal_errors() {
    let app = get_workflow_router(vec![Arc::new(FailingWorkflow { params: RunParameters::default() })]);

    let (status, _) = send(&app, "POST", "/workflow_playground/workflow/run/wf-failing", Some(json!({}))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

// ===========================================================================
// Sessions
// ===========================================================================

#[tokio::test]
async fn session_endpoints_need_storage() {
    let (app, _) = stored_app().await;
    let user = json!({"user_id": "u1"});

    let calls = [
        ("POST", "/workflow_playground/workflow/session/all/wf-plain", user.clone()),
        ("POST", "/workflow_playground/workflow/wf-plain/session/s-named", user.clone()),
        ("POST", "/workflow_playground/workflow/wf-plain/session/s-named/rename", json!({"name": "x"})),
        ("DELETE", "/workflow_playground/workflow/wf-plain/session/s-named", user.clone()),
    ];

    for (method, uri, body) in calls {
        let (status, body) = send(&app, method, uri, Some(body)).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{} {}", method, uri);
        assert_eq!(body, json!({"detail": "Workflow does not have storage enabled"}), "{} {}", method, uri);
    }
}

#[tokio::test]
async fn all_sessions_are_summarized_for_the_user_in_storage_order() {
    let (app, _) = stored_app().await;

    let (status, body) = send(
        &app,
        "POST",
        "/workflow_playground/workflow/session/all/wf-stored",
        Some(json!({"user_id": "u1"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([
            {"title": "rust traits", "session_id": "s-run", "session_name": null, "created_at": 200},
            {"title": "Quarterly report", "session_id": "s-named", "session_name": "Quarterly report", "created_at": 100}
        ])
    );
}

#[tokio::test]
async fn session_is_returned_unmodified() {
    let (app, storage) = stored_app().await;
    let stored = storage.read("s-run", Some("u1")).await.unwrap().unwrap();

    let (status, body) = send(
        &app,
        "POST",
        "/workflow_playground/workflow/wf-stored/session/s-run",
        Some(json!({"user_id": "u1"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::to_value(&stored).unwrap());
}

#[tokio::test]
async fn missing_session_is_reported() {
    let (app, _) = stored_app().await;

    for (session_id, user_id) in [("does-not-exist", "u1"), ("s-other-user", "u1")] {
        let (status, body) = send(
            &app,
            "POST",
            &format!("/workflow_playground/workflow/wf-stored/session/{}", session_id),
            Some(json!({"user_id": user_id})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"detail": "Session not found"}));
    }
}

#[tokio::test]
async fn renamed_session_shows_up_in_listing() {
    let (app, _) = stored_app().await;

    let (status, body) = send(
        &app,
        "POST",
        "/workflow_playground/workflow/wf-stored/session/s-run/rename",
        Some(json!({"name": "Trait deep dive", "user_id": "u1"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["session_data"]["session_name"], "Trait deep dive");

    let (_, listing) = send(
        &app,
        "POST",
        "/workflow_playground/workflow/session/all/wf-stored",
        Some(json!({"user_id": "u1"})),
    )
    .await;
    assert_eq!(listing[0]["title"], "Trait deep dive");
    assert_eq!(listing[0]["session_name"], "Trait deep dive");
}

#[tokio::test]
async fn deleted_session_is_gone() {
    let (app, storage) = stored_app().await;
    let uri = "/workflow_playground/workflow/wf-stored/session/s-named";

    let (status, body) = send(&app, "DELETE", uri, Some(json!({"user_id": "u1"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "Session deleted"}));
    assert!(storage.read("s-named", None).await.unwrap().is_none());

    let (status, body) = send(&app, "DELETE", uri, Some(json!({"user_id": "u1"}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"detail": "Session not found"}));
}
