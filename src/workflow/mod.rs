/// Workflow Layer
///
/// Everything the playground knows about workflows:
/// - The `Workflow` trait and its declared run metadata
/// - The immutable catalog the router looks workflows up in
/// - Memory and storage capabilities, and persisted sessions

// Core workflow type definitions
pub mod types;

// Immutable, indexed collection of registered workflows
pub mod catalog;

// Memory capability (run history)
pub mod memory;

// Session storage capability with in-memory and SQLite backends
pub mod storage;

// Persisted sessions and title derivation
pub mod session;

// Demo workflows bundled with the server
pub mod builtin;

// Re-export commonly used types
pub use catalog::WorkflowCatalog;
pub use memory::{MemoryKind, WorkflowMemory, WorkflowRun};
pub use session::{session_title, WorkflowSession};
pub use storage::{InMemoryWorkflowStorage, SqliteWorkflowStorage, StorageKind, WorkflowStorage};
pub use types::{
    RunEvent, RunInput, RunOutput, RunParameter, RunParameters, RunResponse, RunReturnType, Workflow,
};
