/// Workflow session storage capability
///
/// A workflow may carry a storage backend that persists its run sessions.
/// The playground only reads from it (and renames/deletes sessions); workflows
/// write to it while they run.

use crate::workflow::session::WorkflowSession;
use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

// Process-local storage backed by a vector
pub mod in_memory;

// SQLite persistence with sqlx
pub mod sqlite;

pub use in_memory::InMemoryWorkflowStorage;
pub use sqlite::SqliteWorkflowStorage;

/// Known storage capability kinds reported by the config endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StorageKind {
    InMemoryWorkflowStorage,
    SqliteWorkflowStorage,
}

impl StorageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageKind::InMemoryWorkflowStorage => "InMemoryWorkflowStorage",
            StorageKind::SqliteWorkflowStorage => "SqliteWorkflowStorage",
        }
    }
}

/// Session persistence used by workflows
///
/// `user_id` filters are applied only when provided. Implementations must be
/// safe for concurrent use.
#[async_trait]
pub trait WorkflowStorage: Send + Sync {
    /// Which backend this is
    fn kind(&self) -> StorageKind;

    /// Prepare the backend (create tables etc). Safe to call multiple times.
    async fn create(&self) -> Result<()>;

    /// Read one session, optionally scoped to a user
    async fn read(&self, session_id: &str, user_id: Option<&str>) -> Result<Option<WorkflowSession>>;

    /// All sessions, newest first, optionally scoped to a user and workflow
    ///
    /// The playground routes only ever scope by user and pass `None` for
    /// `workflow_id`; a storage shared by several workflows lists all of them.
    async fn get_all_sessions(
        &self,
        user_id: Option<&str>,
        workflow_id: Option<&str>,
    ) -> Result<Vec<WorkflowSession>>;

    /// Insert or update a session, returning the stored version
    async fn upsert(&self, session: &WorkflowSession) -> Result<Option<WorkflowSession>>;

    /// Delete a session by ID. Returns whether a session was removed.
    async fn delete_session(&self, session_id: &str) -> Result<bool>;
}
