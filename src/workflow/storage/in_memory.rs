/// Process-local session storage
///
/// Keeps sessions in insertion order behind a tokio `RwLock`. Nothing survives
/// a restart; useful for demos and tests.

use crate::workflow::{
    session::WorkflowSession,
    storage::{StorageKind, WorkflowStorage},
};
use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
pub struct InMemoryWorkflowStorage {
    sessions: RwLock<Vec<WorkflowSession>>,
}

impl InMemoryWorkflowStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

fn matches_user(session: &WorkflowSession, user_id: Option<&str>) -> bool {
    user_id.map_or(true, |user| session.user_id.as_deref() == Some(user))
}

#[async_trait]
impl WorkflowStorage for InMemoryWorkflowStorage {
    fn kind(&self) -> StorageKind {
        StorageKind::InMemoryWorkflowStorage
    }

    async fn create(&self) -> Result<()> {
        Ok(())
    }

    async fn read(&self, session_id: &str, user_id: Option<&str>) -> Result<Option<WorkflowSession>> {
        let sessions = self.sessions.read().await;
        Ok(sessions
            .iter()
            .find(|s| s.session_id == session_id && matches_user(s, user_id))
            .cloned())
    }

    async fn get_all_sessions(
        &self,
        user_id: Option<&str>,
        workflow_id: Option<&str>,
    ) -> Result<Vec<WorkflowSession>> {
        let sessions = self.sessions.read().await;
        // Newest insert first, then a stable sort keeps that order for equal timestamps
        let mut found: Vec<WorkflowSession> = sessions
            .iter()
            .rev()
            .filter(|s| matches_user(s, user_id))
            .filter(|s| workflow_id.map_or(true, |wf| s.workflow_id.as_deref() == Some(wf)))
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(found)
    }

    async fn upsert(&self, session: &WorkflowSession) -> Result<Option<WorkflowSession>> {
        let mut stored = session.clone();
        stored.updated_at = Some(chrono::Utc::now().timestamp());

        let mut sessions = self.sessions.write().await;
        match sessions.iter_mut().find(|s| s.session_id == session.session_id) {
            Some(existing) => {
                stored.created_at = existing.created_at.or(stored.created_at);
                *existing = stored.clone();
            }
            None => sessions.push(stored.clone()),
        }
        Ok(Some(stored))
    }

    async fn delete_session(&self, session_id: &str) -> Result<bool> {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|s| s.session_id != session_id);
        Ok(sessions.len() < before)
    }
}
