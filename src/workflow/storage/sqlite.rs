/// SQLite persistence layer for workflow sessions
///
/// Sessions are stored one row each, with the JSON fields kept as text columns
/// so the schema stays stable while session payloads evolve.

use crate::workflow::{
    session::WorkflowSession,
    storage::{StorageKind, WorkflowStorage},
};
use anyhow::Result;
use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePool, SqliteRow},
    Row,
};
use std::path::Path;

/// SQLite-based session storage
#[derive(Debug, Clone)]
pub struct SqliteWorkflowStorage {
    /// SQLite connection pool for the session database
    pool: SqlitePool,
}

impl SqliteWorkflowStorage {
    /// Create storage over an existing pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (or create) a database file and prepare the schema
    pub async fn open(db_path: impl AsRef<Path>) -> Result<Self> {
        let db_path = db_path.as_ref();
        tracing::info!("🗄️ Opening workflow session database: {}", db_path.display());

        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true);
        let pool = SqlitePool::connect_with(options).await?;

        let storage = Self::new(pool);
        storage.create().await?;
        Ok(storage)
    }
}

fn json_text<T: serde::Serialize>(value: &Option<T>) -> Result<Option<String>> {
    value
        .as_ref()
        .map(serde_json::to_string)
        .transpose()
        .map_err(Into::into)
}

fn json_column<T: serde::de::DeserializeOwned>(row: &SqliteRow, column: &str) -> Result<Option<T>> {
    let text: Option<String> = row.try_get(column)?;
    text.map(|t| serde_json::from_str(&t))
        .transpose()
        .map_err(|e| anyhow::anyhow!("Invalid JSON in column '{}': {}", column, e))
}

fn session_from_row(row: &SqliteRow) -> Result<WorkflowSession> {
    Ok(WorkflowSession {
        session_id: row.try_get("session_id")?,
        workflow_id: row.try_get("workflow_id")?,
        user_id: row.try_get("user_id")?,
        memory: json_column::<Value>(row, "memory")?,
        workflow_data: json_column::<Map<String, Value>>(row, "workflow_data")?,
        user_data: json_column::<Map<String, Value>>(row, "user_data")?,
        session_data: json_column::<Map<String, Value>>(row, "session_data")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

#[async_trait]
impl WorkflowStorage for SqliteWorkflowStorage {
    fn kind(&self) -> StorageKind {
        StorageKind::SqliteWorkflowStorage
    }

    /// Creates the sessions table and its lookup indexes
    async fn create(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS workflow_sessions (
                session_id TEXT PRIMARY KEY,
                workflow_id TEXT,
                user_id TEXT,
                memory TEXT,
                workflow_data TEXT,
                user_data TEXT,
                session_data TEXT,
                created_at INTEGER,
                updated_at INTEGER
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_workflow_sessions_user ON workflow_sessions(user_id)")
            .execute(&self.pool)
            .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_workflow_sessions_workflow ON workflow_sessions(workflow_id)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn read(&self, session_id: &str, user_id: Option<&str>) -> Result<Option<WorkflowSession>> {
        let row = match user_id {
            Some(user_id) => {
                sqlx::query("SELECT * FROM workflow_sessions WHERE session_id = ? AND user_id = ?")
                    .bind(session_id)
                    .bind(user_id)
                    .fetch_optional(&self.pool)
                    .await?
            }
            None => {
                sqlx::query("SELECT * FROM workflow_sessions WHERE session_id = ?")
                    .bind(session_id)
                    .fetch_optional(&self.pool)
                    .await?
            }
        };

        row.as_ref().map(session_from_row).transpose()
    }

    async fn get_all_sessions(
        &self,
        user_id: Option<&str>,
        workflow_id: Option<&str>,
    ) -> Result<Vec<WorkflowSession>> {
        let mut filters = Vec::new();
        if user_id.is_some() {
            filters.push("user_id = ?");
        }
        if workflow_id.is_some() {
            filters.push("workflow_id = ?");
        }

        let mut sql = String::from("SELECT * FROM workflow_sessions");
        if !filters.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&filters.join(" AND "));
        }
        sql.push_str(" ORDER BY created_at DESC, rowid DESC");

        let mut query = sqlx::query(&sql);
        if let Some(user_id) = user_id {
            query = query.bind(user_id);
        }
        if let Some(workflow_id) = workflow_id {
            query = query.bind(workflow_id);
        }

        let rows = query.fetch_all(&self.pool).await?;
        rows.iter().map(session_from_row).collect()
    }

    /// Uses UPSERT so create and update are one atomic statement.
    /// `created_at` of an existing row is never overwritten.
    async fn upsert(&self, session: &WorkflowSession) -> Result<Option<WorkflowSession>> {
        let now = chrono::Utc::now().timestamp();

        sqlx::query(
            r#"
            INSERT INTO workflow_sessions
                (session_id, workflow_id, user_id, memory, workflow_data, user_data, session_data, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(session_id) DO UPDATE SET
                workflow_id = excluded.workflow_id,
                user_id = excluded.user_id,
                memory = excluded.memory,
                workflow_data = excluded.workflow_data,
                user_data = excluded.user_data,
                session_data = excluded.session_data,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&session.session_id)
        .bind(&session.workflow_id)
        .bind(&session.user_id)
        .bind(json_text(&session.memory)?)
        .bind(json_text(&session.workflow_data)?)
        .bind(json_text(&session.user_data)?)
        .bind(json_text(&session.session_data)?)
        .bind(session.created_at.unwrap_or(now))
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.read(&session.session_id, None).await
    }

    async fn delete_session(&self, session_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM workflow_sessions WHERE session_id = ?")
            .bind(session_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
