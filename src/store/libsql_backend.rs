//! libSQL backend — async `TaskStore` implementation.
//!
//! Supports local file and in-memory databases. The onboarding batch
//! insert runs inside a transaction so a partial batch never survives.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use libsql::{Connection, Database as LibSqlDatabase, params};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::StoreError;
use crate::store::migrations;
use crate::store::traits::TaskStore;
use crate::tasks::model::Task;

/// libSQL task store.
///
/// Stores a single connection that is reused for all operations.
/// `libsql::Connection` is `Send + Sync` and safe for concurrent async use.
pub struct LibSqlStore {
    #[allow(dead_code)]
    db: Arc<LibSqlDatabase>,
    conn: Connection,
}

impl LibSqlStore {
    /// Open (or create) a local database file and run migrations.
    pub async fn new_local(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                StoreError::Pool(format!("Failed to create database directory: {e}"))
            })?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| StoreError::Pool(format!("Failed to open libSQL database: {e}")))?;

        let store = Self::from_db(db).await?;
        info!(path = %path.display(), "Database opened");
        Ok(store)
    }

    /// Create an in-memory database (for tests).
    pub async fn new_memory() -> Result<Self, StoreError> {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| StoreError::Pool(format!("Failed to create in-memory database: {e}")))?;
        Self::from_db(db).await
    }

    async fn from_db(db: LibSqlDatabase) -> Result<Self, StoreError> {
        let conn = db
            .connect()
            .map_err(|e| StoreError::Pool(format!("Failed to create connection: {e}")))?;

        migrations::run_migrations(&conn).await?;
        Ok(Self {
            db: Arc::new(db),
            conn,
        })
    }

    fn conn(&self) -> &Connection {
        &self.conn
    }
}

// ── Helper functions ────────────────────────────────────────────────

/// Parse an RFC 3339 or SQLite datetime string into DateTime<Utc>.
fn parse_datetime(s: &str) -> DateTime<Utc> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return dt.with_timezone(&Utc);
    }
    if let Ok(ndt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
        return ndt.and_utc();
    }
    DateTime::<Utc>::MIN_UTC
}

/// Convert `Option<String>` to a libsql Value.
fn opt_text(s: Option<String>) -> libsql::Value {
    match s {
        Some(s) => libsql::Value::Text(s),
        None => libsql::Value::Null,
    }
}

const TASK_COLUMNS: &str =
    "id, owner_id, title, description, category, frequency, completed, completed_at, created_at";

/// Map a libsql Row to a Task. Column order matches TASK_COLUMNS.
fn row_to_task(row: &libsql::Row) -> Result<Task, StoreError> {
    let id_str: String = row
        .get(0)
        .map_err(|e| StoreError::Query(format!("task row id: {e}")))?;
    let id = Uuid::parse_str(&id_str)
        .map_err(|e| StoreError::Serialization(format!("task id {id_str}: {e}")))?;

    let category_str: String = row
        .get(4)
        .map_err(|e| StoreError::Query(format!("task row category: {e}")))?;
    let frequency_str: String = row
        .get(5)
        .map_err(|e| StoreError::Query(format!("task row frequency: {e}")))?;
    let category = category_str
        .parse()
        .map_err(|e| StoreError::Serialization(format!("{e}")))?;
    let frequency = frequency_str
        .parse()
        .map_err(|e| StoreError::Serialization(format!("{e}")))?;

    let completed: i64 = row
        .get(6)
        .map_err(|e| StoreError::Query(format!("task row completed: {e}")))?;
    let completed_at_str: Option<String> = row.get(7).ok();
    let created_str: String = row
        .get(8)
        .map_err(|e| StoreError::Query(format!("task row created_at: {e}")))?;

    Ok(Task {
        id,
        owner_id: row
            .get(1)
            .map_err(|e| StoreError::Query(format!("task row owner_id: {e}")))?,
        title: row
            .get(2)
            .map_err(|e| StoreError::Query(format!("task row title: {e}")))?,
        description: row
            .get(3)
            .map_err(|e| StoreError::Query(format!("task row description: {e}")))?,
        category,
        frequency,
        completed: completed != 0,
        completed_at: completed_at_str.as_deref().map(parse_datetime),
        created_at: parse_datetime(&created_str),
    })
}

const INSERT_TASK_SQL: &str = "INSERT INTO tasks (id, owner_id, title, description, category, frequency, completed, completed_at, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9) ON CONFLICT (id) DO NOTHING";

fn insert_params(task: &Task) -> impl libsql::params::IntoParams {
    params![
        task.id.to_string(),
        task.owner_id.clone(),
        task.title.clone(),
        task.description.clone(),
        task.category.as_str(),
        task.frequency.as_str(),
        task.completed as i64,
        opt_text(task.completed_at.map(|dt| dt.to_rfc3339())),
        task.created_at.to_rfc3339(),
    ]
}

// ── Trait implementation ────────────────────────────────────────────

#[async_trait]
impl TaskStore for LibSqlStore {
    async fn insert_task(&self, task: &Task) -> Result<(), StoreError> {
        self.conn()
            .execute(INSERT_TASK_SQL, insert_params(task))
            .await
            .map_err(|e| StoreError::Query(format!("insert_task: {e}")))?;

        debug!(task_id = %task.id, owner_id = %task.owner_id, "Task inserted");
        Ok(())
    }

    async fn insert_batch(&self, tasks: &[Task]) -> Result<(), StoreError> {
        let tx = self
            .conn()
            .transaction()
            .await
            .map_err(|e| StoreError::Query(format!("insert_batch begin: {e}")))?;

        for task in tasks {
            tx.execute(INSERT_TASK_SQL, insert_params(task))
                .await
                .map_err(|e| StoreError::Query(format!("insert_batch: {e}")))?;
        }

        tx.commit()
            .await
            .map_err(|e| StoreError::Query(format!("insert_batch commit: {e}")))?;

        debug!(count = tasks.len(), "Task batch inserted");
        Ok(())
    }

    async fn get_task(&self, id: Uuid) -> Result<Option<Task>, StoreError> {
        let mut rows = self
            .conn()
            .query(
                &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"),
                params![id.to_string()],
            )
            .await
            .map_err(|e| StoreError::Query(format!("get_task: {e}")))?;

        match rows.next().await {
            Ok(Some(row)) => Ok(Some(row_to_task(&row)?)),
            Ok(None) => Ok(None),
            Err(e) => Err(StoreError::Query(format!("get_task: {e}"))),
        }
    }

    async fn list_tasks(&self, owner_id: &str) -> Result<Vec<Task>, StoreError> {
        let mut rows = self
            .conn()
            .query(
                &format!(
                    "SELECT {TASK_COLUMNS} FROM tasks WHERE owner_id = ?1 ORDER BY created_at ASC"
                ),
                params![owner_id],
            )
            .await
            .map_err(|e| StoreError::Query(format!("list_tasks: {e}")))?;

        let mut tasks = Vec::new();
        while let Ok(Some(row)) = rows.next().await {
            match row_to_task(&row) {
                Ok(task) => tasks.push(task),
                Err(e) => {
                    tracing::warn!("Skipping task row: {e}");
                }
            }
        }
        Ok(tasks)
    }

    async fn update_completion(
        &self,
        id: Uuid,
        completed: bool,
        completed_at: Option<DateTime<Utc>>,
    ) -> Result<bool, StoreError> {
        let count = self
            .conn()
            .execute(
                "UPDATE tasks SET completed = ?1, completed_at = ?2 WHERE id = ?3",
                params![
                    completed as i64,
                    opt_text(completed_at.map(|dt| dt.to_rfc3339())),
                    id.to_string(),
                ],
            )
            .await
            .map_err(|e| StoreError::Query(format!("update_completion: {e}")))?;

        debug!(task_id = %id, completed, matched = count > 0, "Completion updated");
        Ok(count > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::model::{Category, Frequency};

    fn sample_task(owner: &str) -> Task {
        Task::new(
            owner,
            "Perform Fajr Prayer",
            "Wake up early and perform the Fajr prayer",
            Category::Prayer,
            Frequency::Daily,
        )
    }

    #[tokio::test]
    async fn insert_and_get_roundtrip() {
        let store = LibSqlStore::new_memory().await.unwrap();
        let task = sample_task("user1");
        store.insert_task(&task).await.unwrap();

        let loaded = store.get_task(task.id).await.unwrap().unwrap();
        assert_eq!(loaded.id, task.id);
        assert_eq!(loaded.owner_id, "user1");
        assert_eq!(loaded.title, task.title);
        assert_eq!(loaded.category, Category::Prayer);
        assert_eq!(loaded.frequency, Frequency::Daily);
        assert!(!loaded.completed);
        assert!(loaded.completed_at.is_none());
    }

    #[tokio::test]
    async fn get_unknown_id_returns_none() {
        let store = LibSqlStore::new_memory().await.unwrap();
        assert!(store.get_task(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn list_is_scoped_to_owner() {
        let store = LibSqlStore::new_memory().await.unwrap();
        store.insert_task(&sample_task("user1")).await.unwrap();
        store.insert_task(&sample_task("user1")).await.unwrap();
        store.insert_task(&sample_task("user2")).await.unwrap();

        let tasks = store.list_tasks("user1").await.unwrap();
        assert_eq!(tasks.len(), 2);
        assert!(tasks.iter().all(|t| t.owner_id == "user1"));
    }

    #[tokio::test]
    async fn update_completion_sets_and_clears_timestamp() {
        let store = LibSqlStore::new_memory().await.unwrap();
        let task = sample_task("user1");
        store.insert_task(&task).await.unwrap();

        let now = Utc::now();
        let matched = store.update_completion(task.id, true, Some(now)).await.unwrap();
        assert!(matched);

        let loaded = store.get_task(task.id).await.unwrap().unwrap();
        assert!(loaded.completed);
        let stored = loaded.completed_at.unwrap();
        assert!((stored - now).num_seconds().abs() < 2);

        store.update_completion(task.id, false, None).await.unwrap();
        let loaded = store.get_task(task.id).await.unwrap().unwrap();
        assert!(!loaded.completed);
        assert!(loaded.completed_at.is_none());
    }

    #[tokio::test]
    async fn update_unknown_id_matches_nothing() {
        let store = LibSqlStore::new_memory().await.unwrap();
        let matched = store
            .update_completion(Uuid::new_v4(), true, Some(Utc::now()))
            .await
            .unwrap();
        assert!(!matched);
        assert!(store.list_tasks("anyone").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn batch_insert_is_idempotent_on_retry() {
        let store = LibSqlStore::new_memory().await.unwrap();
        let tasks = vec![sample_task("user1"), sample_task("user1")];
        store.insert_batch(&tasks).await.unwrap();
        // Retrying the identical batch must not duplicate rows.
        store.insert_batch(&tasks).await.unwrap();

        assert_eq!(store.list_tasks("user1").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn local_file_store_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tanbih.db");

        let task = sample_task("user1");
        {
            let store = LibSqlStore::new_local(&path).await.unwrap();
            store.insert_task(&task).await.unwrap();
        }

        let store = LibSqlStore::new_local(&path).await.unwrap();
        let loaded = store.get_task(task.id).await.unwrap().unwrap();
        assert_eq!(loaded.title, task.title);
    }
}
