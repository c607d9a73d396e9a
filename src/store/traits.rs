//! Backend-agnostic `TaskStore` trait.
//!
//! Every engine component takes a store at construction, so tests can
//! substitute the in-memory implementation for the libSQL backend.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::StoreError;
use crate::tasks::model::Task;

/// Persistence interface for tasks, keyed by task id and owner id.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Insert a single task.
    async fn insert_task(&self, task: &Task) -> Result<(), StoreError>;

    /// Insert an onboarding batch as one unit: either every task is
    /// persisted or none are. Tasks whose id already exists are left
    /// untouched, which makes a full-batch retry idempotent.
    async fn insert_batch(&self, tasks: &[Task]) -> Result<(), StoreError>;

    /// Look up a task by id.
    async fn get_task(&self, id: Uuid) -> Result<Option<Task>, StoreError>;

    /// All tasks belonging to one owner, oldest first.
    async fn list_tasks(&self, owner_id: &str) -> Result<Vec<Task>, StoreError>;

    /// Write `completed` and `completed_at` together in one update.
    /// Returns false when no task with the given id exists.
    async fn update_completion(
        &self,
        id: Uuid,
        completed: bool,
        completed_at: Option<DateTime<Utc>>,
    ) -> Result<bool, StoreError>;
}
