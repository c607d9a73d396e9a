//! Completion recording.
//!
//! `completed` and `completed_at` always change together: marking a task
//! done stamps the current UTC instant (refreshed on every repeat, i.e.
//! last-write-wins), and un-marking clears the timestamp.

use std::sync::Arc;

use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

use crate::error::TaskError;
use crate::store::TaskStore;
use crate::tasks::model::Task;

/// Toggles a task's completion state through the store.
pub struct CompletionRecorder {
    store: Arc<dyn TaskStore>,
}

impl CompletionRecorder {
    pub fn new(store: Arc<dyn TaskStore>) -> Self {
        Self { store }
    }

    /// Set a task's completion state and return the updated task.
    ///
    /// Fails with `TaskError::NotFound` when no task has the given id.
    pub async fn set_completion(&self, task_id: Uuid, completed: bool) -> Result<Task, TaskError> {
        let completed_at = completed.then(Utc::now);
        let matched = self
            .store
            .update_completion(task_id, completed, completed_at)
            .await?;
        if !matched {
            return Err(TaskError::NotFound { id: task_id });
        }

        debug!(%task_id, completed, "Task completion recorded");

        // The row matched a moment ago; a miss here means it vanished
        // under a concurrent writer, which we also report as not found.
        self.store
            .get_task(task_id)
            .await?
            .ok_or(TaskError::NotFound { id: task_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::tasks::model::{Category, Frequency};

    async fn seeded() -> (CompletionRecorder, Arc<MemoryStore>, Task) {
        let store = Arc::new(MemoryStore::new());
        let task = Task::new("user1", "Perform Fajr Prayer", "", Category::Prayer, Frequency::Daily);
        store.insert_task(&task).await.unwrap();
        let recorder = CompletionRecorder::new(store.clone());
        (recorder, store, task)
    }

    #[tokio::test]
    async fn completing_sets_timestamp() {
        let (recorder, _store, task) = seeded().await;
        let updated = recorder.set_completion(task.id, true).await.unwrap();
        assert!(updated.completed);
        let stamped = updated.completed_at.expect("completed_at should be set");
        assert!((Utc::now() - stamped).num_seconds().abs() < 2);
    }

    #[tokio::test]
    async fn uncompleting_clears_timestamp() {
        let (recorder, _store, task) = seeded().await;
        recorder.set_completion(task.id, true).await.unwrap();
        let updated = recorder.set_completion(task.id, false).await.unwrap();
        assert!(!updated.completed);
        assert!(updated.completed_at.is_none());
    }

    #[tokio::test]
    async fn repeat_completion_refreshes_timestamp() {
        let (recorder, _store, task) = seeded().await;
        let first = recorder.set_completion(task.id, true).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let second = recorder.set_completion(task.id, true).await.unwrap();

        assert!(second.completed);
        assert!(second.completed_at.unwrap() >= first.completed_at.unwrap());
    }

    #[tokio::test]
    async fn unknown_id_is_not_found_and_creates_nothing() {
        let (recorder, store, _task) = seeded().await;
        let missing = Uuid::new_v4();
        let err = recorder.set_completion(missing, true).await.unwrap_err();
        assert!(matches!(err, TaskError::NotFound { id } if id == missing));
        assert!(store.get_task(missing).await.unwrap().is_none());
    }
}
