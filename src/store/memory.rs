//! In-memory `TaskStore` — a `HashMap` behind a lock.
//!
//! Exists so engine components can be tested without a database, and
//! doubles as a reference implementation of the store contract.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::StoreError;
use crate::store::traits::TaskStore;
use crate::tasks::model::Task;

/// In-memory task store.
#[derive(Default)]
pub struct MemoryStore {
    tasks: RwLock<HashMap<Uuid, Task>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_err() -> StoreError {
        StoreError::Pool("task map lock poisoned".to_string())
    }
}

#[async_trait]
impl TaskStore for MemoryStore {
    async fn insert_task(&self, task: &Task) -> Result<(), StoreError> {
        let mut tasks = self.tasks.write().map_err(|_| Self::lock_err())?;
        tasks.entry(task.id).or_insert_with(|| task.clone());
        Ok(())
    }

    async fn insert_batch(&self, batch: &[Task]) -> Result<(), StoreError> {
        // Single write lock covers the whole batch, so it is all-or-nothing.
        let mut tasks = self.tasks.write().map_err(|_| Self::lock_err())?;
        for task in batch {
            tasks.entry(task.id).or_insert_with(|| task.clone());
        }
        Ok(())
    }

    async fn get_task(&self, id: Uuid) -> Result<Option<Task>, StoreError> {
        let tasks = self.tasks.read().map_err(|_| Self::lock_err())?;
        Ok(tasks.get(&id).cloned())
    }

    async fn list_tasks(&self, owner_id: &str) -> Result<Vec<Task>, StoreError> {
        let tasks = self.tasks.read().map_err(|_| Self::lock_err())?;
        let mut owned: Vec<Task> = tasks
            .values()
            .filter(|t| t.owner_id == owner_id)
            .cloned()
            .collect();
        owned.sort_by_key(|t| t.created_at);
        Ok(owned)
    }

    async fn update_completion(
        &self,
        id: Uuid,
        completed: bool,
        completed_at: Option<DateTime<Utc>>,
    ) -> Result<bool, StoreError> {
        let mut tasks = self.tasks.write().map_err(|_| Self::lock_err())?;
        match tasks.get_mut(&id) {
            Some(task) => {
                task.completed = completed;
                task.completed_at = completed_at;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::model::{Category, Frequency};

    #[tokio::test]
    async fn roundtrip_and_owner_scoping() {
        let store = MemoryStore::new();
        let task = Task::new("user1", "Give Charity", "", Category::Charity, Frequency::Weekly);
        store.insert_task(&task).await.unwrap();
        store
            .insert_task(&Task::new("user2", "Other", "", Category::Dua, Frequency::Daily))
            .await
            .unwrap();

        assert_eq!(store.get_task(task.id).await.unwrap().unwrap().id, task.id);
        assert_eq!(store.list_tasks("user1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn reinsert_keeps_existing_row() {
        let store = MemoryStore::new();
        let task = Task::new("user1", "Morning Dhikr", "", Category::Dhikr, Frequency::Daily);
        store.insert_task(&task).await.unwrap();
        store
            .update_completion(task.id, true, Some(Utc::now()))
            .await
            .unwrap();

        // Same-id insert (a batch retry) must not reset completion state.
        store.insert_task(&task).await.unwrap();
        assert!(store.get_task(task.id).await.unwrap().unwrap().completed);
    }

    #[tokio::test]
    async fn update_unknown_id_reports_no_match() {
        let store = MemoryStore::new();
        assert!(!store.update_completion(Uuid::new_v4(), true, Some(Utc::now())).await.unwrap());
    }
}
