//! In-memory repository for task workflow tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::storage::{StorageError, StorageResult};
use crate::task::{
    domain::{Task, TaskId, UserId},
    ports::TaskRepository,
};

/// Thread-safe in-memory task repository.
///
/// The version check and the write happen under one write lock, which gives
/// the same compare-and-swap behaviour as a conditional `UPDATE`.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskRepository {
    state: Arc<RwLock<HashMap<TaskId, Task>>>,
}

impl InMemoryTaskRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn store(&self, task: &Task) -> StorageResult<()> {
        let mut tasks = self.state.write().map_err(StorageError::poisoned)?;
        if tasks.contains_key(&task.id()) {
            return Err(StorageError::conflict("task", task.id()));
        }
        tasks.insert(task.id(), task.clone());
        Ok(())
    }

    async fn update(&self, task: &Task, expected_version: u64) -> StorageResult<()> {
        let mut tasks = self.state.write().map_err(StorageError::poisoned)?;
        let stored = tasks
            .get_mut(&task.id())
            .ok_or_else(|| StorageError::missing("task", task.id()))?;
        if stored.version() != expected_version {
            return Err(StorageError::conflict("task", task.id()));
        }
        *stored = task.clone();
        Ok(())
    }

    async fn find_by_id(&self, id: TaskId) -> StorageResult<Option<Task>> {
        let tasks = self.state.read().map_err(StorageError::poisoned)?;
        Ok(tasks.get(&id).cloned())
    }

    async fn find_by_assignee(&self, assignee: UserId) -> StorageResult<Vec<Task>> {
        let tasks = self.state.read().map_err(StorageError::poisoned)?;
        let mut owned: Vec<Task> = tasks
            .values()
            .filter(|task| task.assigned_to() == assignee)
            .cloned()
            .collect();
        owned.sort_by_key(Task::created_at);
        Ok(owned)
    }
}
