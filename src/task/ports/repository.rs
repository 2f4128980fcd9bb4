//! Repository port for task persistence with version-conditional updates.

use crate::storage::StorageResult;
use crate::task::domain::{Task, TaskId, UserId};
use async_trait::async_trait;

/// Task persistence contract.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Stores a new task.
    ///
    /// # Errors
    ///
    /// Returns [`crate::storage::StorageError::Conflict`] when the task ID
    /// already exists.
    async fn store(&self, task: &Task) -> StorageResult<()>;

    /// Replaces a stored task only if its stored version still equals
    /// `expected_version`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::storage::StorageError::Conflict`] when another
    /// writer got there first, or [`crate::storage::StorageError::Missing`]
    /// when the task no longer exists.
    async fn update(&self, task: &Task, expected_version: u64) -> StorageResult<()>;

    /// Finds a task by identifier.
    ///
    /// Returns `None` when the task does not exist.
    async fn find_by_id(&self, id: TaskId) -> StorageResult<Option<Task>>;

    /// Returns all tasks assigned to the given user.
    async fn find_by_assignee(&self, assignee: UserId) -> StorageResult<Vec<Task>>;
}
