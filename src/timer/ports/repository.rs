//! Repository port for timer rows.

use crate::storage::StorageResult;
use crate::task::domain::{TaskId, UserId};
use crate::timer::domain::Timer;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Timer persistence contract.
///
/// Implementations must apply [`rotate_open_timer`](Self::rotate_open_timer)
/// and [`close_open_timer`](Self::close_open_timer) atomically per task so
/// at most one timer per task is ever open.
#[async_trait]
pub trait TimerRepository: Send + Sync {
    /// Closes the task's open timer, if any, at the new timer's start time
    /// and inserts `timer` as the open timer.
    ///
    /// Returns the superseded timer.
    async fn rotate_open_timer(&self, timer: &Timer) -> StorageResult<Option<Timer>>;

    /// Stops the task's open timer at `end_time`, recording its duration.
    ///
    /// Returns `None` when the task has no open timer.
    async fn close_open_timer(
        &self,
        task_id: TaskId,
        end_time: DateTime<Utc>,
    ) -> StorageResult<Option<Timer>>;

    /// Returns the most recently started open timer of a user.
    async fn find_open_by_user(&self, user_id: UserId) -> StorageResult<Option<Timer>>;

    /// Returns the most recently started timer of a task.
    async fn latest_for_task(&self, task_id: TaskId) -> StorageResult<Option<Timer>>;

    /// Returns every timer of a task in start order.
    async fn list_for_task(&self, task_id: TaskId) -> StorageResult<Vec<Timer>>;
}
