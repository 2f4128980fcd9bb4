//! Repository port for notification rows.

use crate::notification::domain::{Notification, NotificationId, NotificationKind};
use crate::storage::StorageResult;
use crate::task::domain::{TaskId, UserId};
use async_trait::async_trait;

/// Notification persistence contract. Rows are append-only apart from the
/// read flag.
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    /// Appends a notification.
    async fn store(&self, notification: &Notification) -> StorageResult<()>;

    /// Appends `notifications` unless a notification of `kind` already
    /// exists for the task. The check and the append form one atomic step,
    /// so concurrent callers sharing the store write the batch at most once.
    ///
    /// Returns `false`, storing nothing, when such a notification exists.
    async fn store_once_for_task(
        &self,
        task_id: TaskId,
        kind: NotificationKind,
        notifications: &[Notification],
    ) -> StorageResult<bool>;

    /// Returns whether any notification of `kind` exists for the task.
    async fn exists_for_task(&self, task_id: TaskId, kind: NotificationKind)
    -> StorageResult<bool>;

    /// Returns a user's notifications, newest first.
    async fn find_by_user(&self, user_id: UserId) -> StorageResult<Vec<Notification>>;

    /// Returns a task's notifications in creation order.
    async fn find_by_task(&self, task_id: TaskId) -> StorageResult<Vec<Notification>>;

    /// Sets the read flag.
    ///
    /// Returns `None` when the notification does not exist.
    async fn mark_read(&self, id: NotificationId) -> StorageResult<Option<Notification>>;
}
