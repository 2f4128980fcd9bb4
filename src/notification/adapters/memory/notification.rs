//! In-memory repository for notification rows.

use async_trait::async_trait;
use std::sync::{Arc, RwLock};

use crate::notification::{
    domain::{Notification, NotificationId, NotificationKind},
    ports::NotificationRepository,
};
use crate::storage::{StorageError, StorageResult};
use crate::task::domain::{TaskId, UserId};

/// Thread-safe in-memory notification log.
#[derive(Debug, Clone, Default)]
pub struct InMemoryNotificationRepository {
    rows: Arc<RwLock<Vec<Notification>>>,
}

impl InMemoryNotificationRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NotificationRepository for InMemoryNotificationRepository {
    async fn store(&self, notification: &Notification) -> StorageResult<()> {
        let mut rows = self.rows.write().map_err(StorageError::poisoned)?;
        if rows.iter().any(|row| row.id() == notification.id()) {
            return Err(StorageError::conflict("notification", notification.id()));
        }
        rows.push(notification.clone());
        Ok(())
    }

    async fn store_once_for_task(
        &self,
        task_id: TaskId,
        kind: NotificationKind,
        notifications: &[Notification],
    ) -> StorageResult<bool> {
        let mut rows = self.rows.write().map_err(StorageError::poisoned)?;
        if rows
            .iter()
            .any(|row| row.task_id() == task_id && row.kind() == kind)
        {
            return Ok(false);
        }
        if let Some(duplicate) = notifications
            .iter()
            .find(|candidate| rows.iter().any(|row| row.id() == candidate.id()))
        {
            return Err(StorageError::conflict("notification", duplicate.id()));
        }
        rows.extend_from_slice(notifications);
        Ok(true)
    }

    async fn exists_for_task(
        &self,
        task_id: TaskId,
        kind: NotificationKind,
    ) -> StorageResult<bool> {
        let rows = self.rows.read().map_err(StorageError::poisoned)?;
        Ok(rows
            .iter()
            .any(|row| row.task_id() == task_id && row.kind() == kind))
    }

    async fn find_by_user(&self, user_id: UserId) -> StorageResult<Vec<Notification>> {
        let rows = self.rows.read().map_err(StorageError::poisoned)?;
        Ok(rows
            .iter()
            .rev()
            .filter(|row| row.user_id() == user_id)
            .cloned()
            .collect())
    }

    async fn find_by_task(&self, task_id: TaskId) -> StorageResult<Vec<Notification>> {
        let rows = self.rows.read().map_err(StorageError::poisoned)?;
        Ok(rows
            .iter()
            .filter(|row| row.task_id() == task_id)
            .cloned()
            .collect())
    }

    async fn mark_read(&self, id: NotificationId) -> StorageResult<Option<Notification>> {
        let mut rows = self.rows.write().map_err(StorageError::poisoned)?;
        Ok(rows.iter_mut().find(|row| row.id() == id).map(|row| {
            row.mark_read();
            row.clone()
        }))
    }
}
