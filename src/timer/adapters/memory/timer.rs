//! In-memory repository for timer rows.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::storage::{StorageError, StorageResult};
use crate::task::domain::{TaskId, UserId};
use crate::timer::{domain::Timer, ports::TimerRepository};

/// Thread-safe in-memory timer repository.
///
/// Timers are kept per task in start order; rotation and closing run under
/// a single write lock.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTimerRepository {
    state: Arc<RwLock<HashMap<TaskId, Vec<Timer>>>>,
}

impl InMemoryTimerRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn open_timer_mut(timers: &mut [Timer]) -> Option<&mut Timer> {
    timers.iter_mut().rev().find(|timer| timer.is_open())
}

#[async_trait]
impl TimerRepository for InMemoryTimerRepository {
    async fn rotate_open_timer(&self, timer: &Timer) -> StorageResult<Option<Timer>> {
        let mut state = self.state.write().map_err(StorageError::poisoned)?;
        let timers = state.entry(timer.task_id()).or_default();
        let superseded = open_timer_mut(timers).map(|open| {
            open.supersede(timer.start_time());
            open.clone()
        });
        timers.push(timer.clone());
        Ok(superseded)
    }

    async fn close_open_timer(
        &self,
        task_id: TaskId,
        end_time: DateTime<Utc>,
    ) -> StorageResult<Option<Timer>> {
        let mut state = self.state.write().map_err(StorageError::poisoned)?;
        let closed = state
            .get_mut(&task_id)
            .and_then(|timers| open_timer_mut(timers))
            .map(|open| {
                open.stop(end_time);
                open.clone()
            });
        Ok(closed)
    }

    async fn find_open_by_user(&self, user_id: UserId) -> StorageResult<Option<Timer>> {
        let state = self.state.read().map_err(StorageError::poisoned)?;
        Ok(state
            .values()
            .flatten()
            .filter(|timer| timer.is_open() && timer.user_id() == user_id)
            .max_by_key(|timer| timer.start_time())
            .cloned())
    }

    async fn latest_for_task(&self, task_id: TaskId) -> StorageResult<Option<Timer>> {
        let state = self.state.read().map_err(StorageError::poisoned)?;
        Ok(state
            .get(&task_id)
            .and_then(|timers| timers.last())
            .cloned())
    }

    async fn list_for_task(&self, task_id: TaskId) -> StorageResult<Vec<Timer>> {
        let state = self.state.read().map_err(StorageError::poisoned)?;
        Ok(state.get(&task_id).cloned().unwrap_or_default())
    }
}
