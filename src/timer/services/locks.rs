//! Per-task async mutexes.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::task::domain::TaskId;

/// Serializes timer operations per task without a global lock.
///
/// An entry lives only while some caller holds or awaits it.
#[derive(Debug, Default)]
pub struct TaskLocks {
    locks: Mutex<HashMap<TaskId, Arc<AsyncMutex<()>>>>,
}

/// Exclusive access to one task. Dropping it releases the task and prunes
/// the table entry when nobody else is waiting.
#[derive(Debug)]
pub struct TaskLockGuard<'a> {
    table: &'a TaskLocks,
    task_id: TaskId,
    guard: Option<OwnedMutexGuard<()>>,
}

impl TaskLocks {
    /// Creates an empty lock table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive access to `task_id`. Access is released when the
    /// guard drops.
    pub async fn acquire(&self, task_id: TaskId) -> TaskLockGuard<'_> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(locks.entry(task_id).or_default())
        };
        TaskLockGuard {
            table: self,
            task_id,
            guard: Some(lock.lock_owned().await),
        }
    }

    /// Number of tasks with a live entry.
    #[must_use]
    pub fn tracked(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn release(&self, task_id: TaskId) {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        if locks
            .get(&task_id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(&task_id);
        }
    }
}

impl Drop for TaskLockGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());
        self.table.release(self.task_id);
    }
}
