//! Timer tracker: start/stop of per-task timers and threshold detection.

use mockable::Clock;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use super::TaskLocks;
use crate::config::EngineConfig;
use crate::error::{ClassifiedError, ErrorKind};
use crate::notification::{
    domain::NotificationEvent, ports::NotificationRepository, services::NotificationDispatcher,
};
use crate::storage::{StorageError, bounded};
use crate::task::{
    domain::{Actor, Task, TaskId, TaskStatus, UserId},
    ports::{TaskRepository, UserDirectory},
};
use crate::timer::{
    domain::{Timer, TimerSnapshot, TimerState, WarningThreshold, classify_closed, classify_elapsed},
    ports::TimerRepository,
};
use chrono::{DateTime, Utc};

/// Service-level errors for timer operations.
#[derive(Debug, Error)]
pub enum TimerError {
    /// No task exists with the given identifier.
    #[error("task {0} not found")]
    TaskNotFound(TaskId),
    /// Only the assignee may time work on a task.
    #[error("user {actor} is not assigned to task {task_id}")]
    NotAuthorizedForTask {
        /// Task identifier.
        task_id: TaskId,
        /// Requesting user.
        actor: UserId,
    },
    /// Pending and approved tasks cannot be timed.
    #[error("task {task_id} is {status}; timers cannot be started")]
    NotTimeable {
        /// Task identifier.
        task_id: TaskId,
        /// Current status.
        status: TaskStatus,
    },
    /// No open timer was found.
    #[error("no active timer")]
    NoActiveTimer,
    /// Repository operation failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ClassifiedError for TimerError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::TaskNotFound(_) => ErrorKind::NotFound,
            Self::NotAuthorizedForTask { .. } => ErrorKind::NotAuthorizedForTask,
            Self::NotTimeable { .. } => ErrorKind::InvalidTransition,
            Self::NoActiveTimer => ErrorKind::NoActiveTimer,
            Self::Storage(_) => ErrorKind::StorageError,
        }
    }
}

/// Result type for timer service operations.
pub type TimerResult<T> = Result<T, TimerError>;

/// Timer orchestration service.
///
/// Start and stop are serialized per task, so two concurrent starts never
/// both close the same previous timer. Repeated polls raise at most one
/// `TIME_EXCEEDED` event because the notification store records it
/// atomically.
pub struct TimerTracker<T, M, N, U, C>
where
    T: TaskRepository,
    M: TimerRepository,
    N: NotificationRepository,
    U: UserDirectory,
    C: Clock + Send + Sync,
{
    tasks: Arc<T>,
    timers: Arc<M>,
    dispatcher: Arc<NotificationDispatcher<N, U, C>>,
    clock: Arc<C>,
    locks: TaskLocks,
    threshold: WarningThreshold,
    timeout: Duration,
    max_conflict_retries: u8,
}

impl<T, M, N, U, C> TimerTracker<T, M, N, U, C>
where
    T: TaskRepository,
    M: TimerRepository,
    N: NotificationRepository + 'static,
    U: UserDirectory,
    C: Clock + Send + Sync,
{
    /// Creates a timer tracker.
    #[must_use]
    pub fn new(
        tasks: Arc<T>,
        timers: Arc<M>,
        dispatcher: Arc<NotificationDispatcher<N, U, C>>,
        clock: Arc<C>,
        config: &EngineConfig,
    ) -> Self {
        Self {
            tasks,
            timers,
            dispatcher,
            clock,
            locks: TaskLocks::new(),
            threshold: WarningThreshold::new(config.warning_threshold_percent),
            timeout: config.storage_timeout(),
            max_conflict_retries: config.max_conflict_retries,
        }
    }

    /// Starts a timer on the actor's task, closing any timer already open
    /// for it.
    ///
    /// # Errors
    ///
    /// Returns [`TimerError::NotAuthorizedForTask`] unless the actor is the
    /// task's assignee, [`TimerError::TaskNotFound`] for unknown tasks,
    /// [`TimerError::NotTimeable`] for pending or approved tasks, or a
    /// storage error.
    pub async fn start_timer(&self, task_id: TaskId, actor: &Actor) -> TimerResult<Timer> {
        let task = self.load(task_id).await?;
        if task.assigned_to() != actor.id {
            tracing::warn!(
                %task_id,
                actor = %actor.id,
                role = %actor.role,
                "timer start rejected for non-assignee"
            );
            return Err(TimerError::NotAuthorizedForTask {
                task_id,
                actor: actor.id,
            });
        }
        self.start_for_assignee(&task).await
    }

    /// Starts a timer for the task's current assignee without an ownership
    /// check. Used by the workflow engine after a reassignment.
    ///
    /// # Errors
    ///
    /// Returns [`TimerError::NotTimeable`] for pending or approved tasks or
    /// a storage error.
    pub async fn start_for_assignee(&self, task: &Task) -> TimerResult<Timer> {
        if !task.status().allows_running_timer() {
            return Err(TimerError::NotTimeable {
                task_id: task.id(),
                status: task.status(),
            });
        }

        let _guard = self.locks.acquire(task.id()).await;
        let timer = Timer::start(
            task.id(),
            task.assigned_to(),
            task.status() == TaskStatus::Rework,
            &*self.clock,
        );
        let superseded = bounded(self.timeout, self.timers.rotate_open_timer(&timer)).await?;
        if let Some(previous) = superseded {
            tracing::debug!(task_id = %task.id(), timer_id = %previous.id(), "closed previous open timer");
        }
        self.record_first_start(task.id(), timer.start_time()).await;

        tracing::info!(
            task_id = %task.id(),
            timer_id = %timer.id(),
            user_id = %timer.user_id(),
            is_rework = timer.is_rework(),
            "timer started"
        );
        Ok(timer)
    }

    /// Stops the actor's open timer and returns its rounded duration.
    ///
    /// # Errors
    ///
    /// Returns [`TimerError::NoActiveTimer`] when the actor has no open
    /// timer, or a storage error.
    pub async fn stop_timer(&self, actor: &Actor) -> TimerResult<u32> {
        let open = bounded(self.timeout, self.timers.find_open_by_user(actor.id))
            .await?
            .ok_or(TimerError::NoActiveTimer)?;
        let stopped = self
            .stop_task_timer(open.task_id())
            .await?
            .ok_or(TimerError::NoActiveTimer)?;
        Ok(stopped.duration_minutes().unwrap_or_default())
    }

    /// Stops the task's open timer, if any.
    ///
    /// # Errors
    ///
    /// Returns a storage error when the repository fails.
    pub async fn stop_task_timer(&self, task_id: TaskId) -> TimerResult<Option<Timer>> {
        let _guard = self.locks.acquire(task_id).await;
        let now = self.clock.utc();
        let stopped = bounded(self.timeout, self.timers.close_open_timer(task_id, now)).await?;
        if let Some(timer) = &stopped {
            tracing::info!(
                %task_id,
                timer_id = %timer.id(),
                duration_minutes = ?timer.duration_minutes(),
                "timer stopped"
            );
        }
        Ok(stopped)
    }

    /// Derives the task's timer state and raises `TIME_EXCEEDED` the first
    /// time a running timer is observed past the estimate.
    ///
    /// # Errors
    ///
    /// Returns a storage error when the task or timer lookup fails.
    /// Notification failures are logged, not returned.
    pub async fn get_timer_state(&self, task_id: TaskId) -> TimerResult<TimerSnapshot> {
        let Some(task) = bounded(self.timeout, self.tasks.find_by_id(task_id)).await? else {
            return Ok(TimerSnapshot::bare(TimerState::NoTask));
        };
        if task.status() == TaskStatus::Approved {
            return Ok(TimerSnapshot::bare(TimerState::Approved));
        }
        let Some(latest) = bounded(self.timeout, self.timers.latest_for_task(task_id)).await? else {
            return Ok(TimerSnapshot::bare(TimerState::Available));
        };

        let now = self.clock.utc();
        let elapsed_seconds = latest.elapsed_at(now).num_seconds();
        let estimate = task.estimated_minutes();
        if !latest.is_open() {
            return Ok(TimerSnapshot {
                state: classify_closed(&latest, estimate),
                timer: Some(latest),
                elapsed_seconds: Some(elapsed_seconds),
                remaining_seconds: None,
            });
        }

        let state = classify_elapsed(elapsed_seconds, estimate, self.threshold);
        if state == TimerState::Exceeded {
            self.notify_exceeded(&task).await;
        }
        Ok(TimerSnapshot {
            timer: Some(latest),
            state,
            elapsed_seconds: Some(elapsed_seconds),
            remaining_seconds: estimate.map(|limit| limit.seconds() - elapsed_seconds),
        })
    }

    /// Returns every timer recorded for a task in start order.
    ///
    /// # Errors
    ///
    /// Returns a storage error when the lookup fails.
    pub async fn timers_for_task(&self, task_id: TaskId) -> TimerResult<Vec<Timer>> {
        Ok(bounded(self.timeout, self.timers.list_for_task(task_id)).await?)
    }

    async fn load(&self, task_id: TaskId) -> TimerResult<Task> {
        bounded(self.timeout, self.tasks.find_by_id(task_id))
            .await?
            .ok_or(TimerError::TaskNotFound(task_id))
    }

    async fn notify_exceeded(&self, task: &Task) {
        match self
            .dispatcher
            .notify(NotificationEvent::TimeExceeded, task)
            .await
        {
            Ok(deliveries) if !deliveries.is_empty() => {
                tracing::info!(task_id = %task.id(), "time exceeded notification raised");
            }
            Ok(_) => {}
            Err(error) => {
                tracing::warn!(task_id = %task.id(), %error, "time exceeded notification failed");
            }
        }
    }

    /// Records the task's first start time, retrying on version conflicts.
    /// Failure is logged; the timer itself is already committed.
    async fn record_first_start(&self, task_id: TaskId, started_at: DateTime<Utc>) {
        for _ in 0..=self.max_conflict_retries {
            let mut task = match bounded(self.timeout, self.tasks.find_by_id(task_id)).await {
                Ok(Some(task)) => task,
                Ok(None) => return,
                Err(error) => {
                    tracing::warn!(%task_id, %error, "could not load task to record start time");
                    return;
                }
            };
            let expected_version = task.version();
            if !task.record_first_start(started_at, &*self.clock) {
                return;
            }
            match bounded(self.timeout, self.tasks.update(&task, expected_version)).await {
                Ok(()) => return,
                Err(error) if error.is_conflict() => {}
                Err(error) => {
                    tracing::warn!(%task_id, %error, "could not record task start time");
                    return;
                }
            }
        }
        tracing::warn!(%task_id, "gave up recording task start time after repeated conflicts");
    }
}
