//! Timer entity recording one interval of work on a task.

use crate::task::domain::{TaskId, UserId, uuid_identifier};
use chrono::{DateTime, Duration, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

uuid_identifier!(
    /// Unique identifier for a timer row.
    TimerId
);

/// One measured work interval for a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timer {
    id: TimerId,
    task_id: TaskId,
    user_id: UserId,
    start_time: DateTime<Utc>,
    end_time: Option<DateTime<Utc>>,
    duration_minutes: Option<u32>,
    is_rework: bool,
}

impl Timer {
    /// Opens a timer starting now.
    #[must_use]
    pub fn start(task_id: TaskId, user_id: UserId, is_rework: bool, clock: &impl Clock) -> Self {
        Self {
            id: TimerId::new(),
            task_id,
            user_id,
            start_time: clock.utc(),
            end_time: None,
            duration_minutes: None,
            is_rework,
        }
    }

    /// Returns the timer identifier.
    #[must_use]
    pub const fn id(&self) -> TimerId {
        self.id
    }

    /// Returns the task being timed.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the user who started the timer.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns when the timer started.
    #[must_use]
    pub const fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    /// Returns when the timer ended, if it has.
    #[must_use]
    pub const fn end_time(&self) -> Option<DateTime<Utc>> {
        self.end_time
    }

    /// Returns the stored duration; only set by an explicit stop.
    #[must_use]
    pub const fn duration_minutes(&self) -> Option<u32> {
        self.duration_minutes
    }

    /// Returns whether the task was in rework when the timer started.
    #[must_use]
    pub const fn is_rework(&self) -> bool {
        self.is_rework
    }

    /// Returns whether the timer is still running.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.end_time.is_none()
    }

    /// Returns the wall-clock time elapsed at `now`, never negative.
    #[must_use]
    pub fn elapsed_at(&self, now: DateTime<Utc>) -> Duration {
        let end = self.end_time.unwrap_or(now);
        (end - self.start_time).max(Duration::zero())
    }

    /// Closes the timer because a newer one replaced it. No duration is
    /// recorded.
    pub fn supersede(&mut self, at: DateTime<Utc>) {
        if self.end_time.is_none() {
            self.end_time = Some(at);
        }
    }

    /// Stops the timer and records its rounded duration.
    ///
    /// Returns the recorded duration in minutes.
    pub fn stop(&mut self, at: DateTime<Utc>) -> u32 {
        self.end_time = Some(at);
        let minutes = rounded_minutes(self.elapsed_at(at));
        self.duration_minutes = Some(minutes);
        minutes
    }
}

/// Rounds a duration to the nearest whole minute, half up.
#[must_use]
pub fn rounded_minutes(elapsed: Duration) -> u32 {
    let minutes = (elapsed.max(Duration::zero()) + Duration::seconds(30)).num_minutes();
    u32::try_from(minutes).unwrap_or(u32::MAX)
}
