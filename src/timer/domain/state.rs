//! Threshold classification of a task's timer.

use super::Timer;
use crate::task::domain::EstimatedMinutes;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Timer state of a task relative to its estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimerState {
    /// The task does not exist.
    NoTask,
    /// The task is approved; timers are no longer shown.
    Approved,
    /// The latest timer is closed and stayed within the estimate.
    Used,
    /// The running timer reached the estimate, or the latest closed timer
    /// went over it.
    Exceeded,
    /// The running timer passed the warning share of the estimate.
    Warning,
    /// A timer is running below the warning threshold, or without estimate.
    Running,
    /// No timer has been started yet.
    Available,
}

impl TimerState {
    /// Returns the canonical wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NoTask => "NO_TASK",
            Self::Approved => "APPROVED",
            Self::Used => "USED",
            Self::Exceeded => "EXCEEDED",
            Self::Warning => "WARNING",
            Self::Running => "RUNNING",
            Self::Available => "AVAILABLE",
        }
    }
}

impl fmt::Display for TimerState {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Share of the estimate, in percent, at which a running timer warns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarningThreshold(u8);

impl WarningThreshold {
    /// Creates a threshold, clamped to `1..=99`.
    #[must_use]
    pub fn new(percent: u8) -> Self {
        Self(percent.clamp(1, 99))
    }

    /// Returns the percentage.
    #[must_use]
    pub const fn percent(self) -> u8 {
        self.0
    }
}

impl Default for WarningThreshold {
    fn default() -> Self {
        Self(80)
    }
}

/// Classifies a running timer.
///
/// Works on whole seconds with integer arithmetic so pollers and push
/// evaluation agree exactly: `EXCEEDED` iff `elapsed >= E`, `WARNING` iff
/// `elapsed >= threshold * E`, otherwise `RUNNING`.
#[must_use]
pub fn classify_elapsed(
    elapsed_seconds: i64,
    estimate: Option<EstimatedMinutes>,
    threshold: WarningThreshold,
) -> TimerState {
    let Some(limit) = estimate else {
        return TimerState::Running;
    };
    let scaled_elapsed = elapsed_seconds.saturating_mul(100);
    let budget = limit.seconds();
    if scaled_elapsed >= budget.saturating_mul(100) {
        TimerState::Exceeded
    } else if scaled_elapsed >= budget.saturating_mul(i64::from(threshold.percent())) {
        TimerState::Warning
    } else {
        TimerState::Running
    }
}

/// Classifies a closed timer from its recorded duration.
///
/// A timer closed by rotation has no recorded duration and counts as used.
#[must_use]
pub fn classify_closed(timer: &Timer, estimate: Option<EstimatedMinutes>) -> TimerState {
    match (timer.duration_minutes(), estimate) {
        (Some(duration), Some(limit)) if duration > limit.minutes() => TimerState::Exceeded,
        _ => TimerState::Used,
    }
}

/// Timer view returned to pollers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    /// Most recent timer, hidden for approved or missing tasks.
    pub timer: Option<Timer>,
    /// Derived state.
    pub state: TimerState,
    /// Whole seconds elapsed on the running timer.
    pub elapsed_seconds: Option<i64>,
    /// Whole seconds left before the estimate is reached; negative once
    /// exceeded.
    pub remaining_seconds: Option<i64>,
}

impl TimerSnapshot {
    /// Snapshot without a timer.
    #[must_use]
    pub const fn bare(state: TimerState) -> Self {
        Self {
            timer: None,
            state,
            elapsed_seconds: None,
            remaining_seconds: None,
        }
    }
}
