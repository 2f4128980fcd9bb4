//! Error types for task domain validation and parsing.

use super::{TaskId, TaskStatus};
use thiserror::Error;

/// Errors returned while constructing or mutating domain task values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The task title is empty after trimming.
    #[error("task title must not be empty")]
    EmptyTitle,

    /// The estimate is not a positive number of minutes.
    #[error("invalid estimate {0}, expected a positive number of minutes")]
    InvalidEstimate(u32),

    /// An attachment reference is blank.
    #[error("attachment reference must not be empty")]
    EmptyAttachment,

    /// The state machine does not allow the requested transition.
    #[error("task {task_id} cannot transition from {from} to {to}")]
    InvalidStateTransition {
        /// Task identifier.
        task_id: TaskId,
        /// Current status.
        from: TaskStatus,
        /// Requested status.
        to: TaskStatus,
    },

    /// QA assignment was requested while the task is not awaiting review.
    #[error("task {task_id} is {status}, QA can only be assigned while WAITING_FOR_QA")]
    NotAwaitingQa {
        /// Task identifier.
        task_id: TaskId,
        /// Current status.
        status: TaskStatus,
    },

    /// A QA reviewer is already assigned for the current review cycle.
    #[error("task {0} already has a QA reviewer")]
    QaAlreadyAssigned(TaskId),
}

/// Error returned while parsing task statuses.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status: {0}")]
pub struct ParseTaskStatusError(pub String);

/// Error returned while parsing priorities.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown priority: {0}")]
pub struct ParsePriorityError(pub String);

/// Error returned while parsing roles.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown role: {0}")]
pub struct ParseRoleError(pub String);

/// Error returned while parsing team categories.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown team category: {0}")]
pub struct ParseTeamCategoryError(pub String);
