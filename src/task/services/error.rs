//! Service-level errors for workflow operations.

use thiserror::Error;

use crate::error::{ClassifiedError, ErrorKind};
use crate::notification::services::NotificationError;
use crate::storage::StorageError;
use crate::task::domain::{Role, TaskDomainError, TaskId, TaskStatus, UserId};

/// Errors returned by [`super::WorkflowEngine`].
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// No task exists with the given identifier.
    #[error("task {0} not found")]
    NotFound(TaskId),

    /// The actor's role or ownership does not permit the operation.
    #[error("{role} {actor} is not permitted to {action}")]
    Forbidden {
        /// Acting user.
        actor: UserId,
        /// Acting role.
        role: Role,
        /// Attempted operation.
        action: &'static str,
    },

    /// The state machine has no edge for the request.
    #[error("task {task_id} cannot transition from {from} to {to}")]
    InvalidTransition {
        /// Task identifier.
        task_id: TaskId,
        /// Current status.
        from: TaskStatus,
        /// Requested status as supplied by the caller.
        to: String,
    },

    /// QA assignment requested outside `WAITING_FOR_QA`.
    #[error("task {task_id} is {status}; QA can only be assigned while WAITING_FOR_QA")]
    NotAwaitingQa {
        /// Task identifier.
        task_id: TaskId,
        /// Current status.
        status: TaskStatus,
    },

    /// A QA reviewer is already assigned; reassignment is not allowed.
    #[error("task {0} already has a QA reviewer; reassignment is not allowed")]
    AlreadyAssigned(TaskId),

    /// A field value is malformed or out of range.
    #[error("invalid {field}: {reason}")]
    Validation {
        /// Offending field.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// A required field was not supplied.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// The requested assignee is unknown, not a worker, or in another team.
    #[error("user {0} cannot be assigned to this task")]
    InvalidAssignee(UserId),

    /// The QA reviewer supplied at creation is not a QA user.
    #[error("user {0} is not a QA reviewer")]
    InvalidQa(UserId),

    /// The user named in a QA assignment is not a QA user.
    #[error("user {0} is not a QA reviewer")]
    InvalidQaUser(UserId),

    /// A notification the operation exists to send could not be sent.
    #[error(transparent)]
    Notification(#[from] NotificationError),

    /// Repository operation failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ClassifiedError for WorkflowError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Forbidden { .. } => ErrorKind::Forbidden,
            Self::InvalidTransition { .. } | Self::NotAwaitingQa { .. } => {
                ErrorKind::InvalidTransition
            }
            Self::AlreadyAssigned(_) => ErrorKind::AlreadyAssigned,
            Self::Validation { .. } => ErrorKind::ValidationError,
            Self::MissingField(_) => ErrorKind::MissingField,
            Self::InvalidAssignee(_) => ErrorKind::InvalidAssignee,
            Self::InvalidQa(_) => ErrorKind::InvalidQa,
            Self::InvalidQaUser(_) => ErrorKind::InvalidQaUser,
            Self::Notification(inner) => inner.kind(),
            Self::Storage(_) => ErrorKind::StorageError,
        }
    }
}

impl From<TaskDomainError> for WorkflowError {
    fn from(error: TaskDomainError) -> Self {
        match error {
            TaskDomainError::EmptyTitle => Self::Validation {
                field: "title",
                reason: error.to_string(),
            },
            TaskDomainError::InvalidEstimate(_) => Self::Validation {
                field: "estimated_minutes",
                reason: error.to_string(),
            },
            TaskDomainError::EmptyAttachment => Self::Validation {
                field: "attachments",
                reason: error.to_string(),
            },
            TaskDomainError::InvalidStateTransition { task_id, from, to } => {
                Self::InvalidTransition {
                    task_id,
                    from,
                    to: to.as_str().to_owned(),
                }
            }
            TaskDomainError::NotAwaitingQa { task_id, status } => {
                Self::NotAwaitingQa { task_id, status }
            }
            TaskDomainError::QaAlreadyAssigned(task_id) => Self::AlreadyAssigned(task_id),
        }
    }
}

/// Result type for workflow operations.
pub type WorkflowResult<T> = Result<T, WorkflowError>;
