//! Stable error classification shared by every service boundary.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Message rendered for storage failures at the external boundary.
const STORAGE_MESSAGE: &str = "storage is temporarily unavailable; retry the request";

/// Machine-readable error kind exposed to callers of the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The referenced entity does not exist.
    NotFound,
    /// The actor's role or ownership does not permit the operation.
    Forbidden,
    /// The requested status change is not legal from the current status.
    InvalidTransition,
    /// A QA reviewer is already assigned to the task.
    AlreadyAssigned,
    /// A field value is malformed or out of range.
    ValidationError,
    /// A required field was not supplied.
    MissingField,
    /// The requested assignee cannot own the task.
    InvalidAssignee,
    /// The requested QA reviewer supplied at creation is not a QA user.
    InvalidQa,
    /// The QA user named in an assignment is not a QA user.
    InvalidQaUser,
    /// The actor is not the owner of the task's timer.
    NotAuthorizedForTask,
    /// No open timer exists for the actor or task.
    NoActiveTimer,
    /// Transient infrastructure failure.
    StorageError,
}

impl ErrorKind {
    /// Returns the canonical wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::Forbidden => "forbidden",
            Self::InvalidTransition => "invalid_transition",
            Self::AlreadyAssigned => "already_assigned",
            Self::ValidationError => "validation_error",
            Self::MissingField => "missing_field",
            Self::InvalidAssignee => "invalid_assignee",
            Self::InvalidQa => "invalid_qa",
            Self::InvalidQaUser => "invalid_qa_user",
            Self::NotAuthorizedForTask => "not_authorized_for_task",
            Self::NoActiveTimer => "no_active_timer",
            Self::StorageError => "storage_error",
        }
    }

    /// Returns whether a caller may retry the request unchanged.
    #[must_use]
    pub const fn is_retryable(self) -> bool {
        matches!(self, Self::StorageError)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Errors that can be classified into an [`ErrorKind`].
pub trait ClassifiedError: std::error::Error {
    /// Returns the stable kind of this error.
    fn kind(&self) -> ErrorKind;
}

/// Error payload handed to the external boundary.
///
/// Storage failures are rendered with a generic message so adapter detail
/// never crosses the boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundaryError {
    /// Machine-readable kind.
    pub kind: ErrorKind,
    /// Human-readable description.
    pub message: String,
    /// Whether the caller may retry.
    pub retryable: bool,
}

impl BoundaryError {
    /// Builds the boundary payload for a classified error.
    #[must_use]
    pub fn from_error(error: &impl ClassifiedError) -> Self {
        let kind = error.kind();
        let message = if kind == ErrorKind::StorageError {
            STORAGE_MESSAGE.to_owned()
        } else {
            error.to_string()
        };
        Self {
            kind,
            message,
            retryable: kind.is_retryable(),
        }
    }
}
