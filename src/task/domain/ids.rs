//! Identifier and validated scalar types for the task domain.

use super::TaskDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Declares a UUID-backed identifier newtype.
macro_rules! uuid_identifier {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(uuid::Uuid);

        impl $name {
            /// Creates a new random identifier.
            #[must_use]
            pub fn new() -> Self {
                Self(uuid::Uuid::new_v4())
            }

            /// Creates an identifier from an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: uuid::Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the wrapped UUID.
            #[must_use]
            pub const fn into_inner(self) -> uuid::Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl AsRef<uuid::Uuid> for $name {
            fn as_ref(&self) -> &uuid::Uuid {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

pub(crate) use uuid_identifier;

uuid_identifier!(
    /// Unique identifier for a task record.
    TaskId
);

uuid_identifier!(
    /// Unique identifier for a user known to the directory.
    UserId
);

uuid_identifier!(
    /// Reference to the project a task belongs to.
    ProjectId
);

/// Positive work estimate in whole minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EstimatedMinutes(u32);

impl EstimatedMinutes {
    /// Creates a validated estimate.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidEstimate`] when the value is zero.
    pub const fn new(value: u32) -> Result<Self, TaskDomainError> {
        if value == 0 {
            return Err(TaskDomainError::InvalidEstimate(value));
        }
        Ok(Self(value))
    }

    /// Returns the estimate in minutes.
    #[must_use]
    pub const fn minutes(self) -> u32 {
        self.0
    }

    /// Returns the estimate in seconds.
    #[must_use]
    pub const fn seconds(self) -> i64 {
        (self.0 as i64) * 60
    }
}

impl fmt::Display for EstimatedMinutes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}m", self.0)
    }
}

/// Reference to a stored attachment (file key or URL).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttachmentRef(String);

impl AttachmentRef {
    /// Creates a validated attachment reference.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyAttachment`] when the reference is
    /// blank.
    pub fn new(value: impl Into<String>) -> Result<Self, TaskDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(TaskDomainError::EmptyAttachment);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the reference as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for AttachmentRef {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}
