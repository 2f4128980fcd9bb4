//! Shared repository failure type and bounded storage calls.
//!
//! Every port in the crate reports failures through [`StorageError`] so that
//! services can tell transient infrastructure problems apart from domain
//! outcomes such as a missing task.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Result type for repository operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors returned by repository implementations.
#[derive(Debug, Clone, Error)]
pub enum StorageError {
    /// The repository call did not complete within the configured bound.
    #[error("storage call timed out after {0:?}")]
    Timeout(Duration),

    /// A conditional write lost a race with a concurrent writer.
    #[error("concurrent modification of {entity} {id}")]
    Conflict {
        /// Kind of entity that was modified concurrently.
        entity: &'static str,
        /// Identifier of the entity.
        id: String,
    },

    /// A row expected to exist has disappeared.
    #[error("{entity} {id} does not exist")]
    Missing {
        /// Kind of entity that was missing.
        entity: &'static str,
        /// Identifier of the entity.
        id: String,
    },

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl StorageError {
    /// Wraps a persistence error.
    #[must_use]
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }

    /// Wraps a poisoned in-memory lock.
    #[must_use]
    pub fn poisoned(err: impl std::fmt::Display) -> Self {
        Self::persistence(std::io::Error::other(err.to_string()))
    }

    /// Builds a conflict error for the given entity.
    #[must_use]
    pub fn conflict(entity: &'static str, id: impl ToString) -> Self {
        Self::Conflict {
            entity,
            id: id.to_string(),
        }
    }

    /// Builds a missing-row error for the given entity.
    #[must_use]
    pub fn missing(entity: &'static str, id: impl ToString) -> Self {
        Self::Missing {
            entity,
            id: id.to_string(),
        }
    }

    /// Returns whether the error is an optimistic-concurrency conflict.
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}

/// Runs a repository call, failing with [`StorageError::Timeout`] when it
/// does not finish within `limit`.
///
/// # Errors
///
/// Returns the operation's own error, or [`StorageError::Timeout`] when the
/// bound elapses first.
pub async fn bounded<T, F>(limit: Duration, operation: F) -> StorageResult<T>
where
    F: Future<Output = StorageResult<T>>,
{
    match tokio::time::timeout(limit, operation).await {
        Ok(result) => result,
        Err(_elapsed) => Err(StorageError::Timeout(limit)),
    }
}
