//! Read-only user directory port used for validation and recipient pools.

use crate::storage::StorageResult;
use crate::task::domain::{Role, TeamCategory, UserId, UserProfile};
use async_trait::async_trait;

/// Lookup contract over the externally managed user store.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Finds a user by identifier.
    async fn find_by_id(&self, id: UserId) -> StorageResult<Option<UserProfile>>;

    /// Returns users holding `role`, restricted to `team` when given.
    async fn find_by_role(
        &self,
        role: Role,
        team: Option<TeamCategory>,
    ) -> StorageResult<Vec<UserProfile>>;
}
