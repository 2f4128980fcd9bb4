//! In-memory user directory.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::storage::{StorageError, StorageResult};
use crate::task::{
    domain::{Role, TeamCategory, UserId, UserProfile},
    ports::UserDirectory,
};

/// Thread-safe in-memory user directory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserDirectory {
    users: Arc<RwLock<HashMap<UserId, UserProfile>>>,
}

impl InMemoryUserDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a user.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Persistence`] when the lock is poisoned.
    pub fn insert(&self, user: UserProfile) -> StorageResult<()> {
        let mut users = self.users.write().map_err(StorageError::poisoned)?;
        users.insert(user.id(), user);
        Ok(())
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn find_by_id(&self, id: UserId) -> StorageResult<Option<UserProfile>> {
        let users = self.users.read().map_err(StorageError::poisoned)?;
        Ok(users.get(&id).cloned())
    }

    async fn find_by_role(
        &self,
        role: Role,
        team: Option<TeamCategory>,
    ) -> StorageResult<Vec<UserProfile>> {
        let users = self.users.read().map_err(StorageError::poisoned)?;
        let mut matching: Vec<UserProfile> = users
            .values()
            .filter(|user| user.role() == role)
            .filter(|user| team.is_none_or(|scope| user.team() == Some(scope)))
            .cloned()
            .collect();
        matching.sort_by(|left, right| left.name().cmp(right.name()));
        Ok(matching)
    }
}
