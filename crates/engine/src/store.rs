//! User record store and per-user serialization
//!
//! The store is a collaborator: the engine reads a record at the start of an
//! operation and writes it back at the end. `UserLocks` makes that
//! read-modify-write atomic per user so concurrent feedback and
//! recommendation calls for the same user cannot lose updates. Different
//! users never contend.

use crate::error::{RecommenderError, Result};
use crate::profile::UserRecord;
use crate::types::UserId;
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Persistence for `{user_id, preference_vector, exposure}`
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get(&self, user_id: &str) -> Result<Option<UserRecord>>;

    /// Insert a new record; fails with `UserExists` if the id is taken
    async fn insert(&self, record: UserRecord) -> Result<()>;

    /// Overwrite an existing record
    async fn put(&self, record: UserRecord) -> Result<()>;
}

/// Process-local user store
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    users: DashMap<UserId, UserRecord>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn get(&self, user_id: &str) -> Result<Option<UserRecord>> {
        Ok(self.users.get(user_id).map(|r| r.value().clone()))
    }

    async fn insert(&self, record: UserRecord) -> Result<()> {
        match self.users.entry(record.user_id.clone()) {
            Entry::Occupied(_) => Err(RecommenderError::UserExists(record.user_id)),
            Entry::Vacant(slot) => {
                slot.insert(record);
                Ok(())
            }
        }
    }

    async fn put(&self, record: UserRecord) -> Result<()> {
        match self.users.get_mut(&record.user_id) {
            Some(mut existing) => {
                *existing = record;
                Ok(())
            }
            None => Err(RecommenderError::UserNotFound(record.user_id)),
        }
    }
}

/// Registry of per-user mutexes
///
/// An entry lives only while some caller holds or waits on it; the last
/// guard to drop removes it, so ids that are never seen again cost nothing.
#[derive(Debug, Default)]
pub struct UserLocks {
    locks: DashMap<UserId, Arc<Mutex<()>>>,
}

impl UserLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `user_id`
    ///
    /// The guard can be held across `.await` points; drop it to release the
    /// user.
    pub async fn acquire(&self, user_id: &str) -> UserGuard<'_> {
        // Clone the Arc out so the shard lock is released before awaiting
        let lock = self
            .locks
            .entry(user_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let guard = lock.lock_owned().await;

        UserGuard {
            locks: &self.locks,
            user_id: user_id.to_string(),
            guard: Some(guard),
        }
    }

    /// Number of users with a live lock entry
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

/// Exclusive access to one user, released on drop
pub struct UserGuard<'a> {
    locks: &'a DashMap<UserId, Arc<Mutex<()>>>,
    user_id: UserId,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for UserGuard<'_> {
    fn drop(&mut self) {
        // Release the mutex first so only the registry holds the Arc when idle
        drop(self.guard.take());
        self.locks
            .remove_if(&self.user_id, |_, lock| Arc::strong_count(lock) == 1);
    }
}
