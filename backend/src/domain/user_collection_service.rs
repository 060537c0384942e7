//! Cache-backed user collection store.
//!
//! The whole collection lives as one JSON array under [`CacheKey::Users`].
//! Every operation reads the full array; mutations rebuild it in memory and
//! overwrite the key in a single write with a fixed TTL.
//!
//! No lock is held between the read and the write of a mutation. Two
//! concurrent mutations may read the same base collection, in which case the
//! later write discards the earlier one (lost update). Only the
//! [`CacheKey::UserNumber`] counter is atomic, because the cache engine
//! performs the increment itself.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::domain::ports::{CacheKey, UserCache, UserCacheError, UserCollection};
use crate::domain::{AddUsersOutcome, NewUsers, User, UserCollectionError, UserId, UserPatch};

/// Lifetime of the `users` key after each write: one day.
pub const DEFAULT_USERS_TTL: Duration = Duration::from_millis(86_400_000);

/// Store implementing [`UserCollection`] on top of a [`UserCache`].
///
/// Holds nothing but the cache handle and the TTL, so clones and separate
/// instances all observe the same state.
pub struct UserCollectionService<C: ?Sized> {
    cache: Arc<C>,
    ttl: Duration,
}

impl<C: ?Sized> Clone for UserCollectionService<C> {
    fn clone(&self) -> Self {
        Self {
            cache: Arc::clone(&self.cache),
            ttl: self.ttl,
        }
    }
}

impl<C> UserCollectionService<C>
where
    C: UserCache + ?Sized,
{
    /// Build a store with the default one-day TTL.
    pub fn new(cache: Arc<C>) -> Self {
        Self::with_ttl(cache, DEFAULT_USERS_TTL)
    }

    /// Build a store with a custom TTL for the `users` key.
    pub fn with_ttl(cache: Arc<C>, ttl: Duration) -> Self {
        Self { cache, ttl }
    }

    /// TTL applied on each write.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    async fn load(&self) -> Result<Vec<User>, UserCollectionError> {
        let raw = self
            .cache
            .get(CacheKey::Users)
            .await
            .map_err(read_failure)?;
        let Some(raw) = raw else {
            debug!(key = %CacheKey::Users, "user collection absent; treating as empty");
            return Ok(Vec::new());
        };
        match decode_collection(&raw) {
            Ok(users) => Ok(users),
            Err(err) => {
                warn!(
                    key = %CacheKey::Users,
                    error = %err,
                    "stored user collection is malformed; treating as empty"
                );
                Ok(Vec::new())
            }
        }
    }

    async fn store(&self, users: &[User]) -> Result<(), UserCollectionError> {
        let payload = serde_json::to_string(users).map_err(|err| {
            error!(error = %err, "failed to serialise user collection");
            UserCollectionError::cache_persist(err.to_string())
        })?;
        self.cache
            .set(CacheKey::Users, &payload, Some(self.ttl))
            .await
            .map_err(write_failure)
    }

    async fn record_added(&self, count: usize) {
        let delta = i64::try_from(count).unwrap_or(i64::MAX);
        match self.cache.increment(CacheKey::UserNumber, delta).await {
            Ok(total) => debug!(total, "user counter advanced"),
            Err(err) => warn!(error = %err, "failed to advance user counter"),
        }
    }
}

#[async_trait]
impl<C> UserCollection for UserCollectionService<C>
where
    C: UserCache + ?Sized,
{
    async fn list_users(&self) -> Result<Vec<User>, UserCollectionError> {
        let users = self.load().await?;
        debug!(count = users.len(), "listed users");
        Ok(users)
    }

    async fn add_users(&self, input: NewUsers) -> Result<AddUsersOutcome, UserCollectionError> {
        let incoming = input.into_vec();
        let mut users = self.load().await?;

        let duplicates = colliding_ids(&users, &incoming);
        if !duplicates.is_empty() {
            info!(ids = ?duplicates, "rejected add: duplicate user ids");
            return Err(UserCollectionError::DuplicateId { ids: duplicates });
        }
        if incoming.is_empty() {
            return Ok(AddUsersOutcome {
                added_count: 0,
                added: incoming,
            });
        }

        users.extend(incoming.iter().cloned());
        self.store(&users).await?;
        self.record_added(incoming.len()).await;
        info!(added = incoming.len(), total = users.len(), "users added");
        Ok(AddUsersOutcome {
            added_count: incoming.len(),
            added: incoming,
        })
    }

    async fn get_user_by_id(&self, id: UserId) -> Result<Option<User>, UserCollectionError> {
        let users = self.load().await?;
        Ok(users.into_iter().find(|user| user.id() == id))
    }

    async fn update_user(&self, id: UserId, patch: UserPatch) -> Result<User, UserCollectionError> {
        let mut users = self.load().await?;
        let Some(target) = users.iter_mut().find(|user| user.id() == id) else {
            debug!(%id, "update target missing");
            return Err(UserCollectionError::UserNotFound { id });
        };
        target.merge(&patch);
        let updated = target.clone();

        self.store(&users).await?;
        info!(%id, fields = patch.fields().len(), "user updated");
        Ok(updated)
    }

    async fn delete_user(&self, id: UserId) -> Result<(), UserCollectionError> {
        let users = self.load().await?;
        let before = users.len();
        let remaining: Vec<User> = users.into_iter().filter(|user| user.id() != id).collect();
        if remaining.len() == before {
            debug!(%id, "delete target missing");
            return Err(UserCollectionError::UserNotFound { id });
        }

        if remaining.is_empty() {
            self.cache
                .delete(CacheKey::Users)
                .await
                .map_err(write_failure)?;
        } else {
            self.store(&remaining).await?;
        }
        info!(%id, remaining = remaining.len(), "user deleted");
        Ok(())
    }

    async fn users_added_total(&self) -> Result<i64, UserCollectionError> {
        let raw = self
            .cache
            .get(CacheKey::UserNumber)
            .await
            .map_err(read_failure)?;
        match raw {
            None => Ok(0),
            Some(value) => value.trim().parse().map_err(|err| {
                UserCollectionError::retrieval(format!("user counter is not an integer: {err}"))
            }),
        }
    }

    async fn cache_reachable(&self) -> bool {
        match self.cache.exists(CacheKey::Users).await {
            Ok(_) => true,
            Err(err) => {
                warn!(error = %err, "user cache probe failed");
                false
            }
        }
    }
}

/// Parse the stored array, flattening nested arrays one level.
fn decode_collection(raw: &str) -> Result<Vec<User>, serde_json::Error> {
    let entries: Vec<Value> = serde_json::from_str(raw)?;
    let mut users = Vec::with_capacity(entries.len());
    for entry in entries {
        match entry {
            Value::Array(nested) => {
                for item in nested {
                    users.push(serde_json::from_value(item)?);
                }
            }
            other => users.push(serde_json::from_value(other)?),
        }
    }
    Ok(users)
}

/// Incoming ids that already exist or repeat within `incoming`, in first
/// appearance order.
fn colliding_ids(existing: &[User], incoming: &[User]) -> Vec<UserId> {
    let stored: HashSet<UserId> = existing.iter().map(User::id).collect();
    let mut seen = HashSet::with_capacity(incoming.len());
    let mut reported = HashSet::new();
    let mut duplicates = Vec::new();
    for id in incoming.iter().map(User::id) {
        let collides = stored.contains(&id) || !seen.insert(id);
        if collides && reported.insert(id) {
            duplicates.push(id);
        }
    }
    duplicates
}

fn read_failure(err: UserCacheError) -> UserCollectionError {
    error!(error = %err, "failed to read user collection");
    if err.is_connection() {
        UserCollectionError::cache_connect(err.to_string())
    } else {
        UserCollectionError::retrieval(err.to_string())
    }
}

fn write_failure(err: UserCacheError) -> UserCollectionError {
    error!(error = %err, "failed to write user collection");
    UserCollectionError::cache_persist(err.to_string())
}

#[cfg(test)]
#[path = "user_collection_service_tests.rs"]
mod tests;
