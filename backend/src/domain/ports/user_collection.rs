//! Driving port for user collection use-cases.
//!
//! HTTP handlers depend on this trait rather than on the cache-backed
//! service so they stay free of outbound concerns.

use async_trait::async_trait;

use crate::domain::{AddUsersOutcome, NewUsers, User, UserCollectionError, UserId, UserPatch};

/// Operations exposed to inbound adapters.
#[async_trait]
pub trait UserCollection: Send + Sync {
    /// Every stored user, flattened and in stored order.
    async fn list_users(&self) -> Result<Vec<User>, UserCollectionError>;

    /// Append one or more users atomically with respect to id collisions.
    async fn add_users(&self, input: NewUsers) -> Result<AddUsersOutcome, UserCollectionError>;

    /// The first user with `id`, if any.
    async fn get_user_by_id(&self, id: UserId) -> Result<Option<User>, UserCollectionError>;

    /// Shallow-merge `patch` into the user with `id`.
    async fn update_user(&self, id: UserId, patch: UserPatch) -> Result<User, UserCollectionError>;

    /// Remove the user with `id`.
    async fn delete_user(&self, id: UserId) -> Result<(), UserCollectionError>;

    /// Count of users ever added.
    async fn users_added_total(&self) -> Result<i64, UserCollectionError>;

    /// Whether the backing cache answers.
    async fn cache_reachable(&self) -> bool;
}
