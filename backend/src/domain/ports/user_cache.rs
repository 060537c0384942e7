//! Port for the key-value cache holding the user collection.
//!
//! Adapters translate these primitives into calls against a concrete engine.
//! A missing or expired key is a normal result (`None`/`false`), never an
//! error.

use std::time::Duration;

use async_trait::async_trait;

use super::{CacheKey, define_port_error};

define_port_error! {
    /// Errors raised by cache adapters.
    pub enum UserCacheError {
        /// The engine could not be reached or no connection was available.
        Connection { message: String } => "user cache connection failed: {message}",
        /// The engine rejected or failed to execute a command.
        Command { message: String } => "user cache command failed: {message}",
    }
}

impl UserCacheError {
    /// Whether the failure happened before the command reached the engine.
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::Connection { .. })
    }
}

/// Primitive cache operations used by the user collection.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserCache: Send + Sync {
    /// Read the raw string stored under `key`.
    async fn get(&self, key: CacheKey) -> Result<Option<String>, UserCacheError>;

    /// Store `value` under `key`. With a `ttl` the key expires that long
    /// after this write; without one it never expires.
    async fn set(
        &self,
        key: CacheKey,
        value: &str,
        ttl: Option<Duration>,
    ) -> Result<(), UserCacheError>;

    /// Remove `key`, returning whether anything was removed.
    async fn delete(&self, key: CacheKey) -> Result<bool, UserCacheError>;

    /// Atomically add `delta` to the counter at `key` (absent counts as 0)
    /// and return the new value.
    async fn increment(&self, key: CacheKey, delta: i64) -> Result<i64, UserCacheError>;

    /// Whether `key` currently holds a live value.
    async fn exists(&self, key: CacheKey) -> Result<bool, UserCacheError>;
}
