//! Redis adapter backed by a `bb8` connection pool.
//!
//! # Design
//!
//! - Pool checkout failures and I/O faults map to
//!   [`UserCacheError::Connection`]; anything the server rejects maps to
//!   [`UserCacheError::Command`].
//! - TTL writes use `SET key value PX <ms>` (via `PSETEX`) so expiry is
//!   always measured from the write.
//! - Counters use `INCRBY`, which Redis executes atomically.

use std::time::Duration;

use async_trait::async_trait;
use bb8_redis::RedisConnectionManager;
use bb8_redis::bb8::{Pool, PooledConnection, RunError};
use bb8_redis::redis::{AsyncCommands, RedisError};
use tracing::{debug, info};

use crate::domain::ports::{CacheKey, UserCache, UserCacheError};

/// Connection settings for [`RedisUserCache`].
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use user_cache::outbound::cache::RedisCacheConfig;
///
/// let config = RedisCacheConfig::new("redis://127.0.0.1:6379")
///     .with_max_size(32)
///     .with_connection_timeout(Duration::from_secs(2));
/// assert_eq!(config.url(), "redis://127.0.0.1:6379");
/// ```
#[derive(Debug, Clone)]
pub struct RedisCacheConfig {
    url: String,
    max_size: u32,
    connection_timeout: Duration,
}

impl RedisCacheConfig {
    /// Create a configuration for `url` with a pool of 16 connections and a
    /// five second checkout timeout.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_size: 16,
            connection_timeout: Duration::from_secs(5),
        }
    }

    /// Set the maximum number of pooled connections.
    #[must_use]
    pub fn with_max_size(mut self, max_size: u32) -> Self {
        self.max_size = max_size;
        self
    }

    /// Set how long a checkout may wait for a connection.
    #[must_use]
    pub fn with_connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }

    /// Redis connection URL.
    pub fn url(&self) -> &str {
        &self.url
    }
}

/// [`UserCache`] adapter talking to Redis.
#[derive(Clone)]
pub struct RedisUserCache {
    pool: Pool<RedisConnectionManager>,
}

impl RedisUserCache {
    /// Build the connection pool.
    ///
    /// # Errors
    ///
    /// Returns [`UserCacheError::Connection`] when the URL is invalid or the
    /// pool cannot be initialised.
    pub async fn connect(config: RedisCacheConfig) -> Result<Self, UserCacheError> {
        let manager = RedisConnectionManager::new(config.url.as_str())
            .map_err(|err| UserCacheError::connection(err.to_string()))?;
        let pool = Pool::builder()
            .max_size(config.max_size)
            .connection_timeout(config.connection_timeout)
            .build(manager)
            .await
            .map_err(|err| UserCacheError::connection(err.to_string()))?;
        info!(
            max_size = config.max_size,
            timeout_ms = config.connection_timeout.as_millis(),
            "redis user cache pool ready"
        );
        Ok(Self { pool })
    }

    async fn checkout(
        &self,
    ) -> Result<PooledConnection<'_, RedisConnectionManager>, UserCacheError> {
        self.pool.get().await.map_err(|err| match err {
            RunError::User(inner) => UserCacheError::connection(inner.to_string()),
            RunError::TimedOut => UserCacheError::connection("timed out waiting for a connection"),
        })
    }
}

fn map_redis_error(err: RedisError) -> UserCacheError {
    if err.is_io_error() || err.is_connection_dropped() || err.is_timeout() {
        UserCacheError::connection(err.to_string())
    } else {
        UserCacheError::command(err.to_string())
    }
}

fn ttl_millis(ttl: Duration) -> u64 {
    // PSETEX rejects a zero expiry.
    u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1)
}

#[async_trait]
impl UserCache for RedisUserCache {
    async fn get(&self, key: CacheKey) -> Result<Option<String>, UserCacheError> {
        let mut conn = self.checkout().await?;
        let value: Option<String> = conn.get(key.as_str()).await.map_err(map_redis_error)?;
        debug!(%key, hit = value.is_some(), "redis GET");
        Ok(value)
    }

    async fn set(
        &self,
        key: CacheKey,
        value: &str,
        ttl: Option<Duration>,
    ) -> Result<(), UserCacheError> {
        let mut conn = self.checkout().await?;
        match ttl {
            Some(ttl) => conn
                .pset_ex::<_, _, ()>(key.as_str(), value, ttl_millis(ttl))
                .await
                .map_err(map_redis_error)?,
            None => conn
                .set::<_, _, ()>(key.as_str(), value)
                .await
                .map_err(map_redis_error)?,
        }
        debug!(%key, bytes = value.len(), ?ttl, "redis SET");
        Ok(())
    }

    async fn delete(&self, key: CacheKey) -> Result<bool, UserCacheError> {
        let mut conn = self.checkout().await?;
        let removed: i64 = conn.del(key.as_str()).await.map_err(map_redis_error)?;
        Ok(removed > 0)
    }

    async fn increment(&self, key: CacheKey, delta: i64) -> Result<i64, UserCacheError> {
        let mut conn = self.checkout().await?;
        conn.incr(key.as_str(), delta).await.map_err(map_redis_error)
    }

    async fn exists(&self, key: CacheKey) -> Result<bool, UserCacheError> {
        let mut conn = self.checkout().await?;
        conn.exists(key.as_str()).await.map_err(map_redis_error)
    }
}
