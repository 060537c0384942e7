//! Process-local cache adapter.
//!
//! Mirrors the Redis semantics the store relies on: string values, per-key
//! expiry measured from the last write, integer counters that keep their
//! expiry, and lazy eviction of expired keys on access.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use mockable::{Clock, DefaultClock};
use tokio::sync::Mutex;

use crate::domain::ports::{CacheKey, UserCache, UserCacheError};

const MIN_TTL: Duration = Duration::from_millis(1);

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Option<DateTime<Utc>>,
}

impl Entry {
    fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_none_or(|deadline| now < deadline)
    }
}

/// In-memory [`UserCache`] with clock-driven expiry.
///
/// Clones share the same map.
///
/// ```rust
/// use std::time::Duration;
/// use user_cache::domain::ports::{CacheKey, UserCache};
/// use user_cache::outbound::cache::InMemoryUserCache;
///
/// # tokio::runtime::Runtime::new().expect("runtime").block_on(async {
/// let cache = InMemoryUserCache::new();
/// cache.set(CacheKey::Users, "[]", Some(Duration::from_secs(60))).await.expect("set");
/// assert_eq!(cache.get(CacheKey::Users).await.expect("get").as_deref(), Some("[]"));
/// # });
/// ```
#[derive(Clone)]
pub struct InMemoryUserCache {
    entries: Arc<Mutex<HashMap<CacheKey, Entry>>>,
    clock: Arc<dyn Clock>,
}

impl Default for InMemoryUserCache {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryUserCache {
    /// Cache driven by the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(DefaultClock))
    }

    /// Cache driven by `clock`.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            clock,
        }
    }

    fn deadline(&self, ttl: Duration) -> Result<DateTime<Utc>, UserCacheError> {
        // Matches the Redis adapter, which sends at least one millisecond.
        let delta = TimeDelta::from_std(ttl.max(MIN_TTL))
            .map_err(|err| UserCacheError::command(format!("invalid expiry: {err}")))?;
        self.clock
            .utc()
            .checked_add_signed(delta)
            .ok_or_else(|| UserCacheError::command("expiry is out of range"))
    }
}

/// Drop `key` if it has expired and return whatever is still live.
fn live_entry(
    entries: &mut HashMap<CacheKey, Entry>,
    key: CacheKey,
    now: DateTime<Utc>,
) -> Option<&mut Entry> {
    if entries.get(&key).is_some_and(|entry| !entry.is_live(now)) {
        entries.remove(&key);
    }
    entries.get_mut(&key)
}

#[async_trait]
impl UserCache for InMemoryUserCache {
    async fn get(&self, key: CacheKey) -> Result<Option<String>, UserCacheError> {
        let now = self.clock.utc();
        let mut entries = self.entries.lock().await;
        Ok(live_entry(&mut entries, key, now).map(|entry| entry.value.clone()))
    }

    async fn set(
        &self,
        key: CacheKey,
        value: &str,
        ttl: Option<Duration>,
    ) -> Result<(), UserCacheError> {
        let expires_at = ttl.map(|ttl| self.deadline(ttl)).transpose()?;
        let mut entries = self.entries.lock().await;
        entries.insert(
            key,
            Entry {
                value: value.to_owned(),
                expires_at,
            },
        );
        Ok(())
    }

    async fn delete(&self, key: CacheKey) -> Result<bool, UserCacheError> {
        let now = self.clock.utc();
        let mut entries = self.entries.lock().await;
        let existed = live_entry(&mut entries, key, now).is_some();
        entries.remove(&key);
        Ok(existed)
    }

    async fn increment(&self, key: CacheKey, delta: i64) -> Result<i64, UserCacheError> {
        let now = self.clock.utc();
        let mut entries = self.entries.lock().await;
        let (current, expires_at) = match live_entry(&mut entries, key, now) {
            Some(entry) => {
                let current: i64 = entry.value.trim().parse().map_err(|_| {
                    UserCacheError::command("value is not an integer or out of range")
                })?;
                (current, entry.expires_at)
            }
            None => (0, None),
        };
        let next = current
            .checked_add(delta)
            .ok_or_else(|| UserCacheError::command("increment or decrement would overflow"))?;
        entries.insert(
            key,
            Entry {
                value: next.to_string(),
                expires_at,
            },
        );
        Ok(next)
    }

    async fn exists(&self, key: CacheKey) -> Result<bool, UserCacheError> {
        let now = self.clock.utc();
        let mut entries = self.entries.lock().await;
        Ok(live_entry(&mut entries, key, now).is_some())
    }
}
