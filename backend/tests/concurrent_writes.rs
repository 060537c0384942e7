//! Concurrency behaviour of the whole-collection read-modify-write.
//!
//! Two adds that both read the collection before either writes it race: the
//! later write replaces the earlier one, so one user is lost while the atomic
//! counter still records both.
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rstest::rstest;
use serde_json::Map;
use tokio::sync::Barrier;
use user_cache::domain::ports::{CacheKey, UserCache, UserCacheError, UserCollection};
use user_cache::domain::{NewUsers, User, UserCollectionService, UserId};
use user_cache::outbound::cache::InMemoryUserCache;

/// Cache whose collection reads wait until `parties` readers have arrived.
struct GatedReads {
    inner: InMemoryUserCache,
    gate: Barrier,
}

impl GatedReads {
    fn new(parties: usize) -> Self {
        Self {
            inner: InMemoryUserCache::new(),
            gate: Barrier::new(parties),
        }
    }
}

#[async_trait]
impl UserCache for GatedReads {
    async fn get(&self, key: CacheKey) -> Result<Option<String>, UserCacheError> {
        let value = self.inner.get(key).await?;
        if key == CacheKey::Users {
            self.gate.wait().await;
        }
        Ok(value)
    }

    async fn set(
        &self,
        key: CacheKey,
        value: &str,
        ttl: Option<Duration>,
    ) -> Result<(), UserCacheError> {
        self.inner.set(key, value, ttl).await
    }

    async fn delete(&self, key: CacheKey) -> Result<bool, UserCacheError> {
        self.inner.delete(key).await
    }

    async fn increment(&self, key: CacheKey, delta: i64) -> Result<i64, UserCacheError> {
        self.inner.increment(key, delta).await
    }

    async fn exists(&self, key: CacheKey) -> Result<bool, UserCacheError> {
        self.inner.exists(key).await
    }
}

fn user(id: i64) -> User {
    User::new(UserId::new(id), Map::new())
}

#[rstest]
#[tokio::test]
async fn overlapping_adds_lose_one_update() {
    let cache = Arc::new(GatedReads::new(2));
    cache
        .inner
        .set(CacheKey::Users, r#"[{"id":1}]"#, None)
        .await
        .expect("seed collection");
    let first = UserCollectionService::new(cache.clone());
    let second = UserCollectionService::new(cache.clone());

    let (a, b) = tokio::join!(
        first.add_users(NewUsers::from(user(2))),
        second.add_users(NewUsers::from(user(3))),
    );
    a.expect("first add succeeds");
    b.expect("second add succeeds");

    let ids: Vec<i64> = cache
        .inner
        .get(CacheKey::Users)
        .await
        .expect("read collection")
        .map(|raw| serde_json::from_str::<Vec<User>>(&raw).expect("stored JSON"))
        .expect("collection present")
        .iter()
        .map(|user| user.id().get())
        .collect();
    assert_eq!(ids.len(), 2, "one of the concurrent adds is lost: {ids:?}");
    assert_eq!(ids.first(), Some(&1));
    assert!(ids.contains(&2) ^ ids.contains(&3));

    let total = first.users_added_total().await.expect("counter");
    assert_eq!(total, 2, "the counter is atomic and records both adds");
}

#[rstest]
#[tokio::test]
async fn sequential_adds_keep_every_user() {
    let cache = Arc::new(InMemoryUserCache::new());
    let service = UserCollectionService::new(cache);

    service
        .add_users(NewUsers::from(user(2)))
        .await
        .expect("first add");
    service
        .add_users(NewUsers::from(user(3)))
        .await
        .expect("second add");

    let ids: Vec<i64> = service
        .list_users()
        .await
        .expect("list users")
        .iter()
        .map(|user| user.id().get())
        .collect();
    assert_eq!(ids, vec![2, 3]);
}
