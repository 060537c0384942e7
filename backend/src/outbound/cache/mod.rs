//! Cache adapters implementing the [`UserCache`](crate::domain::ports::UserCache) port.
//!
//! - [`RedisUserCache`]: production adapter over a `bb8-redis` pool.
//! - [`InMemoryUserCache`]: process-local map used for development runs
//!   without Redis and for tests. TTLs are evaluated against an injected
//!   clock.

mod in_memory;
mod redis;

pub use in_memory::InMemoryUserCache;
pub use redis::{RedisCacheConfig, RedisUserCache};
