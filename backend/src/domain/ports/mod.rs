//! Domain ports: the traits outbound adapters implement.

mod macros;
pub(crate) use macros::define_port_error;

mod cache_key;
mod user_cache;
mod user_collection;

pub use cache_key::CacheKey;
#[cfg(test)]
pub use user_cache::MockUserCache;
pub use user_cache::{UserCache, UserCacheError};
pub use user_collection::UserCollection;
