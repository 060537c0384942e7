//! Cache keys owned by the user collection.

use std::fmt;

/// Every key the service reads or writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// JSON array holding the whole user collection.
    Users,
    /// Counter of users ever added.
    UserNumber,
}

impl CacheKey {
    /// Key as stored in the cache engine.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::UserNumber => "usernumber",
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}
