//! Service settings loaded via OrthoConfig.
//!
//! Values come from `USER_CACHE_*` environment variables, CLI flags, or a
//! configuration file, in OrthoConfig's usual precedence.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;

use crate::domain::DEFAULT_USERS_TTL;

const DEFAULT_BIND_ADDR: SocketAddr = SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 3000);
const DEFAULT_POOL_MAX_SIZE: u32 = 16;
const DEFAULT_CONNECTION_TIMEOUT_MS: u64 = 5_000;

/// Settings values that load but cannot be used.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    #[error("users_ttl_ms must be greater than zero")]
    ZeroUsersTtl,
}

/// Runtime configuration for the user cache service.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "USER_CACHE")]
pub struct ServiceSettings {
    /// Socket address the HTTP server binds to.
    pub bind_addr: Option<SocketAddr>,
    /// Redis connection URL. Without it the service keeps users in process
    /// memory.
    pub redis_url: Option<String>,
    /// Lifetime of the `users` key after each write, in milliseconds.
    pub users_ttl_ms: Option<u64>,
    /// Maximum pooled Redis connections.
    pub pool_max_size: Option<u32>,
    /// Redis connection checkout timeout, in milliseconds.
    pub connection_timeout_ms: Option<u64>,
}

impl ServiceSettings {
    /// Bind address, defaulting to `0.0.0.0:3000`.
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr.unwrap_or(DEFAULT_BIND_ADDR)
    }

    /// Redis connection URL, ignoring blank values.
    pub fn redis_url(&self) -> Option<&str> {
        self.redis_url.as_deref().filter(|url| !url.trim().is_empty())
    }

    /// TTL for the `users` key, defaulting to one day.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::ZeroUsersTtl`] when the TTL is set to zero,
    /// which would expire the collection as soon as it is written.
    pub fn users_ttl(&self) -> Result<Duration, SettingsError> {
        match self.users_ttl_ms {
            None => Ok(DEFAULT_USERS_TTL),
            Some(0) => Err(SettingsError::ZeroUsersTtl),
            Some(ms) => Ok(Duration::from_millis(ms)),
        }
    }

    /// Pool size, at least one connection.
    pub fn pool_max_size(&self) -> u32 {
        self.pool_max_size.unwrap_or(DEFAULT_POOL_MAX_SIZE).max(1)
    }

    /// Pool checkout timeout, defaulting to five seconds.
    pub fn connection_timeout(&self) -> Duration {
        Duration::from_millis(
            self.connection_timeout_ms
                .unwrap_or(DEFAULT_CONNECTION_TIMEOUT_MS),
        )
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for service settings parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 5] = [
        "USER_CACHE_BIND_ADDR",
        "USER_CACHE_REDIS_URL",
        "USER_CACHE_USERS_TTL_MS",
        "USER_CACHE_POOL_MAX_SIZE",
        "USER_CACHE_CONNECTION_TIMEOUT_MS",
    ];

    fn load_from_empty_args() -> ServiceSettings {
        ServiceSettings::load_from_iter([OsString::from("user-cache")])
            .expect("config should load")
    }

    #[rstest]
    fn default_values_are_used_when_missing() {
        let _guard = lock_env(VARS.map(|name| (name, None::<String>)));

        let settings = load_from_empty_args();
        assert_eq!(settings.bind_addr().to_string(), "0.0.0.0:3000");
        assert_eq!(settings.redis_url(), None);
        assert_eq!(settings.users_ttl(), Ok(Duration::from_millis(86_400_000)));
        assert_eq!(settings.pool_max_size(), DEFAULT_POOL_MAX_SIZE);
        assert_eq!(settings.connection_timeout(), Duration::from_secs(5));
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("USER_CACHE_BIND_ADDR", Some("127.0.0.1:8081".to_owned())),
            ("USER_CACHE_REDIS_URL", Some("redis://cache:6379".to_owned())),
            ("USER_CACHE_USERS_TTL_MS", Some("60000".to_owned())),
            ("USER_CACHE_POOL_MAX_SIZE", Some("4".to_owned())),
            ("USER_CACHE_CONNECTION_TIMEOUT_MS", Some("250".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(settings.bind_addr(), SocketAddr::from(([127, 0, 0, 1], 8081)));
        assert_eq!(settings.redis_url(), Some("redis://cache:6379"));
        assert_eq!(settings.users_ttl(), Ok(Duration::from_secs(60)));
        assert_eq!(settings.pool_max_size(), 4);
        assert_eq!(settings.connection_timeout(), Duration::from_millis(250));
    }

    #[rstest]
    fn zero_users_ttl_is_rejected() {
        let _guard = lock_env([("USER_CACHE_USERS_TTL_MS", Some("0".to_owned()))]);

        let settings = load_from_empty_args();
        assert_eq!(settings.users_ttl(), Err(SettingsError::ZeroUsersTtl));
    }

    #[rstest]
    fn blank_redis_url_selects_in_memory_cache() {
        let _guard = lock_env([("USER_CACHE_REDIS_URL", Some("  ".to_owned()))]);

        let settings = load_from_empty_args();
        assert_eq!(settings.redis_url(), None);
    }
}
