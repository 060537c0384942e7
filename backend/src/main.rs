//! User cache entry-point: loads settings, selects the cache adapter, and
//! serves the REST endpoints.

mod server;

use std::sync::Arc;

use actix_web::web;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use server::{ServerConfig, create_server};
use user_cache::domain::ports::{UserCache, UserCollection};
use user_cache::domain::UserCollectionService;
use user_cache::inbound::http::health::HealthState;
use user_cache::outbound::cache::{InMemoryUserCache, RedisCacheConfig, RedisUserCache};
use user_cache::settings::ServiceSettings;

async fn build_cache(settings: &ServiceSettings) -> std::io::Result<Arc<dyn UserCache>> {
    match settings.redis_url() {
        Some(url) => {
            let config = RedisCacheConfig::new(url)
                .with_max_size(settings.pool_max_size())
                .with_connection_timeout(settings.connection_timeout());
            let cache = RedisUserCache::connect(config)
                .await
                .map_err(|err| std::io::Error::other(format!("redis cache unavailable: {err}")))?;
            Ok(Arc::new(cache))
        }
        None => {
            warn!("no redis URL configured; users are kept in process memory");
            Ok(Arc::new(InMemoryUserCache::new()))
        }
    }
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = ServiceSettings::load()
        .map_err(|err| std::io::Error::other(format!("invalid configuration: {err}")))?;

    let users_ttl = settings
        .users_ttl()
        .map_err(|err| std::io::Error::other(format!("invalid configuration: {err}")))?;

    let cache = build_cache(&settings).await?;
    let service = UserCollectionService::with_ttl(cache, users_ttl);
    match service.users_added_total().await {
        Ok(total) => info!(total, ttl_ms = service.ttl().as_millis(), "user store ready"),
        Err(err) => warn!(error = %err, "could not read user counter at startup"),
    }
    let users: Arc<dyn UserCollection> = Arc::new(service);

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(
        health_state,
        ServerConfig::new(settings.bind_addr(), users),
    )?;
    server.await
}
