//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::sync::Arc;

use user_cache::domain::ports::UserCollection;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) users: Arc<dyn UserCollection>,
}

impl ServerConfig {
    /// Construct a server configuration bound to `bind_addr` and serving
    /// the given user collection.
    #[must_use]
    pub fn new(bind_addr: SocketAddr, users: Arc<dyn UserCollection>) -> Self {
        Self { bind_addr, users }
    }
}
