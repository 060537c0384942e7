//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on the [`UserCollection`] port and remain testable without Redis.

use std::sync::Arc;

use crate::domain::ports::UserCollection;

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub users: Arc<dyn UserCollection>,
}

impl HttpState {
    /// Wrap the collection port for injection into handlers.
    pub fn new(users: Arc<dyn UserCollection>) -> Self {
        Self { users }
    }
}
