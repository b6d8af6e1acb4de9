use std::sync::Arc;

use warden_db::SessionStore;

use crate::auth::session::SessionEngine;
use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Users and sessions.
    pub store: Arc<dyn SessionStore>,
    /// Server configuration (JWT settings, cookie flags, error verbosity).
    pub config: Arc<ServerConfig>,
}

impl AppState {
    /// A rotation engine over the shared store.
    pub fn sessions(&self) -> SessionEngine<'_> {
        SessionEngine::new(self.store.as_ref(), &self.config.jwt)
    }
}
