use std::sync::Arc;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via
/// `State<AppState>`.
///
/// This is cheaply cloneable; the pool is internally reference-counted.
/// The persistence handle is constructed once at startup and injected here,
/// never reached through ambient global state.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: tickmate_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
}
