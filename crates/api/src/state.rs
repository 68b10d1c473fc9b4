use std::sync::Arc;

use prana_events::AlertNotifier;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; everything inside is behind an `Arc` or a pool handle.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool, used by the health check.
    pub pool: prana_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Handles every alert-created trigger.
    pub notifier: Arc<AlertNotifier>,
}
