use std::sync::Arc;

use lineup_engine::SpotService;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; everything sits behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Every spot lifecycle operation goes through the service.
    pub service: Arc<SpotService>,
    pub config: Arc<ServerConfig>,
}
