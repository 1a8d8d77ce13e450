use std::sync::Arc;

use kiraa_core::store::MarketStore;
use kiraa_events::EventBus;

use crate::config::ServerConfig;

/// Shared application state available to all handlers via `State<AppState>`.
#[derive(Clone)]
pub struct AppState {
    /// Submission and catalogue store. PostgreSQL in production.
    pub store: Arc<dyn MarketStore>,
    pub config: Arc<ServerConfig>,
    /// Receives a [`kiraa_events::MarketEvent`] after every lifecycle change.
    pub event_bus: Arc<EventBus>,
}
