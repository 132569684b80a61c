//! Application state shared across handlers.

use depot_core::config::AppConfig;
use depot_engine::Depot;
use std::sync::Arc;

/// Shared application state.
///
/// Constructed once at startup and cloned into every handler; there is no
/// process-wide mutable state outside it.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// The tiered-storage engine.
    pub depot: Arc<Depot>,
}

impl AppState {
    /// Create a new application state.
    pub fn new(config: AppConfig, depot: Arc<Depot>) -> Self {
        Self {
            config: Arc::new(config),
            depot,
        }
    }
}
