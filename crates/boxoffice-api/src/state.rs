//! Application state shared across all handlers and middleware.

use std::sync::Arc;
use std::time::Instant;

use boxoffice_core::config::AppConfig;
use boxoffice_lease::LeaseManager;

/// Shared state passed to every handler via Axum's `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Loaded configuration.
    pub config: Arc<AppConfig>,
    /// The seat lease engine.
    pub lease_manager: Arc<LeaseManager>,
    /// Process start, for uptime reporting.
    pub started_at: Instant,
}

impl AppState {
    /// Creates application state.
    pub fn new(config: Arc<AppConfig>, lease_manager: Arc<LeaseManager>) -> Self {
        Self {
            config,
            lease_manager,
            started_at: Instant::now(),
        }
    }
}
