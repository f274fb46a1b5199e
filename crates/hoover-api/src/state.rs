//! Application state shared across route handlers.

use std::sync::Arc;
use std::time::Instant;

use hoover_chat::TurnHandler;
use hoover_core::HooverConfig;

/// Shared application state. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    /// Loaded configuration. Read-only once the server starts.
    pub config: Arc<HooverConfig>,
    pub handler: Arc<TurnHandler>,
    /// Bearer token required on `/api/*` routes.
    pub api_token: String,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(config: HooverConfig, handler: TurnHandler, api_token: impl Into<String>) -> Self {
        Self {
            config: Arc::new(config),
            handler: Arc::new(handler),
            api_token: api_token.into(),
            start_time: Instant::now(),
        }
    }
}
