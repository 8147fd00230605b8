//! Application state shared across all handlers.

use std::sync::Arc;

use crate::service::ChatService;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ChatService>,
    /// Expose upstream error details in 500 responses.
    pub development: bool,
}

impl AppState {
    pub fn new(service: Arc<ChatService>, development: bool) -> Self {
        Self {
            service,
            development,
        }
    }
}
