use std::sync::Arc;

use tripdesk_store::MemoryStore;

use crate::config::Config;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<MemoryStore>,
}

impl AppState {
    pub fn new(config: Config, store: Arc<MemoryStore>) -> Self {
        Self {
            config: Arc::new(config),
            store,
        }
    }
}
