//! Application state shared across request handlers.

use std::sync::Arc;

use crate::config::Config;
use crate::gateway::PushGateway;
use crate::publisher::Publisher;
use crate::store::ConnectionStore;

/// Shared application state. The store and gateway are injected once at
/// startup and reused for every invocation.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<dyn ConnectionStore>,
    pub publisher: Publisher,
}

impl AppState {
    pub fn new(
        config: Config,
        store: Arc<dyn ConnectionStore>,
        gateway: Arc<dyn PushGateway>,
    ) -> Self {
        let publisher = Publisher::new(store.clone(), gateway);
        Self {
            config: Arc::new(config),
            store,
            publisher,
        }
    }
}
