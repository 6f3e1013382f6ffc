use std::sync::Arc;
use crate::registry::ClientRegistry;
use crate::config::LimiterConfig;
// app's shared state

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<ClientRegistry>,
    limiter: LimiterConfig,
}

impl AppState {
    pub fn new(limiter: LimiterConfig) -> Self {
        Self {
            registry: Arc::new(ClientRegistry::new(&limiter)),
            limiter,
        }
    }

    pub fn limiter(&self) -> &LimiterConfig {
        &self.limiter
    }
}
