pub mod registry;

use crate::broadcast::ConnectionHub;
use crate::config::ServerConfig;
use crate::game::{RandomSource, WordBank};

pub use registry::SessionRegistry;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub registry: SessionRegistry,
    /// Outbound channels for every open connection
    pub hub: ConnectionHub,
    pub config: ServerConfig,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            registry: SessionRegistry::new(config.words.clone()),
            hub: ConnectionHub::new(),
            config,
        }
    }

    /// State whose sessions use an injected random source
    pub fn with_rng<F>(config: ServerConfig, factory: F) -> Self
    where
        F: Fn() -> Box<dyn RandomSource> + Send + Sync + 'static,
    {
        Self {
            registry: SessionRegistry::with_rng(config.words.clone(), factory),
            hub: ConnectionHub::new(),
            config,
        }
    }

    /// Catalog sessions draw from
    pub fn words(&self) -> &WordBank {
        &self.config.words
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(ServerConfig::default())
    }
}
