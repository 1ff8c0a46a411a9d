//! `EngineBuilder` for assembling an [`Engine`].

use std::sync::Arc;

use super::Engine;
use crate::config::EngineConfig;
use crate::host::{Platform, Store, Unavailable};
use crate::registry::{FunctionRegistry, SharedRegistry};

/// Builder for [`Engine`].
///
/// Anything left unset takes a default: the built-in registry, the default
/// quotas, and a host that is [`Unavailable`], so effecting functions fail
/// in a contained way until a real platform and store are supplied.
#[derive(Default)]
pub struct EngineBuilder {
    registry: Option<SharedRegistry<FunctionRegistry>>,
    platform: Option<Arc<dyn Platform>>,
    store: Option<Arc<dyn Store>>,
    config: Option<EngineConfig>,
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `registry` instead of the built-ins.
    #[must_use]
    pub fn registry(mut self, registry: FunctionRegistry) -> Self {
        self.registry = Some(SharedRegistry::new(registry));
        self
    }

    /// Share a registry with other engines.
    #[must_use]
    pub fn shared_registry(mut self, registry: SharedRegistry<FunctionRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    #[must_use]
    pub fn platform(mut self, platform: Arc<dyn Platform>) -> Self {
        self.platform = Some(platform);
        self
    }

    #[must_use]
    pub fn store(mut self, store: Arc<dyn Store>) -> Self {
        self.store = Some(store);
        self
    }

    #[must_use]
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn build(self) -> Engine {
        Engine {
            registry: self
                .registry
                .unwrap_or_else(|| SharedRegistry::new(FunctionRegistry::with_builtins())),
            platform: self.platform.unwrap_or_else(|| Arc::new(Unavailable)),
            store: self.store.unwrap_or_else(|| Arc::new(Unavailable)),
            config: Arc::new(self.config.unwrap_or_default()),
        }
    }
}
