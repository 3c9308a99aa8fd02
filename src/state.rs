//! Shared application state for all routes. The registry is immutable after start.

use crate::config::Registry;
use crate::service::ResourceService;
use crate::store::Store;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<Registry>,
    pub service: Arc<ResourceService>,
}

impl AppState {
    /// Service over `store` with the default `Stamped` hooks.
    pub fn new(registry: Registry, store: Arc<dyn Store>) -> Self {
        let registry = Arc::new(registry);
        let service = ResourceService::new(Arc::clone(&registry), store);
        Self::from_service(service)
    }

    pub fn from_service(service: ResourceService) -> Self {
        Self {
            registry: Arc::clone(service.registry()),
            service: Arc::new(service),
        }
    }
}
