//! Shared application state for all routes.

use crate::resource::Resource;
use crate::store::DocumentStore;
use std::sync::Arc;

/// Built once at startup and cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        AppState { store }
    }

    pub fn for_resource(&self, resource: Resource) -> ResourceState {
        ResourceState {
            store: Arc::clone(&self.store),
            resource,
        }
    }
}

/// State of one resource's routes: the shared store plus which resource they serve.
#[derive(Clone)]
pub struct ResourceState {
    pub store: Arc<dyn DocumentStore>,
    pub resource: Resource,
}
