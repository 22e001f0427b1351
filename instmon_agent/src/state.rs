//! Shared agent state: the instance store and the connection registry.

use std::sync::Arc;

use crate::registry::ConnectionRegistry;
use crate::store::InstanceStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<InstanceStore>,
    pub registry: Arc<ConnectionRegistry>,
}

impl AppState {
    pub fn new(store: InstanceStore) -> Self {
        Self {
            store: Arc::new(store),
            registry: Arc::new(ConnectionRegistry::new()),
        }
    }
}
