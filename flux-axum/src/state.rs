use std::sync::Arc;

use flux_blob::{FluxAdapter, UploadCoordinator};

/// Shared state handed to every upload route
#[derive(Clone)]
pub struct FluxAxumState {
    pub adapter: Arc<FluxAdapter>,
}

impl FluxAxumState {
    pub fn new(adapter: FluxAdapter) -> Self {
        Self {
            adapter: Arc::new(adapter),
        }
    }

    pub fn uploads(&self) -> &Arc<dyn UploadCoordinator> {
        self.adapter.coordinator()
    }
}
