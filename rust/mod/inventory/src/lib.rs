pub mod api;
pub mod config;
pub mod model;
pub mod report;
pub mod service;

use std::sync::Arc;

use axum::Router;
use sicopa_core::Module;

pub use config::{InventoryConfig, ReportConfig};
pub use service::InventoryService;

/// Inventory module: area verification reports and bulk asset loads.
pub struct InventoryModule {
    service: Arc<InventoryService>,
}

impl InventoryModule {
    pub fn new(service: InventoryService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

impl Module for InventoryModule {
    fn name(&self) -> &str {
        "inventory"
    }

    fn routes(&self) -> Router {
        api::router(self.service.clone())
    }
}
