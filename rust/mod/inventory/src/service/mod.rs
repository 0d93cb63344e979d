//! Inventory business logic over a `DocumentStore`.

pub mod bulk;
pub mod guard;
pub mod report;

#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;

use sicopa_core::ServiceError;
use sicopa_docstore::{DocumentStore, StoreError};
use tracing::error;

use crate::config::InventoryConfig;
use crate::report::{LopdfRenderer, PdfRenderer};

pub use bulk::BulkLoadResult;
pub use report::ReportRequest;

/// Inventory service: holds the document store, the PDF renderer and the
/// module settings.
pub struct InventoryService {
    pub(crate) store: Arc<dyn DocumentStore>,
    pub(crate) renderer: Arc<dyn PdfRenderer>,
    pub(crate) config: InventoryConfig,
}

impl InventoryService {
    pub fn new(store: Arc<dyn DocumentStore>, config: InventoryConfig) -> Self {
        Self {
            store,
            renderer: Arc::new(LopdfRenderer),
            config,
        }
    }

    /// Swap the PDF backend.
    pub fn with_renderer(mut self, renderer: Arc<dyn PdfRenderer>) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn config(&self) -> &InventoryConfig {
        &self.config
    }
}

/// Log a store failure and surface it as `INTERNAL`.
pub(crate) fn store_error(operation: &str, err: StoreError) -> ServiceError {
    error!(operation, error = %err, "document store failure");
    ServiceError::Internal(err.to_string())
}
