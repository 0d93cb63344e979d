//! Bulk asset load: validate every record, then write them in chunks of at
//! most one full batch, committed one after another.
//!
//! Chunks are independent transactions. If chunk N fails, chunks before it
//! stay written and the call reports `INTERNAL`; re-running the same load is
//! safe because every write is a merge keyed by `id_bien`.

use serde::Serialize;
use serde_json::Value;
use sicopa_core::{Principal, ServiceError};
use sicopa_docstore::{DocRef, Document, SetOptions};
use tracing::{error, info};

use super::InventoryService;
use crate::model::asset;

pub const MSG_EXPECTED_ARRAY: &str = "Se esperaba un array de bienes.";

/// Output of `bulk-load-assets`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkLoadResult {
    pub success: bool,
    pub processed_bienes: usize,
}

impl InventoryService {
    /// Upsert `data.bienes` into the asset collection. Privileged callers only.
    pub fn bulk_load(
        &self,
        caller: Option<&Principal>,
        data: Value,
    ) -> Result<BulkLoadResult, ServiceError> {
        let principal = self.require_privileged(caller)?;

        let items = match data {
            Value::Object(mut input) => input.remove("bienes"),
            _ => None,
        };
        let Some(Value::Array(items)) = items else {
            return Err(ServiceError::InvalidArgument(MSG_EXPECTED_ARRAY.into()));
        };
        let records = validate(items)?;
        let total = records.len();

        let chunk_size = self
            .config
            .effective_batch_size()
            .min(self.store.batch().limit());
        let options = SetOptions::merge().server_timestamp(asset::field::UPDATED_AT);

        let mut records = records.into_iter().peekable();
        let mut processed = 0;
        let mut chunk_index = 0;
        while records.peek().is_some() {
            let mut batch = self.store.batch();
            for (doc, record) in records.by_ref().take(chunk_size) {
                batch
                    .set(doc, record, options.clone())
                    .map_err(|e| ServiceError::Internal(e.to_string()))?;
            }
            let writes = batch.len();
            self.store.commit(batch).map_err(|e| {
                error!(chunk = chunk_index, committed = processed, error = %e, "bulk load chunk failed");
                ServiceError::Internal(e.to_string())
            })?;
            processed += writes;
            chunk_index += 1;
            info!(chunk = chunk_index, writes, processed, total, "bulk load chunk committed");
        }

        info!(uid = %principal.uid, processed, chunks = chunk_index, "bulk load finished");
        Ok(BulkLoadResult {
            success: true,
            processed_bienes: processed,
        })
    }
}

/// Check every record before anything is written.
fn validate(items: Vec<Value>) -> Result<Vec<(DocRef, Document)>, ServiceError> {
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            let Value::Object(record) = item else {
                return Err(ServiceError::InvalidArgument(format!(
                    "El bien en la posición {} no es un objeto.",
                    index
                )));
            };
            let id = asset::document_id(record.get(asset::field::ID)).ok_or_else(|| {
                ServiceError::InvalidArgument(format!(
                    "El bien en la posición {} no tiene id_bien.",
                    index
                ))
            })?;
            let doc = DocRef::new(asset::COLLECTION, id).map_err(|e| {
                ServiceError::InvalidArgument(format!(
                    "El bien en la posición {} tiene un id_bien inválido: {}",
                    index, e
                ))
            })?;
            Ok((doc, record))
        })
        .collect()
}
