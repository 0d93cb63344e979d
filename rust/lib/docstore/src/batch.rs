//! Write batches: bounded groups of writes committed atomically.

use serde_json::Value;

use crate::error::StoreError;
use crate::path::DocRef;
use crate::Document;

/// Hard ceiling on writes per batch. A batch can never hold more.
pub const MAX_BATCH_WRITES: usize = 500;

/// How a `set` treats the document already stored under the same key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetOptions {
    merge: bool,
    server_timestamps: Vec<String>,
}

impl SetOptions {
    /// Replace the stored document wholesale.
    pub fn overwrite() -> Self {
        Self::default()
    }

    /// Merge into the stored document: nested objects are merged key by key,
    /// fields absent from the new data are preserved.
    pub fn merge() -> Self {
        Self {
            merge: true,
            ..Self::default()
        }
    }

    /// Fill the top-level `field` with the commit time.
    pub fn server_timestamp(mut self, field: impl Into<String>) -> Self {
        self.server_timestamps.push(field.into());
        self
    }

    pub fn is_merge(&self) -> bool {
        self.merge
    }

    pub fn server_timestamp_fields(&self) -> &[String] {
        &self.server_timestamps
    }
}

/// One staged `set`.
#[derive(Debug, Clone)]
pub struct WriteOp {
    pub doc: DocRef,
    pub data: Document,
    pub options: SetOptions,
}

/// A bounded group of writes. Nothing reaches the store until the batch is
/// handed to `DocumentStore::commit`.
#[derive(Debug, Clone)]
pub struct WriteBatch {
    ops: Vec<WriteOp>,
    limit: usize,
}

impl WriteBatch {
    /// Create a batch holding at most `limit` writes, clamped to
    /// `1..=MAX_BATCH_WRITES`.
    pub fn new(limit: usize) -> Self {
        let limit = limit.clamp(1, MAX_BATCH_WRITES);
        Self {
            ops: Vec::with_capacity(limit),
            limit,
        }
    }

    /// Stage a write. Fails once the batch holds `limit` writes.
    pub fn set(
        &mut self,
        doc: DocRef,
        data: Document,
        options: SetOptions,
    ) -> Result<&mut Self, StoreError> {
        if self.ops.len() >= self.limit {
            return Err(StoreError::BatchFull { limit: self.limit });
        }
        self.ops.push(WriteOp { doc, data, options });
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn ops(&self) -> &[WriteOp] {
        &self.ops
    }

    pub fn into_ops(self) -> Vec<WriteOp> {
        self.ops
    }
}

/// Deep-merge `patch` into `base`.
///
/// Objects merge recursively; every other value (arrays and nulls included)
/// replaces what was there.
pub fn deep_merge(base: &mut Document, patch: Document) {
    for (key, value) in patch {
        let Value::Object(incoming) = value else {
            base.insert(key, value);
            continue;
        };
        if let Some(Value::Object(existing)) = base.get_mut(&key) {
            deep_merge(existing, incoming);
            continue;
        }
        base.insert(key, Value::Object(incoming));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(v: Value) -> Document {
        v.as_object().unwrap().clone()
    }

    #[test]
    fn batch_refuses_write_past_limit() {
        let mut batch = WriteBatch::new(2);
        for id in ["a", "b"] {
            batch
                .set(DocRef::new("bienes", id).unwrap(), Document::new(), SetOptions::merge())
                .unwrap();
        }
        let err = batch
            .set(DocRef::new("bienes", "c").unwrap(), Document::new(), SetOptions::merge())
            .unwrap_err();
        assert!(matches!(err, StoreError::BatchFull { limit: 2 }));
        assert_eq!(batch.len(), 2);
    }

    #[test]
    fn limit_is_clamped_to_ceiling() {
        assert_eq!(WriteBatch::new(10_000).limit(), MAX_BATCH_WRITES);
        assert_eq!(WriteBatch::new(0).limit(), 1);
    }

    #[test]
    fn set_options_builder() {
        let opts = SetOptions::merge().server_timestamp("ultima_actualizacion");
        assert!(opts.is_merge());
        assert_eq!(opts.server_timestamp_fields(), ["ultima_actualizacion".to_string()]);
        assert!(!SetOptions::overwrite().is_merge());
    }

    #[test]
    fn deep_merge_preserves_untouched_fields() {
        let mut base = doc(json!({
            "nombre_bien": "Silla",
            "serie": "S-1",
            "ubicacion_actual": {"area": "Compras", "piso": 1}
        }));
        deep_merge(
            &mut base,
            doc(json!({
                "nombre_bien": "Silla ejecutiva",
                "ubicacion_actual": {"area": "Contabilidad"},
                "notas": null
            })),
        );
        assert_eq!(
            Value::Object(base),
            json!({
                "nombre_bien": "Silla ejecutiva",
                "serie": "S-1",
                "ubicacion_actual": {"area": "Contabilidad", "piso": 1},
                "notas": null
            })
        );
    }

    #[test]
    fn deep_merge_replaces_non_objects() {
        let mut base = doc(json!({"tags": [1, 2], "ubicacion_actual": "bodega"}));
        deep_merge(&mut base, doc(json!({"tags": [3], "ubicacion_actual": {"area": "TI"}})));
        assert_eq!(
            Value::Object(base),
            json!({"tags": [3], "ubicacion_actual": {"area": "TI"}})
        );
    }
}
