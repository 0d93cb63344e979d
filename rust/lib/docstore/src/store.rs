//! DocumentStore trait + the KV-backed implementation.
//!
//! Documents are JSON objects stored under `<collection>/<id>` keys of a
//! `KVStore`. A commit resolves merges and server timestamps, then writes
//! every touched key in one KV transaction.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;
use sicopa_core::now_rfc3339;
use sicopa_kv::KVStore;
use tracing::debug;

use crate::batch::{deep_merge, WriteBatch, MAX_BATCH_WRITES};
use crate::error::StoreError;
use crate::path::{collection_prefix, field_value, DocRef};
use crate::Document;

/// A document read from the store.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentSnapshot {
    /// Document id (the key inside its collection).
    pub id: String,
    pub data: Document,
}

/// Collection/document storage with batched atomic writes.
pub trait DocumentStore: Send + Sync {
    /// Point read. `None` if the document does not exist.
    fn get(&self, doc: &DocRef) -> Result<Option<DocumentSnapshot>, StoreError>;

    /// All documents of `collection` whose `field` (dotted path) equals
    /// `value`, in ascending id order.
    fn query_eq(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> Result<Vec<DocumentSnapshot>, StoreError>;

    /// Open an empty batch sized to this store's write ceiling.
    fn batch(&self) -> WriteBatch {
        WriteBatch::new(MAX_BATCH_WRITES)
    }

    /// Apply every write of `batch` atomically. Returns the number of writes.
    fn commit(&self, batch: WriteBatch) -> Result<usize, StoreError>;
}

/// `DocumentStore` over any `KVStore` backend.
pub struct KvDocumentStore {
    kv: Arc<dyn KVStore>,
}

impl KvDocumentStore {
    pub fn new(kv: Arc<dyn KVStore>) -> Self {
        Self { kv }
    }

    fn decode(key: &str, bytes: &[u8]) -> Result<Document, StoreError> {
        match serde_json::from_slice::<Value>(bytes) {
            Ok(Value::Object(doc)) => Ok(doc),
            Ok(_) => Err(StoreError::Corrupt {
                key: key.to_string(),
                message: "not a JSON object".into(),
            }),
            Err(e) => Err(StoreError::Corrupt {
                key: key.to_string(),
                message: e.to_string(),
            }),
        }
    }

    fn read(&self, key: &str) -> Result<Option<Document>, StoreError> {
        match self.kv.get(key)? {
            Some(bytes) => Ok(Some(Self::decode(key, &bytes)?)),
            None => Ok(None),
        }
    }
}

impl DocumentStore for KvDocumentStore {
    fn get(&self, doc: &DocRef) -> Result<Option<DocumentSnapshot>, StoreError> {
        Ok(self.read(&doc.key())?.map(|data| DocumentSnapshot {
            id: doc.id().to_string(),
            data,
        }))
    }

    fn query_eq(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> Result<Vec<DocumentSnapshot>, StoreError> {
        let prefix = collection_prefix(collection);
        let mut matches = Vec::new();
        for (key, bytes) in self.kv.scan(&prefix)? {
            let data = Self::decode(&key, &bytes)?;
            if field_value(&data, field) == Some(value) {
                matches.push(DocumentSnapshot {
                    id: key[prefix.len()..].to_string(),
                    data,
                });
            }
        }
        debug!(collection, field, matched = matches.len(), "query_eq");
        Ok(matches)
    }

    fn commit(&self, batch: WriteBatch) -> Result<usize, StoreError> {
        let writes = batch.len();
        if writes > MAX_BATCH_WRITES {
            return Err(StoreError::BatchFull { limit: MAX_BATCH_WRITES });
        }

        let committed_at = Value::String(now_rfc3339());

        // Later writes to the same key build on earlier ones in this batch.
        let mut staged: BTreeMap<String, Document> = BTreeMap::new();
        for op in batch.into_ops() {
            let key = op.doc.key();
            let mut doc = if op.options.is_merge() {
                match staged.remove(&key) {
                    Some(pending) => pending,
                    None => self.read(&key)?.unwrap_or_default(),
                }
            } else {
                Document::new()
            };
            deep_merge(&mut doc, op.data);
            for field in op.options.server_timestamp_fields() {
                doc.insert(field.clone(), committed_at.clone());
            }
            staged.insert(key, doc);
        }

        let encoded = staged
            .into_iter()
            .map(|(key, doc)| match serde_json::to_vec(&doc) {
                Ok(bytes) => Ok((key, bytes)),
                Err(e) => Err(StoreError::Encode {
                    key,
                    message: e.to_string(),
                }),
            })
            .collect::<Result<Vec<_>, _>>()?;
        let entries: Vec<(&str, &[u8])> = encoded
            .iter()
            .map(|(key, bytes)| (key.as_str(), bytes.as_slice()))
            .collect();
        self.kv.batch_set(&entries)?;

        debug!(writes, keys = entries.len(), "batch committed");
        Ok(writes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::SetOptions;
    use serde_json::json;
    use sicopa_kv::{OverlayKV, RedbStore};

    fn make_store() -> (KvDocumentStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let kv: Arc<dyn KVStore> =
            Arc::new(RedbStore::open(&dir.path().join("docs.redb")).unwrap());
        (KvDocumentStore::new(kv), dir)
    }

    fn doc(v: Value) -> Document {
        v.as_object().unwrap().clone()
    }

    fn bien(id: &str) -> DocRef {
        DocRef::new("bienes", id).unwrap()
    }

    #[test]
    fn commit_then_get() {
        let (store, _dir) = make_store();
        let mut batch = store.batch();
        batch
            .set(bien("A1"), doc(json!({"nombre_bien": "Silla"})), SetOptions::overwrite())
            .unwrap();
        assert_eq!(store.commit(batch).unwrap(), 1);

        let snap = store.get(&bien("A1")).unwrap().unwrap();
        assert_eq!(snap.id, "A1");
        assert_eq!(snap.data["nombre_bien"], "Silla");
        assert!(store.get(&bien("A2")).unwrap().is_none());
    }

    #[test]
    fn merge_keeps_existing_fields_and_stamps_time() {
        let (store, _dir) = make_store();
        let mut first = store.batch();
        first
            .set(
                bien("A1"),
                doc(json!({"nombre_bien": "Silla", "serie": "S-9"})),
                SetOptions::overwrite(),
            )
            .unwrap();
        store.commit(first).unwrap();

        let mut second = store.batch();
        second
            .set(
                bien("A1"),
                doc(json!({"nombre_bien": "Silla ejecutiva"})),
                SetOptions::merge().server_timestamp("ultima_actualizacion"),
            )
            .unwrap();
        store.commit(second).unwrap();

        let data = store.get(&bien("A1")).unwrap().unwrap().data;
        assert_eq!(data["nombre_bien"], "Silla ejecutiva");
        assert_eq!(data["serie"], "S-9");
        let stamp = data["ultima_actualizacion"].as_str().unwrap();
        assert!(stamp.ends_with('Z'));
    }

    #[test]
    fn overwrite_drops_existing_fields() {
        let (store, _dir) = make_store();
        let mut first = store.batch();
        first
            .set(bien("A1"), doc(json!({"serie": "S-9"})), SetOptions::overwrite())
            .unwrap();
        store.commit(first).unwrap();

        let mut second = store.batch();
        second
            .set(bien("A1"), doc(json!({"nombre_bien": "Mesa"})), SetOptions::overwrite())
            .unwrap();
        store.commit(second).unwrap();

        let data = store.get(&bien("A1")).unwrap().unwrap().data;
        assert!(data.get("serie").is_none());
    }

    #[test]
    fn same_key_twice_in_one_batch_merges_in_order() {
        let (store, _dir) = make_store();
        let mut batch = store.batch();
        batch
            .set(bien("A1"), doc(json!({"a": 1, "b": 1})), SetOptions::merge())
            .unwrap()
            .set(bien("A1"), doc(json!({"b": 2})), SetOptions::merge())
            .unwrap();
        assert_eq!(store.commit(batch).unwrap(), 2);

        let data = store.get(&bien("A1")).unwrap().unwrap().data;
        assert_eq!(Value::Object(data), json!({"a": 1, "b": 2}));
    }

    #[test]
    fn query_eq_matches_nested_field_exactly() {
        let (store, _dir) = make_store();
        let mut batch = store.batch();
        for (id, area) in [("B2", "Contabilidad"), ("A1", "Contabilidad"), ("C3", "contabilidad")] {
            batch
                .set(
                    bien(id),
                    doc(json!({"ubicacion_actual": {"area": area}})),
                    SetOptions::overwrite(),
                )
                .unwrap();
        }
        store.commit(batch).unwrap();

        let hits = store
            .query_eq("bienes", "ubicacion_actual.area", &json!("Contabilidad"))
            .unwrap();
        let ids: Vec<&str> = hits.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["A1", "B2"]);

        let none = store
            .query_eq("bienes", "ubicacion_actual.area", &json!("Compras"))
            .unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn corrupt_document_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let redb = RedbStore::open(&dir.path().join("bad.redb")).unwrap();
        redb.set("bienes/X", b"[1,2]").unwrap();
        let store = KvDocumentStore::new(Arc::new(redb));

        let err = store.get(&bien("X")).unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
    }

    #[test]
    fn seeded_documents_are_readable_but_not_writable() {
        let dir = tempfile::tempdir().unwrap();
        let redb = RedbStore::open(&dir.path().join("seed.redb")).unwrap();
        let mut layer = std::collections::BTreeMap::new();
        layer.insert("usuarios/admin".to_string(), br#"{"rol":"ADMIN_SUPREMO"}"#.to_vec());
        let store = KvDocumentStore::new(Arc::new(OverlayKV::new(redb, layer)));

        let user = DocRef::new("usuarios", "admin").unwrap();
        let snap = store.get(&user).unwrap().unwrap();
        assert_eq!(snap.data["rol"], "ADMIN_SUPREMO");

        let mut batch = store.batch();
        batch.set(user, doc(json!({"rol": "X"})), SetOptions::merge()).unwrap();
        assert!(matches!(store.commit(batch), Err(StoreError::Kv(_))));
    }
}
