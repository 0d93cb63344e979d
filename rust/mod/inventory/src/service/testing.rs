//! Test double: a real KV-backed document store that records every call.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use serde_json::{json, Value};
use sicopa_docstore::{
    DocRef, Document, DocumentSnapshot, DocumentStore, KvDocumentStore, SetOptions, StoreError,
    WriteBatch,
};
use sicopa_kv::{KVError, KVStore, RedbStore};

use crate::model::{asset, user};

pub(crate) struct RecordingStore {
    inner: KvDocumentStore,
    kv: Arc<RedbStore>,
    reads: AtomicUsize,
    commits: Mutex<Vec<usize>>,
    fail_on_commit: Option<usize>,
    _dir: tempfile::TempDir,
}

impl RecordingStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::build(None))
    }

    /// Commit number `n` (1-based) fails with a storage error.
    pub fn failing_on_commit(n: usize) -> Arc<Self> {
        Arc::new(Self::build(Some(n)))
    }

    fn build(fail_on_commit: Option<usize>) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let kv = Arc::new(RedbStore::open(&dir.path().join("inventory.redb")).unwrap());
        Self {
            inner: KvDocumentStore::new(kv.clone()),
            kv,
            reads: AtomicUsize::new(0),
            commits: Mutex::new(Vec::new()),
            fail_on_commit,
            _dir: dir,
        }
    }

    fn put(&self, collection: &str, id: &str, data: Value) {
        let mut batch = self.inner.batch();
        batch
            .set(
                DocRef::new(collection, id).unwrap(),
                data.as_object().unwrap().clone(),
                SetOptions::overwrite(),
            )
            .unwrap();
        self.inner.commit(batch).unwrap();
    }

    pub fn seed_user(&self, uid: &str, rol: &str) {
        self.put(user::COLLECTION, uid, json!({ "rol": rol }));
    }

    pub fn seed_asset(&self, id: &str, data: Value) {
        self.put(asset::COLLECTION, id, data);
    }

    pub fn asset(&self, id: &str) -> Option<Document> {
        self.inner
            .get(&DocRef::new(asset::COLLECTION, id).unwrap())
            .unwrap()
            .map(|s| s.data)
    }

    pub fn asset_count(&self) -> usize {
        self.kv.scan("bienes/").unwrap().len()
    }

    /// Reads and queries seen through the trait.
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Size of every commit seen through the trait, in order.
    pub fn commit_sizes(&self) -> Vec<usize> {
        self.commits.lock().unwrap().clone()
    }
}

impl DocumentStore for RecordingStore {
    fn get(&self, doc: &DocRef) -> Result<Option<DocumentSnapshot>, StoreError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.get(doc)
    }

    fn query_eq(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> Result<Vec<DocumentSnapshot>, StoreError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.query_eq(collection, field, value)
    }

    fn commit(&self, batch: WriteBatch) -> Result<usize, StoreError> {
        let attempt = {
            let mut commits = self.commits.lock().unwrap();
            commits.push(batch.len());
            commits.len()
        };
        if self.fail_on_commit == Some(attempt) {
            return Err(StoreError::Kv(KVError::Storage("disk full".into())));
        }
        self.inner.commit(batch)
    }
}
