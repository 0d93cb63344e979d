use std::collections::BTreeMap;

use crate::error::KVError;
use crate::traits::KVStore;

/// OverlayKV is a two-layer KV store:
///
/// - **File layer** (read-only, higher priority): seed documents loaded from
///   the seed directory at startup.
/// - **DB layer** (read-write): backed by a concrete KVStore (e.g. redb).
///
/// Reads check the file layer first. Writes only reach the DB layer; a write
/// touching a file-layer key fails with `KVError::ReadOnly`.
pub struct OverlayKV<DB: KVStore> {
    file_layer: BTreeMap<String, Vec<u8>>,
    db: DB,
}

impl<DB: KVStore> OverlayKV<DB> {
    pub fn new(db: DB, file_layer: BTreeMap<String, Vec<u8>>) -> Self {
        Self { file_layer, db }
    }

    /// Number of entries in the file layer.
    pub fn file_layer_len(&self) -> usize {
        self.file_layer.len()
    }
}

impl<DB: KVStore> KVStore for OverlayKV<DB> {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, KVError> {
        match self.file_layer.get(key) {
            Some(value) => Ok(Some(value.clone())),
            None => self.db.get(key),
        }
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), KVError> {
        if self.is_readonly(key) {
            return Err(KVError::ReadOnly(key.to_string()));
        }
        self.db.set(key, value)
    }

    fn batch_set(&self, entries: &[(&str, &[u8])]) -> Result<(), KVError> {
        // All-or-nothing: reject before the DB transaction starts.
        if let Some((key, _)) = entries.iter().find(|(key, _)| self.is_readonly(key)) {
            return Err(KVError::ReadOnly(key.to_string()));
        }
        self.db.batch_set(entries)
    }

    fn scan(&self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>, KVError> {
        let mut merged: BTreeMap<String, Vec<u8>> = self.db.scan(prefix)?.into_iter().collect();

        // File layer shadows DB entries with the same key.
        for (key, value) in self.file_layer.range(prefix.to_string()..) {
            if !key.starts_with(prefix) {
                break;
            }
            merged.insert(key.clone(), value.clone());
        }

        Ok(merged.into_iter().collect())
    }

    fn is_readonly(&self, key: &str) -> bool {
        self.file_layer.contains_key(key)
    }
}
