//! Document addressing and field-path lookup.

use serde_json::Value;

use crate::error::StoreError;
use crate::Document;

/// Maximum byte length of a collection name or document id.
const MAX_SEGMENT_BYTES: usize = 1500;

/// Address of one document: `<collection>/<id>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocRef {
    collection: String,
    id: String,
}

impl DocRef {
    /// Build a reference, rejecting ids the KV key scheme cannot represent.
    pub fn new(collection: impl Into<String>, id: impl Into<String>) -> Result<Self, StoreError> {
        let collection = collection.into();
        let id = id.into();
        check_segment(&collection)?;
        check_segment(&id)?;
        Ok(Self { collection, id })
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// KV key holding this document.
    pub fn key(&self) -> String {
        format!("{}/{}", self.collection, self.id)
    }
}

/// KV prefix shared by every document of a collection.
pub(crate) fn collection_prefix(collection: &str) -> String {
    format!("{}/", collection)
}

fn check_segment(segment: &str) -> Result<(), StoreError> {
    if segment.is_empty() {
        return Err(StoreError::InvalidPath("empty path segment".into()));
    }
    if segment == "." || segment == ".." {
        return Err(StoreError::InvalidPath(format!("'{}' is reserved", segment)));
    }
    if segment.contains('/') {
        return Err(StoreError::InvalidPath(format!("'{}' contains '/'", segment)));
    }
    if segment.len() > MAX_SEGMENT_BYTES {
        return Err(StoreError::InvalidPath(format!(
            "segment longer than {} bytes",
            MAX_SEGMENT_BYTES
        )));
    }
    Ok(())
}

/// Resolve a dotted field path (`ubicacion_actual.area`) inside a document.
pub fn field_value<'a>(doc: &'a Document, path: &str) -> Option<&'a Value> {
    let mut parts = path.split('.');
    let mut current = doc.get(parts.next()?)?;
    for part in parts {
        current = current.as_object()?.get(part)?;
    }
    Some(current)
}
