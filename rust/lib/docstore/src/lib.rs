//! Collection/document store over the KV layer.
//!
//! Mirrors the contract the inventory module needs from a document database:
//! point reads, equality queries on (nested) fields, and write batches of at
//! most [`MAX_BATCH_WRITES`] writes committed atomically, with merge writes
//! and server-assigned timestamps.

pub mod batch;
pub mod error;
pub mod path;
pub mod store;

/// A stored document: a JSON object.
pub type Document = serde_json::Map<String, serde_json::Value>;

pub use batch::{deep_merge, SetOptions, WriteBatch, WriteOp, MAX_BATCH_WRITES};
pub use error::StoreError;
pub use path::{field_value, DocRef};
pub use store::{DocumentSnapshot, DocumentStore, KvDocumentStore};
