use sicopa_kv::KVError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("invalid document path: {0}")]
    InvalidPath(String),

    #[error("write batch is full ({limit} writes)")]
    BatchFull { limit: usize },

    #[error("document {key} is corrupt: {message}")]
    Corrupt { key: String, message: String },

    #[error("encode document {key}: {message}")]
    Encode { key: String, message: String },

    #[error(transparent)]
    Kv(#[from] KVError),
}
