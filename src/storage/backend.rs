use crate::key::StoredObjectKey;
use async_trait::async_trait;
use bytes::Bytes;
use futures_util::stream::BoxStream;
use thiserror::Error;

/// Body of a stored blob, delivered incrementally.
pub type BlobStream = BoxStream<'static, Result<Bytes, StoreError>>;

#[derive(Error, Debug)]
pub enum StoreError {
    /// The store answered with a failure; `message` is its own diagnostic.
    #[error("{message}")]
    Rejected { status: u16, message: String },

    #[error("store unreachable: {0}")]
    Transport(String),

    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result of a put-if-absent write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateOutcome {
    Created,
    /// Another writer created the key first; nothing was written.
    AlreadyExists,
}

/// Write-once blob store keyed by [`StoredObjectKey`].
///
/// Implementations must guarantee at most one successful `create` per key.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// `Ok(false)` only for a definite miss; anything inconclusive is an error.
    async fn exists(&self, key: &StoredObjectKey) -> Result<bool, StoreError>;

    /// Create the object unless it is already present. Never overwrites.
    async fn create(&self, key: &StoredObjectKey, bytes: &[u8]) -> Result<CreateOutcome, StoreError>;

    /// Open the object for reading, `None` when it does not exist.
    async fn open(&self, key: &StoredObjectKey) -> Result<Option<BlobStream>, StoreError>;
}
