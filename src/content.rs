//! Content-addressed ingestion on top of a write-once [`BlobStore`].

use crate::filetype::FileExtension;
use crate::key::{ContentFingerprint, StoredObjectKey};
use crate::storage::{BlobStore, BlobStream, CreateOutcome, StoreError};
use crate::MAX_BLOB_BYTES;
use std::sync::Arc;
use thiserror::Error;

/// Path segment under which stored blobs are publicly readable.
pub const PUBLIC_PREFIX: &str = "public";

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("File too large")]
    TooLarge,

    /// The existence check was inconclusive, so nothing was written.
    #[error("{0}")]
    CheckFailed(StoreError),

    #[error("{0}")]
    Store(StoreError),
}

/// Where an ingested blob lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBlob {
    pub key: StoredObjectKey,
    pub url: String,
    /// `false` when identical content was already stored, by an earlier
    /// upload or by a concurrent writer that won the race.
    pub created: bool,
}

/// Public link for `key` under `base` (scheme and authority, optional path).
pub fn public_url(base: &str, key: &StoredObjectKey) -> String {
    format!("{}/{}/{}", base.trim_end_matches('/'), PUBLIC_PREFIX, key)
}

#[derive(Clone)]
pub struct ContentStore {
    store: Arc<dyn BlobStore>,
    max_bytes: usize,
}

impl ContentStore {
    pub fn new(store: Arc<dyn BlobStore>) -> Self {
        ContentStore {
            store,
            max_bytes: MAX_BLOB_BYTES,
        }
    }

    /// Store `bytes` under their fingerprint unless already present.
    ///
    /// The existence check always precedes the create. A create that loses
    /// a race to an identical writer is reported as `created: false`.
    pub async fn put_if_absent(
        &self,
        bytes: &[u8],
        extension: FileExtension,
        public_base: &str,
    ) -> Result<StoredBlob, IngestError> {
        if bytes.len() > self.max_bytes {
            return Err(IngestError::TooLarge);
        }

        let key = StoredObjectKey::new(ContentFingerprint::of(bytes), extension);
        let url = public_url(public_base, &key);

        let present = self.store.exists(&key).await.map_err(|e| {
            tracing::error!(key = %key, error = %e, "existence check failed");
            IngestError::CheckFailed(e)
        })?;
        if present {
            tracing::debug!(key = %key, "content already stored");
            return Ok(StoredBlob {
                key,
                url,
                created: false,
            });
        }

        let outcome = self.store.create(&key, bytes).await.map_err(|e| {
            tracing::error!(key = %key, error = %e, "create failed");
            IngestError::Store(e)
        })?;
        let created = match outcome {
            CreateOutcome::Created => {
                tracing::info!(key = %key, size = bytes.len(), "stored new blob");
                true
            }
            CreateOutcome::AlreadyExists => {
                tracing::debug!(key = %key, "concurrent writer stored the blob first");
                false
            }
        };

        Ok(StoredBlob { key, url, created })
    }

    /// Open a stored blob for reading; `None` on a miss.
    pub async fn open(&self, key: &StoredObjectKey) -> Result<Option<BlobStream>, StoreError> {
        self.store.open(key).await
    }
}
