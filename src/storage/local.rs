use super::backend::{BlobStore, BlobStream, CreateOutcome, StoreError};
use crate::key::StoredObjectKey;
use async_trait::async_trait;
use bytes::Bytes;
use futures_util::{stream, StreamExt};
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

/// Blobs as files in one directory.
///
/// A create writes a private temporary file and hard-links it into place;
/// the link fails if the name is taken, so racing creators never overwrite
/// each other and readers never see a partial file.
pub struct LocalStore {
    root: PathBuf,
    temp_seq: AtomicU64,
}

impl LocalStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        LocalStore {
            root: root.into(),
            temp_seq: AtomicU64::new(0),
        }
    }

    fn object_path(&self, key: &StoredObjectKey) -> PathBuf {
        self.root.join(key.to_string())
    }

    fn temp_path(&self, key: &StoredObjectKey) -> PathBuf {
        let seq = self.temp_seq.fetch_add(1, Ordering::Relaxed);
        self.root
            .join(format!(".{}.{}.{}.tmp", key, std::process::id(), seq))
    }
}

#[async_trait]
impl BlobStore for LocalStore {
    async fn exists(&self, key: &StoredObjectKey) -> Result<bool, StoreError> {
        Ok(tokio::fs::try_exists(self.object_path(key)).await?)
    }

    async fn create(&self, key: &StoredObjectKey, bytes: &[u8]) -> Result<CreateOutcome, StoreError> {
        tokio::fs::create_dir_all(&self.root).await?;

        let temp = self.temp_path(key);
        tokio::fs::write(&temp, bytes).await?;
        let linked = tokio::fs::hard_link(&temp, self.object_path(key)).await;
        let _ = tokio::fs::remove_file(&temp).await;

        match linked {
            Ok(()) => Ok(CreateOutcome::Created),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(CreateOutcome::AlreadyExists),
            Err(e) => Err(e.into()),
        }
    }

    async fn open(&self, key: &StoredObjectKey) -> Result<Option<BlobStream>, StoreError> {
        match tokio::fs::read(self.object_path(key)).await {
            Ok(bytes) => Ok(Some(stream::once(async move { Ok(Bytes::from(bytes)) }).boxed())),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
