pub mod backend;
pub mod github;
pub mod local;

pub use backend::{BlobStore, BlobStream, CreateOutcome, StoreError};
pub use github::GitHubStore;
pub use local::LocalStore;

use crate::config::{Config, StorageType};
use std::sync::Arc;

/// Factory function to create the configured blob store.
///
/// Returns `None` when the GitHub backend is selected without a token or
/// repository; requests that need the store then report the server as
/// unconfigured.
pub fn create_store(config: &Config) -> anyhow::Result<Option<Arc<dyn BlobStore>>> {
    match config.storage_type {
        StorageType::GitHub => {
            let (Some(token), Some(repo)) = (&config.github_token, &config.github_repo) else {
                tracing::warn!("GITHUB_TOKEN or GITHUB_REPO not set; uploads are disabled");
                return Ok(None);
            };
            let store = GitHubStore::new(&config.github_api_url, repo, token, &config.user_agent)?;
            Ok(Some(Arc::new(store)))
        }
        StorageType::Local => {
            let path = config
                .local_storage_path
                .as_ref()
                .ok_or_else(|| anyhow::anyhow!("LOCAL_STORAGE_PATH must be set for local storage"))?;
            Ok(Some(Arc::new(LocalStore::new(path))))
        }
    }
}
