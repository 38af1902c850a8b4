use super::backend::{BlobStore, BlobStream, CreateOutcome, StoreError};
use crate::codec;
use crate::key::StoredObjectKey;
use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::{header, Client, Response, StatusCode};
use serde::{Deserialize, Serialize};

/// Media type asking the contents API for the file itself instead of JSON.
const RAW_MEDIA_TYPE: &str = "application/vnd.github.raw";

/// Directory inside the repository holding uploaded blobs.
const OBJECT_DIR: &str = "public";

/// Stores blobs as files of a GitHub repository through the contents API
pub struct GitHubStore {
    client: Client,
    api_base: String,
    repo: String,
    token: String,
}

#[derive(Debug, Serialize)]
struct CreateFileRequest<'a> {
    message: String,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    message: Option<String>,
}

impl GitHubStore {
    pub fn new(
        api_base: &str,
        repo: &str,
        token: &str,
        user_agent: &str,
    ) -> reqwest::Result<Self> {
        let client = Client::builder().user_agent(user_agent).build()?;
        Ok(Self::with_client(client, api_base, repo, token))
    }

    /// Use a prepared client; it should already carry a user agent.
    pub fn with_client(client: Client, api_base: &str, repo: &str, token: &str) -> Self {
        GitHubStore {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            repo: repo.to_string(),
            token: token.to_string(),
        }
    }

    fn object_url(&self, key: &StoredObjectKey) -> String {
        format!(
            "{}/repos/{}/contents/{}/{}",
            self.api_base, self.repo, OBJECT_DIR, key
        )
    }

    /// The `message` field GitHub puts in error bodies, if any.
    async fn upstream_message(response: Response) -> Option<String> {
        response
            .json::<ApiMessage>()
            .await
            .ok()
            .and_then(|body| body.message)
    }
}

fn transport(err: reqwest::Error) -> StoreError {
    StoreError::Transport(err.to_string())
}

#[async_trait]
impl BlobStore for GitHubStore {
    async fn exists(&self, key: &StoredObjectKey) -> Result<bool, StoreError> {
        let response = self
            .client
            .get(self.object_url(key))
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        if status.is_success() {
            return Ok(true);
        }
        if status == StatusCode::NOT_FOUND {
            return Ok(false);
        }

        let message = Self::upstream_message(response)
            .await
            .unwrap_or_else(|| format!("GitHub check failed ({})", status.as_u16()));
        Err(StoreError::Rejected {
            status: status.as_u16(),
            message,
        })
    }

    async fn create(&self, key: &StoredObjectKey, bytes: &[u8]) -> Result<CreateOutcome, StoreError> {
        let content = codec::encode(bytes);
        let body = CreateFileRequest {
            message: format!("Upload {}", key),
            content: &content,
        };

        let response = self
            .client
            .put(self.object_url(key))
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        if status.is_success() {
            return Ok(CreateOutcome::Created);
        }

        let message = Self::upstream_message(response).await;
        // Creating a path that exists without naming its sha is refused with
        // 422; that is a concurrent writer having won.
        if status == StatusCode::UNPROCESSABLE_ENTITY
            && message
                .as_deref()
                .is_some_and(|m| m.to_lowercase().contains("already exists"))
        {
            return Ok(CreateOutcome::AlreadyExists);
        }

        Err(StoreError::Rejected {
            status: status.as_u16(),
            message: message.unwrap_or_else(|| "Upload failed".to_string()),
        })
    }

    async fn open(&self, key: &StoredObjectKey) -> Result<Option<BlobStream>, StoreError> {
        let response = self
            .client
            .get(self.object_url(key))
            .bearer_auth(&self.token)
            .header(header::ACCEPT, RAW_MEDIA_TYPE)
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let message = Self::upstream_message(response)
                .await
                .unwrap_or_else(|| format!("GitHub read failed ({})", status.as_u16()));
            return Err(StoreError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        Ok(Some(response.bytes_stream().map(|r| r.map_err(transport)).boxed()))
    }
}
