use super::bounded::{read_bounded, ReadError};
use super::guard::{self, Blocked};
use crate::config::Config;
use crate::MAX_BLOB_BYTES;
use reqwest::{header, redirect, Client};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Content type reported when the origin does not declare one.
pub const DEFAULT_FETCH_TYPE: &str = "image/*";

/// Redirect hops followed before giving up.
const MAX_REDIRECTS: usize = 10;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("Invalid URL")]
    InvalidUrl,

    #[error(transparent)]
    Blocked(#[from] Blocked),

    #[error("Request timed out")]
    Timeout,

    #[error("File too large")]
    TooLarge,

    /// Origin answered with a failure status or the transfer broke. The
    /// detail is for logs; clients get the generic message.
    #[error("Failed to fetch")]
    Upstream(String),
}

impl From<ReadError> for FetchError {
    fn from(err: ReadError) -> Self {
        match err {
            ReadError::TooLarge { .. } => FetchError::TooLarge,
            ReadError::Stream(detail) => FetchError::Upstream(detail),
        }
    }
}

/// A fully received remote resource.
#[derive(Debug, Clone)]
pub struct FetchResult {
    /// Declared media type, lowercased and without parameters.
    pub content_type: String,
    /// Bytes actually received.
    pub size: usize,
    pub bytes: Vec<u8>,
}

/// Fetches user-supplied URLs under the SSRF guard, a deadline and the blob
/// size ceiling. One request per call (plus redirect hops), never retried.
#[derive(Clone)]
pub struct Fetcher {
    client: Client,
    timeout: Duration,
    max_bytes: usize,
}

impl Fetcher {
    pub fn new(config: &Config) -> reqwest::Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .redirect(redirect::Policy::limited(MAX_REDIRECTS))
            .build()?;
        Ok(Self::with_client(
            client,
            Duration::from_secs(config.fetch_timeout_secs),
            MAX_BLOB_BYTES,
        ))
    }

    /// Use a prepared client, e.g. one with pinned name resolution.
    pub fn with_client(client: Client, timeout: Duration, max_bytes: usize) -> Self {
        Fetcher {
            client,
            timeout,
            max_bytes,
        }
    }

    pub async fn fetch(&self, raw_url: &str) -> Result<FetchResult, FetchError> {
        let url = Url::parse(raw_url.trim()).map_err(|_| FetchError::InvalidUrl)?;
        guard::check(&url).inspect_err(|blocked| {
            tracing::warn!(url = %url, reason = %blocked.0, "refusing to fetch URL");
        })?;

        // Dropping the in-flight future on expiry aborts the request.
        match tokio::time::timeout(self.timeout, self.fetch_guarded(url)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::debug!(timeout = ?self.timeout, "fetch deadline expired");
                Err(FetchError::Timeout)
            }
        }
    }

    async fn fetch_guarded(&self, url: Url) -> Result<FetchResult, FetchError> {
        let response = self.client.get(url.clone()).send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout
            } else {
                FetchError::Upstream(e.to_string())
            }
        })?;

        // Redirects were followed by the client, so the host that answered
        // may differ from the one that was checked.
        let final_url = response.url().clone();
        guard::check(&final_url).inspect_err(|blocked| {
            tracing::warn!(
                url = %url,
                final_url = %final_url,
                reason = %blocked.0,
                "redirect led to a refused URL"
            );
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Upstream(format!("origin answered {}", status)));
        }

        let content_type = media_type(
            response
                .headers()
                .get(header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok()),
        );
        let declared = response.content_length();
        let bytes = read_bounded(response.bytes_stream(), declared, self.max_bytes).await?;

        tracing::debug!(url = %final_url, size = bytes.len(), content_type = %content_type, "fetched remote resource");

        Ok(FetchResult {
            content_type,
            size: bytes.len(),
            bytes,
        })
    }
}

/// `image/PNG; charset=x` becomes `image/png`; absent or blank becomes the default.
fn media_type(header_value: Option<&str>) -> String {
    let essence = header_value
        .and_then(|v| v.split(';').next())
        .map(|v| v.trim().to_lowercase())
        .unwrap_or_default();
    if essence.is_empty() {
        DEFAULT_FETCH_TYPE.to_string()
    } else {
        essence
    }
}
