//! Shared test utilities.
//! Note: #[allow(dead_code)] because each test file compiles common/ separately.
#![allow(dead_code)]

use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use blob_relay::config::{Config, StorageType};
use blob_relay::content::ContentStore;
use blob_relay::fetch::Fetcher;
use blob_relay::storage::{BlobStore, GitHubStore, LocalStore};
use blob_relay::{create_router, AppState};
use serde_json::Value;
use std::net::{SocketAddr, TcpListener};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

pub const PUBLIC_BASE: &str = "https://files.example.com";
pub const TOKEN: &str = "ghp_test_token";
pub const REPO: &str = "octocat/assets";

pub fn can_bind_localhost() -> bool {
    TcpListener::bind("127.0.0.1:0").is_ok()
}

pub fn test_config() -> Config {
    Config {
        base_url: Some(PUBLIC_BASE.to_string()),
        ..Config::default()
    }
}

/// Fetcher whose client resolves each of `hosts` to `addr`, so tests can use
/// hostnames the URL guard accepts while talking to a local mock.
pub fn pinned_fetcher(hosts: &[&str], addr: SocketAddr, timeout: Duration, max_bytes: usize) -> Fetcher {
    let mut builder = reqwest::Client::builder().no_proxy();
    for host in hosts {
        builder = builder.resolve(host, addr);
    }
    Fetcher::with_client(builder.build().unwrap(), timeout, max_bytes)
}

pub fn default_fetcher() -> Fetcher {
    Fetcher::new(&test_config()).unwrap()
}

pub fn local_state(dir: &Path) -> AppState {
    let config = Config {
        storage_type: StorageType::Local,
        local_storage_path: Some(dir.to_string_lossy().into_owned()),
        ..test_config()
    };
    let store: Arc<dyn BlobStore> = Arc::new(LocalStore::new(dir));
    AppState {
        config,
        fetcher: default_fetcher(),
        content: Some(ContentStore::new(store)),
    }
}

pub const USER_AGENT: &str = "blob-relay-tests";

pub fn github_store(api_base: &str) -> GitHubStore {
    let client = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .no_proxy()
        .build()
        .unwrap();
    GitHubStore::with_client(client, api_base, REPO, TOKEN)
}

pub fn github_state(api_base: &str) -> AppState {
    let config = Config {
        github_token: Some(TOKEN.to_string()),
        github_repo: Some(REPO.to_string()),
        github_api_url: api_base.to_string(),
        ..test_config()
    };
    let store: Arc<dyn BlobStore> = Arc::new(github_store(api_base));
    AppState {
        config,
        fetcher: default_fetcher(),
        content: Some(ContentStore::new(store)),
    }
}

/// Send a request with an optional JSON body; returns status and parsed JSON.
pub async fn json_request(
    state: &AppState,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(v) => {
            builder = builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&v).unwrap())
        }
        None => Body::empty(),
    };

    let (status, _, bytes) = send(state, builder.body(body).unwrap()).await;
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

/// Send a prepared request; returns status, headers and the raw body.
pub async fn send(state: &AppState, request: Request<Body>) -> (StatusCode, HeaderMap, Vec<u8>) {
    let response = create_router(state.clone()).oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, headers, bytes.to_vec())
}

/// Deterministic non-trivial test payload.
pub fn sample_bytes(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 7 % 256) as u8).collect()
}

/// Expected content-addressed name of `bytes` with `ext`.
pub fn expected_key(bytes: &[u8], ext: &str) -> String {
    use sha2::{Digest, Sha256};
    let digest = hex::encode(Sha256::digest(bytes));
    format!("{}{}", &digest[..12], ext)
}
