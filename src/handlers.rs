use crate::codec;
use crate::config::Config;
use crate::content::ContentStore;
use crate::error::{ApiError, ApiResult};
use crate::fetch::Fetcher;
use crate::filetype::FileExtension;
use crate::key::StoredObjectKey;
use crate::models::{FetchUrlRequest, FetchUrlResponse, UploadRequest, UploadResponse};
use crate::storage::create_store;
use axum::{
    body::Body,
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde_json::Value;

/// One year; stored objects never change.
const PUBLIC_CACHE_CONTROL: &str = "public, max-age=31536000, immutable";

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub fetcher: Fetcher,
    /// `None` when the blob store is not configured.
    pub content: Option<ContentStore>,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let fetcher = Fetcher::new(&config)?;
        let content = create_store(&config)?.map(ContentStore::new);
        Ok(AppState {
            config,
            fetcher,
            content,
        })
    }

    /// Base for public links: the configured one, else the request's origin.
    fn public_base(&self, headers: &HeaderMap) -> String {
        if let Some(base) = &self.config.base_url {
            return base.clone();
        }
        request_origin(headers).unwrap_or_default()
    }
}

fn request_origin(headers: &HeaderMap) -> Option<String> {
    let host = headers.get(header::HOST)?.to_str().ok()?;
    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| *v == "http" || *v == "https")
        .unwrap_or("http");
    Some(format!("{}://{}", scheme, host))
}

fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    payload.map(|Json(body)| body).map_err(|e| {
        tracing::debug!("Rejected request body: {}", e);
        ApiError::BadRequest("Invalid JSON body".to_string())
    })
}

/// Non-blank string field or a `Missing <name>` error. Values of any other
/// JSON type count as missing.
fn required(value: Option<Value>, name: &str) -> ApiResult<String> {
    value
        .and_then(|v| match v {
            Value::String(s) => Some(s),
            _ => None,
        })
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest(format!("Missing {}", name)))
}

/// POST /api/fetch-url - Fetch a remote resource and return it as base64
pub async fn fetch_url(
    State(state): State<AppState>,
    payload: Result<Json<FetchUrlRequest>, JsonRejection>,
) -> ApiResult<Json<FetchUrlResponse>> {
    let request = json_body(payload)?;
    let url = required(request.url, "url")?;

    let fetched = state.fetcher.fetch(&url).await.inspect_err(|e| {
        tracing::info!("Fetch of {} failed: {:?}", url, e);
    })?;

    Ok(Json(FetchUrlResponse {
        success: true,
        base64: codec::encode(&fetched.bytes),
        content_type: fetched.content_type,
    }))
}

/// POST /api/upload - Store base64 content under its fingerprint
pub async fn upload(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<UploadRequest>, JsonRejection>,
) -> ApiResult<Json<UploadResponse>> {
    let request = json_body(payload)?;
    let content_store = state.content.as_ref().ok_or(ApiError::NotConfigured)?;

    let filename = required(request.filename, "filename")?;
    let content = required(request.content, "content")?;

    let extension = FileExtension::from_filename(&filename)
        .ok_or_else(|| ApiError::BadRequest("Unsupported file type".to_string()))?;
    let bytes = codec::decode(&content)?;
    drop(content);

    let stored = content_store
        .put_if_absent(&bytes, extension, &state.public_base(&headers))
        .await?;

    Ok(Json(UploadResponse {
        success: true,
        url: stored.url,
        cached: (!stored.created).then_some(true),
    }))
}

/// ANY /public/{file} - Serve a stored blob by its content-addressed name
pub async fn serve_public(
    State(state): State<AppState>,
    file: Result<Path<String>, PathRejection>,
) -> Response {
    let Ok(Path(file)) = file else {
        return not_found();
    };
    let Some(key) = StoredObjectKey::parse(&file) else {
        return not_found();
    };
    let Some(content_store) = &state.content else {
        tracing::error!("Blob store not configured; cannot serve {}", key);
        return not_found();
    };

    let stream = match content_store.open(&key).await {
        Ok(Some(stream)) => stream,
        Ok(None) => return not_found(),
        Err(e) => {
            tracing::warn!("Failed to open {}: {}", key, e);
            return not_found();
        }
    };

    (
        [
            (header::CONTENT_TYPE, key.extension().content_type().to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("inline; filename=\"{}\"", key),
            ),
            (header::CACHE_CONTROL, PUBLIC_CACHE_CONTROL.to_string()),
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*".to_string()),
            (header::X_CONTENT_TYPE_OPTIONS, "nosniff".to_string()),
        ],
        Body::from_stream(stream),
    )
        .into_response()
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "Not found").into_response()
}
