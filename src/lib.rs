pub mod codec;
pub mod config;
pub mod content;
pub mod error;
pub mod fetch;
pub mod filetype;
pub mod handlers;
pub mod key;
pub mod models;
pub mod storage;

pub use handlers::AppState;

use axum::{
    extract::DefaultBodyLimit,
    routing::{any, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Ceiling for fetched and uploaded blobs, in decoded bytes (24 MiB).
pub const MAX_BLOB_BYTES: usize = 24 * 1024 * 1024;

/// Request body limit: a full-size blob in base64 plus the JSON envelope.
pub const MAX_REQUEST_BYTES: usize = 40 * 1024 * 1024;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/fetch-url", post(handlers::fetch_url))
        .route("/api/upload", post(handlers::upload))
        .route("/public/:file", any(handlers::serve_public))
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BYTES))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
