//! API error types.

use crate::codec::CodecError;
use crate::content::IngestError;
use crate::fetch::FetchError;
use crate::models::ErrorResponse;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Missing or malformed client input.
    #[error("{0}")]
    BadRequest(String),

    #[error("Server not configured")]
    NotConfigured,

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Ingest(#[from] IngestError),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotConfigured => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Fetch(_) => StatusCode::BAD_REQUEST,
            Self::Codec(_) => StatusCode::BAD_REQUEST,
            Self::Ingest(e) => match e {
                IngestError::TooLarge => StatusCode::BAD_REQUEST,
                IngestError::CheckFailed(_) => StatusCode::BAD_GATEWAY,
                IngestError::Store(_) => StatusCode::BAD_REQUEST,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            success: false,
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::{BlockReason, Blocked};
    use crate::storage::StoreError;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::NotConfigured.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::from(FetchError::Timeout).status_code(),
            StatusCode::BAD_REQUEST
        );
        let inconclusive = IngestError::CheckFailed(StoreError::Rejected {
            status: 500,
            message: "Server Error".to_string(),
        });
        assert_eq!(
            ApiError::from(inconclusive).status_code(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_messages_are_client_facing() {
        let blocked = ApiError::from(FetchError::from(Blocked(BlockReason::PrivateNetwork)));
        assert_eq!(blocked.to_string(), "URL not allowed");

        let upstream = ApiError::from(FetchError::Upstream("origin answered 503".to_string()));
        assert_eq!(upstream.to_string(), "Failed to fetch");

        let rejected = ApiError::from(IngestError::Store(StoreError::Rejected {
            status: 409,
            message: "is at 1234 but expected 5678".to_string(),
        }));
        assert_eq!(rejected.to_string(), "is at 1234 but expected 5678");

        assert_eq!(
            ApiError::from(CodecError::InvalidEncoding).to_string(),
            "Invalid base64"
        );
    }
}
