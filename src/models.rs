use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Deserialize)]
pub struct FetchUrlRequest {
    /// Kept as raw JSON so a non-string reads as a missing url.
    #[serde(default)]
    pub url: Option<Value>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FetchUrlResponse {
    pub success: bool,
    pub base64: String,
    #[serde(rename = "type")]
    pub content_type: String,
}

#[derive(Debug, Deserialize)]
pub struct UploadRequest {
    #[serde(default)]
    pub filename: Option<Value>,
    /// Base64 of the file body.
    #[serde(default)]
    pub content: Option<Value>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub success: bool,
    pub url: String,
    /// Present (and true) when the content was already stored.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cached: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}
