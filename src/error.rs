/// Unified error types for MapTools markers
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for the marker service
#[derive(Error, Debug)]
pub enum MarkerError {
    /// Name to profile lookup failed
    #[error("Name lookup error: {0}")]
    NameLookup(String),

    /// Texture lookup or decoding failed
    #[error("Texture lookup error: {0}")]
    TextureLookup(String),

    /// Remote service has no record
    #[error("Not found: {0}")]
    NotFound(String),

    /// HTTP transport errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding/decoding errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Outbound rate limit exhausted
    #[error("Rate limit exceeded")]
    RateLimitExceeded { retry_after: std::time::Duration },

    /// Internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// JSON error body returned by the HTTP listener
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl IntoResponse for MarkerError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            MarkerError::NotFound(_) => (StatusCode::NOT_FOUND, "NotFound", self.to_string()),
            MarkerError::RateLimitExceeded { .. } => (
                StatusCode::TOO_MANY_REQUESTS,
                "RateLimitExceeded",
                "Rate limit exceeded".to_string(),
            ),
            MarkerError::Io(_) | MarkerError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "InternalServerError",
                "Internal server error".to_string(), // Don't leak paths
            ),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "InternalServerError",
                self.to_string(),
            ),
        };

        let body = Json(ErrorResponse {
            error: error_code.to_string(),
            message,
        });

        (status, body).into_response()
    }
}

/// Result type alias for marker operations
pub type MarkerResult<T> = Result<T, MarkerError>;
