// src/api/error.rs
// Centralized error handling for HTTP API responses

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::fmt;
use tracing::error;

use super::types::ErrorResponse;

/// Reason strings clients can match on
pub const MISSING_TOPIC: &str = "missing topic";
pub const MISSING_LEVEL: &str = "missing level";
pub const INVALID_LEVEL: &str = "invalid level";
pub const INVALID_BODY: &str = "invalid request body";
pub const GENERATION_FAILED: &str = "generation failed";

/// API error rendered as `{"error": reason}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub reason: String,
    pub status_code: StatusCode,
}

impl ApiError {
    /// Create a new bad request error
    pub fn bad_request(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            status_code: StatusCode::BAD_REQUEST,
        }
    }

    /// Create a new internal server error
    pub fn internal(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            status_code: StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Log the upstream cause and return the generic generation failure
    pub fn generation_failed(cause: impl fmt::Display) -> Self {
        error!(error = %cause, "Error generating explanation");
        Self::internal(GENERATION_FAILED)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.reason)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse { error: self.reason };
        (self.status_code, Json(body)).into_response()
    }
}

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;

/// Extension trait for Option<T> to create ApiError for None cases
pub trait IntoApiErrorOption<T> {
    fn ok_or_bad_request(self, reason: &str) -> Result<T, ApiError>;
}

impl<T> IntoApiErrorOption<T> for Option<T> {
    fn ok_or_bad_request(self, reason: &str) -> Result<T, ApiError> {
        self.ok_or_else(|| ApiError::bad_request(reason))
    }
}
