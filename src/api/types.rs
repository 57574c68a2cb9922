// src/api/types.rs
// Request/response bodies of the explain API

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::{
    ApiError, ApiResult, INVALID_BODY, INVALID_LEVEL, IntoApiErrorOption, MISSING_LEVEL,
    MISSING_TOPIC,
};
use crate::prompt::Level;

/// Body of `POST /explain` as sent by clients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplainRequest {
    pub topic: String,
    pub level: Level,
    #[serde(default)]
    pub stream: bool,
}

/// Non-streaming success body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplainResponse {
    pub explanation: String,
}

/// Error body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

/// An explain request that passed boundary validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRequest {
    /// Trimmed, non-empty
    pub topic: String,
    pub level: Level,
    pub stream: bool,
}

impl ValidatedRequest {
    /// Validate a raw JSON body.
    ///
    /// Fields are checked loosely so that every bad input maps to one of the
    /// reason strings instead of a generic deserialization failure.
    pub fn parse(body: &[u8]) -> ApiResult<Self> {
        let value: Value =
            serde_json::from_slice(body).map_err(|_| ApiError::bad_request(INVALID_BODY))?;
        let object = value.as_object().ok_or_bad_request(INVALID_BODY)?;

        let topic = object
            .get("topic")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_bad_request(MISSING_TOPIC)?;

        let level = object
            .get("level")
            .and_then(Value::as_str)
            .filter(|l| !l.is_empty())
            .ok_or_bad_request(MISSING_LEVEL)?
            .parse::<Level>()
            .map_err(|_| ApiError::bad_request(INVALID_LEVEL))?;

        let stream = object.get("stream").and_then(Value::as_bool).unwrap_or(false);

        Ok(Self {
            topic: topic.to_string(),
            level,
            stream,
        })
    }
}
