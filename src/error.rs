// src/error.rs
// Standardized error types for the explainer library

use thiserror::Error;

/// Main error type for the explainer library
#[derive(Error, Debug)]
pub enum ExplainerError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("unknown level: {0}")]
    UnknownLevel(String),

    #[error("configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("proxy returned status {0}")]
    Status(u16),

    #[error("stream ended without a terminal event")]
    Incomplete,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("request cancelled")]
    Cancelled,
}

/// Convenience type alias for Result using ExplainerError
pub type Result<T> = std::result::Result<T, ExplainerError>;

impl ExplainerError {
    /// Cancellation is absorbed silently by callers, never shown to the user
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ExplainerError::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_level_error() {
        let err = ExplainerError::UnknownLevel("toddler".to_string());
        assert!(err.to_string().contains("unknown level"));
        assert!(err.to_string().contains("toddler"));
    }

    #[test]
    fn test_llm_error() {
        let err = ExplainerError::Llm("quota exceeded".to_string());
        assert!(err.to_string().contains("LLM error"));
        assert!(err.to_string().contains("quota exceeded"));
    }

    #[test]
    fn test_cancelled_error() {
        assert!(ExplainerError::Cancelled.is_cancelled());
        assert!(!ExplainerError::Incomplete.is_cancelled());
        assert!(ExplainerError::Cancelled.to_string().contains("cancelled"));
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: ExplainerError = io_err.into();
        assert!(matches!(err, ExplainerError::Io(_)));
        assert!(err.to_string().contains("I/O error"));
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<i32>("not json").unwrap_err();
        let err: ExplainerError = json_err.into();
        assert!(matches!(err, ExplainerError::Json(_)));
        assert!(err.to_string().contains("JSON"));
    }

    #[test]
    fn test_from_config_error() {
        let err: ExplainerError = crate::config::ConfigError::MissingApiKey.into();
        assert!(matches!(err, ExplainerError::Config(_)));
        assert!(err.to_string().contains("GEMINI_API_KEY"));
    }
}
