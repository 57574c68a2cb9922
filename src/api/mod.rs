// src/api/mod.rs
// HTTP API: handlers, bodies and error mapping

pub mod error;
pub mod explain;
pub mod types;

pub use error::{ApiError, ApiResult};
pub use types::{ErrorResponse, ExplainRequest, ExplainResponse, HealthResponse, ValidatedRequest};
