// src/api/error.rs
// Centralized error handling for HTTP API responses

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;
use tracing::error;

use crate::error::EngineError;

/// Standard API error response format
#[derive(Debug)]
pub struct ApiError {
    pub message: String,
    pub status_code: StatusCode,
    pub error_code: Option<String>,
}

impl ApiError {
    fn with_code(status_code: StatusCode, code: &str, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status_code,
            error_code: Some(code.to_string()),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::with_code(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::with_code(StatusCode::BAD_REQUEST, "BAD_REQUEST", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::with_code(StatusCode::NOT_FOUND, "NOT_FOUND", message)
    }

    /// Wrong or missing admin key
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::with_code(StatusCode::FORBIDDEN, "FORBIDDEN", message)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut body = json!({
            "error": true,
            "message": self.message,
            "status": self.status_code.as_u16()
        });
        if let Some(code) = self.error_code {
            body["error_code"] = json!(code);
        }
        (self.status_code, Json(body)).into_response()
    }
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::EmptyPool => ApiError::not_found("No content available"),
            EngineError::Persistence(e) => {
                error!("Persistence failure: {}", e);
                ApiError::internal("Failed to persist state")
            }
        }
    }
}

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;

/// Extension trait for converting common error types to ApiError
pub trait IntoApiError<T> {
    fn into_api_error(self, message: &str) -> Result<T, ApiError>;
}

impl<T, E> IntoApiError<T> for Result<T, E>
where
    E: std::fmt::Debug,
{
    fn into_api_error(self, message: &str) -> Result<T, ApiError> {
        self.map_err(|e| {
            error!("{}: {:?}", message, e);
            ApiError::internal(message)
        })
    }
}

/// Helper function for validation errors
pub fn validation_error(field: &str, reason: &str) -> ApiError {
    ApiError::bad_request(format!("Validation failed for {field}: {reason}"))
}
