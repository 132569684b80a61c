//! API error types.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use depot_engine::EngineError;
use depot_metadata::MetadataError;
use depot_storage::StorageError;
use serde::Serialize;

/// API error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

/// API error type.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("metadata error: {0}")]
    Metadata(#[from] MetadataError),
}

impl ApiError {
    /// Get the error code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "bad_request",
            Self::Unauthorized(_) => "unauthorized",
            Self::Engine(e) => match e {
                EngineError::InvalidName(_) => "invalid_filename",
                EngineError::PayloadTooLarge { .. } => "payload_too_large",
                EngineError::DuplicateContent { .. } => "duplicate_content",
                EngineError::NameExhausted(_) => "name_exhausted",
                EngineError::NotFound(_) => "not_found",
                EngineError::Storage(_) => "storage_error",
                EngineError::Metadata(_) => "metadata_error",
                EngineError::Internal(_) => "internal_error",
            },
            Self::Storage(_) => "storage_error",
            Self::Metadata(_) => "metadata_error",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Engine(e) => match e {
                EngineError::InvalidName(_) => StatusCode::BAD_REQUEST,
                EngineError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
                EngineError::DuplicateContent { .. } => StatusCode::CONFLICT,
                EngineError::NameExhausted(_) => StatusCode::CONFLICT,
                EngineError::NotFound(_) => StatusCode::NOT_FOUND,
                EngineError::Metadata(MetadataError::NotFound(_)) => StatusCode::NOT_FOUND,
                EngineError::Metadata(MetadataError::AlreadyExists(_)) => StatusCode::CONFLICT,
                EngineError::Storage(StorageError::NotFound(_)) => StatusCode::NOT_FOUND,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Storage(StorageError::NotFound(_)) => StatusCode::NOT_FOUND,
            Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Metadata(MetadataError::NotFound(_)) => StatusCode::NOT_FOUND,
            Self::Metadata(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            code: self.code().to_string(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers.
pub type ApiResult<T> = std::result::Result<T, ApiError>;
