//! Backend Error Types
//!
//! Defines error types for the development backend and implements
//! conversion to HTTP responses with appropriate status codes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Backend error types
#[derive(Error, Debug)]
pub enum BackendError {
    /// Request validation failed
    #[error("Validation error: {0}")]
    Validation(String),

    /// Room or conversation not found
    #[error("{kind} with id={id} not found")]
    NotFound { kind: &'static str, id: String },

    /// A model the request needs is not configured
    #[error("{0}")]
    ModelNotConfigured(&'static str),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error response body
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub status: &'static str,
    pub request_id: String,
}

impl IntoResponse for BackendError {
    fn into_response(self) -> Response {
        let status = match &self {
            BackendError::Validation(_) => StatusCode::BAD_REQUEST,
            BackendError::NotFound { .. } => StatusCode::NOT_FOUND,
            BackendError::ModelNotConfigured(_)
            | BackendError::Internal(_)
            | BackendError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let request_id = uuid::Uuid::new_v4().to_string();

        tracing::error!(
            request_id = %request_id,
            status = %status,
            error_message = %self,
            "Request failed"
        );

        let body = ErrorResponse {
            error: self.to_string(),
            status: "error",
            request_id,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for backend operations
pub type BackendResult<T> = Result<T, BackendError>;
