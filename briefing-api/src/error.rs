//! Error types for briefing-api
//!
//! Every failure leaves the service as `{"error": {"code", "message"}}` with a
//! status derived from the error kind.

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use briefing_common::db::PersistenceError;
use briefing_common::ExtractionError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Request body is not the expected JSON (400)
    #[error("Invalid request body: {0}")]
    InvalidBody(#[from] JsonRejection),

    /// Query string does not deserialize (400)
    #[error("Invalid query string: {0}")]
    InvalidQuery(#[from] QueryRejection),

    /// Briefing extraction failed (502/504)
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    /// Briefing persistence failed (403/404/500)
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

impl ApiError {
    /// HTTP status and machine-readable code
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::BadRequest(_) | ApiError::InvalidBody(_) | ApiError::InvalidQuery(_) => {
                (StatusCode::BAD_REQUEST, "invalid-input")
            }
            ApiError::Extraction(e) => {
                let status = match e {
                    ExtractionError::UpstreamTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
                    ExtractionError::MalformedResponse(_)
                    | ExtractionError::SchemaMismatch(_)
                    | ExtractionError::UpstreamFailed(_) => StatusCode::BAD_GATEWAY,
                };
                (status, e.kind())
            }
            ApiError::Persistence(e) => {
                let status = match e {
                    PersistenceError::NotFound(_) => StatusCode::NOT_FOUND,
                    PersistenceError::Forbidden(_) => StatusCode::FORBIDDEN,
                    PersistenceError::WriteFailed(_) | PersistenceError::Database(_) => {
                        StatusCode::INTERNAL_SERVER_ERROR
                    }
                };
                (status, e.kind())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        if status.is_server_error() {
            error!(code, error = %self, "Request failed");
        }

        let body = Json(json!({
            "error": {
                "code": code,
                "message": self.to_string(),
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
