//! Error types for the analyzer server

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use explain_engine::ExplainError;
use scan_engine::ScanError;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::api::timestamp;

/// Server error types
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    AnalysisFailed(String),

    #[error("{0}")]
    Internal(String),
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: &'static str,
    message: String,
    timestamp: String,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, label) = match &self {
            ServerError::Validation(_) => (StatusCode::BAD_REQUEST, "Validation Error"),
            ServerError::AnalysisFailed(_) => (StatusCode::BAD_REQUEST, "Analysis Failed"),
            ServerError::Internal(msg) => {
                error!(error = %msg, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
            }
        };

        let body = ErrorResponse {
            error: label,
            message: self.to_string(),
            timestamp: timestamp(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<ScanError> for ServerError {
    fn from(err: ScanError) -> Self {
        match err {
            ScanError::Validation(msg) => ServerError::Validation(msg),
            other => ServerError::AnalysisFailed(other.to_string()),
        }
    }
}

impl From<ExplainError> for ServerError {
    fn from(err: ExplainError) -> Self {
        match err {
            ExplainError::Validation(msg) => ServerError::Validation(msg),
            other => ServerError::Internal(other.to_string()),
        }
    }
}

/// Bodies that are not JSON or do not fit the request shape
impl From<JsonRejection> for ServerError {
    fn from(rejection: JsonRejection) -> Self {
        ServerError::Validation(rejection.body_text())
    }
}
