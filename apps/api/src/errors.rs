use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::generation::service::{FailureReason, GenerationFailure};
use crate::generation::workflow::WorkflowError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Generation failed: {0}")]
    Generation(#[from] GenerationFailure),
}

impl From<WorkflowError> for AppError {
    fn from(error: WorkflowError) -> Self {
        match error {
            WorkflowError::InvalidState(msg) => AppError::InvalidState(msg),
            WorkflowError::Generation(failure) => AppError::Generation(failure),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::InvalidState(msg) => (StatusCode::CONFLICT, "INVALID_STATE", msg.clone()),
            AppError::Generation(failure) => {
                tracing::error!("Generation error: {failure}");
                match failure.reason() {
                    FailureReason::Timeout => (
                        StatusCode::GATEWAY_TIMEOUT,
                        "GENERATION_TIMEOUT",
                        failure.to_string(),
                    ),
                    FailureReason::MalformedResponse => (
                        StatusCode::BAD_GATEWAY,
                        "MALFORMED_RESPONSE",
                        "The generation backend returned an unusable response".to_string(),
                    ),
                    FailureReason::UpstreamError => (
                        StatusCode::BAD_GATEWAY,
                        "UPSTREAM_ERROR",
                        "The generation backend reported an error".to_string(),
                    ),
                }
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
