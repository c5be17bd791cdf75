use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::pipeline::orchestrator::MoveError;
use crate::pipeline::store::StoreError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Data unavailable: {0}")]
    DataUnavailable(#[from] StoreError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<MoveError> for AppError {
    fn from(err: MoveError) -> Self {
        match err {
            MoveError::Validation(e) => AppError::Validation(e.to_string()),
            MoveError::UnknownCandidate { .. } | MoveError::UnknownStage(_) => {
                AppError::NotFound(err.to_string())
            }
            MoveError::DataUnavailable(StoreError::NotFound { candidate_id }) => {
                AppError::NotFound(format!("Candidate {candidate_id} has no pipeline position"))
            }
            MoveError::DataUnavailable(e) => AppError::DataUnavailable(e),
            MoveError::InvalidTransition { .. } => AppError::Internal(anyhow::anyhow!(err)),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::DataUnavailable(e) => {
                tracing::error!("Pipeline store error: {e}");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "DATA_UNAVAILABLE",
                    "Pipeline data is unavailable. Please try again.".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
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
