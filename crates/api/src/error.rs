//! API Error Responses

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use data_validator::ValidationError;
use inference_engine::PredictError;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

/// Errors surfaced by request handlers
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid student record: {}", join(.0))]
    Validation(Vec<ValidationError>),
    #[error(transparent)]
    Predict(#[from] PredictError),
    #[error("Prediction task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Error body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Predict(e) if e.is_schema_mismatch() => StatusCode::BAD_REQUEST,
            ApiError::Predict(e) if e.is_artifact_error() => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Predict(_) | ApiError::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("{}", self);
        } else {
            warn!("{}", self);
        }
        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}
