//! Prediction Routes

use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;
use student_record::{RawStudentRecord, Table};
use tracing::info;

use crate::{ApiError, AppState};

/// Response for single prediction endpoint
#[derive(Debug, Serialize)]
pub struct PredictionResponse {
    /// Predicted final grade (G3)
    pub prediction: f64,
    pub model_name: String,
    /// Tolerated validation problems, e.g. unseen categories
    pub warnings: Vec<String>,
}

/// Response for batch prediction endpoint
#[derive(Debug, Serialize)]
pub struct BatchPredictionResponse {
    pub predictions: Vec<f64>,
    pub count: usize,
}

/// Validate one student record and predict the final grade
pub async fn predict(
    State(state): State<Arc<AppState>>,
    Json(record): Json<RawStudentRecord>,
) -> Result<Json<PredictionResponse>, ApiError> {
    let warnings = state
        .validator
        .validate(&record)
        .into_result()
        .map_err(ApiError::Validation)?;

    let worker = Arc::clone(&state);
    let (prediction, model_name) =
        tokio::task::spawn_blocking(move || worker.pipeline.predict_record_named(&record))
            .await??;

    metrics::counter!("predictions_total").increment(1);
    info!("Predicted final grade {:.2} with {}", prediction, model_name);

    Ok(Json(PredictionResponse {
        prediction,
        model_name,
        warnings: warnings.iter().map(ToString::to_string).collect(),
    }))
}

/// Predict every row of a table, in row order. Rows may carry engineered
/// columns already; supplied values are used as-is.
pub async fn predict_batch(
    State(state): State<Arc<AppState>>,
    Json(table): Json<Table>,
) -> Result<Json<BatchPredictionResponse>, ApiError> {
    let worker = Arc::clone(&state);
    let predictions = tokio::task::spawn_blocking(move || worker.pipeline.predict(&table)).await??;

    metrics::counter!("predictions_total").increment(predictions.len() as u64);
    info!("Predicted {} final grades", predictions.len());

    Ok(Json(BatchPredictionResponse {
        count: predictions.len(),
        predictions,
    }))
}
