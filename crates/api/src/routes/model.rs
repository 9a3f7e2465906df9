//! Model Routes

use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;
use tracing::warn;

use crate::AppState;

/// Response for model endpoint
#[derive(Debug, Serialize)]
pub struct ModelResponse {
    pub model_name: String,
    pub version: String,
}

/// Describe the configured model. Reports "Unknown" when the artifact
/// cannot be loaded.
pub async fn get_model(State(state): State<Arc<AppState>>) -> Json<ModelResponse> {
    let loader = Arc::clone(&state);
    let model_name = match tokio::task::spawn_blocking(move || loader.pipeline.model_name()).await {
        Ok(Ok(name)) => name,
        Ok(Err(e)) => {
            warn!("Model unavailable: {}", e);
            "Unknown".to_string()
        }
        Err(e) => {
            warn!("Model lookup task failed: {}", e);
            "Unknown".to_string()
        }
    };

    Json(ModelResponse {
        model_name,
        version: state.version.clone(),
    })
}
