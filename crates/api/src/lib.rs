//! Student Grade Predictor API Server
//!
//! HTTP front-end that validates submitted student records and returns the
//! predicted final grade.

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use data_validator::{ValidationConfig, Validator};
use inference_engine::PredictPipeline;
use serde::Serialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

mod error;
mod routes;
mod settings;

pub use error::{ApiError, ErrorResponse};
pub use settings::{LoggingSettings, ServerSettings, Settings, ValidationSettings};

/// Application state shared across handlers
pub struct AppState {
    /// Prediction pipeline
    pub pipeline: PredictPipeline,
    /// Boundary validation for raw records
    pub validator: Validator,
    /// Version string
    pub version: String,
    /// Start time
    pub start_time: std::time::Instant,
}

impl AppState {
    /// Create new application state
    pub fn new(settings: &Settings) -> Self {
        let validation = ValidationConfig {
            vocabulary_policy: settings.validation.vocabulary_policy,
            ..Default::default()
        };
        Self {
            pipeline: PredictPipeline::new(settings.pipeline.clone()),
            validator: Validator::new(validation),
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: std::time::Instant::now(),
        }
    }
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: u64,
    pub version: String,
    pub uptime_seconds: u64,
}

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/api/v1/health", get(health_handler))
        .route("/api/v1/model", get(routes::model::get_model))
        .route("/api/v1/predict", post(routes::predictions::predict))
        .route("/api/v1/predict/batch", post(routes::predictions::predict_batch))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check handler
async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp,
        version: state.version.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
    })
}

/// Initialize logging
pub fn init_logging(
    settings: &LoggingSettings,
) -> Result<(), tracing::subscriber::SetGlobalDefaultError> {
    let level = settings.level.parse::<Level>().unwrap_or(Level::INFO);
    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true);

    if settings.json {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.finish())
    }
}

/// Run the server
pub async fn run_server(settings: Settings) -> std::io::Result<()> {
    let addr = settings.server.addr.clone();
    let state = Arc::new(AppState::new(&settings));
    let app = create_router(state);

    info!("Starting API server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
