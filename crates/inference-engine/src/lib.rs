//! Grade Inference Engine
//!
//! Loads the persisted preprocessor and regression model, and runs the
//! feature engineering + transform + predict pipeline over student records.

mod artifact;
mod cache;
mod config;
mod model;
mod pipeline;
mod preprocessor;

pub use artifact::{
    read_artifact, write_artifact, ArtifactEnvelope, ArtifactFormat, ArtifactKind,
    ArtifactLoader, FileArtifactLoader, Model, Preprocessor,
};
pub use cache::{ArtifactCache, CachedArtifactLoader};
pub use config::PipelineConfig;
pub use model::{Aggregation, LinearRegressor, RegressionTree, Regressor, TreeEnsemble, TreeNode};
pub use pipeline::PredictPipeline;
pub use preprocessor::{ColumnTransformer, OneHotColumn, ScaledColumn};

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Errors during artifact loading and inference
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("Artifact not found at {}", .path.display())]
    ArtifactNotFound {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Artifact at {} could not be read", .path.display())]
    ArtifactIo {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Artifact at {} is corrupt: {reason}", .path.display())]
    ArtifactCorrupt { path: PathBuf, reason: String },
    #[error(
        "Unsupported artifact format for {} (expected .json, .postcard or .bin)",
        .path.display()
    )]
    UnsupportedFormat { path: PathBuf },
    #[error("Artifact at {} holds a {found}, expected a {expected}", .path.display())]
    ArtifactKindMismatch {
        path: PathBuf,
        expected: ArtifactKind,
        found: ArtifactKind,
    },
    #[error(
        "Artifact at {} was fitted for feature schema v{found}, this build engineers v{expected}",
        .path.display()
    )]
    FeatureSchemaMismatch {
        path: PathBuf,
        expected: u32,
        found: u32,
    },
    #[error("Row {row} is missing required column {column}")]
    MissingColumn { column: String, row: usize },
    #[error("Row {row} column {column} must be {expected}")]
    ColumnType {
        column: String,
        row: usize,
        expected: &'static str,
    },
    #[error("Invalid input shape: expected {expected} features, got {actual}")]
    InvalidInputShape { expected: usize, actual: usize },
    #[error("Inference failed: {0}")]
    InferenceFailed(String),
}

impl InferenceError {
    /// Persisted artifact missing, unreadable or unusable
    pub fn is_artifact_error(&self) -> bool {
        matches!(
            self,
            InferenceError::ArtifactNotFound { .. }
                | InferenceError::ArtifactIo { .. }
                | InferenceError::ArtifactCorrupt { .. }
                | InferenceError::UnsupportedFormat { .. }
                | InferenceError::ArtifactKindMismatch { .. }
                | InferenceError::FeatureSchemaMismatch { .. }
        )
    }

    /// Input table does not fit what the preprocessor or model expects
    pub fn is_schema_mismatch(&self) -> bool {
        matches!(
            self,
            InferenceError::MissingColumn { .. }
                | InferenceError::ColumnType { .. }
                | InferenceError::InvalidInputShape { .. }
        )
    }
}

/// Pipeline stage an error originated from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    LoadPreprocessor,
    LoadModel,
    Transform,
    Predict,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PipelineStage::LoadPreprocessor => "loading preprocessor",
            PipelineStage::LoadModel => "loading model",
            PipelineStage::Transform => "preprocessing",
            PipelineStage::Predict => "model prediction",
        })
    }
}

/// Prediction failure with the stage it happened in
#[derive(Debug, Error)]
#[error("Prediction failed while {stage}: {source}")]
pub struct PredictError {
    pub stage: PipelineStage,
    pub source: InferenceError,
}

impl PredictError {
    pub fn new(stage: PipelineStage, source: InferenceError) -> Self {
        Self { stage, source }
    }

    /// Persisted artifact missing, unreadable or unusable
    pub fn is_artifact_error(&self) -> bool {
        self.source.is_artifact_error()
    }

    /// Input does not fit what the preprocessor or model expects
    pub fn is_schema_mismatch(&self) -> bool {
        self.source.is_schema_mismatch()
    }
}
