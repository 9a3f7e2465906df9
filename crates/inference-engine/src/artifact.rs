//! Persisted Artifacts
//!
//! The pipeline only needs two capabilities from its fitted artifacts:
//! `Preprocessor::transform` and `Model::predict`. How they are stored is the
//! loader's business. The file loader here wraps each payload in an envelope
//! recording what it is and which engineered-feature schema it was fitted
//! against, so drift between the feature engine and the artifacts is caught
//! at load time.

use crate::model::Regressor;
use crate::preprocessor::ColumnTransformer;
use crate::InferenceError;
use feature_engine::FEATURE_SCHEMA_VERSION;
use ndarray::Array2;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;
use std::sync::Arc;
use student_record::Table;
use tracing::{debug, info};

/// Fitted transformation from a table of records to a numeric matrix
pub trait Preprocessor: Send + Sync {
    /// Encode `table` into one matrix row per table row
    fn transform(&self, table: &Table) -> Result<Array2<f64>, InferenceError>;

    /// Number of matrix columns produced
    fn output_width(&self) -> usize;
}

/// Fitted regressor over preprocessed features
pub trait Model: Send + Sync {
    /// One prediction per matrix row, in row order
    fn predict(&self, features: &Array2<f64>) -> Result<Vec<f64>, InferenceError>;

    /// Human readable model name
    fn name(&self) -> &str;
}

/// Source of fitted artifacts, addressed by path
pub trait ArtifactLoader: Send + Sync {
    fn load_preprocessor(&self, path: &Path) -> Result<Arc<dyn Preprocessor>, InferenceError>;

    fn load_model(&self, path: &Path) -> Result<Arc<dyn Model>, InferenceError>;
}

/// What an artifact file holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArtifactKind {
    Preprocessor,
    Model,
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactKind::Preprocessor => f.write_str("preprocessor"),
            ArtifactKind::Model => f.write_str("model"),
        }
    }
}

/// On-disk wrapper around a fitted artifact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactEnvelope<T> {
    pub kind: ArtifactKind,
    pub feature_schema: u32,
    pub payload: T,
}

/// Leading fields of an envelope, decoded before the payload
#[derive(Deserialize)]
struct EnvelopeHeader {
    kind: ArtifactKind,
    feature_schema: u32,
}

/// Serialization format, chosen by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactFormat {
    Json,
    Postcard,
}

impl ArtifactFormat {
    /// `.json` or `.postcard`/`.bin`
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "json" => Some(ArtifactFormat::Json),
            "postcard" | "bin" => Some(ArtifactFormat::Postcard),
            _ => None,
        }
    }

    fn encode<T: Serialize>(self, value: &T) -> Result<Vec<u8>, String> {
        match self {
            ArtifactFormat::Json => serde_json::to_vec_pretty(value).map_err(|e| e.to_string()),
            ArtifactFormat::Postcard => postcard::to_allocvec(value).map_err(|e| e.to_string()),
        }
    }

    fn decode<T: DeserializeOwned>(self, bytes: &[u8]) -> Result<T, String> {
        match self {
            ArtifactFormat::Json => serde_json::from_slice(bytes).map_err(|e| e.to_string()),
            ArtifactFormat::Postcard => postcard::from_bytes(bytes).map_err(|e| e.to_string()),
        }
    }
}

fn io_error(path: &Path, source: io::Error) -> InferenceError {
    if source.kind() == io::ErrorKind::NotFound {
        InferenceError::ArtifactNotFound {
            path: path.to_path_buf(),
            source,
        }
    } else {
        InferenceError::ArtifactIo {
            path: path.to_path_buf(),
            source,
        }
    }
}

fn format_of(path: &Path) -> Result<ArtifactFormat, InferenceError> {
    ArtifactFormat::from_path(path).ok_or_else(|| InferenceError::UnsupportedFormat {
        path: path.to_path_buf(),
    })
}

/// Persist `payload` at `path`, creating parent directories as needed
pub fn write_artifact<T: Serialize>(
    path: &Path,
    kind: ArtifactKind,
    payload: &T,
) -> Result<(), InferenceError> {
    let format = format_of(path)?;
    let envelope = ArtifactEnvelope {
        kind,
        feature_schema: FEATURE_SCHEMA_VERSION,
        payload,
    };
    let bytes = format
        .encode(&envelope)
        .map_err(|reason| InferenceError::ArtifactCorrupt {
            path: path.to_path_buf(),
            reason,
        })?;

    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(|e| io_error(dir, e))?;
    }
    fs::write(path, bytes).map_err(|e| io_error(path, e))?;

    info!("Wrote {} artifact to {}", kind, path.display());
    Ok(())
}

/// Read the payload of an artifact, checking its kind and feature schema
pub fn read_artifact<T: DeserializeOwned>(
    path: &Path,
    expected: ArtifactKind,
) -> Result<T, InferenceError> {
    let format = format_of(path)?;
    let bytes = fs::read(path).map_err(|e| io_error(path, e))?;
    let corrupt = |reason: String| InferenceError::ArtifactCorrupt {
        path: path.to_path_buf(),
        reason,
    };

    let header: EnvelopeHeader = format.decode(&bytes).map_err(corrupt)?;
    if header.kind != expected {
        return Err(InferenceError::ArtifactKindMismatch {
            path: path.to_path_buf(),
            expected,
            found: header.kind,
        });
    }
    if header.feature_schema != FEATURE_SCHEMA_VERSION {
        return Err(InferenceError::FeatureSchemaMismatch {
            path: path.to_path_buf(),
            expected: FEATURE_SCHEMA_VERSION,
            found: header.feature_schema,
        });
    }

    let envelope: ArtifactEnvelope<T> = format.decode(&bytes).map_err(corrupt)?;
    debug!("Decoded {} artifact ({} bytes) from {}", expected, bytes.len(), path.display());
    Ok(envelope.payload)
}

/// Loads `ColumnTransformer` and `Regressor` artifacts from the filesystem.
/// Every call reads the file again.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileArtifactLoader;

impl ArtifactLoader for FileArtifactLoader {
    fn load_preprocessor(&self, path: &Path) -> Result<Arc<dyn Preprocessor>, InferenceError> {
        let transformer: ColumnTransformer = read_artifact(path, ArtifactKind::Preprocessor)?;
        info!(
            "Loaded preprocessor from {} ({} output features)",
            path.display(),
            transformer.output_width()
        );
        Ok(Arc::new(transformer))
    }

    fn load_model(&self, path: &Path) -> Result<Arc<dyn Model>, InferenceError> {
        let model: Regressor = read_artifact(path, ArtifactKind::Model)?;
        info!("Loaded {} model from {}", model.name(), path.display());
        Ok(Arc::new(model))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LinearRegressor;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("grade-artifact-{}", uuid::Uuid::new_v4()))
            .join(name)
    }

    fn linear() -> Regressor {
        Regressor::Linear(LinearRegressor {
            intercept: 1.5,
            coefficients: vec![0.5, -0.25],
        })
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            ArtifactFormat::from_path(Path::new("a/model.json")),
            Some(ArtifactFormat::Json)
        );
        assert_eq!(
            ArtifactFormat::from_path(Path::new("model.bin")),
            Some(ArtifactFormat::Postcard)
        );
        assert_eq!(ArtifactFormat::from_path(Path::new("model.pkl")), None);
    }

    #[test]
    fn test_model_persists_in_both_formats() {
        for name in ["model.json", "model.postcard"] {
            let path = temp_path(name);
            write_artifact(&path, ArtifactKind::Model, &linear()).unwrap();
            let loaded: Regressor = read_artifact(&path, ArtifactKind::Model).unwrap();
            assert_eq!(loaded, linear());
            let _ = fs::remove_dir_all(path.parent().unwrap());
        }
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let err = FileArtifactLoader
            .load_model(&temp_path("model.json"))
            .err()
            .unwrap();
        assert!(matches!(err, InferenceError::ArtifactNotFound { .. }));
        assert!(err.is_artifact_error());
    }

    #[test]
    fn test_garbage_is_corrupt() {
        let path = temp_path("model.json");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, b"{ not json").unwrap();
        let err = FileArtifactLoader.load_model(&path).err().unwrap();
        assert!(matches!(err, InferenceError::ArtifactCorrupt { .. }));
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_kind_is_checked() {
        let path = temp_path("preprocessor.json");
        write_artifact(&path, ArtifactKind::Model, &linear()).unwrap();
        let err = FileArtifactLoader.load_preprocessor(&path).err().unwrap();
        assert!(matches!(
            err,
            InferenceError::ArtifactKindMismatch {
                expected: ArtifactKind::Preprocessor,
                found: ArtifactKind::Model,
                ..
            }
        ));
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_feature_schema_drift_is_rejected() {
        let path = temp_path("model.json");
        let stale = ArtifactEnvelope {
            kind: ArtifactKind::Model,
            feature_schema: FEATURE_SCHEMA_VERSION + 1,
            payload: linear(),
        };
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, serde_json::to_vec(&stale).unwrap()).unwrap();

        let err = FileArtifactLoader.load_model(&path).err().unwrap();
        assert!(matches!(err, InferenceError::FeatureSchemaMismatch { .. }));
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_unknown_extension_rejected() {
        let err = FileArtifactLoader
            .load_model(Path::new("artifacts/model.pkl"))
            .err()
            .unwrap();
        assert!(matches!(err, InferenceError::UnsupportedFormat { .. }));
    }
}
