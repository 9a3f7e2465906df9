//! Pipeline configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Where the fitted artifacts live and how they are loaded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Fitted regression model
    pub model_path: PathBuf,
    /// Fitted column transformer
    pub preprocessor_path: PathBuf,
    /// Keep loaded artifacts in memory between calls, reloading when the
    /// file's modification time or length changes
    pub cache_artifacts: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::with_artifact_dir("artifacts")
    }
}

impl PipelineConfig {
    /// `model.json` and `preprocessor.json` under `dir`, uncached
    pub fn with_artifact_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            model_path: dir.join("model.json"),
            preprocessor_path: dir.join("preprocessor.json"),
            cache_artifacts: false,
        }
    }

    /// Same paths with caching switched on
    pub fn cached(self) -> Self {
        Self {
            cache_artifacts: true,
            ..self
        }
    }
}
