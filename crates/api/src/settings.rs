//! Layered configuration
//!
//! Optional TOML/YAML/JSON file, then `GRADE__SECTION__KEY` environment
//! variables, e.g. `GRADE__PIPELINE__MODEL_PATH=/srv/artifacts/model.json`.

use config::{Config, ConfigError, Environment, File};
use data_validator::VocabularyPolicy;
use inference_engine::PipelineConfig;
use serde::{Deserialize, Serialize};

/// Config file used when `GRADE_CONFIG` is unset (extension optional)
pub const DEFAULT_CONFIG_FILE: &str = "config/default";

/// Server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Listen address
    pub addr: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            addr: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Maximum level: trace, debug, info, warn or error
    pub level: String,
    /// Emit JSON lines instead of human readable output
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Record validation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationSettings {
    pub vocabulary_policy: VocabularyPolicy,
}

impl Default for ValidationSettings {
    fn default() -> Self {
        Self {
            vocabulary_policy: VocabularyPolicy::Warn,
        }
    }
}

/// Application settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub logging: LoggingSettings,
    pub pipeline: PipelineConfig,
    pub validation: ValidationSettings,
}

impl Settings {
    /// Load from `file` (or `GRADE_CONFIG`, or `config/default`) and the
    /// environment. A missing file is not an error.
    pub fn load(file: Option<&str>) -> Result<Self, ConfigError> {
        let file = file
            .map(str::to_string)
            .or_else(|| std::env::var("GRADE_CONFIG").ok())
            .unwrap_or_else(|| DEFAULT_CONFIG_FILE.to_string());

        Config::builder()
            .add_source(File::with_name(&file).required(false))
            .add_source(
                Environment::with_prefix("GRADE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use std::sync::{Mutex, MutexGuard};

    /// `Settings::load` reads the process environment; tests that load
    /// settings hold this lock so variables set by one are not seen by another.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn env_lock() -> MutexGuard<'static, ()> {
        ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    #[test]
    fn test_defaults_without_file() {
        let _env = env_lock();
        let settings = Settings::load(Some("does/not/exist")).unwrap();
        assert_eq!(settings.server.addr, "0.0.0.0:8080");
        assert_eq!(settings.logging.level, "info");
        assert_eq!(settings.pipeline, PipelineConfig::default());
        assert_eq!(settings.validation.vocabulary_policy, VocabularyPolicy::Warn);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let _env = env_lock();
        let dir = std::env::temp_dir().join(format!("grade-settings-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let file = dir.join("grade.toml");
        std::fs::write(
            &file,
            r#"
[server]
addr = "127.0.0.1:9000"

[pipeline]
model_path = "/srv/model.postcard"
cache_artifacts = true

[validation]
vocabulary_policy = "reject"
"#,
        )
        .unwrap();

        let settings = Settings::load(file.to_str()).unwrap();
        assert_eq!(settings.server.addr, "127.0.0.1:9000");
        assert_eq!(settings.pipeline.model_path, Path::new("/srv/model.postcard"));
        assert_eq!(
            settings.pipeline.preprocessor_path,
            PipelineConfig::default().preprocessor_path
        );
        assert!(settings.pipeline.cache_artifacts);
        assert_eq!(settings.validation.vocabulary_policy, VocabularyPolicy::Reject);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_environment_overrides_pipeline() {
        let _env = env_lock();
        std::env::set_var("GRADE__PIPELINE__MODEL_PATH", "/srv/env/model.postcard");
        std::env::set_var("GRADE__PIPELINE__CACHE_ARTIFACTS", "true");

        let loaded = Settings::load(Some("does/not/exist"));

        std::env::remove_var("GRADE__PIPELINE__MODEL_PATH");
        std::env::remove_var("GRADE__PIPELINE__CACHE_ARTIFACTS");

        let settings = loaded.unwrap();
        assert_eq!(settings.pipeline.model_path, Path::new("/srv/env/model.postcard"));
        assert!(settings.pipeline.cache_artifacts);
        assert_eq!(
            settings.pipeline.preprocessor_path,
            PipelineConfig::default().preprocessor_path
        );
    }

    #[test]
    fn test_shipped_config_matches_defaults() {
        let _env = env_lock();
        let file = concat!(env!("CARGO_MANIFEST_DIR"), "/../../config/default.toml");
        assert!(Path::new(file).exists());

        let settings = Settings::load(Some(file)).unwrap();
        assert_eq!(settings.server.addr, ServerSettings::default().addr);
        assert_eq!(settings.logging.level, "info");
        assert!(!settings.logging.json);
        assert_eq!(settings.pipeline, PipelineConfig::default());
        assert!(!settings.pipeline.cache_artifacts);
        assert_eq!(settings.validation.vocabulary_policy, VocabularyPolicy::Warn);
    }
}
