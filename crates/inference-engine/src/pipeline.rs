//! Predict Pipeline
//!
//! raw records → feature engineering → preprocessor → model → one grade per row

use crate::artifact::{ArtifactLoader, FileArtifactLoader, Model, Preprocessor};
use crate::cache::CachedArtifactLoader;
use crate::config::PipelineConfig;
use crate::{InferenceError, PipelineStage, PredictError};
use feature_engine::FeatureEngineer;
use std::sync::Arc;
use student_record::{RawStudentRecord, Table};
use tracing::{debug, info};

/// Final-grade prediction over fitted artifacts
pub struct PredictPipeline {
    config: PipelineConfig,
    loader: Arc<dyn ArtifactLoader>,
    engineer: FeatureEngineer,
}

impl PredictPipeline {
    /// Create a pipeline reading artifacts from the configured paths
    pub fn new(config: PipelineConfig) -> Self {
        let loader: Arc<dyn ArtifactLoader> = if config.cache_artifacts {
            Arc::new(CachedArtifactLoader::new(FileArtifactLoader))
        } else {
            Arc::new(FileArtifactLoader)
        };
        Self::with_loader(config, loader)
    }

    /// Create a pipeline over a custom artifact loader
    pub fn with_loader(config: PipelineConfig, loader: Arc<dyn ArtifactLoader>) -> Self {
        info!(
            "Creating predict pipeline: model={}, preprocessor={}, cached={}",
            config.model_path.display(),
            config.preprocessor_path.display(),
            config.cache_artifacts
        );
        Self {
            config,
            loader,
            engineer: FeatureEngineer::new(),
        }
    }

    /// Active configuration
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    fn load_model(&self) -> Result<Arc<dyn Model>, PredictError> {
        self.loader
            .load_model(&self.config.model_path)
            .map_err(|e| PredictError::new(PipelineStage::LoadModel, e))
    }

    fn load_preprocessor(&self) -> Result<Arc<dyn Preprocessor>, PredictError> {
        self.loader
            .load_preprocessor(&self.config.preprocessor_path)
            .map_err(|e| PredictError::new(PipelineStage::LoadPreprocessor, e))
    }

    /// Predict one grade per row, in row order. Rows may already carry some or
    /// all engineered columns; supplied values are used as-is.
    pub fn predict(&self, table: &Table) -> Result<Vec<f64>, PredictError> {
        self.run(table).map(|(predictions, _)| predictions)
    }

    /// Predict the final grade of a single student
    pub fn predict_record(&self, record: &RawStudentRecord) -> Result<f64, PredictError> {
        self.predict_record_named(record).map(|(grade, _)| grade)
    }

    /// Predict the final grade of a single student, together with the name
    /// of the model that produced it. The model artifact is loaded once.
    pub fn predict_record_named(
        &self,
        record: &RawStudentRecord,
    ) -> Result<(f64, String), PredictError> {
        let (predictions, model) = self.run(&Table::single(record.to_record()))?;
        let grade = predictions.into_iter().next().ok_or_else(|| {
            PredictError::new(
                PipelineStage::Predict,
                InferenceError::InferenceFailed("model returned no prediction".to_string()),
            )
        })?;
        Ok((grade, model.name().to_string()))
    }

    /// Name of the configured model
    pub fn model_name(&self) -> Result<String, PredictError> {
        Ok(self.load_model()?.name().to_string())
    }

    fn run(&self, table: &Table) -> Result<(Vec<f64>, Arc<dyn Model>), PredictError> {
        let start = std::time::Instant::now();

        let model = self.load_model()?;
        let preprocessor = self.load_preprocessor()?;
        if table.is_empty() {
            return Ok((Vec::new(), model));
        }

        let engineered = self.engineer.engineer_table(table);
        let features = preprocessor
            .transform(&engineered)
            .map_err(|e| PredictError::new(PipelineStage::Transform, e))?;
        let predictions = model
            .predict(&features)
            .map_err(|e| PredictError::new(PipelineStage::Predict, e))?;

        if predictions.len() != table.len() {
            return Err(PredictError::new(
                PipelineStage::Predict,
                InferenceError::InferenceFailed(format!(
                    "model returned {} predictions for {} rows",
                    predictions.len(),
                    table.len()
                )),
            ));
        }

        debug!(
            "Predicted {} rows with {} in {}ms",
            table.len(),
            model.name(),
            start.elapsed().as_millis()
        );
        Ok((predictions, model))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::{write_artifact, ArtifactKind};
    use crate::model::{LinearRegressor, Regressor};
    use crate::preprocessor::ColumnTransformer;
    use std::path::{Path, PathBuf};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use student_record::{Record, Value};

    fn student(m_job: &str, failures: i64, g1: i64, g2: i64, absences: i64) -> RawStudentRecord {
        RawStudentRecord {
            school: "GP".to_string(),
            sex: "F".to_string(),
            age: 17,
            address: "U".to_string(),
            famsize: "GT3".to_string(),
            p_status: "T".to_string(),
            m_edu: 3,
            f_edu: 2,
            m_job: m_job.to_string(),
            f_job: "other".to_string(),
            reason: "course".to_string(),
            guardian: "mother".to_string(),
            traveltime: 1,
            studytime: 2,
            failures,
            schoolsup: "no".to_string(),
            famsup: "yes".to_string(),
            paid: "no".to_string(),
            activities: "yes".to_string(),
            nursery: "yes".to_string(),
            higher: "yes".to_string(),
            internet: "yes".to_string(),
            romantic: "no".to_string(),
            famrel: 4,
            freetime: 3,
            goout: 3,
            d_alc: 1,
            w_alc: 2,
            health: 4,
            absences,
            g1,
            g2,
        }
    }

    fn training_students() -> Vec<RawStudentRecord> {
        vec![
            student("teacher", 0, 14, 15, 2),
            student("at_home", 2, 4, 5, 16),
            student("services", 1, 9, 10, 8),
            student("health", 0, 17, 18, 0),
        ]
    }

    /// Fits a transformer on engineered training rows and pairs it with a
    /// linear model that mostly follows G2
    fn write_artifacts(dir: &Path) -> (PipelineConfig, ColumnTransformer) {
        let engineer = FeatureEngineer::new();
        let table: Table = training_students()
            .iter()
            .map(|s| engineer.recompute(&s.to_record()))
            .collect();
        let transformer = ColumnTransformer::fit(&table).unwrap();

        let coefficients = transformer
            .feature_names()
            .iter()
            .map(|name| match name.as_str() {
                "G2" => 4.0,
                "G1" => 1.0,
                "has_failures" => -0.5,
                "Mjob_teacher" => 0.25,
                _ => 0.0,
            })
            .collect();
        let model = Regressor::Linear(LinearRegressor {
            intercept: 11.0,
            coefficients,
        });

        let config = PipelineConfig::with_artifact_dir(dir);
        write_artifact(
            &config.preprocessor_path,
            ArtifactKind::Preprocessor,
            &transformer,
        )
        .unwrap();
        write_artifact(&config.model_path, ArtifactKind::Model, &model).unwrap();
        (config, transformer)
    }

    fn temp_dir() -> PathBuf {
        std::env::temp_dir().join(format!("grade-pipeline-{}", uuid::Uuid::new_v4()))
    }

    #[test]
    fn test_predict_single_record() {
        let dir = temp_dir();
        let (config, _) = write_artifacts(&dir);
        let pipeline = PredictPipeline::new(config);

        let grade = pipeline.predict_record(&student("teacher", 0, 14, 15, 2)).unwrap();
        assert!(grade.is_finite());
        assert_eq!(pipeline.model_name().unwrap(), "LinearRegression");
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_pre_engineered_rows_predict_the_same() {
        let dir = temp_dir();
        let (config, _) = write_artifacts(&dir);
        let pipeline = PredictPipeline::new(config);

        let raw = student("services", 1, 9, 10, 8).to_record();
        let engineered = FeatureEngineer::new().engineer(&raw);
        let from_raw = pipeline.predict(&Table::single(raw)).unwrap();
        let from_engineered = pipeline.predict(&Table::single(engineered)).unwrap();
        assert_eq!(from_raw, from_engineered);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_batch_matches_individual_predictions() {
        let dir = temp_dir();
        let (config, _) = write_artifacts(&dir);
        let pipeline = PredictPipeline::new(config);

        let rows: Vec<Record> = training_students().iter().map(|s| s.to_record()).collect();
        let batch = pipeline.predict(&Table::new(rows.clone())).unwrap();
        let individual: Vec<f64> = rows
            .into_iter()
            .map(|row| pipeline.predict(&Table::single(row)).unwrap()[0])
            .collect();
        assert_eq!(batch, individual);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_unknown_category_still_predicts() {
        let dir = temp_dir();
        let (config, _) = write_artifacts(&dir);
        let pipeline = PredictPipeline::new(config);

        let grade = pipeline
            .predict_record(&student("unicorn_job", 0, 14, 15, 2))
            .unwrap();
        let teacher = pipeline
            .predict_record(&student("teacher", 0, 14, 15, 2))
            .unwrap();
        assert!((teacher - grade - 0.25).abs() < 1e-9);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_missing_artifact_is_reported() {
        let pipeline = PredictPipeline::new(PipelineConfig::with_artifact_dir(temp_dir()));
        let err = pipeline
            .predict_record(&student("teacher", 0, 14, 15, 2))
            .unwrap_err();
        assert_eq!(err.stage, PipelineStage::LoadModel);
        assert!(err.is_artifact_error());
        assert!(matches!(err.source, InferenceError::ArtifactNotFound { .. }));
        assert!(pipeline.model_name().is_err());
    }

    #[test]
    fn test_missing_raw_column_is_schema_mismatch() {
        let dir = temp_dir();
        let (config, _) = write_artifacts(&dir);
        let pipeline = PredictPipeline::new(config);

        let mut row = student("teacher", 0, 14, 15, 2).to_record();
        row.remove("G2");
        let err = pipeline.predict(&Table::single(row)).unwrap_err();
        assert_eq!(err.stage, PipelineStage::Transform);
        assert!(err.is_schema_mismatch());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_empty_table_still_loads_artifacts() {
        let dir = temp_dir();
        let (config, _) = write_artifacts(&dir);
        assert!(PredictPipeline::new(config).predict(&Table::default()).unwrap().is_empty());

        let missing = PredictPipeline::new(PipelineConfig::with_artifact_dir(temp_dir()));
        assert!(missing.predict(&Table::default()).is_err());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_cached_pipeline_predicts_the_same() {
        let dir = temp_dir();
        let (config, _) = write_artifacts(&dir);
        let plain = PredictPipeline::new(config.clone());
        let cached = PredictPipeline::new(config.cached());

        let table = Table::single(student("health", 0, 17, 18, 0).to_record());
        assert_eq!(plain.predict(&table).unwrap(), cached.predict(&table).unwrap());
        assert_eq!(cached.predict(&table).unwrap(), plain.predict(&table).unwrap());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_supplied_engineered_values_are_used() {
        let dir = temp_dir();
        let (config, _) = write_artifacts(&dir);
        let pipeline = PredictPipeline::new(config);

        let raw = student("other", 1, 9, 10, 8).to_record();
        let overridden = raw.clone().with("has_failures", Value::Int(0));
        let base = pipeline.predict(&Table::single(raw)).unwrap()[0];
        let changed = pipeline.predict(&Table::single(overridden)).unwrap()[0];
        assert!(base < changed);
        let _ = std::fs::remove_dir_all(&dir);
    }

    struct CountingLoader {
        inner: FileArtifactLoader,
        model_loads: AtomicUsize,
    }

    impl ArtifactLoader for CountingLoader {
        fn load_preprocessor(
            &self,
            path: &Path,
        ) -> Result<Arc<dyn Preprocessor>, InferenceError> {
            self.inner.load_preprocessor(path)
        }

        fn load_model(&self, path: &Path) -> Result<Arc<dyn Model>, InferenceError> {
            self.model_loads.fetch_add(1, Ordering::SeqCst);
            self.inner.load_model(path)
        }
    }

    #[test]
    fn test_named_prediction_loads_model_once() {
        let dir = temp_dir();
        let (config, _) = write_artifacts(&dir);
        let loader = Arc::new(CountingLoader {
            inner: FileArtifactLoader,
            model_loads: AtomicUsize::new(0),
        });
        let pipeline = PredictPipeline::with_loader(config, loader.clone());

        let record = student("teacher", 0, 14, 15, 2);
        let (grade, model_name) = pipeline.predict_record_named(&record).unwrap();
        assert_eq!(model_name, "LinearRegression");
        assert_eq!(loader.model_loads.load(Ordering::SeqCst), 1);
        assert_eq!(grade, pipeline.predict_record(&record).unwrap());
        let _ = std::fs::remove_dir_all(&dir);
    }
}
