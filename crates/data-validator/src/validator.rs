//! Raw Record Validator

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use student_record::RawStudentRecord;
use tracing::{debug, warn};

const YES_NO: &[&str] = &["no", "yes"];
const JOBS: &[&str] = &["at_home", "health", "other", "services", "teacher"];

/// How to treat categorical values outside the training vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VocabularyPolicy {
    /// Report as a validation error
    Reject,
    /// Log and let through; the preprocessor encodes them as all-zero indicators
    Warn,
}

/// Validation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Inclusive range per integer column
    pub ranges: BTreeMap<String, (i64, i64)>,
    /// Known categories per categorical column
    pub vocabulary: BTreeMap<String, Vec<String>>,
    /// Policy for out-of-vocabulary values
    pub vocabulary_policy: VocabularyPolicy,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        let ranges = [
            ("age", (15, 22)),
            ("Medu", (0, 4)),
            ("Fedu", (0, 4)),
            ("traveltime", (1, 4)),
            ("studytime", (1, 4)),
            ("failures", (0, 4)),
            ("famrel", (1, 5)),
            ("freetime", (1, 5)),
            ("goout", (1, 5)),
            ("Dalc", (1, 5)),
            ("Walc", (1, 5)),
            ("health", (1, 5)),
            ("absences", (0, 93)),
            ("G1", (0, 20)),
            ("G2", (0, 20)),
        ];

        let vocabulary: [(&str, &[&str]); 17] = [
            ("school", &["GP", "MS"]),
            ("sex", &["F", "M"]),
            ("address", &["R", "U"]),
            ("famsize", &["GT3", "LE3"]),
            ("Pstatus", &["A", "T"]),
            ("Mjob", JOBS),
            ("Fjob", JOBS),
            ("reason", &["course", "home", "other", "reputation"]),
            ("guardian", &["father", "mother", "other"]),
            ("schoolsup", YES_NO),
            ("famsup", YES_NO),
            ("paid", YES_NO),
            ("activities", YES_NO),
            ("nursery", YES_NO),
            ("higher", YES_NO),
            ("internet", YES_NO),
            ("romantic", YES_NO),
        ];

        Self {
            ranges: ranges
                .into_iter()
                .map(|(field, range)| (field.to_string(), range))
                .collect(),
            vocabulary: vocabulary
                .into_iter()
                .map(|(field, values)| {
                    (field.to_string(), values.iter().map(|v| v.to_string()).collect())
                })
                .collect(),
            vocabulary_policy: VocabularyPolicy::Warn,
        }
    }
}

impl ValidationConfig {
    /// Default ranges with out-of-vocabulary values rejected
    pub fn strict() -> Self {
        Self {
            vocabulary_policy: VocabularyPolicy::Reject,
            ..Default::default()
        }
    }
}

/// Result of validation
#[derive(Debug, Clone)]
pub struct ValidationResult {
    /// Whether all values are valid
    pub valid: bool,
    /// List of validation errors
    pub errors: Vec<ValidationError>,
    /// Tolerated problems (unknown categories under `VocabularyPolicy::Warn`)
    pub warnings: Vec<ValidationError>,
    /// Number of fields validated
    pub fields_checked: usize,
}

impl ValidationResult {
    /// Create a valid result
    pub fn valid(fields_checked: usize) -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
            fields_checked,
        }
    }

    /// Convert into `Err` with the collected errors when invalid
    pub fn into_result(self) -> Result<Vec<ValidationError>, Vec<ValidationError>> {
        if self.valid {
            Ok(self.warnings)
        } else {
            Err(self.errors)
        }
    }
}

/// Validator for raw student records
pub struct Validator {
    config: ValidationConfig,
}

impl Validator {
    /// Create a new validator with given config
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Validate a single value against a range
    pub fn validate_range(
        &self,
        field: &'static str,
        value: i64,
        range: (i64, i64),
    ) -> Result<(), ValidationError> {
        if value < range.0 || value > range.1 {
            Err(ValidationError::OutOfRange {
                field,
                value,
                min: range.0,
                max: range.1,
            })
        } else {
            Ok(())
        }
    }

    /// Validate a categorical value against the configured vocabulary.
    /// Columns without a configured vocabulary only reject blank values.
    pub fn validate_category(
        &self,
        field: &'static str,
        value: &str,
    ) -> Result<(), ValidationError> {
        if value.trim().is_empty() {
            return Err(ValidationError::EmptyField(field));
        }
        match self.config.vocabulary.get(field) {
            Some(allowed) if !allowed.iter().any(|a| a == value) => {
                Err(ValidationError::UnknownCategory {
                    field,
                    value: value.to_string(),
                    allowed: allowed.clone(),
                })
            }
            _ => Ok(()),
        }
    }

    /// Validate every field of a record, collecting all violations
    pub fn validate(&self, record: &RawStudentRecord) -> ValidationResult {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();
        let mut fields_checked = 0;

        for (field, value) in record.integer_fields() {
            if let Some(&range) = self.config.ranges.get(field) {
                fields_checked += 1;
                if let Err(e) = self.validate_range(field, value, range) {
                    errors.push(e);
                }
            }
        }

        for (field, value) in record.categorical_fields() {
            fields_checked += 1;
            match self.validate_category(field, value) {
                Ok(()) => {}
                Err(e @ ValidationError::UnknownCategory { .. })
                    if self.config.vocabulary_policy == VocabularyPolicy::Warn =>
                {
                    warn!("Tolerating unknown category: {}", e);
                    warnings.push(e);
                }
                Err(e) => errors.push(e),
            }
        }

        debug!(
            "Validated {} fields: {} errors, {} warnings",
            fields_checked,
            errors.len(),
            warnings.len()
        );

        if errors.is_empty() {
            ValidationResult {
                warnings,
                ..ValidationResult::valid(fields_checked)
            }
        } else {
            ValidationResult {
                valid: false,
                errors,
                warnings,
                fields_checked,
            }
        }
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(ValidationConfig::default())
    }
}
