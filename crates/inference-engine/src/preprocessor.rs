//! Column Transformer
//!
//! Standard-scaled numeric columns followed by one-hot blocks for categorical
//! columns. Columns not named by the transformer are dropped. Categorical
//! values never seen at fit time encode as an all-zero block.

use crate::artifact::Preprocessor;
use crate::InferenceError;
use feature_engine::ColumnStatistics;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use student_record::{Table, Value};
use tracing::{debug, warn};

/// Numeric column scaled as `(x - mean) / scale`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScaledColumn {
    pub name: String,
    pub mean: f64,
    pub scale: f64,
}

/// Categorical column expanded into one indicator per known category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OneHotColumn {
    pub name: String,
    pub categories: Vec<String>,
}

impl OneHotColumn {
    fn index_of(&self, value: &Value) -> Option<usize> {
        let key = value.to_string();
        self.categories.iter().position(|c| *c == key)
    }
}

/// Fitted numeric scaling + categorical encoding
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnTransformer {
    pub numeric: Vec<ScaledColumn>,
    pub categorical: Vec<OneHotColumn>,
}

impl ColumnTransformer {
    /// Create a transformer from already-fitted columns
    pub fn new(numeric: Vec<ScaledColumn>, categorical: Vec<OneHotColumn>) -> Self {
        Self {
            numeric,
            categorical,
        }
    }

    /// Fit on a training table. Text columns become one-hot columns with
    /// sorted categories; every other column is standard scaled. Every row
    /// must carry every column.
    pub fn fit(table: &Table) -> Result<Self, InferenceError> {
        let mut numeric = Vec::new();
        let mut categorical = Vec::new();

        for column in table.columns() {
            let values = table
                .column(column)
                .enumerate()
                .map(|(row, value)| {
                    value.ok_or_else(|| InferenceError::MissingColumn {
                        column: column.to_string(),
                        row,
                    })
                })
                .collect::<Result<Vec<&Value>, _>>()?;

            let is_text = values.first().map_or(false, |v| !v.is_numeric());
            if is_text {
                let categories: BTreeSet<String> = values.iter().map(|v| v.to_string()).collect();
                categorical.push(OneHotColumn {
                    name: column.to_string(),
                    categories: categories.into_iter().collect(),
                });
            } else {
                let numbers = values
                    .iter()
                    .enumerate()
                    .map(|(row, v)| {
                        v.as_f64().ok_or_else(|| InferenceError::ColumnType {
                            column: column.to_string(),
                            row,
                            expected: "numeric",
                        })
                    })
                    .collect::<Result<Vec<f64>, _>>()?;
                let stats = ColumnStatistics::compute(&numbers);
                numeric.push(ScaledColumn {
                    name: column.to_string(),
                    mean: stats.mean,
                    scale: stats.scale(),
                });
            }
        }

        debug!(
            "Fitted column transformer: {} numeric, {} categorical columns",
            numeric.len(),
            categorical.len()
        );
        Ok(Self::new(numeric, categorical))
    }

    /// Output column names: numeric names, then `column_category` per indicator
    pub fn feature_names(&self) -> Vec<String> {
        let numeric = self.numeric.iter().map(|c| c.name.clone());
        let indicators = self.categorical.iter().flat_map(|c| {
            c.categories
                .iter()
                .map(move |category| format!("{}_{}", c.name, category))
        });
        numeric.chain(indicators).collect()
    }
}

impl Preprocessor for ColumnTransformer {
    fn transform(&self, table: &Table) -> Result<Array2<f64>, InferenceError> {
        let mut out = Array2::zeros((table.len(), self.output_width()));
        let mut unknown = 0usize;

        for (i, row) in table.rows().iter().enumerate() {
            let lookup = |column: &str| {
                row.get(column).ok_or_else(|| InferenceError::MissingColumn {
                    column: column.to_string(),
                    row: i,
                })
            };

            for (j, column) in self.numeric.iter().enumerate() {
                let x = lookup(&column.name)?
                    .as_f64()
                    .ok_or_else(|| InferenceError::ColumnType {
                        column: column.name.clone(),
                        row: i,
                        expected: "numeric",
                    })?;
                let scale = if column.scale == 0.0 { 1.0 } else { column.scale };
                out[[i, j]] = (x - column.mean) / scale;
            }

            let mut offset = self.numeric.len();
            for column in &self.categorical {
                let value = lookup(&column.name)?;
                match column.index_of(value) {
                    Some(k) => out[[i, offset + k]] = 1.0,
                    None => {
                        debug!("Row {}: unseen {} category {:?}", i, column.name, value);
                        unknown += 1;
                    }
                }
                offset += column.categories.len();
            }
        }

        if unknown > 0 {
            warn!("Encoded {} unseen categorical values as all-zero indicators", unknown);
        }
        Ok(out)
    }

    fn output_width(&self) -> usize {
        self.numeric.len() + self.categorical.iter().map(|c| c.categories.len()).sum::<usize>()
    }
}
