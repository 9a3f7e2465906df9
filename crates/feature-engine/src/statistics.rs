//! Column Statistics

use serde::{Deserialize, Serialize};

/// Summary statistics for one numeric column
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnStatistics {
    /// Number of values
    pub count: usize,
    /// Mean value
    pub mean: f64,
    /// Population standard deviation
    pub std_dev: f64,
    /// Minimum value
    pub min: f64,
    /// Maximum value
    pub max: f64,
}

impl ColumnStatistics {
    /// Compute statistics from a slice of values
    pub fn compute(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }

        let n = values.len() as f64;

        let mean = values.iter().sum::<f64>() / n;

        let min = values.iter().cloned().fold(f64::MAX, f64::min);
        let max = values.iter().cloned().fold(f64::MIN, f64::max);

        // Divides by n, matching a standard scaler's variance
        let m2: f64 = values.iter().map(|v| (v - mean) * (v - mean)).sum();
        let std_dev = (m2 / n).sqrt();

        Self {
            count: values.len(),
            mean,
            std_dev,
            min,
            max,
        }
    }

    /// Divisor for standard scaling; a constant column scales by 1
    pub fn scale(&self) -> f64 {
        if self.std_dev > 0.0 {
            self.std_dev
        } else {
            1.0
        }
    }
}
