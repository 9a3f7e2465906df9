//! Feature Engineering Engine
//!
//! Derives the engineered columns the grade model was trained on, and the
//! column statistics used to fit numeric scaling.

mod features;
mod statistics;

pub use features::{DerivedFeature, FeatureEngineer, ENGINEERED_COLUMNS, FEATURE_SCHEMA_VERSION};
pub use statistics::ColumnStatistics;
