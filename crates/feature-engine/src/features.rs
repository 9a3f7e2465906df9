//! Derived Feature Rules
//!
//! Twelve engineered columns computed from raw fields with fixed thresholds.
//! Each rule reads raw columns only, so rules are independent of each other
//! and of evaluation order.

use serde::{Deserialize, Serialize};
use student_record::{Record, Table, Value};
use tracing::debug;

/// Version of the engineered-feature schema. Bump whenever a rule, threshold
/// or column name below changes; persisted artifacts record the version they
/// were fitted against.
pub const FEATURE_SCHEMA_VERSION: u32 = 1;

/// Engineered column names, in canonical order
pub const ENGINEERED_COLUMNS: [&str; 12] = [
    "has_failures",
    "high_studytime",
    "avg_parent_edu",
    "early_failure",
    "parents_together",
    "big_family",
    "urban_student",
    "long_travel",
    "has_internet",
    "romantic_rel",
    "high_alcohol_use",
    "high_absenteeism",
];

/// One derived column and the rule that computes it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DerivedFeature {
    /// failures > 0
    HasFailures,
    /// studytime >= 3
    HighStudytime,
    /// (Medu + Fedu) / 2
    AvgParentEdu,
    /// G1 < 5
    EarlyFailure,
    /// Pstatus == "T"
    ParentsTogether,
    /// famsize == "GT3"
    BigFamily,
    /// address == "U"
    UrbanStudent,
    /// traveltime >= 3
    LongTravel,
    /// internet == "yes"
    HasInternet,
    /// romantic == "yes"
    RomanticRel,
    /// Dalc + Walc >= 6
    HighAlcoholUse,
    /// absences >= 10
    HighAbsenteeism,
}

impl DerivedFeature {
    /// Every rule, in `ENGINEERED_COLUMNS` order
    pub const ALL: [DerivedFeature; 12] = [
        DerivedFeature::HasFailures,
        DerivedFeature::HighStudytime,
        DerivedFeature::AvgParentEdu,
        DerivedFeature::EarlyFailure,
        DerivedFeature::ParentsTogether,
        DerivedFeature::BigFamily,
        DerivedFeature::UrbanStudent,
        DerivedFeature::LongTravel,
        DerivedFeature::HasInternet,
        DerivedFeature::RomanticRel,
        DerivedFeature::HighAlcoholUse,
        DerivedFeature::HighAbsenteeism,
    ];

    /// Output column name
    pub fn column(self) -> &'static str {
        ENGINEERED_COLUMNS[self as usize]
    }

    /// Raw columns the rule reads
    pub fn sources(self) -> &'static [&'static str] {
        match self {
            DerivedFeature::HasFailures => &["failures"],
            DerivedFeature::HighStudytime => &["studytime"],
            DerivedFeature::AvgParentEdu => &["Medu", "Fedu"],
            DerivedFeature::EarlyFailure => &["G1"],
            DerivedFeature::ParentsTogether => &["Pstatus"],
            DerivedFeature::BigFamily => &["famsize"],
            DerivedFeature::UrbanStudent => &["address"],
            DerivedFeature::LongTravel => &["traveltime"],
            DerivedFeature::HasInternet => &["internet"],
            DerivedFeature::RomanticRel => &["romantic"],
            DerivedFeature::HighAlcoholUse => &["Dalc", "Walc"],
            DerivedFeature::HighAbsenteeism => &["absences"],
        }
    }

    /// Compute the derived value, or `None` when a source column is absent
    /// or holds the wrong kind of value
    pub fn derive(self, record: &Record) -> Option<Value> {
        let value = match self {
            DerivedFeature::HasFailures => Value::flag(number(record, "failures")? > 0.0),
            DerivedFeature::HighStudytime => Value::flag(number(record, "studytime")? >= 3.0),
            DerivedFeature::AvgParentEdu => {
                Value::Float((number(record, "Medu")? + number(record, "Fedu")?) / 2.0)
            }
            DerivedFeature::EarlyFailure => Value::flag(number(record, "G1")? < 5.0),
            DerivedFeature::ParentsTogether => Value::flag(text(record, "Pstatus")? == "T"),
            DerivedFeature::BigFamily => Value::flag(text(record, "famsize")? == "GT3"),
            DerivedFeature::UrbanStudent => Value::flag(text(record, "address")? == "U"),
            DerivedFeature::LongTravel => Value::flag(number(record, "traveltime")? >= 3.0),
            DerivedFeature::HasInternet => Value::flag(text(record, "internet")? == "yes"),
            DerivedFeature::RomanticRel => Value::flag(text(record, "romantic")? == "yes"),
            DerivedFeature::HighAlcoholUse => {
                Value::flag(number(record, "Dalc")? + number(record, "Walc")? >= 6.0)
            }
            DerivedFeature::HighAbsenteeism => Value::flag(number(record, "absences")? >= 10.0),
        };
        Some(value)
    }
}

fn number(record: &Record, column: &str) -> Option<f64> {
    let value = record.get(column)?;
    let n = value.as_f64();
    if n.is_none() {
        debug!("Skipping derivation: {} holds non-numeric {:?}", column, value);
    }
    n
}

fn text<'a>(record: &'a Record, column: &str) -> Option<&'a str> {
    let value = record.get(column)?;
    let s = value.as_str();
    if s.is_none() {
        debug!("Skipping derivation: {} holds non-text {:?}", column, value);
    }
    s
}

/// Applies the derived feature rules to records
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureEngineer;

impl FeatureEngineer {
    /// Create a new feature engineer
    pub fn new() -> Self {
        Self
    }

    /// Return a copy of `record` with every absent derived column filled in.
    /// Columns already present are kept as supplied, and rules whose sources
    /// are missing are skipped, so the operation is idempotent.
    pub fn engineer(&self, record: &Record) -> Record {
        let mut out = record.clone();
        let mut added = 0;
        for feature in DerivedFeature::ALL {
            if out.contains(feature.column()) {
                continue;
            }
            if let Some(value) = feature.derive(record) {
                out.insert(feature.column(), value);
                added += 1;
            }
        }
        debug!("Engineered {} of {} derived columns", added, ENGINEERED_COLUMNS.len());
        out
    }

    /// Apply `engineer` to every row, preserving row order
    pub fn engineer_table(&self, table: &Table) -> Table {
        table.rows().iter().map(|row| self.engineer(row)).collect()
    }

    /// Return a copy of `record` with every derivable column recomputed from
    /// its sources, replacing whatever value was there. Used when preparing
    /// training data, where stale engineered values must not survive.
    pub fn recompute(&self, record: &Record) -> Record {
        let mut out = record.clone();
        for feature in DerivedFeature::ALL {
            if let Some(value) = feature.derive(record) {
                out.insert(feature.column(), value);
            }
        }
        out
    }

    /// Apply `recompute` to every row, preserving row order
    pub fn recompute_table(&self, table: &Table) -> Table {
        table.rows().iter().map(|row| self.recompute(row)).collect()
    }

    /// Derived columns absent from `record`
    pub fn missing(&self, record: &Record) -> Vec<DerivedFeature> {
        DerivedFeature::ALL
            .into_iter()
            .filter(|f| !record.contains(f.column()))
            .collect()
    }
}
