//! Raw Student Record
//!
//! The 32 fields collected by the prediction forms. Wire names match the
//! dataset column names the preprocessor was fitted on.

use crate::table::Record;
use crate::value::Value;
use serde::{Deserialize, Serialize};

/// Categorical columns, in dataset order
pub const CATEGORICAL_COLUMNS: [&str; 17] = [
    "school", "sex", "address", "famsize", "Pstatus", "Mjob", "Fjob", "reason", "guardian",
    "schoolsup", "famsup", "paid", "activities", "nursery", "higher", "internet", "romantic",
];

/// Integer columns, in dataset order
pub const INTEGER_COLUMNS: [&str; 15] = [
    "age", "Medu", "Fedu", "traveltime", "studytime", "failures", "famrel", "freetime", "goout",
    "Dalc", "Walc", "health", "absences", "G1", "G2",
];

/// All raw columns, in dataset order
pub const RAW_COLUMNS: [&str; 32] = [
    "school", "sex", "age", "address", "famsize", "Pstatus", "Medu", "Fedu", "Mjob", "Fjob",
    "reason", "guardian", "traveltime", "studytime", "failures", "schoolsup", "famsup", "paid",
    "activities", "nursery", "higher", "internet", "romantic", "famrel", "freetime", "goout",
    "Dalc", "Walc", "health", "absences", "G1", "G2",
];

/// One student's raw input. Every field is required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawStudentRecord {
    pub school: String,
    pub sex: String,
    pub age: i64,
    pub address: String,
    pub famsize: String,
    #[serde(rename = "Pstatus")]
    pub p_status: String,
    #[serde(rename = "Medu")]
    pub m_edu: i64,
    #[serde(rename = "Fedu")]
    pub f_edu: i64,
    #[serde(rename = "Mjob")]
    pub m_job: String,
    #[serde(rename = "Fjob")]
    pub f_job: String,
    pub reason: String,
    pub guardian: String,
    pub traveltime: i64,
    pub studytime: i64,
    pub failures: i64,
    pub schoolsup: String,
    pub famsup: String,
    pub paid: String,
    pub activities: String,
    pub nursery: String,
    pub higher: String,
    pub internet: String,
    pub romantic: String,
    pub famrel: i64,
    pub freetime: i64,
    pub goout: i64,
    #[serde(rename = "Dalc")]
    pub d_alc: i64,
    #[serde(rename = "Walc")]
    pub w_alc: i64,
    pub health: i64,
    pub absences: i64,
    #[serde(rename = "G1")]
    pub g1: i64,
    #[serde(rename = "G2")]
    pub g2: i64,
}

impl RawStudentRecord {
    /// Categorical fields paired with their column names
    pub fn categorical_fields(&self) -> [(&'static str, &str); 17] {
        [
            ("school", &self.school),
            ("sex", &self.sex),
            ("address", &self.address),
            ("famsize", &self.famsize),
            ("Pstatus", &self.p_status),
            ("Mjob", &self.m_job),
            ("Fjob", &self.f_job),
            ("reason", &self.reason),
            ("guardian", &self.guardian),
            ("schoolsup", &self.schoolsup),
            ("famsup", &self.famsup),
            ("paid", &self.paid),
            ("activities", &self.activities),
            ("nursery", &self.nursery),
            ("higher", &self.higher),
            ("internet", &self.internet),
            ("romantic", &self.romantic),
        ]
    }

    /// Integer fields paired with their column names
    pub fn integer_fields(&self) -> [(&'static str, i64); 15] {
        [
            ("age", self.age),
            ("Medu", self.m_edu),
            ("Fedu", self.f_edu),
            ("traveltime", self.traveltime),
            ("studytime", self.studytime),
            ("failures", self.failures),
            ("famrel", self.famrel),
            ("freetime", self.freetime),
            ("goout", self.goout),
            ("Dalc", self.d_alc),
            ("Walc", self.w_alc),
            ("health", self.health),
            ("absences", self.absences),
            ("G1", self.g1),
            ("G2", self.g2),
        ]
    }

    /// Table row holding the 32 raw columns
    pub fn to_record(&self) -> Record {
        let categorical = self
            .categorical_fields()
            .into_iter()
            .map(|(column, value)| (column, Value::from(value)));
        let integer = self
            .integer_fields()
            .into_iter()
            .map(|(column, value)| (column, Value::Int(value)));
        categorical.chain(integer).collect()
    }
}

impl From<&RawStudentRecord> for Record {
    fn from(raw: &RawStudentRecord) -> Self {
        raw.to_record()
    }
}
