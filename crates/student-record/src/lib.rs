//! Student Record Types
//!
//! Raw student records as submitted by the front-ends, and the loosely typed
//! row/table representation the feature engine and preprocessor operate on.

mod raw;
mod table;
mod value;

pub use raw::{RawStudentRecord, CATEGORICAL_COLUMNS, INTEGER_COLUMNS, RAW_COLUMNS};
pub use table::{Record, Table};
pub use value::Value;
