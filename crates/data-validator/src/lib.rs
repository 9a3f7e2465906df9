//! Data Validation
//!
//! Range checking and vocabulary checking for raw student records at the
//! front-end boundary.

mod error;
mod validator;

pub use error::ValidationError;
pub use validator::{ValidationConfig, ValidationResult, Validator, VocabularyPolicy};
