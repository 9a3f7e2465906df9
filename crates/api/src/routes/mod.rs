//! API route handlers

pub mod model;
pub mod predictions;
