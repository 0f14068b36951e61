//! Validation pipeline tests
//!
//! End-to-end runs of the default pipeline over whole documents.

pub mod tests_comment_immunity;
pub mod tests_imports;
pub mod tests_properties_and_types;
pub mod tests_unused;
