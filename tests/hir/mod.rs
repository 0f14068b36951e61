//! HIR layer tests
//!
//! - Declaration indexing and scope bounds
//! - Name resolution within and across documents

pub mod tests_indexing;
pub mod tests_resolution;
