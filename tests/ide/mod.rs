//! IDE layer tests
//!
//! - Find references and rename through `AnalysisHost`
//! - Go-to-definition
//! - Quick fixes
//! - Filesystem-backed workspaces

pub mod tests_code_actions;
pub mod tests_goto;
pub mod tests_references;
pub mod tests_workspace;
