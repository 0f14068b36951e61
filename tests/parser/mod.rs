//! Parser layer tests
//!
//! - Error recovery on partial input
//! - Lexical classification of code, comments and strings

pub mod tests_lexical;
pub mod tests_recovery;
