//! Parser front-end for Kite
//!
//! ```text
//! Source Text
//!     ↓
//! Lexer (logos) → Tokens with SyntaxKind
//!     ↓
//! Parser → SourceFile (enum AST) + SyntaxErrors
//!     ↓
//! HIR → Declarations, scopes, diagnostics
//! ```
//!
//! The parser never panics and always returns its best tree. The
//! [`LexicalMap`] classifier and the bounded [`ParseCache`] live here too
//! because both are built directly on the lexer and parser.

#[allow(clippy::module_inception)]
mod parser;

pub mod ast;
mod cache;
mod lexer;
mod lexical;
mod syntax_kind;

pub use ast::*;
pub use cache::{CacheStats, DEFAULT_CAPACITY, ParseCache};
pub use lexer::{Lexer, Token, tokenize};
pub use lexical::{LexicalMap, Region, interpolation_holes};
pub use parser::{Parse, SyntaxError, parse};
pub use syntax_kind::SyntaxKind;

pub use text_size::{TextRange, TextSize};
