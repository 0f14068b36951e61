//! # kite-base
//!
//! Declaration indexing, scope resolution and validation for the Kite
//! infrastructure language.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! ide         → AnalysisHost session, references/rename, goto, code actions
//!   ↓
//! validation  → Pipeline of independent checks producing diagnostics
//!   ↓
//! hir         → Declarations, scopes, locator, resolver, diagnostics
//!   ↓
//! project     → Workspace enumeration, import path resolution
//!   ↓
//! parser      → Logos lexer, recursive-descent parser, lexical map, parse cache
//!   ↓
//! base        → Primitives (TextRange, LineIndex, Location)
//! ```

// ============================================================================
// MODULES (dependency order: base → parser → project → hir → validation → ide)
// ============================================================================

/// Foundation types: TextRange, LineIndex, Location
pub mod base;

/// Parser: Logos lexer, recursive-descent parser, lexical classification
pub mod parser;

/// Project management: workspace enumeration
pub mod project;

/// High-level IR: declarations, scopes and resolution
pub mod hir;

/// Validation passes and the pipeline that runs them
pub mod validation;

/// IDE features: references, rename, goto-definition, code actions
pub mod ide;

// Re-export foundation types
pub use base::{DocumentUri, LineIndex, Location, Position, Span, TextRange, TextSize};
