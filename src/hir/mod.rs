//! High-level IR (HIR) — declarations, scopes and resolution.
//!
//! Everything here is recomputed from scratch for each document snapshot.
//! There is no persistent project index: cross-file lookups read the other
//! workspace documents on demand.
//!
//! ## Key Types
//!
//! - [`AnalyzedDocument`] — parse tree, declarations and lexical map of one snapshot
//! - [`Declaration`] — a named thing found by the indexer, with scope bounds
//! - [`ResolvedSymbol`] — the result of resolving a name at a cursor
//! - [`Diagnostic`] — a semantic error, warning or hint
//!
//! ## Layers
//!
//! ```text
//! parse(text)                 ← tree + syntax errors
//!     │
//!     ▼
//! index_document(uri, tree)   ← flat, scope-annotated declarations
//!     │
//!     ├── locate::*           ← schemas, components, members, imports, instances
//!     ▼
//! resolve(name, cursor, ...)  ← visible declaration + search radius
//! ```

mod declarations;
pub mod decorators;
mod diagnostics;
mod document;
mod indexer;
pub mod locate;
mod resolve;

pub use declarations::{Declaration, DeclarationKind, IndexType, IndexedBy, Parameter};
pub use diagnostics::{
    Diagnostic, DiagnosticCollector, DiagnosticData, DiagnosticTag, RelatedInfo, Severity, codes,
};
pub use document::AnalyzedDocument;
pub use indexer::index_document;
pub use locate::{ImportInfo, Instance, InstanceKind, MemberInfo, MemberKind};
pub use resolve::{
    MemberSymbol, OwnerDocument, OwnerKind, ResolvedSymbol, SearchScope, find_exported, find_owner,
    resolve, search_scope, select_declaration,
};
