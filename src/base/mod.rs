//! Foundation types for the Kite toolchain.
//!
//! This module provides fundamental types used throughout the crate:
//! - [`TextRange`], [`TextSize`] - Source positions (byte offsets)
//! - [`LineIndex`] - Byte offset to line/column conversion
//! - [`Position`], [`Span`] - Line/column positions for editor output
//! - [`DocumentUri`], [`Location`] - Shared document identifier and ranges within it
//!
//! This module has NO dependencies on other kite modules.

mod position;
mod span;

use std::sync::Arc;

pub use position::{Position, Span};
pub use span::{LineIndex, TextRange, TextSize};

// Re-export text-size types for convenience
pub use text_size;

/// Identifier of a document (an editor URI or a filesystem path).
pub type DocumentUri = Arc<str>;

/// File extension of Kite sources.
pub const KITE_EXTENSION: &str = "kite";

/// Name of this tool, used as the `source` of every diagnostic.
pub const SOURCE_NAME: &str = "kite";

/// A range inside a specific document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location {
    pub uri: DocumentUri,
    pub range: TextRange,
}

impl Location {
    pub fn new(uri: DocumentUri, range: TextRange) -> Self {
        Self { uri, range }
    }
}
