//! Diagnostics — semantic error reporting.
//!
//! Diagnostics carry byte ranges; editor-facing line/column spans are
//! computed on demand from the document's [`LineIndex`]. Passes that need
//! a quick fix downstream attach a typed [`DiagnosticData`] payload.

use std::sync::Arc;

use serde::Serialize;
use text_size::TextRange;

use super::declarations::Declaration;
use crate::base::{LineIndex, SOURCE_NAME, Span};

// ============================================================================
// DIAGNOSTIC TYPES
// ============================================================================

/// Severity level of a diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Severity {
    Error,
    Warning,
    Info,
    Hint,
}

impl Severity {
    /// Convert to LSP severity number.
    pub fn to_lsp(&self) -> u32 {
        match self {
            Severity::Error => 1,
            Severity::Warning => 2,
            Severity::Info => 3,
            Severity::Hint => 4,
        }
    }
}

/// Extra rendering hints for editors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum DiagnosticTag {
    /// Rendered faded out (unused code).
    Unnecessary,
}

/// Structured payload consumed by the quick-fix layer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum DiagnosticData {
    MissingProperty {
        property_name: String,
        property_type: String,
        instance_type: String,
        /// Byte offset of the instance body's opening brace.
        brace_offset: u32,
    },
    UnusedImport {
        import_path: String,
        symbol: Option<String>,
        is_wildcard: bool,
        line_start: u32,
        line_end: u32,
    },
}

impl DiagnosticData {
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

/// A diagnostic message with location.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub range: TextRange,
    pub severity: Severity,
    /// Error/warning code (e.g., "E0001").
    pub code: Option<Arc<str>>,
    pub message: Arc<str>,
    /// Always [`SOURCE_NAME`].
    pub source: &'static str,
    pub tags: Vec<DiagnosticTag>,
    pub data: Option<DiagnosticData>,
    pub related: Vec<RelatedInfo>,
}

/// Related information for a diagnostic.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelatedInfo {
    pub range: TextRange,
    pub message: Arc<str>,
}

impl Diagnostic {
    pub fn new(severity: Severity, range: TextRange, message: impl Into<Arc<str>>) -> Self {
        Self {
            range,
            severity,
            code: None,
            message: message.into(),
            source: SOURCE_NAME,
            tags: Vec::new(),
            data: None,
            related: Vec::new(),
        }
    }

    /// Create a new error diagnostic.
    pub fn error(range: TextRange, message: impl Into<Arc<str>>) -> Self {
        Self::new(Severity::Error, range, message)
    }

    /// Create a new warning diagnostic.
    pub fn warning(range: TextRange, message: impl Into<Arc<str>>) -> Self {
        Self::new(Severity::Warning, range, message)
    }

    pub fn hint(range: TextRange, message: impl Into<Arc<str>>) -> Self {
        Self::new(Severity::Hint, range, message)
    }

    /// Set the error code.
    pub fn with_code(mut self, code: impl Into<Arc<str>>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_tag(mut self, tag: DiagnosticTag) -> Self {
        self.tags.push(tag);
        self
    }

    pub fn with_data(mut self, data: DiagnosticData) -> Self {
        self.data = Some(data);
        self
    }

    /// Add related information.
    pub fn with_related(mut self, info: RelatedInfo) -> Self {
        self.related.push(info);
        self
    }

    /// Line/column span for editor output.
    pub fn span(&self, line_index: &LineIndex) -> Span {
        line_index.span(self.range)
    }

    pub fn has_code(&self, code: &str) -> bool {
        self.code.as_deref() == Some(code)
    }
}

// ============================================================================
// DIAGNOSTIC CODES
// ============================================================================

/// Standard diagnostic codes.
///
/// ## Code Ranges
///
/// - **E0001-E0099**: Errors (syntax, missing properties, type checking)
/// - **W0001-W0099**: Warnings (unused, decorator misuse, lints)
/// - **H0001-H0099**: Hints (informational, rendered faded or dotted)
pub mod codes {
    // ========================================================================
    // ERRORS (E0001-E0099)
    // ========================================================================

    /// Parser error.
    pub const SYNTAX_ERROR: &str = "E0001";
    /// Required schema property not set on an instance.
    pub const MISSING_PROPERTY: &str = "E0002";
    /// Literal value does not fit the declared type.
    pub const TYPE_MISMATCH: &str = "E0003";
    /// Duplicate definition.
    pub const DUPLICATE_DEFINITION: &str = "E0004";
    /// Decorator argument of the wrong shape or arity.
    pub const INVALID_DECORATOR_ARGUMENT: &str = "E0005";
    /// String literal without a closing quote.
    pub const UNCLOSED_STRING: &str = "E0006";

    // ========================================================================
    // WARNINGS (W0001-W0099)
    // ========================================================================

    /// Unused variable, parameter or loop variable.
    pub const UNUSED_SYMBOL: &str = "W0001";
    /// Decorator name not in the registry.
    pub const UNKNOWN_DECORATOR: &str = "W0002";
    /// Same decorator twice on one declaration.
    pub const DUPLICATE_DECORATOR: &str = "W0003";
    /// Decorator attached to a declaration it does not apply to.
    pub const DECORATOR_TARGET: &str = "W0004";
    /// `=` where `==` was probably meant.
    pub const ASSIGNMENT_IN_CONDITION: &str = "W0005";
    /// `while true` with no way out.
    pub const INFINITE_LOOP: &str = "W0006";
    /// `==`/`!=` between literals of different types.
    pub const CROSS_TYPE_COMPARISON: &str = "W0007";

    // ========================================================================
    // HINTS (H0001-H0099)
    // ========================================================================

    /// Component output nobody reads inside the component.
    pub const UNUSED_OUTPUT: &str = "H0001";
    /// Import whose symbols are never referenced.
    pub const UNUSED_IMPORT: &str = "H0002";
    /// Untyped variable whose type cannot be inferred.
    pub const IMPLICIT_ANY: &str = "H0003";
}

// ============================================================================
// DIAGNOSTIC COLLECTOR
// ============================================================================

/// Collects diagnostics during a validation pass.
#[derive(Clone, Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a diagnostic.
    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Add a duplicate definition error on the later declaration.
    pub fn duplicate_definition(&mut self, symbol: &Declaration, existing: &Declaration) {
        self.add(
            Diagnostic::error(
                symbol.name_range,
                format!("duplicate definition: '{}' is already defined", symbol.name),
            )
            .with_code(codes::DUPLICATE_DEFINITION)
            .with_related(RelatedInfo {
                range: existing.name_range,
                message: Arc::from(format!("previous definition of '{}'", existing.name)),
            }),
        );
    }

    /// Add a type mismatch error.
    pub fn type_mismatch(&mut self, range: TextRange, expected: &str, found: &str) {
        self.add(
            Diagnostic::error(
                range,
                format!("type mismatch: expected '{}', found '{}'", expected, found),
            )
            .with_code(codes::TYPE_MISMATCH),
        );
    }

    /// Add an unused symbol diagnostic.
    pub fn unused_symbol(&mut self, symbol: &Declaration, severity: Severity, code: &'static str) {
        self.add(
            Diagnostic::new(
                severity,
                symbol.name_range,
                format!("unused {}: '{}'", symbol.kind.display(), symbol.name),
            )
            .with_code(code)
            .with_tag(DiagnosticTag::Unnecessary),
        );
    }

    /// Get all diagnostics.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    /// Get the number of errors.
    pub fn error_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .count()
    }

    /// Get the number of warnings.
    pub fn warning_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .count()
    }

    /// Check if there are any errors.
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity == Severity::Error)
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

impl Extend<Diagnostic> for DiagnosticCollector {
    fn extend<I: IntoIterator<Item = Diagnostic>>(&mut self, iter: I) {
        self.diagnostics.extend(iter);
    }
}
