//! Declaration types produced by the indexer.
//!
//! Declarations are value objects rebuilt from scratch on every content
//! change. Nothing here carries identity across edits.

use smol_str::SmolStr;
use text_size::{TextRange, TextSize};

use crate::base::{DocumentUri, Location};

// ============================================================================
// KINDS
// ============================================================================

/// What kind of named thing a declaration introduces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclarationKind {
    Variable,
    Input,
    Output,
    Resource,
    Component,
    Schema,
    Function,
    Type,
    ForVar,
    Import,
}

impl DeclarationKind {
    /// Lowercase display form used in diagnostic messages.
    pub fn display(self) -> &'static str {
        match self {
            DeclarationKind::Variable => "variable",
            DeclarationKind::Input => "input",
            DeclarationKind::Output => "output",
            DeclarationKind::Resource => "resource",
            DeclarationKind::Component => "component",
            DeclarationKind::Schema => "schema",
            DeclarationKind::Function => "function",
            DeclarationKind::Type => "type",
            DeclarationKind::ForVar => "loop variable",
            DeclarationKind::Import => "import",
        }
    }

    /// Kinds other documents can refer to by name.
    pub fn is_exported(self) -> bool {
        matches!(
            self,
            DeclarationKind::Schema
                | DeclarationKind::Component
                | DeclarationKind::Function
                | DeclarationKind::Type
                | DeclarationKind::Resource
        )
    }
}

// ============================================================================
// INDEXING DESCRIPTORS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexType {
    /// `@count(n)` or iteration over an integer range.
    Numeric,
    /// Iteration over a list of string keys (or an opaque source).
    String,
}

/// How a resource or component instance is multiplied.
///
/// Describes multiplicity for the user; instances are never materialized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedBy {
    pub index_type: IndexType,
    /// `count` for `@count`, otherwise the loop variable feeding the instance.
    pub loop_variable: SmolStr,
    pub range_start: Option<i64>,
    pub range_end: Option<i64>,
    /// `None` when `@count` has a non-literal argument.
    pub count_value: Option<i64>,
    pub string_keys: Option<Vec<SmolStr>>,
}

impl IndexedBy {
    /// Whether the number of generated instances is statically known.
    pub fn is_static(&self) -> bool {
        match self.index_type {
            IndexType::Numeric => {
                self.count_value.is_some()
                    || (self.range_start.is_some() && self.range_end.is_some())
            }
            IndexType::String => self.string_keys.is_some(),
        }
    }
}

/// A function parameter as recorded on the function's declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub type_name: Option<SmolStr>,
    pub name: SmolStr,
}

// ============================================================================
// DECLARATION
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub name: SmolStr,
    pub kind: DeclarationKind,
    pub type_name: Option<SmolStr>,
    /// Schema type of a resource instance.
    pub schema_name: Option<SmolStr>,
    /// Component type of a component instance.
    pub component_type: Option<SmolStr>,
    pub parameters: Vec<Parameter>,
    pub return_type: Option<SmolStr>,
    pub source_range: TextRange,
    pub name_range: TextRange,
    pub document_uri: DocumentUri,
    /// Visibility bounds; `None` means visible in the whole document.
    pub scope: Option<TextRange>,
    pub indexed_by: Option<IndexedBy>,
    pub documentation: Option<String>,
    pub import_path: Option<SmolStr>,
    /// Enclosing function or component definition.
    pub container: Option<SmolStr>,
}

impl Declaration {
    pub fn new(
        name: impl Into<SmolStr>,
        kind: DeclarationKind,
        source_range: TextRange,
        name_range: TextRange,
        document_uri: DocumentUri,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            type_name: None,
            schema_name: None,
            component_type: None,
            parameters: Vec::new(),
            return_type: None,
            source_range,
            name_range,
            document_uri,
            scope: None,
            indexed_by: None,
            documentation: None,
            import_path: None,
            container: None,
        }
    }

    /// Scoped variables, parameters and loop variables.
    pub fn is_local(&self) -> bool {
        self.scope.is_some()
            && matches!(self.kind, DeclarationKind::Variable | DeclarationKind::ForVar)
    }

    /// Inputs and outputs declared inside a component definition.
    pub fn is_component_member(&self) -> bool {
        matches!(self.kind, DeclarationKind::Input | DeclarationKind::Output)
            && self.container.is_some()
    }

    /// Scope bounds are inclusive at both ends.
    pub fn is_visible_at(&self, offset: TextSize) -> bool {
        self.scope.is_none_or(|scope| scope.contains_inclusive(offset))
    }

    /// Length of the visibility range, `None` for document scope.
    pub fn scope_len(&self) -> Option<TextSize> {
        self.scope.map(|scope| scope.len())
    }

    pub fn location(&self) -> Location {
        Location::new(self.document_uri.clone(), self.name_range)
    }

    /// The schema or component type of an instance.
    pub fn instance_type(&self) -> Option<&SmolStr> {
        self.schema_name.as_ref().or(self.component_type.as_ref())
    }
}
