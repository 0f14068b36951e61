//! Find references and rename.
//!
//! Both build on the resolver's scope decision. Declarations are swept
//! lexically over their search radius; schema properties and component
//! inputs/outputs are additionally matched structurally in every instance
//! of their owner (property keys and `instance.member` accesses).

use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use text_size::{TextRange, TextSize};
use thiserror::Error;

use crate::base::{DocumentUri, Location};
use crate::hir::{
    AnalyzedDocument, Declaration, DeclarationKind, InstanceKind, MemberSymbol, OwnerKind,
    ResolvedSymbol, SearchScope, locate, resolve, select_declaration,
};
use crate::parser::{SyntaxKind, tokenize};
use crate::project::Workspace;

// ============================================================================
// FIND REFERENCES
// ============================================================================

/// Every location referring to the symbol named `word` at `offset`.
///
/// The definition comes first and appears exactly once. Names that do not
/// resolve fall back to their plain occurrences in the current document.
pub fn find_references(
    word: &str,
    offset: TextSize,
    document: &AnalyzedDocument,
    workspace: &dyn Workspace,
) -> Vec<Location> {
    let mut refs = References::default();
    match resolve(word, Some(offset), document, workspace) {
        Some(ResolvedSymbol::Declaration { declaration, search }) => {
            refs.push(declaration.location());
            declaration_references(&declaration, search, document, workspace, &mut refs);
        }
        Some(ResolvedSymbol::Member(member)) => {
            if let Some(definition) = &member.definition {
                refs.push(definition.clone());
            }
            member_references(&member, document, workspace, &mut refs);
        }
        None => {
            tracing::debug!(word, "unresolved; falling back to document occurrences");
            for range in document.lexical.word_occurrences(&document.text, word) {
                if !document.is_member_position(range) {
                    refs.push(document.location(range));
                }
            }
        }
    }
    refs.locations
}

/// Locations in discovery order, deduplicated by document and start.
#[derive(Default)]
struct References {
    seen: FxHashSet<(DocumentUri, TextSize)>,
    locations: Vec<Location>,
}

impl References {
    fn push(&mut self, location: Location) {
        if self.seen.insert((location.uri.clone(), location.range.start())) {
            self.locations.push(location);
        }
    }
}

fn declaration_references(
    declaration: &Declaration,
    search: SearchScope,
    document: &AnalyzedDocument,
    workspace: &dyn Workspace,
    refs: &mut References,
) {
    tracing::debug!(name = %declaration.name, ?search, "sweeping references");
    let within = match search {
        SearchScope::Local(range) => Some(range),
        SearchScope::Document => None,
        SearchScope::Workspace => {
            for other in documents(document, workspace) {
                sweep(declaration, &other, None, refs);
            }
            return;
        }
    };
    if declaration.document_uri == document.uri {
        sweep(declaration, document, within, refs);
    } else if let Some(owner) = load(workspace, &declaration.document_uri) {
        sweep(declaration, &owner, within, refs);
    }
}

fn sweep(
    declaration: &Declaration,
    document: &AnalyzedDocument,
    within: Option<TextRange>,
    refs: &mut References,
) {
    let within = within.unwrap_or_else(|| TextRange::up_to(TextSize::of(&*document.text)));
    for range in document.lexical.word_occurrences_in(&document.text, &declaration.name, within) {
        if document.is_member_position(range) {
            continue;
        }
        if refers_to(document, range, declaration) {
            tracing::trace!(uri = %document.uri, start = u32::from(range.start()), "reference");
            refs.push(document.location(range));
        }
    }
}

/// Whether the occurrence at `range` in `document` names `declaration`
/// rather than something the document declares itself.
fn refers_to(document: &AnalyzedDocument, range: TextRange, declaration: &Declaration) -> bool {
    let same_document = document.uri == declaration.document_uri;
    match select_declaration(&declaration.name, Some(range.start()), &document.declarations) {
        Some(found) if same_document => found.name_range == declaration.name_range,
        Some(found) => found.kind == DeclarationKind::Import,
        None => !same_document,
    }
}

fn member_references(
    member: &MemberSymbol,
    document: &AnalyzedDocument,
    workspace: &dyn Workspace,
    refs: &mut References,
) {
    let wanted = match member.owner_kind {
        OwnerKind::Schema => InstanceKind::Resource,
        OwnerKind::Component => InstanceKind::Component,
    };
    for doc in documents(document, workspace) {
        // Uses inside the component definition itself.
        let own = member.declaration.as_ref().filter(|d| d.document_uri == doc.uri);
        if let Some(declaration) = own {
            sweep(declaration, &doc, declaration.scope, refs);
        }
        let Some(tree) = doc.tree() else {
            continue;
        };
        let instances: Vec<_> = locate::instances_of(tree, &member.owner)
            .into_iter()
            .filter(|i| i.kind == wanted)
            .collect();
        for instance in &instances {
            for property in instance.body.properties() {
                if property.key.text == member.name {
                    refs.push(doc.location(property.key.range));
                }
            }
        }
        if instances.is_empty() {
            continue;
        }
        for range in doc.lexical.word_occurrences(&doc.text, &member.name) {
            let Some((_, object)) = doc.qualifier_before(range.start()) else {
                continue;
            };
            if instances.iter().any(|i| i.name.text == object) {
                refs.push(doc.location(range));
            }
        }
    }
}

/// The current document followed by every other workspace document.
fn documents(document: &AnalyzedDocument, workspace: &dyn Workspace) -> Vec<AnalyzedDocument> {
    let mut out = vec![document.clone()];
    for uri in workspace.documents() {
        if uri == document.uri {
            continue;
        }
        out.extend(load(workspace, &uri));
    }
    out
}

fn load(workspace: &dyn Workspace, uri: &DocumentUri) -> Option<AnalyzedDocument> {
    let text = workspace.read(uri)?;
    Some(AnalyzedDocument::new(uri.clone(), text))
}

// ============================================================================
// RENAME
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    pub range: TextRange,
    pub new_text: String,
}

impl TextEdit {
    pub fn replace(range: TextRange, new_text: impl Into<String>) -> Self {
        Self {
            range,
            new_text: new_text.into(),
        }
    }

    pub fn insert(offset: TextSize, new_text: impl Into<String>) -> Self {
        Self::replace(TextRange::empty(offset), new_text)
    }

    pub fn delete(range: TextRange) -> Self {
        Self::replace(range, "")
    }
}

/// Edits grouped per document, in the order documents were first touched.
pub type WorkspaceEdit = IndexMap<DocumentUri, Vec<TextEdit>>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenameError {
    #[error("no symbol at cursor")]
    NoSymbol,
    #[error("'{0}' is not a valid identifier")]
    InvalidIdentifier(String),
    #[error("'{0}' is a keyword")]
    Keyword(String),
}

/// Rename the symbol at `offset` to `new_name` everywhere it is referenced.
pub fn rename(
    offset: TextSize,
    new_name: &str,
    document: &AnalyzedDocument,
    workspace: &dyn Workspace,
) -> Result<WorkspaceEdit, RenameError> {
    check_identifier(new_name)?;
    let (_, word) = document.word_at(offset).ok_or(RenameError::NoSymbol)?;
    if resolve(word, Some(offset), document, workspace).is_none() {
        return Err(RenameError::NoSymbol);
    }
    let mut edits = WorkspaceEdit::new();
    for location in find_references(word, offset, document, workspace) {
        edits
            .entry(location.uri)
            .or_default()
            .push(TextEdit::replace(location.range, new_name));
    }
    Ok(edits)
}

/// A valid name lexes as exactly one identifier token.
fn check_identifier(name: &str) -> Result<(), RenameError> {
    let tokens = tokenize(name);
    match tokens.as_slice() {
        [token] if token.kind == SyntaxKind::IDENT => Ok(()),
        [token] if token.kind.is_keyword() => Err(RenameError::Keyword(name.to_string())),
        _ => Err(RenameError::InvalidIdentifier(name.to_string())),
    }
}
