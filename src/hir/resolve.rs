//! Name resolution — picking the visible declaration and its search radius.
//!
//! Resolution prefers the most local declaration visible at the cursor and
//! restricts later reference sweeps to the smallest radius that can hold
//! every use: the declaration's scope, the current document, or the whole
//! workspace. Schema properties and component inputs/outputs resolve to a
//! [`MemberSymbol`] because they are also used structurally from instances.

use std::sync::Arc;

use smol_str::SmolStr;
use text_size::{TextRange, TextSize};

use super::declarations::{Declaration, DeclarationKind};
use super::document::AnalyzedDocument;
use super::indexer::index_document;
use super::locate::{self, InstanceKind, MemberKind};
use crate::base::{DocumentUri, Location};
use crate::parser::{SourceFile, Stmt, parse};
use crate::project::Workspace;

// ============================================================================
// RESULT TYPES
// ============================================================================

/// How far a reference sweep for a declaration must reach.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchScope {
    /// Only inside this range of the declaring document.
    Local(TextRange),
    /// The whole declaring document.
    Document,
    /// Every workspace document.
    Workspace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OwnerKind {
    Schema,
    Component,
}

/// A schema property or component input/output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberSymbol {
    pub owner_kind: OwnerKind,
    pub owner: SmolStr,
    pub name: SmolStr,
    pub member_kind: MemberKind,
    /// Where the member is declared, when the owner definition was found.
    pub definition: Option<Location>,
    /// The input/output declaration inside the component body.
    pub declaration: Option<Declaration>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedSymbol {
    Declaration {
        declaration: Declaration,
        search: SearchScope,
    },
    Member(MemberSymbol),
}

impl ResolvedSymbol {
    pub fn name(&self) -> &SmolStr {
        match self {
            ResolvedSymbol::Declaration { declaration, .. } => &declaration.name,
            ResolvedSymbol::Member(member) => &member.name,
        }
    }

    /// Location of the defining name, when known.
    pub fn definition(&self) -> Option<Location> {
        match self {
            ResolvedSymbol::Declaration { declaration, .. } => Some(declaration.location()),
            ResolvedSymbol::Member(member) => member.definition.clone(),
        }
    }

    pub fn as_declaration(&self) -> Option<&Declaration> {
        match self {
            ResolvedSymbol::Declaration { declaration, .. } => Some(declaration),
            ResolvedSymbol::Member(member) => member.declaration.as_ref(),
        }
    }
}

// ============================================================================
// RESOLUTION
// ============================================================================

/// Resolve `name` as seen from `cursor` in `document`.
///
/// Names the current document does not declare are looked up among the
/// exported declarations of the other workspace documents.
pub fn resolve(
    name: &str,
    cursor: Option<TextSize>,
    document: &AnalyzedDocument,
    workspace: &dyn Workspace,
) -> Option<ResolvedSymbol> {
    if let Some(member) = cursor.and_then(|offset| member_at(name, offset, document, workspace)) {
        tracing::debug!(name, owner = %member.owner, "resolved structural member");
        return Some(ResolvedSymbol::Member(member));
    }

    if let Some(declaration) = select_declaration(name, cursor, &document.declarations) {
        if declaration.is_component_member() {
            return Some(ResolvedSymbol::Member(component_member_symbol(declaration.clone())));
        }
        let export = (declaration.kind == DeclarationKind::Import)
            .then(|| find_exported(name, document, workspace))
            .flatten();
        if let Some(found) = export {
            tracing::debug!(name, uri = %found.document_uri, "resolved import to its export");
            return Some(ResolvedSymbol::Declaration {
                declaration: found,
                search: SearchScope::Workspace,
            });
        }
        let search = search_scope(declaration);
        tracing::debug!(name, kind = declaration.kind.display(), ?search, "resolved declaration");
        return Some(ResolvedSymbol::Declaration {
            declaration: declaration.clone(),
            search,
        });
    }

    let found = find_exported(name, document, workspace)?;
    tracing::debug!(name, uri = %found.document_uri, "resolved in workspace");
    Some(ResolvedSymbol::Declaration {
        declaration: found,
        search: SearchScope::Workspace,
    })
}

/// The most local declaration of `name` visible at `cursor`.
///
/// A cursor sitting on a declaration's own name selects it directly.
/// Among equally local candidates the nearest one declared before the
/// cursor wins. Without a cursor, document-scoped declarations are
/// preferred.
pub fn select_declaration<'a>(
    name: &str,
    cursor: Option<TextSize>,
    declarations: &'a [Declaration],
) -> Option<&'a Declaration> {
    let all: Vec<&Declaration> = declarations.iter().filter(|d| d.name == name).collect();
    let Some(offset) = cursor else {
        return all.iter().find(|d| d.scope.is_none()).or(all.first()).copied();
    };
    if let Some(on_name) = all.iter().find(|d| d.name_range.contains_inclusive(offset)) {
        return Some(*on_name);
    }
    all.into_iter()
        .filter(|d| d.is_visible_at(offset))
        .min_by_key(|d| {
            let width = d.scope_len().map(u32::from).unwrap_or(u32::MAX);
            (width, distance(d.name_range.start(), offset))
        })
}

/// Candidates declared before `offset` rank ahead of later ones, nearest
/// first.
fn distance(start: TextSize, offset: TextSize) -> (bool, u32) {
    if start <= offset {
        (false, u32::from(offset - start))
    } else {
        (true, u32::from(start - offset))
    }
}

/// Radius a reference sweep for `declaration` must cover.
pub fn search_scope(declaration: &Declaration) -> SearchScope {
    match (declaration.kind, declaration.scope) {
        (DeclarationKind::Import, _) => SearchScope::Workspace,
        (_, Some(scope)) => SearchScope::Local(scope),
        (DeclarationKind::Variable | DeclarationKind::ForVar, None) => SearchScope::Document,
        (DeclarationKind::Input | DeclarationKind::Output, None) => SearchScope::Document,
        (_, None) => SearchScope::Workspace,
    }
}

fn component_member_symbol(declaration: Declaration) -> MemberSymbol {
    let member_kind = if declaration.kind == DeclarationKind::Input {
        MemberKind::Input
    } else {
        MemberKind::Output
    };
    MemberSymbol {
        owner_kind: OwnerKind::Component,
        owner: declaration.container.clone().unwrap_or_default(),
        name: declaration.name.clone(),
        member_kind,
        definition: Some(declaration.location()),
        declaration: Some(declaration),
    }
}

// ============================================================================
// STRUCTURAL MEMBERS
// ============================================================================

fn member_at(
    name: &str,
    offset: TextSize,
    document: &AnalyzedDocument,
    workspace: &dyn Workspace,
) -> Option<MemberSymbol> {
    let tree = document.tree()?;

    // Property key inside an instance body.
    for instance in locate::instances(tree) {
        for property in instance.body.properties() {
            if property.key.as_str() == name && property.key.range.contains_inclusive(offset) {
                let owner_kind = match instance.kind {
                    InstanceKind::Resource => OwnerKind::Schema,
                    InstanceKind::Component => OwnerKind::Component,
                };
                let owner = instance.type_name();
                return Some(member_symbol(owner_kind, owner, name, document, workspace));
            }
        }
    }

    // Property declaration inside a schema.
    let on_schema_property = tree.statements.iter().find_map(|stmt| match stmt {
        Stmt::Schema(schema)
            if schema
                .properties
                .iter()
                .any(|p| p.name.as_str() == name && p.name.range.contains_inclusive(offset)) =>
        {
            Some(schema)
        }
        _ => None,
    });
    if let Some(schema) = on_schema_property {
        let owner = schema.name.as_str();
        return Some(member_symbol(OwnerKind::Schema, owner, name, document, workspace));
    }

    // `instance.member`
    let (word_range, word) = document.word_at(offset)?;
    if word != name {
        return None;
    }
    let (object_range, object) = document.qualifier_before(word_range.start())?;
    let instance = select_declaration(object, Some(object_range.start()), &document.declarations)
        .filter(|d| matches!(d.kind, DeclarationKind::Resource | DeclarationKind::Component))?;
    let owner_kind = if instance.kind == DeclarationKind::Resource {
        OwnerKind::Schema
    } else {
        OwnerKind::Component
    };
    let owner = instance.instance_type()?.clone();
    Some(member_symbol(owner_kind, &owner, name, document, workspace))
}

fn member_symbol(
    owner_kind: OwnerKind,
    owner: &str,
    name: &str,
    document: &AnalyzedDocument,
    workspace: &dyn Workspace,
) -> MemberSymbol {
    let owner = locate::last_segment(owner);
    let default_kind = match owner_kind {
        OwnerKind::Schema => MemberKind::Property,
        OwnerKind::Component => MemberKind::Input,
    };
    let mut symbol = MemberSymbol {
        owner_kind,
        owner: SmolStr::new(owner),
        name: SmolStr::new(name),
        member_kind: default_kind,
        definition: None,
        declaration: None,
    };

    let Some(found) = find_owner(owner_kind, owner, document, workspace) else {
        return symbol;
    };
    let members = match owner_kind {
        OwnerKind::Schema => locate::schema_properties(&found.tree, owner),
        OwnerKind::Component => locate::component_members(&found.tree, owner),
    };
    if let Some(member) = members.into_iter().flatten().find(|m| m.name == name) {
        symbol.member_kind = member.kind;
        symbol.definition = Some(Location::new(found.uri.clone(), member.name_range));
        if owner_kind == OwnerKind::Component {
            symbol.declaration = found.declarations().into_iter().find(|d| {
                d.name == name && d.is_component_member() && d.name_range == member.name_range
            });
        }
    }
    symbol
}

/// A document holding the definition of a schema or component.
pub struct OwnerDocument {
    pub uri: DocumentUri,
    pub tree: Arc<SourceFile>,
    declarations: Option<Vec<Declaration>>,
}

impl OwnerDocument {
    pub fn declarations(&self) -> Vec<Declaration> {
        self.declarations
            .clone()
            .unwrap_or_else(|| index_document(&self.uri, &self.tree))
    }
}

/// Find the definition of a schema or component, current document first.
pub fn find_owner(
    owner_kind: OwnerKind,
    owner: &str,
    document: &AnalyzedDocument,
    workspace: &dyn Workspace,
) -> Option<OwnerDocument> {
    let defines = |tree: &SourceFile| match owner_kind {
        OwnerKind::Schema => locate::find_schema(tree, owner).is_some(),
        OwnerKind::Component => locate::find_component_definition(tree, owner).is_some(),
    };
    if let Some(tree) = document.parse.tree.as_ref().filter(|tree| defines(tree)) {
        return Some(OwnerDocument {
            uri: document.uri.clone(),
            tree: tree.clone(),
            declarations: Some(document.declarations.clone()),
        });
    }
    for uri in workspace.documents() {
        if uri == document.uri {
            continue;
        }
        let Some(text) = workspace.read(&uri) else {
            continue;
        };
        let Some(tree) = parse(&text).tree else {
            continue;
        };
        if defines(&tree) {
            tracing::trace!(owner, uri = %uri, "found owner definition");
            return Some(OwnerDocument {
                uri,
                tree,
                declarations: None,
            });
        }
    }
    None
}

/// First exported, document-scoped declaration of `name` in another
/// workspace document.
pub fn find_exported(
    name: &str,
    document: &AnalyzedDocument,
    workspace: &dyn Workspace,
) -> Option<Declaration> {
    for uri in workspace.documents() {
        if uri == document.uri {
            continue;
        }
        let Some(text) = workspace.read(&uri) else {
            continue;
        };
        let Some(tree) = parse(&text).tree else {
            continue;
        };
        let found = index_document(&uri, &tree)
            .into_iter()
            .find(|d| d.name == name && d.kind.is_exported() && d.scope.is_none());
        if found.is_some() {
            return found;
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::MemoryWorkspace;

    fn offset_of(text: &str, needle: &str, nth: usize) -> TextSize {
        let at = text.match_indices(needle).nth(nth).unwrap().0;
        TextSize::from(at as u32)
    }

    #[test]
    fn test_most_local_declaration_wins() {
        let text = "var x = 1\nfun f() {\n  var x = 2\n  return x\n}";
        let doc = AnalyzedDocument::new("a.kite", text);
        let ws = MemoryWorkspace::new();
        let cursor = offset_of(text, "x", 2);
        let resolved = resolve("x", Some(cursor), &doc, &ws).unwrap();
        let ResolvedSymbol::Declaration { declaration, search } = resolved else {
            panic!("expected declaration");
        };
        assert!(declaration.scope.is_some());
        assert!(matches!(search, SearchScope::Local(_)));

        let top = resolve("x", Some(offset_of(text, "x", 0)), &doc, &ws).unwrap();
        assert!(matches!(top, ResolvedSymbol::Declaration { search: SearchScope::Document, .. }));
    }

    #[test]
    fn test_redeclaration_in_same_scope_picks_nearest_preceding() {
        let text = "fun f() {\n  var x = 1\n  println(x)\n  var x = 2\n  println(x)\n}";
        let doc = AnalyzedDocument::new("a.kite", text);
        let at = |nth| select_declaration("x", Some(offset_of(text, "x", nth)), &doc.declarations);
        assert_eq!(at(1).unwrap().name_range.start(), offset_of(text, "x", 0));
        assert_eq!(at(3).unwrap().name_range.start(), offset_of(text, "x", 2));
    }

    #[test]
    fn test_schema_is_workspace_scoped() {
        let doc = AnalyzedDocument::new("a.kite", "schema S { string a }");
        let resolved = resolve("S", None, &doc, &MemoryWorkspace::new()).unwrap();
        assert!(matches!(
            resolved,
            ResolvedSymbol::Declaration {
                search: SearchScope::Workspace,
                ..
            }
        ));
    }

    #[test]
    fn test_property_key_resolves_to_schema_member() {
        let mut ws = MemoryWorkspace::new();
        ws.insert("schemas.kite", "schema Bucket {\n  string name\n}");
        let text = "resource Bucket photos { name = \"p\" }";
        let doc = AnalyzedDocument::new("main.kite", text);
        let resolved = resolve("name", Some(offset_of(text, "name", 0)), &doc, &ws).unwrap();
        let ResolvedSymbol::Member(member) = resolved else {
            panic!("expected member");
        };
        assert_eq!(member.owner, "Bucket");
        assert_eq!(member.owner_kind, OwnerKind::Schema);
        assert_eq!(member.definition.unwrap().uri.as_ref(), "schemas.kite");
    }

    #[test]
    fn test_dotted_access_resolves_member() {
        let text = "component Web {\n  output string url = \"u\"\n}\
                    \ncomponent Web site {}\nvar link = site.url";
        let doc = AnalyzedDocument::new("a.kite", text);
        let cursor = Some(offset_of(text, "url", 1));
        let resolved = resolve("url", cursor, &doc, &MemoryWorkspace::new()).unwrap();
        let ResolvedSymbol::Member(member) = resolved else {
            panic!("expected member");
        };
        assert_eq!(member.member_kind, MemberKind::Output);
        assert!(member.declaration.is_some());
    }

    #[test]
    fn test_unknown_name_searches_workspace() {
        let mut ws = MemoryWorkspace::new();
        ws.insert("lib.kite", "fun helper() { return 1 }");
        let doc = AnalyzedDocument::new("main.kite", "var x = helper()");
        let resolved = resolve("helper", None, &doc, &ws).unwrap();
        assert_eq!(resolved.definition().unwrap().uri.as_ref(), "lib.kite");
        assert!(resolve("nothing", None, &doc, &ws).is_none());
    }

    #[test]
    fn test_named_import_resolves_to_export() {
        let mut ws = MemoryWorkspace::new();
        ws.insert("aws.kite", "schema Bucket {\n  string name\n}");
        let text = "import Bucket from \"aws.kite\"\nresource Bucket b {}";
        let doc = AnalyzedDocument::new("main.kite", text);
        let resolved = resolve("Bucket", Some(offset_of(text, "Bucket", 1)), &doc, &ws).unwrap();
        let declaration = resolved.as_declaration().unwrap();
        assert_eq!(declaration.kind, DeclarationKind::Schema);
        assert_eq!(declaration.document_uri.as_ref(), "aws.kite");
    }
}
