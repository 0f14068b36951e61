//! Name resolution within and across documents.

use kite::hir::{AnalyzedDocument, DeclarationKind, OwnerKind, ResolvedSymbol, SearchScope, resolve};
use kite::project::MemoryWorkspace;

use crate::helpers::analysis_helpers::{offset_of, workspace_with};
use crate::helpers::source_fixtures::*;

#[test]
fn test_inner_declaration_shadows_outer() {
    let doc = AnalyzedDocument::new("main.kite", SHADOWING);
    let ws = MemoryWorkspace::new();

    // `return x` inside `f`
    let inner = resolve("x", Some(offset_of(SHADOWING, "x", 2)), &doc, &ws).unwrap();
    let ResolvedSymbol::Declaration { declaration, search } = inner else {
        panic!("expected declaration");
    };
    assert_eq!(declaration.container.as_deref(), Some("f"));
    assert!(matches!(search, SearchScope::Local(_)));

    // `var z = x` at the top level
    let outer = resolve("x", Some(offset_of(SHADOWING, "x", 3)), &doc, &ws).unwrap();
    assert_eq!(outer.as_declaration().unwrap().name_range.start(), offset_of(SHADOWING, "x", 0));
}

#[test]
fn test_schema_resolves_across_documents() {
    let ws = workspace_with(&[("schemas/config.kite", CONFIG_SCHEMA)]);
    let text = "resource Config c {\n  host = \"h\"\n  tls = true\n}";
    let doc = AnalyzedDocument::new("main.kite", text);
    let resolved = resolve("Config", Some(offset_of(text, "Config", 0)), &doc, &ws).unwrap();
    let declaration = resolved.as_declaration().unwrap();
    assert_eq!(declaration.kind, DeclarationKind::Schema);
    assert_eq!(declaration.document_uri.as_ref(), "schemas/config.kite");
}

#[test]
fn test_component_input_key_resolves_to_member() {
    let text = format!("{WEB_COMPONENT}component WebServer api {{\n  name = \"api\"\n}}\n");
    let doc = AnalyzedDocument::new("main.kite", text.as_str());
    let cursor = Some(offset_of(&text, "name =", 0));
    let resolved = resolve("name", cursor, &doc, &MemoryWorkspace::new()).unwrap();
    let ResolvedSymbol::Member(member) = resolved else {
        panic!("expected member");
    };
    assert_eq!(member.owner_kind, OwnerKind::Component);
    assert_eq!(member.owner, "WebServer");
    let definition = member.definition.unwrap();
    assert_eq!(&text[definition.range], "name");
    assert!(definition.range.start() < offset_of(&text, "output", 0));
}

#[test]
fn test_unknown_names_do_not_resolve() {
    let doc = AnalyzedDocument::new("main.kite", "var a = missing");
    assert!(resolve("missing", None, &doc, &MemoryWorkspace::new()).is_none());
}
