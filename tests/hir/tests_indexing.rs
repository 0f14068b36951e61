//! Declaration indexing properties.

use kite::hir::{AnalyzedDocument, DeclarationKind, IndexType};
use kite::ide::find_references;
use kite::parser::parse;
use kite::project::MemoryWorkspace;
use rstest::rstest;

use crate::helpers::source_fixtures::*;

fn document(text: &str) -> AnalyzedDocument {
    AnalyzedDocument::new("main.kite", text)
}

#[rstest]
#[case(CONFIG_SCHEMA)]
#[case(WEB_COMPONENT)]
#[case(SHADOWING)]
#[case("[for env in [\"dev\", \"prod\"]]\nresource Bucket b { name = env }")]
fn test_indexing_is_idempotent(#[case] text: &str) {
    assert_eq!(document(text).declarations, document(text).declarations);
}

#[test]
fn test_uses_of_scoped_declarations_stay_in_scope() {
    let text = format!(
        "{SHADOWING}{WEB_COMPONENT}for i in 0..3 {{\n  var doubled = i * 2\n  println(doubled)\n}}\
         \nvar i = 9\n"
    );
    let doc = document(&text);
    let ws = MemoryWorkspace::new();
    let scoped: Vec<_> = doc.declarations.iter().filter(|d| d.scope.is_some()).collect();
    assert!(scoped.len() >= 5);
    for decl in scoped {
        let scope = decl.scope.unwrap();
        let refs = find_references(&decl.name, decl.name_range.start(), &doc, &ws);
        assert_eq!(refs.first().map(|r| r.range), Some(decl.name_range));
        for reference in &refs[1..] {
            assert!(
                scope.contains_range(reference.range),
                "use of {} at {:?} outside {:?}",
                decl.name,
                reference.range,
                scope
            );
        }
    }
}

#[test]
fn test_kinds_and_types() {
    let text = format!(
        "{CONFIG_SCHEMA}{WEB_COMPONENT}resource Config c {{}}\ncomponent WebServer web {{}}\
         \ntype Region = \"us\" | \"eu\"\n"
    );
    let doc = document(&text);
    let kind_of = |name: &str| doc.declarations.iter().find(|d| d.name == name).map(|d| d.kind);
    assert_eq!(kind_of("Config"), Some(DeclarationKind::Schema));
    assert_eq!(kind_of("WebServer"), Some(DeclarationKind::Component));
    assert_eq!(kind_of("c"), Some(DeclarationKind::Resource));
    assert_eq!(kind_of("web"), Some(DeclarationKind::Component));
    assert_eq!(kind_of("Region"), Some(DeclarationKind::Type));
    assert_eq!(kind_of("endpoint"), Some(DeclarationKind::Output));

    let c = doc.declarations.iter().find(|d| d.name == "c").unwrap();
    assert_eq!(c.schema_name.as_deref(), Some("Config"));
}

#[test]
fn test_counted_and_looped_instances() {
    let text = "@count(3)\nresource Bucket a {}\n@count(size)\nresource Bucket b {}\
                \nfor i in 0..4 {\n  resource Bucket c {}\n}";
    let doc = document(text);
    let indexed = |name: &str| {
        doc.declarations
            .iter()
            .find(|d| d.name == name)
            .and_then(|d| d.indexed_by.clone())
            .unwrap()
    };
    assert!(indexed("a").is_static());
    assert!(!indexed("b").is_static());
    let c = indexed("c");
    assert_eq!(c.index_type, IndexType::Numeric);
    assert_eq!(c.loop_variable, "i");
}

#[test]
fn test_unparseable_document_is_empty_not_an_error() {
    let text = format!("var x = {}", "[".repeat(500));
    assert!(parse(&text).tree.is_none());
    assert!(document(&text).declarations.is_empty());
}
