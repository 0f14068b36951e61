//! Find references and rename tests for the IDE layer.

use kite::TextSize;
use kite::ide::RenameError;

use crate::helpers::analysis_helpers::{apply_edits, host_with, offset_of};
use crate::helpers::source_fixtures::*;

// =============================================================================
// FIND REFERENCES
// =============================================================================

#[test]
fn test_local_variable_references_stay_in_function() {
    let host = host_with(&[("main.kite", SHADOWING)]);
    let analysis = host.analysis();
    let refs = analysis.find_references("main.kite", offset_of(SHADOWING, "x", 2));
    let starts: Vec<_> = refs.iter().map(|r| r.range.start()).collect();
    assert_eq!(starts, vec![offset_of(SHADOWING, "x", 1), offset_of(SHADOWING, "x", 2)]);
}

#[test]
fn test_schema_references_span_documents() {
    let host = host_with(&[
        ("config.kite", CONFIG_SCHEMA),
        ("a.kite", "resource Config one {}"),
        ("b.kite", "resource Config two {}\n// Config"),
    ]);
    let analysis = host.analysis();
    let refs = analysis.find_references("config.kite", offset_of(CONFIG_SCHEMA, "Config", 0));
    let uris: Vec<&str> = refs.iter().map(|r| r.uri.as_ref()).collect();
    assert_eq!(uris, vec!["config.kite", "a.kite", "b.kite"]);
}

#[test]
fn test_definition_listed_once() {
    let text = "var x = 1\nvar y = x + x";
    let host = host_with(&[("main.kite", text)]);
    let refs = host.analysis().find_references("main.kite", offset_of(text, "x", 0));
    assert_eq!(refs.len(), 3);
    assert_eq!(refs[0].range.start(), offset_of(text, "x", 0));
}

#[test]
fn test_component_input_references() {
    let text = format!(
        "{WEB_COMPONENT}component WebServer api {{\n  name = \"api\"\n}}\nvar n = api.name\n"
    );
    let host = host_with(&[("main.kite", text.as_str())]);
    let refs = host.analysis().find_references("main.kite", offset_of(&text, "name", 0));
    let found: Vec<&str> = refs.iter().map(|r| &text[r.range]).collect();
    // definition, interpolation hole, property key, dotted access
    assert_eq!(found, vec!["name"; 4]);
}

#[test]
fn test_branch_local_variables_are_distinct() {
    let text = BRANCHES;
    let host = host_with(&[("main.kite", text)]);
    let refs = host.analysis().find_references("main.kite", offset_of(text, "t = 2", 0));
    let starts: Vec<_> = refs.iter().map(|r| r.range.start()).collect();
    assert_eq!(starts, vec![offset_of(text, "t = 2", 0), offset_of(text, "t)", 1)]);
}

#[test]
fn test_cursor_in_comment_finds_nothing() {
    let text = "var x = 1\n// x\nvar y = x";
    let host = host_with(&[("main.kite", text)]);
    assert!(host.analysis().find_references("main.kite", offset_of(text, "x", 1)).is_empty());
}

// =============================================================================
// RENAME
// =============================================================================

#[test]
fn test_rename_across_documents() {
    let schema = "schema Bucket {\n  string name\n}";
    let user = "import Bucket from \"lib.kite\"\nresource Bucket logs {\n  name = \"l\"\n}";
    let host = host_with(&[("lib.kite", schema), ("main.kite", user)]);
    let edits = host
        .analysis()
        .rename("lib.kite", offset_of(schema, "Bucket", 0), "Store")
        .unwrap();
    assert_eq!(apply_edits(schema, &edits["lib.kite"]), "schema Store {\n  string name\n}");
    assert_eq!(
        apply_edits(user, &edits["main.kite"]),
        "import Store from \"lib.kite\"\nresource Store logs {\n  name = \"l\"\n}"
    );
}

#[test]
fn test_rename_local_leaves_shadowed_names() {
    let host = host_with(&[("main.kite", SHADOWING)]);
    let edits = host
        .analysis()
        .rename("main.kite", offset_of(SHADOWING, "x", 0), "outer")
        .unwrap();
    let renamed = apply_edits(SHADOWING, &edits["main.kite"]);
    let expected = SHADOWING
        .replacen("var x = 1", "var outer = 1", 1)
        .replace("var z = x", "var z = outer");
    assert_eq!(renamed, expected);
}

#[test]
fn test_rename_in_else_branch_covers_its_use() {
    let host = host_with(&[("main.kite", BRANCHES)]);
    let edits = host
        .analysis()
        .rename("main.kite", offset_of(BRANCHES, "t = 2", 0), "u")
        .unwrap();
    let renamed = apply_edits(BRANCHES, &edits["main.kite"]);
    let expected = BRANCHES.replacen("var t = 2\n    println(t)", "var u = 2\n    println(u)", 1);
    assert_eq!(renamed, expected);
}

#[test]
fn test_rename_rejections() {
    let host = host_with(&[("main.kite", "var x = 1\nvar y = x")]);
    let analysis = host.analysis();
    let at = offset_of("var x = 1", "x", 0);
    assert_eq!(
        analysis.rename("main.kite", at, "while"),
        Err(RenameError::Keyword("while".into()))
    );
    assert!(matches!(
        analysis.rename("main.kite", at, "9lives"),
        Err(RenameError::InvalidIdentifier(_))
    ));
    assert_eq!(analysis.rename("missing.kite", at, "ok"), Err(RenameError::NoSymbol));
    // `var` keyword under the cursor
    assert_eq!(analysis.rename("main.kite", TextSize::from(2), "ok"), Err(RenameError::NoSymbol));
}
