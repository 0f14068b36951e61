//! Unused imports and wildcard opacity.

use kite::hir::{AnalyzedDocument, DeclarationKind, DiagnosticData, Severity, codes};
use kite::ide::{code_actions, find_references};
use kite::project::MemoryWorkspace;

use crate::helpers::analysis_helpers::{diagnostics_in, offset_of, with_code, workspace_with};

#[test]
fn test_two_unused_named_imports_offer_remove_all() {
    let text = "import Bucket from \"aws.kite\"\nimport Queue from \"aws.kite\"\
                \nvar x = 1\noutput any y = x";
    let doc = AnalyzedDocument::new("main.kite", text);
    let diagnostics = diagnostics_in(&MemoryWorkspace::new(), text);
    let unused = with_code(&diagnostics, codes::UNUSED_IMPORT);
    assert!(unused.len() >= 2);
    assert!(unused.iter().all(|d| d.severity == Severity::Hint));

    let actions = code_actions(&doc, &diagnostics);
    assert!(actions.iter().any(|a| a.title == "Remove all unused imports"));
}

#[test]
fn test_payload_carries_line_span() {
    let text = "var x = 1\nimport Bucket,\n  Queue from \"aws.kite\"\noutput any y = x";
    let diagnostics = diagnostics_in(&MemoryWorkspace::new(), text);
    let unused = with_code(&diagnostics, codes::UNUSED_IMPORT);
    assert_eq!(unused.len(), 2);
    let Some(DiagnosticData::UnusedImport {
        line_start,
        line_end,
        is_wildcard,
        ..
    }) = &unused[0].data
    else {
        panic!("missing payload");
    };
    assert_eq!((*line_start, *line_end, *is_wildcard), (1, 2, false));
}

#[test]
fn test_wildcard_used_through_an_export() {
    let ws = workspace_with(&[("common.kite", "schema Tag {\n  string key\n}")]);
    let text = "import * from \"common.kite\"\nresource Tag t {\n  key = \"k\"\n}";
    assert!(with_code(&diagnostics_in(&ws, text), codes::UNUSED_IMPORT).is_empty());

    let unused = "import * from \"common.kite\"\nvar x = 1\noutput any y = x";
    assert_eq!(with_code(&diagnostics_in(&ws, unused), codes::UNUSED_IMPORT).len(), 1);
}

#[test]
fn test_unresolvable_wildcard_is_assumed_used() {
    let text = "import * from \"missing.kite\"";
    let diagnostics = diagnostics_in(&MemoryWorkspace::new(), text);
    assert!(with_code(&diagnostics, codes::UNUSED_IMPORT).is_empty());
}

#[test]
fn test_wildcard_contributes_no_declarations_but_is_searchable() {
    let ws = workspace_with(&[("common.kite", "schema Tag {\n  string key\n}")]);
    let text = "import * from \"common.kite\"\nresource Tag t {\n  key = \"k\"\n}";
    let doc = AnalyzedDocument::new("main.kite", text);
    assert!(doc.declarations.iter().all(|d| d.kind != DeclarationKind::Import));

    let refs = find_references("key", offset_of(text, "key", 0), &doc, &ws);
    let uris: Vec<&str> = refs.iter().map(|r| r.uri.as_ref()).collect();
    assert_eq!(uris, vec!["common.kite", "main.kite"]);
}
