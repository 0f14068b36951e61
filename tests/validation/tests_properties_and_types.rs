//! Missing properties and type mismatches through the full pipeline.

use kite::hir::{Severity, codes};
use kite::project::MemoryWorkspace;
use rstest::rstest;

use crate::helpers::analysis_helpers::{diagnostics_in, with_code, workspace_with};

const SCHEMA: &str = "schema Config {\n  string host\n  number port = 8080\n}\n";

#[test]
fn test_missing_property_names_only_required_ones() {
    let text = format!("{SCHEMA}resource Config c {{}}");
    let diagnostics = diagnostics_in(&MemoryWorkspace::new(), &text);
    let missing = with_code(&diagnostics, codes::MISSING_PROPERTY);
    assert_eq!(missing.len(), 1);
    assert!(missing[0].message.contains("'host'"));
    assert!(!missing[0].message.contains("'port'"));
}

#[test]
fn test_assigning_the_property_clears_it() {
    let text = format!("{SCHEMA}resource Config c {{\n  host = \"x\"\n}}");
    let diagnostics = diagnostics_in(&MemoryWorkspace::new(), &text);
    assert!(with_code(&diagnostics, codes::MISSING_PROPERTY).is_empty());
}

#[test]
fn test_schema_from_another_document() {
    let ws = workspace_with(&[("config.kite", SCHEMA)]);
    let diagnostics = diagnostics_in(&ws, "resource Config c {}");
    assert_eq!(with_code(&diagnostics, codes::MISSING_PROPERTY).len(), 1);
}

#[test]
fn test_unknown_schema_is_skipped() {
    let diagnostics = diagnostics_in(&MemoryWorkspace::new(), "resource Nowhere c {}");
    assert!(with_code(&diagnostics, codes::MISSING_PROPERTY).is_empty());
}

#[rstest]
#[case("var string name = 123", 1)]
#[case("var string name = \"ok\"", 0)]
#[case("var number n = true", 1)]
#[case("var string[] names = \"one\"", 1)]
#[case("var string[] names = [\"one\"]", 0)]
#[case("var any v = 1", 0)]
#[case("var string s = null", 0)]
#[case("var string s = other", 0)]
fn test_type_mismatch_round_trip(#[case] declaration: &str, #[case] expected: usize) {
    let name = declaration.split_whitespace().nth(2).unwrap();
    let text = format!("{declaration}\noutput any used = {name}");
    let diagnostics = diagnostics_in(&MemoryWorkspace::new(), &text);
    let mismatches = with_code(&diagnostics, codes::TYPE_MISMATCH);
    assert_eq!(mismatches.len(), expected, "{declaration}: {mismatches:?}");
    for mismatch in mismatches {
        assert_eq!(mismatch.severity, Severity::Error);
    }
}

#[test]
fn test_type_mismatch_message_names_both_types() {
    let diagnostics = diagnostics_in(&MemoryWorkspace::new(), "var string name = 123");
    let mismatch = with_code(&diagnostics, codes::TYPE_MISMATCH);
    assert_eq!(mismatch.len(), 1);
    assert!(mismatch[0].message.contains("string"));
    assert!(mismatch[0].message.contains("number"));
}

#[test]
fn test_instance_property_checked_against_schema() {
    let text = format!("{SCHEMA}resource Config c {{\n  host = 42\n}}");
    let diagnostics = diagnostics_in(&MemoryWorkspace::new(), &text);
    assert_eq!(with_code(&diagnostics, codes::TYPE_MISMATCH).len(), 1);
}
