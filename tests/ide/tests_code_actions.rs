//! Quick fixes through `AnalysisHost`.

use kite::hir::codes;

use crate::helpers::analysis_helpers::{apply_edits, host_with};

const SCHEMA: &str = "schema Config {\n  string host\n  number port = 8080\n  string[] zones\n}\n";

#[test]
fn test_add_missing_property_fix_clears_diagnostic() {
    let user = "resource Config c {\n  zones = []\n}";
    let mut host = host_with(&[("config.kite", SCHEMA), ("main.kite", user)]);
    let diagnostics = host.diagnostics("main.kite").to_vec();
    let actions = host.analysis().code_actions("main.kite", &diagnostics);
    let fix = actions.iter().find(|a| a.title == "Add missing property 'host'").unwrap();
    let fixed = apply_edits(user, &fix.edits);
    assert_eq!(fixed, "resource Config c {\n  host = \"\"\n  zones = []\n}");

    host.set_document("main.kite", fixed);
    assert!(
        host.diagnostics("main.kite")
            .iter()
            .all(|d| !d.has_code(codes::MISSING_PROPERTY))
    );
}

#[test]
fn test_add_all_missing_properties_uses_type_defaults() {
    let user = "  resource Config c {}";
    let host = host_with(&[("config.kite", SCHEMA), ("main.kite", user)]);
    let diagnostics = host.diagnostics("main.kite").to_vec();
    let actions = host.analysis().code_actions("main.kite", &diagnostics);
    let fix = actions.iter().find(|a| a.title == "Add all missing properties").unwrap();
    assert_eq!(
        apply_edits(user, &fix.edits),
        "  resource Config c {\n    host = \"\"\n    zones = []\n  }"
    );
}

#[test]
fn test_remove_all_unused_imports_leaves_used_symbols() {
    let user = "import Config, Queue from \"config.kite\"\nimport * from \"config.kite\"\
                \nimport Topic from \"sns.kite\"\nresource Config c {\
                \n  host = \"h\"\n  zones = []\n}";
    let host = host_with(&[("config.kite", SCHEMA), ("main.kite", user)]);
    let diagnostics = host.diagnostics("main.kite").to_vec();
    let actions = host.analysis().code_actions("main.kite", &diagnostics);
    let all = actions.iter().find(|a| a.title == "Remove all unused imports").unwrap();
    assert_eq!(all.diagnostics.len(), 2);
    assert_eq!(
        apply_edits(user, &all.edits),
        "import Config from \"config.kite\"\nimport * from \"config.kite\"\
         \nresource Config c {\n  host = \"h\"\n  zones = []\n}"
    );
}

#[test]
fn test_diagnostics_without_payload_have_no_actions() {
    let user = "var x = 1";
    let host = host_with(&[("main.kite", user)]);
    let diagnostics = host.diagnostics("main.kite").to_vec();
    assert!(!diagnostics.is_empty());
    assert!(host.analysis().code_actions("main.kite", &diagnostics).is_empty());
}
