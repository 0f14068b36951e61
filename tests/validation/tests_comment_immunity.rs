//! Nothing inside a comment produces a diagnostic.

use kite::project::MemoryWorkspace;
use rstest::rstest;

use crate::helpers::analysis_helpers::diagnostics_in;
use crate::helpers::source_fixtures::COMMENTED_OUT;

#[test]
fn test_commented_code_is_inert() {
    let diagnostics = diagnostics_in(&MemoryWorkspace::new(), COMMENTED_OUT);
    assert!(diagnostics.is_empty(), "{diagnostics:?}");
}

#[rstest]
#[case("// if a = 1 {\n")]
#[case("/* while true { } */")]
#[case("// var x\n")]
#[case("/* if 1 == \"1\" { } */")]
#[case("// @frobnicate\n")]
#[case("// var string s = \"open\n")]
fn test_lint_triggers_in_comments(#[case] text: &str) {
    let diagnostics = diagnostics_in(&MemoryWorkspace::new(), text);
    assert!(diagnostics.is_empty(), "{text:?}: {diagnostics:?}");
}
