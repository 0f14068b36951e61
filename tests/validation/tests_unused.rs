//! Unused variables, loop variables and component outputs.

use kite::hir::{Severity, codes};
use kite::project::MemoryWorkspace;

use crate::helpers::analysis_helpers::{diagnostics_in, offset_of, with_code};
use crate::helpers::source_fixtures::BRANCHES;

#[test]
fn test_shadowing_reports_exactly_the_unused_one() {
    let text = "fun f() {\n  var x = 1\n}\nfun g() {\n  var x = 2\n  println(x)\n}";
    let diagnostics = diagnostics_in(&MemoryWorkspace::new(), text);
    let unused = with_code(&diagnostics, codes::UNUSED_SYMBOL);
    assert_eq!(unused.len(), 1);
    assert_eq!(unused[0].range.start(), offset_of(text, "x", 0));
    assert_eq!(unused[0].severity, Severity::Warning);
}

#[test]
fn test_underscore_names_are_exempt() {
    let diagnostics = diagnostics_in(&MemoryWorkspace::new(), "var _scratch = 1");
    assert!(with_code(&diagnostics, codes::UNUSED_SYMBOL).is_empty());
}

#[test]
fn test_interpolation_counts_as_use() {
    let text = "var string region = \"eu\"\nvar string bucket = \"logs-${region}\"\
                \noutput string name = bucket";
    let diagnostics = diagnostics_in(&MemoryWorkspace::new(), text);
    assert!(with_code(&diagnostics, codes::UNUSED_SYMBOL).is_empty());
}

#[test]
fn test_component_output_is_a_hint_and_input_is_exempt() {
    let text = "component Web {\n  input string name\n  output string url = \"u\"\n}";
    let diagnostics = diagnostics_in(&MemoryWorkspace::new(), text);
    let outputs = with_code(&diagnostics, codes::UNUSED_OUTPUT);
    assert_eq!(outputs.len(), 1);
    assert_eq!(outputs[0].severity, Severity::Hint);
    assert!(with_code(&diagnostics, codes::UNUSED_SYMBOL).is_empty());
}

#[test]
fn test_output_read_through_instance_is_used() {
    let text = "component Web {\n  output string url = \"u\"\n}\ncomponent Web site {}\
                \noutput string link = site.url";
    let diagnostics = diagnostics_in(&MemoryWorkspace::new(), text);
    assert!(with_code(&diagnostics, codes::UNUSED_OUTPUT).is_empty(), "{diagnostics:?}");
}

#[test]
fn test_same_name_in_sibling_branches_are_both_used() {
    let diagnostics = diagnostics_in(&MemoryWorkspace::new(), BRANCHES);
    assert!(with_code(&diagnostics, codes::UNUSED_SYMBOL).is_empty(), "{diagnostics:?}");
}

#[test]
fn test_redeclaration_inside_loop_body_is_used() {
    let text = "fun f() {\n  var x = 1\n  for i in 0..2 {\n    var x = 2\n    println(x, i)\
                \n  }\n  return x\n}";
    let diagnostics = diagnostics_in(&MemoryWorkspace::new(), text);
    assert!(with_code(&diagnostics, codes::UNUSED_SYMBOL).is_empty(), "{diagnostics:?}");
}

#[test]
fn test_top_level_variables_are_checked() {
    let diagnostics = diagnostics_in(&MemoryWorkspace::new(), "var string name = \"n\"");
    let unused = with_code(&diagnostics, codes::UNUSED_SYMBOL);
    assert_eq!(unused.len(), 1);
    assert_eq!(unused[0].severity, Severity::Warning);
}
