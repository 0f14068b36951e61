//! Parsing never fails outright on ordinary broken input.

use kite::parser::{Stmt, parse};
use rstest::rstest;

#[rstest]
#[case("resource Bucket b {")]
#[case("var = 1")]
#[case("schema { string }")]
#[case("fun f(number a, { }")]
#[case("import from")]
#[case("@count(\nresource")]
fn test_partial_input_yields_tree_and_errors(#[case] source: &str) {
    let result = parse(source);
    assert!(result.tree.is_some(), "no tree for {source:?}");
    assert!(!result.errors.is_empty(), "expected syntax errors for {source:?}");
}

#[test]
fn test_valid_input_has_no_errors() {
    let source = "import * from \"common.kite\"\nschema S {\n  string a = \"x\"\n}\
                  \n@count(2)\nresource S r {\n  a = \"y\"\n}";
    let result = parse(source);
    assert!(result.ok(), "{:?}", result.errors);
    assert_eq!(result.tree.unwrap().statements.len(), 3);
}

#[test]
fn test_statements_after_error_are_kept() {
    let result = parse("var = 1\nschema S { string a }");
    let tree = result.tree.unwrap();
    assert!(tree.statements.iter().any(|s| matches!(s, Stmt::Schema(_))));
}

#[test]
fn test_excessive_nesting_gives_up_without_panicking() {
    let source = format!("var x = {}", "[".repeat(1000));
    let result = parse(&source);
    assert!(result.tree.is_none());
    assert!(!result.errors.is_empty());
}
