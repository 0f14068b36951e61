//! Go-to-definition tests for the IDE layer.

use crate::helpers::analysis_helpers::{host_with, offset_of};
use crate::helpers::source_fixtures::*;

#[test]
fn test_goto_schema_in_other_document() {
    let user = "resource Config c {\n  host = \"h\"\n}";
    let host = host_with(&[("config.kite", CONFIG_SCHEMA), ("main.kite", user)]);
    let target = host
        .analysis()
        .goto_definition("main.kite", offset_of(user, "Config", 0))
        .unwrap();
    assert_eq!(target.uri.as_ref(), "config.kite");
    assert_eq!(&CONFIG_SCHEMA[target.range], "Config");
}

#[test]
fn test_goto_property_key_lands_on_schema_property() {
    let user = "resource Config c {\n  host = \"h\"\n}";
    let host = host_with(&[("config.kite", CONFIG_SCHEMA), ("main.kite", user)]);
    let target = host
        .analysis()
        .goto_definition("main.kite", offset_of(user, "host", 0))
        .unwrap();
    assert_eq!(target.uri.as_ref(), "config.kite");
    assert_eq!(target.range.start(), offset_of(CONFIG_SCHEMA, "host", 0));
}

#[test]
fn test_goto_output_through_instance() {
    let text = format!("{WEB_COMPONENT}component WebServer api {{}}\nvar url = api.endpoint\n");
    let host = host_with(&[("main.kite", text.as_str())]);
    let target = host
        .analysis()
        .goto_definition("main.kite", offset_of(&text, "endpoint", 1))
        .unwrap();
    assert_eq!(target.range.start(), offset_of(&text, "endpoint", 0));
}

#[test]
fn test_goto_import_path_opens_document() {
    let user = "import * from \"./lib/net.kite\"";
    let host = host_with(&[
        ("app/lib/net.kite", "schema Vpc {\n  string cidr\n}"),
        ("app/main.kite", user),
    ]);
    let target = host
        .analysis()
        .goto_definition("app/main.kite", offset_of(user, "net", 0))
        .unwrap();
    assert_eq!(target.uri.as_ref(), "app/lib/net.kite");
}

#[test]
fn test_goto_unknown_is_none() {
    let text = "var a = missing";
    let host = host_with(&[("main.kite", text)]);
    assert!(host.analysis().goto_definition("main.kite", offset_of(text, "missing", 0)).is_none());
}
