//! Decorator hygiene: duplicates, unknown names, argument shapes, targets.
//!
//! Duplicates are detected per declaration (case-sensitive); the same
//! decorator on two different declarations is fine.

use rustc_hash::FxHashSet;

use super::{ValidationContext, ValidationPass};
use crate::hir::decorators::{self, DecoratorTarget};
use crate::hir::{Diagnostic, codes, locate};
use crate::parser::{Decorator, Stmt};

pub struct DecoratorPass;

impl ValidationPass for DecoratorPass {
    fn name(&self) -> &'static str {
        "decorators"
    }

    fn check(&self, cx: &ValidationContext<'_>) -> Vec<Diagnostic> {
        let Some(tree) = cx.document.tree() else {
            return Vec::new();
        };
        let mut diagnostics = Vec::new();
        locate::walk_statements(&tree.statements, &mut |stmt| {
            let target = match stmt {
                Stmt::Schema(schema) => {
                    let target = Some(DecoratorTarget::SchemaProperty);
                    for property in &schema.properties {
                        check_list(&property.decorators, target, &mut diagnostics);
                    }
                    Some(DecoratorTarget::Schema)
                }
                Stmt::Resource(_) => Some(DecoratorTarget::Resource),
                Stmt::Component(_) => Some(DecoratorTarget::Component),
                Stmt::Function(_) => Some(DecoratorTarget::Function),
                Stmt::Var(_) => Some(DecoratorTarget::Var),
                Stmt::Input(_) => Some(DecoratorTarget::Input),
                Stmt::Output(_) => Some(DecoratorTarget::Output),
                Stmt::TypeAlias(_) => None,
                // The prefixed statement is visited on its own.
                _ => return,
            };
            check_list(stmt.decorators(), target, &mut diagnostics);
        });
        diagnostics
    }
}

/// Check one declaration's decorators. `target` is `None` for declarations
/// no decorator applies to.
fn check_list(list: &[Decorator], target: Option<DecoratorTarget>, out: &mut Vec<Diagnostic>) {
    let mut seen = FxHashSet::default();
    for decorator in list {
        let name = decorator.name.as_str();
        if !seen.insert(name) {
            out.push(
                Diagnostic::warning(decorator.range, format!("duplicate decorator '@{name}'"))
                    .with_code(codes::DUPLICATE_DECORATOR),
            );
            continue;
        }
        let Some(spec) = decorators::lookup(name) else {
            out.push(
                Diagnostic::warning(decorator.name.range, format!("unknown decorator '@{name}'"))
                    .with_code(codes::UNKNOWN_DECORATOR),
            );
            continue;
        };
        if let Err(message) = decorators::check_arguments(spec, decorator) {
            let range = decorator.args.as_ref().map(|a| a.range).unwrap_or(decorator.range);
            out.push(
                Diagnostic::error(range, message).with_code(codes::INVALID_DECORATOR_ARGUMENT),
            );
        }
        match target {
            Some(target) if spec.applies_to(target) => {}
            Some(target) => out.push(
                Diagnostic::warning(
                    decorator.range,
                    format!("'@{name}' cannot be applied to {}", target.display()),
                )
                .with_code(codes::DECORATOR_TARGET),
            ),
            None => out.push(
                Diagnostic::warning(
                    decorator.range,
                    format!("'@{name}' cannot be applied to type aliases"),
                )
                .with_code(codes::DECORATOR_TARGET),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hir::AnalyzedDocument;

    fn check(text: &str) -> Vec<Diagnostic> {
        let doc = AnalyzedDocument::new("a.kite", text);
        DecoratorPass.check(&ValidationContext::new(&doc))
    }

    fn codes_of(diagnostics: &[Diagnostic]) -> Vec<&str> {
        diagnostics.iter().filter_map(|d| d.code.as_deref()).collect()
    }

    #[test]
    fn test_duplicates_within_one_declaration_only() {
        let text = "@sensitive\n@sensitive\nvar string a = \"x\"\n@sensitive\nvar string b = \"y\"";
        assert_eq!(codes_of(&check(text)), vec![codes::DUPLICATE_DECORATOR]);
    }

    #[test]
    fn test_unknown_decorator() {
        let diagnostics = check("@frobnicate\nresource Bucket b {}");
        assert_eq!(codes_of(&diagnostics), vec![codes::UNKNOWN_DECORATOR]);
        assert!(diagnostics[0].message.contains("@frobnicate"));
    }

    #[test]
    fn test_argument_shape_mismatch_names_expectation() {
        let diagnostics = check("@count(\"three\")\nresource Bucket b {}");
        assert_eq!(codes_of(&diagnostics), vec![codes::INVALID_DECORATOR_ARGUMENT]);
        assert!(diagnostics[0].message.contains("a number"));
    }

    #[test]
    fn test_schema_property_target() {
        let text = "schema S {\n  @cloud\n  string arn\n  @count(2)\n  string name\n}";
        let diagnostics = check(text);
        assert_eq!(codes_of(&diagnostics), vec![codes::DECORATOR_TARGET]);
    }

    #[test]
    fn test_comprehension_prefixed_resource_checked_once() {
        let text = "[for i in 0..2]\n@frobnicate\nresource Bucket b {}";
        assert_eq!(check(text).len(), 1);
    }
}
