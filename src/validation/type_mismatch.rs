//! Literal values checked against declared types.
//!
//! Only literals have a known type; identifiers, calls and operators are
//! never flagged. Declared types outside the builtin set (schema names,
//! type aliases) are not checked either.

use super::cross_file::CrossFile;
use super::{ValidationContext, ValidationPass};
use crate::hir::{Diagnostic, DiagnosticCollector, InstanceKind, OwnerKind, locate};
use crate::parser::{Expr, Stmt, UnaryOp};

const BUILTIN_TYPES: &[&str] = &["string", "number", "boolean", "any", "object", "null"];

/// Type of a literal inferred from its shape, `None` for anything else.
pub fn infer_literal_type(expr: &Expr) -> Option<&'static str> {
    match expr.unparenthesized() {
        Expr::String(_) => Some("string"),
        Expr::Number { .. } => Some("number"),
        Expr::Unary {
            op: UnaryOp::Neg,
            operand,
            ..
        } if matches!(operand.unparenthesized(), Expr::Number { .. }) => Some("number"),
        Expr::Bool { .. } => Some("boolean"),
        Expr::Null(_) => Some("null"),
        Expr::Array { .. } | Expr::Comprehension { .. } => Some("array"),
        Expr::Object { .. } => Some("object"),
        _ => None,
    }
}

/// Whether a value of type `found` may be assigned to `declared`.
///
/// Names are compared case-insensitively; `null` fits everywhere and
/// non-builtin declared types accept anything.
pub fn is_compatible(declared: &str, found: &str) -> bool {
    let declared = declared.trim().to_ascii_lowercase();
    let found = found.to_ascii_lowercase();
    if found == "null" || declared == "any" {
        return true;
    }
    if declared.ends_with("[]") {
        return found == "array";
    }
    if !BUILTIN_TYPES.contains(&declared.as_str()) {
        return true;
    }
    declared == found
}

pub struct TypeMismatchPass;

impl ValidationPass for TypeMismatchPass {
    fn name(&self) -> &'static str {
        "type-mismatch"
    }

    fn check(&self, cx: &ValidationContext<'_>) -> Vec<Diagnostic> {
        let Some(tree) = cx.document.tree() else {
            return Vec::new();
        };
        let mut collector = DiagnosticCollector::new();

        locate::walk_statements(&tree.statements, &mut |stmt| match stmt {
            Stmt::Var(var) => {
                if let (Some(ty), Some(value)) = (&var.ty, &var.value) {
                    check_value(&mut collector, &ty.display(), value);
                }
            }
            Stmt::Input(member) | Stmt::Output(member) => {
                if let (Some(ty), Some(value)) = (&member.ty, &member.value) {
                    check_value(&mut collector, &ty.display(), value);
                }
            }
            Stmt::Schema(schema) => {
                for property in &schema.properties {
                    if let Some(default) = &property.default {
                        check_value(&mut collector, &property.ty.display(), default);
                    }
                }
            }
            _ => {}
        });

        let mut lookup = CrossFile::new(cx);
        for instance in locate::instances(tree) {
            let properties = instance.body.properties();
            if properties.is_empty() {
                continue;
            }
            let owner_kind = match instance.kind {
                InstanceKind::Resource => OwnerKind::Schema,
                InstanceKind::Component => OwnerKind::Component,
            };
            let Some(members) = lookup.members(owner_kind, instance.type_name()) else {
                continue;
            };
            for property in properties {
                if let Some(member) = members.iter().find(|m| m.name == property.key.text) {
                    check_value(&mut collector, &member.type_name, &property.value);
                }
            }
        }
        collector.into_vec()
    }
}

fn check_value(collector: &mut DiagnosticCollector, declared: &str, value: &Expr) {
    let Some(found) = infer_literal_type(value) else {
        return;
    };
    if !is_compatible(declared, found) {
        collector.type_mismatch(value.range(), declared, found);
    }
}
