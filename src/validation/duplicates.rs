//! Names declared twice in the same scope.
//!
//! Type-like declarations (schemas, component definitions, type aliases)
//! and value-like declarations (resources, component instances, functions,
//! top-level variables, inputs, outputs) live in separate namespaces. Loop
//! variables, parameters, imports and scoped variables are not checked.
//! Instances multiplied by `@count` or a loop are compared by base name
//! whether or not their multiplicity is known.

use rustc_hash::FxHashMap;
use smol_str::SmolStr;
use text_size::TextRange;

use super::{ValidationContext, ValidationPass};
use crate::hir::{Declaration, DeclarationKind, Diagnostic, DiagnosticCollector};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Namespace {
    Type,
    Value,
}

fn namespace(decl: &Declaration) -> Option<Namespace> {
    match decl.kind {
        DeclarationKind::Schema | DeclarationKind::Type => Some(Namespace::Type),
        DeclarationKind::Component if decl.component_type.is_none() => Some(Namespace::Type),
        DeclarationKind::Component
        | DeclarationKind::Resource
        | DeclarationKind::Function
        | DeclarationKind::Input
        | DeclarationKind::Output => Some(Namespace::Value),
        DeclarationKind::Variable if decl.scope.is_none() => Some(Namespace::Value),
        _ => None,
    }
}

pub struct DuplicateDeclarationPass;

impl ValidationPass for DuplicateDeclarationPass {
    fn name(&self) -> &'static str {
        "duplicates"
    }

    fn check(&self, cx: &ValidationContext<'_>) -> Vec<Diagnostic> {
        let mut collector = DiagnosticCollector::new();
        let mut first: FxHashMap<(Namespace, SmolStr, Option<TextRange>), &Declaration> =
            FxHashMap::default();
        for decl in &cx.document.declarations {
            if decl.name.is_empty() {
                continue;
            }
            let Some(ns) = namespace(decl) else {
                continue;
            };
            match first.get(&(ns, decl.name.clone(), decl.scope)) {
                Some(existing) => collector.duplicate_definition(decl, existing),
                None => {
                    first.insert((ns, decl.name.clone(), decl.scope), decl);
                }
            }
        }
        collector.into_vec()
    }
}
