//! Unused variables, parameters, loop variables and component outputs.
//!
//! A declaration is used when its name occurs in code within its scope,
//! outside its own name, and resolves back to it from that position (so a
//! shadowed declaration does not borrow the uses of the one shadowing it).
//! Interpolation holes count as code; comments and plain string text do not.
//!
//! Component inputs are never reported: they are the component's public API.
//! A component output also counts as used when some instance of the
//! component reads it (`instance.output`) in any workspace document.

use text_size::{TextRange, TextSize};

use super::cross_file::CrossFile;
use super::{ValidationContext, ValidationPass};
use crate::hir::{
    AnalyzedDocument, Declaration, DeclarationKind, Diagnostic, DiagnosticCollector, InstanceKind,
    Severity, codes, locate, select_declaration,
};

pub struct UnusedSymbolsPass;

impl ValidationPass for UnusedSymbolsPass {
    fn name(&self) -> &'static str {
        "unused-symbols"
    }

    fn check(&self, cx: &ValidationContext<'_>) -> Vec<Diagnostic> {
        let document = cx.document;
        let lookup = CrossFile::new(cx);
        let mut collector = DiagnosticCollector::new();
        for decl in &document.declarations {
            let (severity, code) = match decl.kind {
                DeclarationKind::Variable | DeclarationKind::ForVar => {
                    (Severity::Warning, codes::UNUSED_SYMBOL)
                }
                DeclarationKind::Output if decl.is_component_member() => {
                    (Severity::Hint, codes::UNUSED_OUTPUT)
                }
                _ => continue,
            };
            if decl.name.is_empty() || decl.name.starts_with('_') {
                continue;
            }
            if uses(document, decl).next().is_some() {
                continue;
            }
            if decl.kind == DeclarationKind::Output && read_through_instance(&lookup, decl) {
                continue;
            }
            collector.unused_symbol(decl, severity, code);
        }
        collector.into_vec()
    }
}

/// Occurrences of `decl`'s name that resolve to `decl`.
pub(crate) fn uses<'a>(
    document: &'a AnalyzedDocument,
    decl: &'a Declaration,
) -> impl Iterator<Item = TextRange> + 'a {
    let within = decl
        .scope
        .unwrap_or_else(|| TextRange::up_to(TextSize::of(&*document.text)));
    document
        .lexical
        .word_occurrences_in(&document.text, &decl.name, within)
        .into_iter()
        .filter(move |range| {
            range.start() != decl.name_range.start()
                && !(decl.kind == DeclarationKind::Variable
                    && decl.source_range.contains_range(*range))
                && !document.is_member_position(*range)
                && select_declaration(&decl.name, Some(range.start()), &document.declarations)
                    .is_some_and(|found| found.name_range == decl.name_range)
        })
}

/// Whether some instance of the output's component reads it as
/// `instance.output`.
fn read_through_instance(lookup: &CrossFile<'_>, decl: &Declaration) -> bool {
    let Some(component) = decl.container.as_deref() else {
        return false;
    };
    lookup
        .documents()
        .any(|doc| reads_member(doc, component, &decl.name))
}

fn reads_member(doc: &AnalyzedDocument, component: &str, member: &str) -> bool {
    let Some(tree) = doc.tree() else {
        return false;
    };
    let instances: Vec<_> = locate::instances_of(tree, component)
        .into_iter()
        .filter(|i| i.kind == InstanceKind::Component)
        .collect();
    if instances.is_empty() {
        return false;
    }
    doc.lexical.word_occurrences(&doc.text, member).into_iter().any(|range| {
        doc.qualifier_before(range.start())
            .is_some_and(|(_, object)| instances.iter().any(|i| i.name.as_str() == object))
    })
}
