//! Imports whose symbols are never referenced.
//!
//! A named import is reported per unused symbol. A wildcard import is
//! reported once, and only when its target can be read and none of the
//! target's exported names occur in the document; an unresolvable wildcard
//! target is assumed used.

use rustc_hash::FxHashSet;
use smol_str::SmolStr;
use text_size::{TextRange, TextSize};

use super::{ValidationContext, ValidationPass};
use crate::hir::{
    AnalyzedDocument, Diagnostic, DiagnosticData, DiagnosticTag, ImportInfo, codes, index_document,
    locate,
};
use crate::parser::parse;
use crate::project::{Workspace, find_import_target};

pub struct UnusedImportsPass;

impl ValidationPass for UnusedImportsPass {
    fn name(&self) -> &'static str {
        "unused-imports"
    }

    fn check(&self, cx: &ValidationContext<'_>) -> Vec<Diagnostic> {
        let document = cx.document;
        let Some(tree) = document.tree() else {
            return Vec::new();
        };
        let mut diagnostics = Vec::new();
        for import in locate::imports(tree, &document.line_index) {
            if import.is_wildcard {
                let Some(exports) = wildcard_exports(document, &import, cx.workspace()) else {
                    continue;
                };
                if !exports.iter().any(|name| is_referenced(document, &import, name)) {
                    diagnostics.push(unused(document, &import, None, import.source_range));
                }
                continue;
            }
            for symbol in &import.symbols {
                if !is_referenced(document, &import, &symbol.text) {
                    diagnostics.push(unused(document, &import, Some(&symbol.text), symbol.range));
                }
            }
        }
        diagnostics
    }
}

/// Whether `name` occurs in code outside the import statement itself.
fn is_referenced(document: &AnalyzedDocument, import: &ImportInfo, name: &str) -> bool {
    document
        .lexical
        .word_occurrences(&document.text, name)
        .into_iter()
        .any(|range| !import.source_range.contains_range(range))
}

/// Exported names of a wildcard import's target, `None` when the target
/// cannot be found or parsed.
fn wildcard_exports(
    document: &AnalyzedDocument,
    import: &ImportInfo,
    workspace: &dyn Workspace,
) -> Option<FxHashSet<SmolStr>> {
    let uri = find_import_target(workspace, &document.uri, &import.path)?;
    let text = workspace.read(&uri)?;
    let tree = parse(&text).tree?;
    let exports = index_document(&uri, &tree)
        .into_iter()
        .filter(|d| d.kind.is_exported() && d.scope.is_none())
        .map(|d| d.name)
        .collect();
    Some(exports)
}

fn unused(
    document: &AnalyzedDocument,
    import: &ImportInfo,
    symbol: Option<&str>,
    range: TextRange,
) -> Diagnostic {
    let message = match symbol {
        Some(symbol) => format!("unused import: '{symbol}' from \"{}\"", import.path),
        None => format!("unused import: nothing from \"{}\" is used", import.path),
    };
    let end = import.source_range.end().checked_sub(TextSize::from(1)).unwrap_or_default();
    let line_end = document.line_index.line_col(end.max(import.source_range.start())).line;
    Diagnostic::hint(range, message)
        .with_code(codes::UNUSED_IMPORT)
        .with_tag(DiagnosticTag::Unnecessary)
        .with_data(DiagnosticData::UnusedImport {
            import_path: import.path.to_string(),
            symbol: symbol.map(str::to_string),
            is_wildcard: import.is_wildcard,
            line_start: import.line as u32,
            line_end: line_end as u32,
        })
}
