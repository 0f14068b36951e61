//! Go-to-definition.

use text_size::{TextRange, TextSize};

use crate::base::Location;
use crate::hir::{AnalyzedDocument, resolve};
use crate::parser::Stmt;
use crate::project::{Workspace, find_import_target};

/// Definition of the symbol under the cursor.
///
/// A cursor inside an import path jumps to the start of the imported
/// document.
pub fn goto_definition(
    offset: TextSize,
    document: &AnalyzedDocument,
    workspace: &dyn Workspace,
) -> Option<Location> {
    if let Some(target) = import_path_at(offset, document, workspace) {
        return Some(target);
    }
    let (_, word) = document.word_at(offset)?;
    if !document.lexical.is_code(offset) {
        return None;
    }
    let resolved = resolve(word, Some(offset), document, workspace)?;
    tracing::debug!(word, "goto definition");
    resolved.definition()
}

fn import_path_at(
    offset: TextSize,
    document: &AnalyzedDocument,
    workspace: &dyn Workspace,
) -> Option<Location> {
    let tree = document.tree()?;
    let path = tree.statements.iter().find_map(|stmt| match stmt {
        Stmt::Import(import) => import.path.as_ref().filter(|p| p.range.contains_inclusive(offset)),
        _ => None,
    })?;
    let uri = find_import_target(workspace, &document.uri, path.value())?;
    Some(Location::new(uri, TextRange::empty(TextSize::from(0))))
}
