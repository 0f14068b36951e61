//! Quick fixes driven by diagnostic payloads.
//!
//! Only diagnostics carrying a [`DiagnosticData`] payload produce actions:
//! unused imports (remove the symbol or the import lines) and missing
//! required properties (insert `name = <default>` into the instance body).

use indexmap::IndexMap;
use text_size::{TextRange, TextSize};

use super::references::TextEdit;
use crate::hir::{AnalyzedDocument, Diagnostic, DiagnosticData};
use crate::parser::{ImportItems, ImportStmt, Name, Stmt};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeActionKind {
    QuickFix,
}

impl CodeActionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            CodeActionKind::QuickFix => "quickfix",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeAction {
    pub title: String,
    pub kind: CodeActionKind,
    /// Non-overlapping edits to the document the diagnostics belong to.
    pub edits: Vec<TextEdit>,
    pub diagnostics: Vec<Diagnostic>,
    pub is_preferred: bool,
}

impl CodeAction {
    fn quick_fix(
        title: impl Into<String>,
        edits: Vec<TextEdit>,
        diagnostics: Vec<Diagnostic>,
    ) -> Self {
        Self {
            title: title.into(),
            kind: CodeActionKind::QuickFix,
            edits,
            diagnostics,
            is_preferred: false,
        }
    }

    fn preferred(mut self) -> Self {
        self.is_preferred = true;
        self
    }
}

/// Quick fixes for `diagnostics`, all of which belong to `document`.
pub fn code_actions(document: &AnalyzedDocument, diagnostics: &[Diagnostic]) -> Vec<CodeAction> {
    let mut actions = Vec::new();
    let mut unused_imports = Vec::new();
    let mut missing: IndexMap<u32, Vec<&Diagnostic>> = IndexMap::new();
    for diagnostic in diagnostics {
        match &diagnostic.data {
            Some(DiagnosticData::UnusedImport { .. }) => unused_imports.push(diagnostic),
            Some(DiagnosticData::MissingProperty { brace_offset, .. }) => {
                missing.entry(*brace_offset).or_default().push(diagnostic)
            }
            None => {}
        }
    }

    for diagnostic in &unused_imports {
        if let Some(action) = remove_unused_import(document, diagnostic) {
            actions.push(action);
        }
    }
    if unused_imports.len() >= 2 {
        actions.extend(remove_all_unused_imports(document, &unused_imports));
    }

    for (brace_offset, group) in &missing {
        for diagnostic in group {
            let single = std::slice::from_ref(diagnostic);
            if let Some(action) = add_missing_properties(document, *brace_offset, single) {
                actions.push(action.preferred());
            }
        }
        if group.len() >= 2 {
            actions.extend(add_missing_properties(document, *brace_offset, group));
        }
    }
    tracing::debug!(uri = %document.uri, count = actions.len(), "code actions");
    actions
}

// ============================================================================
// UNUSED IMPORTS
// ============================================================================

struct UnusedImport<'a> {
    symbol: Option<&'a str>,
    line_start: u32,
    line_end: u32,
}

fn unused_import(diagnostic: &Diagnostic) -> Option<UnusedImport<'_>> {
    match &diagnostic.data {
        Some(DiagnosticData::UnusedImport {
            symbol,
            line_start,
            line_end,
            ..
        }) => Some(UnusedImport {
            symbol: symbol.as_deref(),
            line_start: *line_start,
            line_end: *line_end,
        }),
        _ => None,
    }
}

fn remove_unused_import(
    document: &AnalyzedDocument,
    diagnostic: &Diagnostic,
) -> Option<CodeAction> {
    let data = unused_import(diagnostic)?;
    let names = find_import(document, data.line_start).and_then(named_items);
    let edit = match (data.symbol, names) {
        (Some(_), Some(names)) if names.len() > 1 => {
            let idx = names.iter().position(|n| n.range == diagnostic.range)?;
            let range = match names.get(idx + 1) {
                Some(next) => TextRange::new(names[idx].range.start(), next.range.start()),
                None => TextRange::new(names[idx - 1].range.end(), names[idx].range.end()),
            };
            TextEdit::delete(range)
        }
        _ => delete_lines(document, data.line_start, data.line_end)?,
    };
    let title = match data.symbol {
        Some(symbol) => format!("Remove unused import '{symbol}'"),
        None => "Remove unused import".to_string(),
    };
    Some(CodeAction::quick_fix(title, vec![edit], vec![diagnostic.clone()]).preferred())
}

/// One edit per import statement, so the edits never overlap.
fn remove_all_unused_imports(
    document: &AnalyzedDocument,
    diagnostics: &[&Diagnostic],
) -> Option<CodeAction> {
    let mut per_import: IndexMap<u32, Vec<&Diagnostic>> = IndexMap::new();
    for diagnostic in diagnostics {
        if let Some(data) = unused_import(diagnostic) {
            per_import.entry(data.line_start).or_default().push(diagnostic);
        }
    }
    let mut edits = Vec::new();
    for (line_start, group) in &per_import {
        let line_end = group
            .iter()
            .filter_map(|d| unused_import(d))
            .map(|d| d.line_end)
            .max()
            .unwrap_or(*line_start);
        let names = find_import(document, *line_start).and_then(named_items);
        let unused = |name: &&Name| group.iter().any(|d| d.range == name.range);
        let kept: Vec<&Name> = names
            .map(|names| names.iter().filter(|n| !unused(n)).collect())
            .unwrap_or_default();
        let edit = match names {
            Some(names) if !kept.is_empty() => {
                let list = kept.iter().map(|n| n.as_str()).collect::<Vec<_>>().join(", ");
                let first = names.first()?.range.start();
                let last = names.last()?.range.end();
                TextEdit::replace(TextRange::new(first, last), list)
            }
            _ => delete_lines(document, *line_start, line_end)?,
        };
        edits.push(edit);
    }
    edits.sort_by_key(|e| e.range.start());
    Some(CodeAction::quick_fix(
        "Remove all unused imports",
        edits,
        diagnostics.iter().map(|d| (*d).clone()).collect(),
    ))
}

fn find_import(document: &AnalyzedDocument, line: u32) -> Option<&ImportStmt> {
    let line = line as usize;
    document.tree()?.statements.iter().find_map(|stmt| match stmt {
        Stmt::Import(import)
            if document.line_index.line_col(import.range.start()).line == line =>
        {
            Some(import)
        }
        _ => None,
    })
}

fn named_items(import: &ImportStmt) -> Option<&[Name]> {
    match &import.items {
        ImportItems::Named(names) => Some(names),
        ImportItems::Wildcard(_) => None,
    }
}

/// Whole lines `start..=end`, including the final newline.
fn delete_lines(document: &AnalyzedDocument, start: u32, end: u32) -> Option<TextEdit> {
    let first = document.line_index.line_range(start as usize)?;
    let last = document.line_index.line_range(end as usize)?;
    Some(TextEdit::delete(first.cover(last)))
}

// ============================================================================
// MISSING PROPERTIES
// ============================================================================

fn add_missing_properties(
    document: &AnalyzedDocument,
    brace_offset: u32,
    diagnostics: &[&Diagnostic],
) -> Option<CodeAction> {
    let brace = TextSize::from(brace_offset);
    let line = document.line_index.line_col(brace).line;
    let line_text = document.slice(document.line_index.line_range(line)?);
    let indent: String = line_text.chars().take_while(|c| *c == ' ' || *c == '\t').collect();

    let mut names = Vec::new();
    let mut text = String::new();
    for diagnostic in diagnostics {
        let Some(DiagnosticData::MissingProperty {
            property_name,
            property_type,
            ..
        }) = &diagnostic.data
        else {
            continue;
        };
        text.push_str(&format!("\n{indent}  {property_name} = {}", default_value(property_type)));
        names.push(property_name.as_str());
    }
    if names.is_empty() {
        return None;
    }
    let after = brace + TextSize::from(1);
    let rest = document.text.get(usize::from(after)..).unwrap_or("");
    if rest.trim_start_matches([' ', '\t']).starts_with('}') {
        text.push('\n');
        text.push_str(&indent);
    }

    let title = match names.as_slice() {
        [name] => format!("Add missing property '{name}'"),
        _ => "Add all missing properties".to_string(),
    };
    Some(CodeAction::quick_fix(
        title,
        vec![TextEdit::insert(after, text)],
        diagnostics.iter().map(|d| (*d).clone()).collect(),
    ))
}

/// Placeholder value for a property of type `ty`.
pub fn default_value(ty: &str) -> &'static str {
    if ty.ends_with("[]") {
        return "[]";
    }
    match ty.to_ascii_lowercase().as_str() {
        "string" => "\"\"",
        "number" => "0",
        "boolean" => "false",
        "object" => "{}",
        _ => "null",
    }
}
