//! Builders and assertions over analysis results.

use kite::TextSize;
use kite::hir::{AnalyzedDocument, Diagnostic};
use kite::ide::{AnalysisHost, TextEdit};
use kite::project::MemoryWorkspace;
use kite::validation::validate;

/// Byte offset of the `nth` occurrence of `needle`.
pub fn offset_of(text: &str, needle: &str, nth: usize) -> TextSize {
    let (at, _) = text
        .match_indices(needle)
        .nth(nth)
        .unwrap_or_else(|| panic!("no occurrence {nth} of {needle:?}"));
    TextSize::from(at as u32)
}

/// A host with every `(uri, text)` pair opened in order.
pub fn host_with(documents: &[(&str, &str)]) -> AnalysisHost {
    let mut host = AnalysisHost::new();
    for (uri, text) in documents {
        host.set_document(*uri, *text);
    }
    host
}

pub fn workspace_with(documents: &[(&str, &str)]) -> MemoryWorkspace {
    let mut ws = MemoryWorkspace::new();
    for (uri, text) in documents {
        ws.insert(*uri, *text);
    }
    ws
}

/// Run the default pipeline over `text` as `main.kite` within `ws`.
pub fn diagnostics_in(ws: &MemoryWorkspace, text: &str) -> Vec<Diagnostic> {
    let doc = AnalyzedDocument::new("main.kite", text);
    validate(&doc, Some(ws))
}

pub fn with_code<'a>(diagnostics: &'a [Diagnostic], code: &str) -> Vec<&'a Diagnostic> {
    diagnostics.iter().filter(|d| d.has_code(code)).collect()
}

/// Apply non-overlapping edits back to front.
pub fn apply_edits(text: &str, edits: &[TextEdit]) -> String {
    let mut sorted = edits.to_vec();
    sorted.sort_by_key(|e| std::cmp::Reverse(e.range.start()));
    let mut out = text.to_string();
    for edit in sorted {
        out.replace_range(std::ops::Range::<usize>::from(edit.range), &edit.new_text);
    }
    out
}
