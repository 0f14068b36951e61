//! A document snapshot with everything derived from its text.

use std::sync::Arc;

use text_size::{TextRange, TextSize};

use super::declarations::Declaration;
use super::indexer::index_document;
use super::locate;
use crate::base::{DocumentUri, LineIndex, Location};
use crate::parser::{LexicalMap, Parse, SourceFile, Stmt, parse};

/// Parse tree, declarations and lexical map of one document snapshot.
///
/// Rebuilt in full whenever the text changes.
#[derive(Debug, Clone)]
pub struct AnalyzedDocument {
    pub uri: DocumentUri,
    pub text: Arc<str>,
    pub parse: Parse,
    pub line_index: LineIndex,
    pub lexical: LexicalMap,
    pub declarations: Vec<Declaration>,
    /// Instance property keys and schema property names, sorted.
    member_names: Vec<TextRange>,
}

impl AnalyzedDocument {
    pub fn new(uri: impl Into<DocumentUri>, text: impl Into<Arc<str>>) -> Self {
        let text = text.into();
        let parse = parse(&text);
        Self::from_parse(uri.into(), text, parse)
    }

    /// Build from an existing parse (e.g. a cache hit).
    pub fn from_parse(uri: DocumentUri, text: Arc<str>, parse: Parse) -> Self {
        let (declarations, member_names) = match &parse.tree {
            Some(tree) => (index_document(&uri, tree), member_names(tree)),
            None => (Vec::new(), Vec::new()),
        };
        Self {
            line_index: LineIndex::new(&text),
            lexical: LexicalMap::new(&text),
            uri,
            text,
            parse,
            declarations,
            member_names,
        }
    }

    /// `None` when the text could not be parsed at all.
    pub fn tree(&self) -> Option<&SourceFile> {
        self.parse.tree.as_deref()
    }

    pub fn location(&self, range: TextRange) -> Location {
        Location::new(self.uri.clone(), range)
    }

    pub fn slice(&self, range: TextRange) -> &str {
        self.text.get(std::ops::Range::<usize>::from(range)).unwrap_or("")
    }

    /// Identifier touching `offset`, including a cursor placed right after it.
    pub fn word_at(&self, offset: TextSize) -> Option<(TextRange, &str)> {
        let text = &*self.text;
        let at = usize::from(offset).min(text.len());
        if !text.is_char_boundary(at) {
            return None;
        }
        let start = text[..at]
            .char_indices()
            .rev()
            .take_while(|(_, c)| is_ident_char(*c))
            .last()
            .map(|(i, _)| i)
            .unwrap_or(at);
        let end = text[at..]
            .char_indices()
            .find(|(_, c)| !is_ident_char(*c))
            .map(|(i, _)| at + i)
            .unwrap_or(text.len());
        if start == end {
            return None;
        }
        let word = &text[start..end];
        if word.chars().next().is_some_and(|c| c.is_ascii_digit()) {
            return None;
        }
        let range = TextRange::new(TextSize::from(start as u32), TextSize::from(end as u32));
        Some((range, word))
    }

    /// Whether the word at `range` names a member rather than a standalone
    /// symbol: `object.member`, an instance property key or a schema property.
    pub fn is_member_position(&self, range: TextRange) -> bool {
        if self.member_names.binary_search_by_key(&range.start(), |r| r.start()).is_ok() {
            return true;
        }
        let before = self.text.get(..usize::from(range.start())).unwrap_or("");
        let before = before.trim_end_matches([' ', '\t']);
        before.ends_with('.') && !before.ends_with("..")
    }

    /// For `object.member` with `member` starting at `start`, the `object` word.
    pub fn qualifier_before(&self, start: TextSize) -> Option<(TextRange, &str)> {
        let before = self.text.get(..usize::from(start))?;
        let trimmed = before.trim_end_matches([' ', '\t']);
        let dot = trimmed.strip_suffix('.')?;
        let dot = dot.trim_end_matches([' ', '\t']);
        if dot.is_empty() {
            return None;
        }
        self.word_at(TextSize::from(dot.len() as u32))
    }
}

fn member_names(tree: &SourceFile) -> Vec<TextRange> {
    let mut names: Vec<TextRange> = locate::instances(tree)
        .iter()
        .flat_map(|instance| instance.body.properties().iter().map(|p| p.key.range))
        .collect();
    for stmt in &tree.statements {
        if let Stmt::Schema(schema) = stmt {
            names.extend(schema.properties.iter().map(|p| p.name.range));
        }
    }
    names.sort_by_key(|r| r.start());
    names
}

fn is_ident_char(c: char) -> bool {
    c == '_' || unicode_ident::is_xid_continue(c)
}
