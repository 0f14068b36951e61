//! Comment and string position classifier.
//!
//! Every consumer that scans raw text (reference sweeps, unused-symbol and
//! unused-import checks, lints) asks this map whether an offset is code.
//! Interpolation holes inside double-quoted strings (`"${name}"`) count as
//! code; the quotes and literal text around them do not.

use regex::Regex;
use text_size::{TextRange, TextSize};

use super::lexer::Lexer;
use super::syntax_kind::SyntaxKind;

/// Lexical class of a byte offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    Code,
    Comment,
    String,
}

#[derive(Debug, Clone, Default)]
pub struct LexicalMap {
    /// Non-code ranges, sorted and disjoint.
    regions: Vec<(TextRange, Region)>,
    /// Offsets of `{`/`}` tokens in code, with `true` for opening braces.
    braces: Vec<(TextSize, bool)>,
    len: TextSize,
}

impl LexicalMap {
    pub fn new(text: &str) -> Self {
        let mut regions = Vec::new();
        let mut braces = Vec::new();
        for token in Lexer::new(text) {
            match token.kind {
                kind if kind.is_comment() => regions.push((token.range(), Region::Comment)),
                kind if kind.is_string() => {
                    push_string_regions(&mut regions, token.text, token.offset)
                }
                SyntaxKind::L_BRACE => braces.push((token.offset, true)),
                SyntaxKind::R_BRACE => braces.push((token.offset, false)),
                _ => {}
            }
        }
        Self {
            regions,
            braces,
            len: TextSize::of(text),
        }
    }

    pub fn region_at(&self, offset: TextSize) -> Region {
        let idx = self.regions.partition_point(|(range, _)| range.end() <= offset);
        match self.regions.get(idx) {
            Some((range, region)) if range.start() <= offset => *region,
            _ => Region::Code,
        }
    }

    pub fn is_code(&self, offset: TextSize) -> bool {
        self.region_at(offset) == Region::Code
    }

    pub fn is_comment(&self, offset: TextSize) -> bool {
        self.region_at(offset) == Region::Comment
    }

    /// Word-bounded occurrences of `word` that start in code.
    pub fn word_occurrences(&self, text: &str, word: &str) -> Vec<TextRange> {
        self.word_occurrences_in(text, word, TextRange::up_to(self.len))
    }

    /// Like [`Self::word_occurrences`], restricted to `within`.
    pub fn word_occurrences_in(&self, text: &str, word: &str, within: TextRange) -> Vec<TextRange> {
        if word.is_empty() {
            return Vec::new();
        }
        let Ok(pattern) = Regex::new(&format!(r"\b{}\b", regex::escape(word))) else {
            return Vec::new();
        };
        let start = usize::from(within.start()).min(text.len());
        let end = usize::from(within.end()).min(text.len());
        let Some(slice) = text.get(start..end) else {
            return Vec::new();
        };
        pattern
            .find_iter(slice)
            .filter_map(|m| {
                let range = TextRange::new(
                    TextSize::from((start + m.start()) as u32),
                    TextSize::from((start + m.end()) as u32),
                );
                let boundary_ok = !preceded_by_ident_char(text, start + m.start())
                    && !followed_by_ident_char(text, start + m.end());
                (boundary_ok && self.is_code(range.start())).then_some(range)
            })
            .collect()
    }

    /// Offset of the `}` that closes the `{` at `open`, skipping braces in
    /// comments and strings.
    pub fn matching_brace(&self, open: TextSize) -> Option<TextSize> {
        let start = self.braces.iter().position(|&(at, is_open)| at == open && is_open)?;
        let mut depth = 0usize;
        for &(at, is_open) in &self.braces[start..] {
            if is_open {
                depth += 1;
            } else {
                depth -= 1;
                if depth == 0 {
                    return Some(at);
                }
            }
        }
        None
    }
}

fn preceded_by_ident_char(text: &str, at: usize) -> bool {
    text[..at].chars().next_back().is_some_and(unicode_ident::is_xid_continue)
}

fn followed_by_ident_char(text: &str, at: usize) -> bool {
    text[at..].chars().next().is_some_and(unicode_ident::is_xid_continue)
}

/// Split a string token into `String` regions around its interpolation holes.
fn push_string_regions(regions: &mut Vec<(TextRange, Region)>, token: &str, offset: TextSize) {
    let mut cursor = 0usize;
    for (hole_start, hole_end) in interpolation_holes(token) {
        if hole_start > cursor {
            regions.push((relative_range(offset, cursor, hole_start), Region::String));
        }
        cursor = hole_end;
    }
    if token.len() > cursor {
        regions.push((relative_range(offset, cursor, token.len()), Region::String));
    }
}

fn relative_range(offset: TextSize, start: usize, end: usize) -> TextRange {
    TextRange::new(
        offset + TextSize::from(start as u32),
        offset + TextSize::from(end as u32),
    )
}

/// Byte ranges of `${...}` contents within a double-quoted string token,
/// excluding the `${` and `}` delimiters.
pub fn interpolation_holes(token: &str) -> Vec<(usize, usize)> {
    let bytes = token.as_bytes();
    let mut holes = Vec::new();
    if bytes.first() != Some(&b'"') {
        return holes;
    }
    let mut i = 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'$' if bytes.get(i + 1) == Some(&b'{') => {
                let start = i + 2;
                let mut j = start;
                let mut depth = 1usize;
                let mut quote: Option<u8> = None;
                while j < bytes.len() {
                    let b = bytes[j];
                    match quote {
                        Some(_) if b == b'\\' => j += 1,
                        Some(q) if b == q => quote = None,
                        Some(_) => {}
                        None => match b {
                            b'"' | b'\'' => quote = Some(b),
                            b'{' => depth += 1,
                            b'}' => {
                                depth -= 1;
                                if depth == 0 {
                                    break;
                                }
                            }
                            _ => {}
                        },
                    }
                    j += 1;
                }
                let end = j.min(bytes.len());
                holes.push((start, end));
                i = end + 1;
            }
            _ => i += 1,
        }
    }
    holes
}
