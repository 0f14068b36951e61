//! Code / comment / string classification.

use kite::TextSize;
use kite::parser::{LexicalMap, Region};

fn at(text: &str, needle: &str) -> TextSize {
    TextSize::from(text.find(needle).unwrap() as u32)
}

#[test]
fn test_regions() {
    let text = "var a = \"lit ${b} end\" // note\n/* block */ var c = 1";
    let map = LexicalMap::new(text);
    assert_eq!(map.region_at(at(text, "lit")), Region::String);
    assert_eq!(map.region_at(at(text, "b}")), Region::Code);
    assert_eq!(map.region_at(at(text, "note")), Region::Comment);
    assert_eq!(map.region_at(at(text, "block")), Region::Comment);
    assert_eq!(map.region_at(at(text, "c =")), Region::Code);
}

#[test]
fn test_word_occurrences_skip_comments_and_literals() {
    let text = "var name = 1\n// name\nvar s = \"name ${name}\"\nvar n2 = names";
    let map = LexicalMap::new(text);
    let found: Vec<usize> = map
        .word_occurrences(text, "name")
        .into_iter()
        .map(|r| usize::from(r.start()))
        .collect();
    assert_eq!(found, vec![4, text.find("${name}").unwrap() + 2]);
}

#[test]
fn test_matching_brace_skips_strings() {
    let text = "resource S r {\n  a = \"}\"\n}";
    let map = LexicalMap::new(text);
    let close = map.matching_brace(at(text, "{")).unwrap();
    assert_eq!(usize::from(close), text.len() - 1);
}
