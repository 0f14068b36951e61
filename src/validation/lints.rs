//! Token-level lints.
//!
//! These run on the token stream rather than the tree, so they still work
//! on documents that fail to parse. Comments never produce tokens here and
//! string contents are a single token, so neither can trigger a lint.

use text_size::TextRange;

use super::{ValidationContext, ValidationPass};
use crate::hir::{Diagnostic, codes};
use crate::parser::{SyntaxKind, Token, tokenize};

fn code_tokens(text: &str) -> Vec<Token<'_>> {
    tokenize(text).into_iter().filter(|t| !t.kind.is_trivia()).collect()
}

fn kind_at(tokens: &[Token<'_>], idx: usize) -> Option<SyntaxKind> {
    tokens.get(idx).map(|t| t.kind)
}

/// Tokens that extend the expression before them.
fn is_continuation(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SyntaxKind::DOT
            | SyntaxKind::L_PAREN
            | SyntaxKind::L_BRACKET
            | SyntaxKind::PLUS
            | SyntaxKind::MINUS
            | SyntaxKind::STAR
            | SyntaxKind::SLASH
            | SyntaxKind::PERCENT
            | SyntaxKind::QUESTION
    )
}

fn literal_type(kind: SyntaxKind) -> Option<&'static str> {
    match kind {
        SyntaxKind::INTEGER | SyntaxKind::DECIMAL => Some("number"),
        SyntaxKind::STRING => Some("string"),
        SyntaxKind::TRUE_KW | SyntaxKind::FALSE_KW => Some("boolean"),
        _ => None,
    }
}

// ============================================================================
// ASSIGNMENT IN CONDITION
// ============================================================================

/// `if a = b` / `while a = b`, where `==` was almost certainly meant.
pub struct AssignmentInConditionLint;

impl ValidationPass for AssignmentInConditionLint {
    fn name(&self) -> &'static str {
        "lint:assignment-in-condition"
    }

    fn check(&self, cx: &ValidationContext<'_>) -> Vec<Diagnostic> {
        let tokens = code_tokens(&cx.document.text);
        let mut diagnostics = Vec::new();
        for (idx, token) in tokens.iter().enumerate() {
            if !matches!(token.kind, SyntaxKind::IF_KW | SyntaxKind::WHILE_KW) {
                continue;
            }
            let mut depth = 0i32;
            for next in &tokens[idx + 1..] {
                match next.kind {
                    SyntaxKind::L_PAREN | SyntaxKind::L_BRACKET => depth += 1,
                    SyntaxKind::R_PAREN | SyntaxKind::R_BRACKET => {
                        depth -= 1;
                        if depth < 0 {
                            break;
                        }
                    }
                    SyntaxKind::L_BRACE | SyntaxKind::R_BRACE | SyntaxKind::SEMICOLON => break,
                    SyntaxKind::EQ => {
                        let message = "assignment in condition; did you mean '=='?";
                        diagnostics.push(
                            Diagnostic::warning(next.range(), message)
                                .with_code(codes::ASSIGNMENT_IN_CONDITION),
                        );
                        break;
                    }
                    _ => {}
                }
            }
        }
        diagnostics
    }
}

// ============================================================================
// INFINITE LOOP
// ============================================================================

/// `while true { ... }` with no `break` or `return` in the body.
pub struct InfiniteLoopLint;

impl ValidationPass for InfiniteLoopLint {
    fn name(&self) -> &'static str {
        "lint:infinite-loop"
    }

    fn check(&self, cx: &ValidationContext<'_>) -> Vec<Diagnostic> {
        let tokens = code_tokens(&cx.document.text);
        let mut diagnostics = Vec::new();
        for (idx, token) in tokens.iter().enumerate() {
            if token.kind != SyntaxKind::WHILE_KW {
                continue;
            }
            let open = match (kind_at(&tokens, idx + 1), kind_at(&tokens, idx + 2)) {
                (Some(SyntaxKind::TRUE_KW), Some(SyntaxKind::L_BRACE)) => idx + 2,
                (Some(SyntaxKind::L_PAREN), Some(SyntaxKind::TRUE_KW))
                    if kind_at(&tokens, idx + 3) == Some(SyntaxKind::R_PAREN)
                        && kind_at(&tokens, idx + 4) == Some(SyntaxKind::L_BRACE) =>
                {
                    idx + 4
                }
                _ => continue,
            };
            let mut depth = 0usize;
            let mut exits = false;
            for next in &tokens[open..] {
                match next.kind {
                    SyntaxKind::L_BRACE => depth += 1,
                    SyntaxKind::R_BRACE => {
                        depth -= 1;
                        if depth == 0 {
                            break;
                        }
                    }
                    SyntaxKind::BREAK_KW | SyntaxKind::RETURN_KW => {
                        exits = true;
                        break;
                    }
                    _ => {}
                }
            }
            if !exits {
                let range = TextRange::new(token.offset, tokens[open - 1].range().end());
                let message = "infinite loop: 'while true' has no 'break' or 'return'";
                diagnostics
                    .push(Diagnostic::warning(range, message).with_code(codes::INFINITE_LOOP));
            }
        }
        diagnostics
    }
}

// ============================================================================
// UNCLOSED STRING
// ============================================================================

/// String literal with no closing quote before the end of the line.
pub struct UnclosedStringLint;

impl ValidationPass for UnclosedStringLint {
    fn name(&self) -> &'static str {
        "lint:unclosed-string"
    }

    fn check(&self, cx: &ValidationContext<'_>) -> Vec<Diagnostic> {
        tokenize(&cx.document.text)
            .into_iter()
            .filter(|t| t.kind == SyntaxKind::UNTERMINATED_STRING)
            .map(|t| {
                Diagnostic::error(t.range(), "unclosed string literal")
                    .with_code(codes::UNCLOSED_STRING)
            })
            .collect()
    }
}

// ============================================================================
// CROSS-TYPE COMPARISON
// ============================================================================

/// `==`/`!=` between literals of different types.
pub struct CrossTypeComparisonLint;

impl ValidationPass for CrossTypeComparisonLint {
    fn name(&self) -> &'static str {
        "lint:cross-type-comparison"
    }

    fn check(&self, cx: &ValidationContext<'_>) -> Vec<Diagnostic> {
        let tokens = code_tokens(&cx.document.text);
        let mut diagnostics = Vec::new();
        for idx in 1..tokens.len().saturating_sub(1) {
            let op = &tokens[idx];
            let always = match op.kind {
                SyntaxKind::EQ_EQ => "false",
                SyntaxKind::BANG_EQ => "true",
                _ => continue,
            };
            let (lhs, rhs) = (&tokens[idx - 1], &tokens[idx + 1]);
            let (Some(left), Some(right)) = (literal_type(lhs.kind), literal_type(rhs.kind)) else {
                continue;
            };
            let before = idx.checked_sub(2).and_then(|i| kind_at(&tokens, i));
            let after = kind_at(&tokens, idx + 2);
            let isolated = before.is_none_or(|k| !is_continuation(k) && k != SyntaxKind::BANG)
                && after.is_none_or(|k| !is_continuation(k));
            if left == right || !isolated {
                continue;
            }
            diagnostics.push(
                Diagnostic::warning(
                    TextRange::new(lhs.offset, rhs.range().end()),
                    format!("comparison between {left} and {right} is always {always}"),
                )
                .with_code(codes::CROSS_TYPE_COMPARISON),
            );
        }
        diagnostics
    }
}

// ============================================================================
// IMPLICIT ANY
// ============================================================================

/// Untyped `var` whose initializer says nothing about its type
/// (`null`, `[]`, or no initializer at all).
pub struct ImplicitAnyLint;

impl ValidationPass for ImplicitAnyLint {
    fn name(&self) -> &'static str {
        "lint:implicit-any"
    }

    fn check(&self, cx: &ValidationContext<'_>) -> Vec<Diagnostic> {
        let tokens = code_tokens(&cx.document.text);
        let mut diagnostics = Vec::new();
        for (idx, token) in tokens.iter().enumerate() {
            if token.kind != SyntaxKind::VAR_KW {
                continue;
            }
            let Some(name) = tokens
                .get(idx + 1)
                .filter(|t| t.kind == SyntaxKind::IDENT || t.kind.is_keyword())
            else {
                continue;
            };
            let implicit = match kind_at(&tokens, idx + 2) {
                None => true,
                Some(SyntaxKind::EQ) => match kind_at(&tokens, idx + 3) {
                    Some(SyntaxKind::NULL_KW) => {
                        kind_at(&tokens, idx + 4).is_none_or(|k| !is_continuation(k))
                    }
                    Some(SyntaxKind::L_BRACKET) => {
                        kind_at(&tokens, idx + 4) == Some(SyntaxKind::R_BRACKET)
                            && kind_at(&tokens, idx + 5).is_none_or(|k| !is_continuation(k))
                    }
                    _ => false,
                },
                Some(SyntaxKind::IDENT | SyntaxKind::DOT | SyntaxKind::L_BRACKET) => false,
                // `var type name = ...` with a keyword as the variable name.
                Some(kind)
                    if kind.is_keyword() && kind_at(&tokens, idx + 3) == Some(SyntaxKind::EQ) =>
                {
                    false
                }
                Some(_) => true,
            };
            if implicit {
                let message = format!(
                    "variable '{}' has no type and none can be inferred; it is treated as 'any'",
                    name.text
                );
                diagnostics
                    .push(Diagnostic::hint(name.range(), message).with_code(codes::IMPLICIT_ANY));
            }
        }
        diagnostics
    }
}
