//! Logos-based lexer for Kite
//!
//! Fast tokenization using the logos crate. The lexer never fails: bytes it
//! cannot classify become [`SyntaxKind::ERROR`] tokens, and strings or block
//! comments that run off the end of their line/file become distinct
//! unterminated kinds instead of swallowing the rest of the document.

use super::syntax_kind::SyntaxKind;
use logos::Logos;
use text_size::{TextRange, TextSize};

/// A token with its kind, text, and position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: SyntaxKind,
    pub text: &'a str,
    pub offset: TextSize,
}

impl Token<'_> {
    pub fn range(&self) -> TextRange {
        TextRange::at(self.offset, TextSize::of(self.text))
    }
}

/// Lexer wrapping the logos-generated tokenizer
pub struct Lexer<'a> {
    inner: logos::Lexer<'a, LogosToken>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            inner: LogosToken::lexer(input),
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let logos_token = self.inner.next()?;
        let text = self.inner.slice();
        let offset = TextSize::new(self.inner.span().start as u32);

        let kind = match logos_token {
            Ok(LogosToken::Ident) => SyntaxKind::from_keyword(text).unwrap_or(SyntaxKind::IDENT),
            Ok(t) => t.into(),
            Err(()) => SyntaxKind::ERROR,
        };

        Some(Token { kind, text, offset })
    }
}

/// Tokenize an entire string into a Vec
pub fn tokenize(input: &str) -> Vec<Token<'_>> {
    Lexer::new(input).collect()
}

/// Whether a string or block comment found its closing delimiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Closure {
    Closed,
    Open,
}

/// Logos token enum - maps to SyntaxKind
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
pub enum LogosToken {
    // =========================================================================
    // TRIVIA
    // =========================================================================
    #[regex(r"[ \t\r\n\f]+")]
    Whitespace,

    #[regex(r"//[^\n]*")]
    LineComment,

    #[token("/*", lex_block_comment)]
    BlockComment(Closure),

    // =========================================================================
    // LITERALS
    // =========================================================================
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
    Ident,

    #[regex(r"[0-9]+")]
    Integer,

    #[regex(r"[0-9]+\.[0-9]+([eE][+-]?[0-9]+)?")]
    Decimal,

    #[token("\"", |lex| lex_string(lex, b'"'))]
    #[token("'", |lex| lex_string(lex, b'\''))]
    String(Closure),

    // =========================================================================
    // MULTI-CHARACTER PUNCTUATION (must come before single-char)
    // =========================================================================
    #[token("..")]
    DotDot,
    #[token("==")]
    EqEq,
    #[token("!=")]
    BangEq,
    #[token("<=")]
    LtEq,
    #[token(">=")]
    GtEq,
    #[token("+=")]
    PlusEq,
    #[token("-=")]
    MinusEq,
    #[token("*=")]
    StarEq,
    #[token("/=")]
    SlashEq,
    #[token("&&")]
    AmpAmp,
    #[token("||")]
    PipePipe,
    #[token("=>")]
    FatArrow,

    // =========================================================================
    // SINGLE-CHARACTER PUNCTUATION
    // =========================================================================
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token(";")]
    Semicolon,
    #[token(":")]
    Colon,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
    #[token("=")]
    Eq,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("!")]
    Bang,
    #[token("|")]
    Pipe,
    #[token("@")]
    At,
    #[token("?")]
    Question,
}

impl From<LogosToken> for SyntaxKind {
    fn from(token: LogosToken) -> Self {
        match token {
            LogosToken::Whitespace => SyntaxKind::WHITESPACE,
            LogosToken::LineComment => SyntaxKind::LINE_COMMENT,
            LogosToken::BlockComment(Closure::Closed) => SyntaxKind::BLOCK_COMMENT,
            LogosToken::BlockComment(Closure::Open) => SyntaxKind::UNTERMINATED_COMMENT,
            LogosToken::Ident => SyntaxKind::IDENT,
            LogosToken::Integer => SyntaxKind::INTEGER,
            LogosToken::Decimal => SyntaxKind::DECIMAL,
            LogosToken::String(Closure::Closed) => SyntaxKind::STRING,
            LogosToken::String(Closure::Open) => SyntaxKind::UNTERMINATED_STRING,
            LogosToken::DotDot => SyntaxKind::DOT_DOT,
            LogosToken::EqEq => SyntaxKind::EQ_EQ,
            LogosToken::BangEq => SyntaxKind::BANG_EQ,
            LogosToken::LtEq => SyntaxKind::LT_EQ,
            LogosToken::GtEq => SyntaxKind::GT_EQ,
            LogosToken::PlusEq => SyntaxKind::PLUS_EQ,
            LogosToken::MinusEq => SyntaxKind::MINUS_EQ,
            LogosToken::StarEq => SyntaxKind::STAR_EQ,
            LogosToken::SlashEq => SyntaxKind::SLASH_EQ,
            LogosToken::AmpAmp => SyntaxKind::AMP_AMP,
            LogosToken::PipePipe => SyntaxKind::PIPE_PIPE,
            LogosToken::FatArrow => SyntaxKind::FAT_ARROW,
            LogosToken::LBrace => SyntaxKind::L_BRACE,
            LogosToken::RBrace => SyntaxKind::R_BRACE,
            LogosToken::LBracket => SyntaxKind::L_BRACKET,
            LogosToken::RBracket => SyntaxKind::R_BRACKET,
            LogosToken::LParen => SyntaxKind::L_PAREN,
            LogosToken::RParen => SyntaxKind::R_PAREN,
            LogosToken::Semicolon => SyntaxKind::SEMICOLON,
            LogosToken::Colon => SyntaxKind::COLON,
            LogosToken::Comma => SyntaxKind::COMMA,
            LogosToken::Dot => SyntaxKind::DOT,
            LogosToken::Eq => SyntaxKind::EQ,
            LogosToken::Lt => SyntaxKind::LT,
            LogosToken::Gt => SyntaxKind::GT,
            LogosToken::Plus => SyntaxKind::PLUS,
            LogosToken::Minus => SyntaxKind::MINUS,
            LogosToken::Star => SyntaxKind::STAR,
            LogosToken::Slash => SyntaxKind::SLASH,
            LogosToken::Percent => SyntaxKind::PERCENT,
            LogosToken::Bang => SyntaxKind::BANG,
            LogosToken::Pipe => SyntaxKind::PIPE,
            LogosToken::At => SyntaxKind::AT,
            LogosToken::Question => SyntaxKind::QUESTION,
        }
    }
}

fn lex_block_comment(lex: &mut logos::Lexer<LogosToken>) -> Closure {
    let rest = lex.remainder();
    match rest.find("*/") {
        Some(end) => {
            lex.bump(end + 2);
            Closure::Closed
        }
        None => {
            lex.bump(rest.len());
            Closure::Open
        }
    }
}

fn lex_string(lex: &mut logos::Lexer<LogosToken>, quote: u8) -> Closure {
    let (len, closure) = scan_string_body(lex.remainder().as_bytes(), quote);
    lex.bump(len);
    closure
}

/// Scan a string body (after the opening quote).
///
/// Returns the number of bytes consumed, including the closing quote when
/// one is found. Strings never span lines: a newline ends an unterminated
/// string without being consumed. Double-quoted strings may contain `${...}`
/// holes, which can themselves contain nested strings.
pub(crate) fn scan_string_body(bytes: &[u8], quote: u8) -> (usize, Closure) {
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => {
                if bytes.get(i + 1) == Some(&b'\n') {
                    return (i + 1, Closure::Open);
                }
                i += 2;
            }
            b'\n' => return (i, Closure::Open),
            b'$' if quote == b'"' && bytes.get(i + 1) == Some(&b'{') => {
                i += 2;
                let mut depth = 1usize;
                while i < bytes.len() && depth > 0 {
                    match bytes[i] {
                        b'{' => depth += 1,
                        b'}' => depth -= 1,
                        b'\n' => return (i, Closure::Open),
                        q @ (b'"' | b'\'') => {
                            let (n, closure) = scan_string_body(&bytes[i + 1..], q);
                            i += n + 1;
                            if closure == Closure::Open {
                                return (i, Closure::Open);
                            }
                            continue;
                        }
                        _ => {}
                    }
                    i += 1;
                }
            }
            b if b == quote => return (i + 1, Closure::Closed),
            _ => i += 1,
        }
    }
    (bytes.len(), Closure::Open)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<SyntaxKind> {
        tokenize(input)
            .into_iter()
            .map(|t| t.kind)
            .filter(|k| *k != SyntaxKind::WHITESPACE)
            .collect()
    }

    #[test]
    fn test_keywords_and_idents() {
        assert_eq!(
            kinds("schema Config"),
            vec![SyntaxKind::SCHEMA_KW, SyntaxKind::IDENT]
        );
    }

    #[test]
    fn test_range_is_not_decimal() {
        assert_eq!(
            kinds("0..10"),
            vec![SyntaxKind::INTEGER, SyntaxKind::DOT_DOT, SyntaxKind::INTEGER]
        );
        assert_eq!(kinds("1.5"), vec![SyntaxKind::DECIMAL]);
    }

    #[test]
    fn test_string_with_interpolation_is_one_token() {
        let tokens = tokenize(r#""a-${name}-${"x"}" rest"#);
        assert_eq!(tokens[0].kind, SyntaxKind::STRING);
        assert_eq!(tokens[0].text, r#""a-${name}-${"x"}""#);
    }

    #[test]
    fn test_unterminated_string_stops_at_newline() {
        let tokens = tokenize("var a = \"open\nvar b = 1");
        let open = tokens
            .iter()
            .find(|t| t.kind == SyntaxKind::UNTERMINATED_STRING)
            .unwrap();
        assert_eq!(open.text, "\"open");
        assert!(tokens.iter().any(|t| t.text == "b"));
    }

    #[test]
    fn test_single_quotes_do_not_interpolate() {
        let tokens = tokenize("'${' x");
        assert_eq!(tokens[0].kind, SyntaxKind::STRING);
        assert_eq!(tokens[0].text, "'${'");
    }

    #[test]
    fn test_block_comments() {
        assert_eq!(kinds("/* a */ x"), vec![SyntaxKind::BLOCK_COMMENT, SyntaxKind::IDENT]);
        assert_eq!(kinds("/* a"), vec![SyntaxKind::UNTERMINATED_COMMENT]);
    }

    #[test]
    fn test_offsets_are_contiguous() {
        let input = "var x = \"é\" // c";
        let mut expected = 0u32;
        for token in tokenize(input) {
            assert_eq!(u32::from(token.offset), expected);
            expected += token.text.len() as u32;
        }
        assert_eq!(expected as usize, input.len());
    }
}
