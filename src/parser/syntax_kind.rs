//! Token kinds produced by the lexer.
//!
//! The tree is an enum AST (see [`super::ast`]), so unlike a CST this enum
//! only lists token kinds. Keywords are contextual: the lexer classifies
//! them, but any keyword is accepted wherever a name is expected.

/// All token kinds in Kite source text
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
#[allow(non_camel_case_types)]
pub enum SyntaxKind {
    // =========================================================================
    // TRIVIA (whitespace and comments - preserved but not semantically meaningful)
    // =========================================================================
    WHITESPACE = 0,
    LINE_COMMENT,
    BLOCK_COMMENT,
    UNTERMINATED_COMMENT, // /* without */

    // =========================================================================
    // LITERALS
    // =========================================================================
    IDENT,               // identifier
    INTEGER,             // 42
    DECIMAL,             // 3.14
    STRING,              // "hello ${name}" or 'hello'
    UNTERMINATED_STRING, // "hello

    // =========================================================================
    // PUNCTUATION
    // =========================================================================
    L_BRACE,    // {
    R_BRACE,    // }
    L_BRACKET,  // [
    R_BRACKET,  // ]
    L_PAREN,    // (
    R_PAREN,    // )
    SEMICOLON,  // ;
    COLON,      // :
    COMMA,      // ,
    DOT,        // .
    DOT_DOT,    // ..
    EQ,         // =
    EQ_EQ,      // ==
    BANG_EQ,    // !=
    LT,         // <
    GT,         // >
    LT_EQ,      // <=
    GT_EQ,      // >=
    PLUS,       // +
    MINUS,      // -
    STAR,       // *
    SLASH,      // /
    PERCENT,    // %
    PLUS_EQ,    // +=
    MINUS_EQ,   // -=
    STAR_EQ,    // *=
    SLASH_EQ,   // /=
    BANG,       // !
    AMP_AMP,    // &&
    PIPE_PIPE,  // ||
    PIPE,       // |
    AT,         // @
    QUESTION,   // ?
    FAT_ARROW,  // =>

    // =========================================================================
    // KEYWORDS
    // =========================================================================
    IMPORT_KW,
    FROM_KW,
    SCHEMA_KW,
    RESOURCE_KW,
    COMPONENT_KW,
    FUN_KW,
    VAR_KW,
    INPUT_KW,
    OUTPUT_KW,
    TYPE_KW,
    FOR_KW,
    IN_KW,
    WHILE_KW,
    IF_KW,
    ELSE_KW,
    RETURN_KW,
    BREAK_KW,
    CONTINUE_KW,
    TRUE_KW,
    FALSE_KW,
    NULL_KW,

    // =========================================================================
    // SPECIAL
    // =========================================================================
    ERROR,
}

impl SyntaxKind {
    /// Whitespace and comments.
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            SyntaxKind::WHITESPACE
                | SyntaxKind::LINE_COMMENT
                | SyntaxKind::BLOCK_COMMENT
                | SyntaxKind::UNTERMINATED_COMMENT
        )
    }

    pub fn is_comment(self) -> bool {
        matches!(
            self,
            SyntaxKind::LINE_COMMENT | SyntaxKind::BLOCK_COMMENT | SyntaxKind::UNTERMINATED_COMMENT
        )
    }

    pub fn is_string(self) -> bool {
        matches!(self, SyntaxKind::STRING | SyntaxKind::UNTERMINATED_STRING)
    }

    pub fn is_keyword(self) -> bool {
        self >= SyntaxKind::IMPORT_KW && self <= SyntaxKind::NULL_KW
    }

    /// Literal tokens whose type is known from their shape alone.
    pub fn is_literal(self) -> bool {
        matches!(
            self,
            SyntaxKind::INTEGER
                | SyntaxKind::DECIMAL
                | SyntaxKind::STRING
                | SyntaxKind::TRUE_KW
                | SyntaxKind::FALSE_KW
                | SyntaxKind::NULL_KW
        )
    }

    /// Classify an identifier as a keyword, if it is one.
    pub fn from_keyword(text: &str) -> Option<SyntaxKind> {
        let kind = match text {
            "import" => SyntaxKind::IMPORT_KW,
            "from" => SyntaxKind::FROM_KW,
            "schema" => SyntaxKind::SCHEMA_KW,
            "resource" => SyntaxKind::RESOURCE_KW,
            "component" => SyntaxKind::COMPONENT_KW,
            "fun" => SyntaxKind::FUN_KW,
            "var" => SyntaxKind::VAR_KW,
            "input" => SyntaxKind::INPUT_KW,
            "output" => SyntaxKind::OUTPUT_KW,
            "type" => SyntaxKind::TYPE_KW,
            "for" => SyntaxKind::FOR_KW,
            "in" => SyntaxKind::IN_KW,
            "while" => SyntaxKind::WHILE_KW,
            "if" => SyntaxKind::IF_KW,
            "else" => SyntaxKind::ELSE_KW,
            "return" => SyntaxKind::RETURN_KW,
            "break" => SyntaxKind::BREAK_KW,
            "continue" => SyntaxKind::CONTINUE_KW,
            "true" => SyntaxKind::TRUE_KW,
            "false" => SyntaxKind::FALSE_KW,
            "null" => SyntaxKind::NULL_KW,
            _ => return None,
        };
        Some(kind)
    }

    /// Human-readable description used in syntax error messages.
    pub fn describe(self) -> &'static str {
        match self {
            SyntaxKind::IDENT => "identifier",
            SyntaxKind::STRING | SyntaxKind::UNTERMINATED_STRING => "string",
            SyntaxKind::INTEGER | SyntaxKind::DECIMAL => "number",
            SyntaxKind::L_BRACE => "'{'",
            SyntaxKind::R_BRACE => "'}'",
            SyntaxKind::L_BRACKET => "'['",
            SyntaxKind::R_BRACKET => "']'",
            SyntaxKind::L_PAREN => "'('",
            SyntaxKind::R_PAREN => "')'",
            SyntaxKind::COLON => "':'",
            SyntaxKind::COMMA => "','",
            SyntaxKind::EQ => "'='",
            SyntaxKind::FROM_KW => "'from'",
            SyntaxKind::IN_KW => "'in'",
            _ => "token",
        }
    }
}
