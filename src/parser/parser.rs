//! Recursive descent parser for Kite
//!
//! Builds the enum AST from tokens. Supports error recovery at statement
//! boundaries: a malformed statement becomes [`Stmt::Error`] and parsing
//! resumes at the next line, so a single typo never hides the rest of the
//! document from the indexer.

use std::sync::Arc;

use smol_str::SmolStr;
use text_size::{TextRange, TextSize};

use super::ast::*;
use super::lexer::Lexer;
use super::syntax_kind::SyntaxKind;
use crate::base::{LineIndex, Position};

/// Nesting depth past which the input is treated as unrecoverable.
const MAX_DEPTH: usize = 256;

/// Parse result containing the tree and any errors
#[derive(Debug, Clone, PartialEq)]
pub struct Parse {
    /// Best-effort tree; `None` only when the input could not be parsed at all.
    pub tree: Option<Arc<SourceFile>>,
    pub errors: Vec<SyntaxError>,
}

impl Parse {
    /// Check if parsing succeeded without errors
    pub fn ok(&self) -> bool {
        self.tree.is_some() && self.errors.is_empty()
    }
}

/// A syntax error with location and message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub message: String,
    pub range: TextRange,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>, range: TextRange) -> Self {
        Self {
            message: message.into(),
            range,
        }
    }

    /// Line/column of the error start.
    pub fn position(&self, line_index: &LineIndex) -> Position {
        line_index.line_col(self.range.start())
    }
}

/// Parse Kite source code into an AST
pub fn parse(input: &str) -> Parse {
    let mut parser = Parser::new(input);
    let file = parser.parse_source_file();
    parser.finish(file)
}

#[derive(Debug, Clone, Copy)]
struct Tok<'a> {
    kind: SyntaxKind,
    text: &'a str,
    range: TextRange,
    newline_before: bool,
}

/// The parser state
struct Parser<'a> {
    tokens: Vec<Tok<'a>>,
    pos: usize,
    prev_end: TextSize,
    len: TextSize,
    errors: Vec<SyntaxError>,
    depth: usize,
    too_deep: bool,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        let mut tokens = Vec::new();
        let mut newline_before = false;
        for token in Lexer::new(input) {
            if token.kind.is_trivia() {
                newline_before |= token.text.contains('\n');
                continue;
            }
            tokens.push(Tok {
                kind: token.kind,
                text: token.text,
                range: token.range(),
                newline_before,
            });
            newline_before = false;
        }
        Self {
            tokens,
            pos: 0,
            prev_end: TextSize::new(0),
            len: TextSize::of(input),
            errors: Vec::new(),
            depth: 0,
            too_deep: false,
        }
    }

    fn finish(mut self, file: SourceFile) -> Parse {
        if self.too_deep {
            self.errors.push(SyntaxError::new(
                "nesting too deep; document could not be parsed",
                TextRange::empty(TextSize::new(0)),
            ));
            return Parse {
                tree: None,
                errors: self.errors,
            };
        }
        Parse {
            tree: Some(Arc::new(file)),
            errors: self.errors,
        }
    }

    // =========================================================================
    // Token inspection
    // =========================================================================

    fn current(&self) -> Option<&Tok<'a>> {
        self.tokens.get(self.pos)
    }

    fn kind(&self) -> SyntaxKind {
        self.nth(0)
    }

    fn nth(&self, n: usize) -> SyntaxKind {
        self.tokens
            .get(self.pos + n)
            .map(|t| t.kind)
            .unwrap_or(SyntaxKind::ERROR)
    }

    fn at(&self, kind: SyntaxKind) -> bool {
        !self.at_eof() && self.kind() == kind
    }

    fn at_eof(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn at_line_start(&self) -> bool {
        self.current().map(|t| t.newline_before).unwrap_or(true)
    }

    /// Identifiers and keywords are both accepted in name positions.
    fn at_name(&self) -> bool {
        !self.at_eof() && is_name_kind(self.kind())
    }

    fn nth_is_name(&self, n: usize) -> bool {
        self.pos + n < self.tokens.len() && is_name_kind(self.nth(n))
    }

    fn start(&self) -> TextSize {
        self.current().map(|t| t.range.start()).unwrap_or(self.len)
    }

    fn range_from(&self, start: TextSize) -> TextRange {
        TextRange::new(start, self.prev_end.max(start))
    }

    // =========================================================================
    // Token consumption
    // =========================================================================

    fn bump(&mut self) -> Option<Tok<'a>> {
        let token = *self.current()?;
        self.pos += 1;
        self.prev_end = token.range.end();
        Some(token)
    }

    fn eat(&mut self, kind: SyntaxKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: SyntaxKind) -> bool {
        if self.eat(kind) {
            true
        } else {
            self.error(format!("expected {}", kind.describe()));
            false
        }
    }

    fn name(&mut self) -> Option<Name> {
        if self.at_name() {
            let token = self.bump()?;
            Some(Name {
                text: SmolStr::new(token.text),
                range: token.range,
            })
        } else {
            self.error("expected identifier");
            None
        }
    }

    fn skip_separators(&mut self) {
        while self.at(SyntaxKind::SEMICOLON) || self.at(SyntaxKind::COMMA) {
            self.bump();
        }
    }

    // =========================================================================
    // Error handling
    // =========================================================================

    fn error(&mut self, message: impl Into<String>) {
        let range = self
            .current()
            .map(|t| t.range)
            .unwrap_or_else(|| TextRange::empty(self.len));
        self.errors.push(SyntaxError::new(message, range));
    }

    /// Skip to the next line (or closing brace), always consuming at least
    /// one token so the caller makes progress.
    fn recover(&mut self) -> TextRange {
        let start = self.start();
        if !self.at_eof() {
            self.bump();
        }
        while !self.at_eof()
            && !self.at_line_start()
            && !self.at(SyntaxKind::R_BRACE)
            && !self.at(SyntaxKind::SEMICOLON)
        {
            self.bump();
        }
        self.range_from(start)
    }

    fn enter(&mut self) -> bool {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            self.too_deep = true;
        }
        !self.too_deep
    }

    fn exit(&mut self) {
        self.depth -= 1;
    }

    // =========================================================================
    // Statements
    // =========================================================================

    fn parse_source_file(&mut self) -> SourceFile {
        let mut statements = Vec::new();
        while !self.at_eof() && !self.too_deep {
            if self.at(SyntaxKind::R_BRACE) {
                self.error("unexpected '}'");
                let range = self.recover();
                statements.push(Stmt::Error(range));
                continue;
            }
            self.parse_statement_into(&mut statements);
        }
        SourceFile {
            statements,
            range: TextRange::up_to(self.len),
        }
    }

    /// Parse statements until a closing brace (not consumed) or EOF.
    fn parse_statement_list(&mut self) -> Vec<Stmt> {
        let mut statements = Vec::new();
        while !self.at_eof() && !self.at(SyntaxKind::R_BRACE) && !self.too_deep {
            self.parse_statement_into(&mut statements);
        }
        statements
    }

    fn parse_statement_into(&mut self, statements: &mut Vec<Stmt>) {
        self.skip_separators();
        if self.at_eof() || self.at(SyntaxKind::R_BRACE) {
            return;
        }
        let before = self.pos;
        let stmt = self.parse_statement();
        if self.pos == before {
            let range = self.recover();
            statements.push(Stmt::Error(range));
            return;
        }
        statements.push(stmt);
        self.eat(SyntaxKind::SEMICOLON);
    }

    fn parse_statement(&mut self) -> Stmt {
        if !self.enter() {
            self.exit();
            return Stmt::Error(self.recover());
        }
        let stmt = self.parse_statement_inner();
        self.exit();
        stmt
    }

    fn parse_statement_inner(&mut self) -> Stmt {
        let start = self.start();
        let decorators = self.parse_decorators();

        match self.kind() {
            SyntaxKind::IMPORT_KW => return self.parse_import(start),
            SyntaxKind::SCHEMA_KW if self.nth_is_name(1) => {
                return self.parse_schema(start, decorators);
            }
            SyntaxKind::RESOURCE_KW if self.nth_is_name(1) => {
                return self.parse_resource(start, decorators);
            }
            SyntaxKind::COMPONENT_KW if self.nth_is_name(1) => {
                return self.parse_component(start, decorators);
            }
            SyntaxKind::FUN_KW => return self.parse_function(start, decorators),
            SyntaxKind::VAR_KW => return self.parse_var(start, decorators),
            SyntaxKind::INPUT_KW if self.nth_is_name(1) => {
                let member = self.parse_member(start, decorators);
                return Stmt::Input(member);
            }
            SyntaxKind::OUTPUT_KW if self.nth_is_name(1) => {
                let member = self.parse_member(start, decorators);
                return Stmt::Output(member);
            }
            SyntaxKind::TYPE_KW if self.nth_is_name(1) && self.nth(2) == SyntaxKind::EQ => {
                return self.parse_type_alias(start, decorators);
            }
            _ => {}
        }

        if !decorators.is_empty() {
            self.error("decorators must precede a declaration");
        }

        match self.kind() {
            SyntaxKind::FOR_KW => self.parse_for(start),
            SyntaxKind::WHILE_KW => self.parse_while(start),
            SyntaxKind::IF_KW => Stmt::If(self.parse_if(start)),
            SyntaxKind::RETURN_KW => {
                self.bump();
                let value = if self.at_eof()
                    || self.at_line_start()
                    || self.at(SyntaxKind::R_BRACE)
                    || self.at(SyntaxKind::SEMICOLON)
                {
                    None
                } else {
                    Some(self.parse_expr())
                };
                Stmt::Return(ReturnStmt {
                    value,
                    range: self.range_from(start),
                })
            }
            SyntaxKind::BREAK_KW => {
                self.bump();
                Stmt::Break(self.range_from(start))
            }
            SyntaxKind::CONTINUE_KW => {
                self.bump();
                Stmt::Continue(self.range_from(start))
            }
            SyntaxKind::L_BRACKET if self.nth(1) == SyntaxKind::FOR_KW => {
                self.parse_comprehension_statement(start)
            }
            _ => self.parse_expression_statement(start),
        }
    }

    fn parse_decorators(&mut self) -> Vec<Decorator> {
        let mut decorators = Vec::new();
        while self.at(SyntaxKind::AT) {
            let start = self.start();
            self.bump();
            let Some(name) = self.name() else {
                break;
            };
            let args = if self.at(SyntaxKind::L_PAREN) && !self.at_line_start() {
                Some(self.parse_decorator_args())
            } else {
                None
            };
            decorators.push(Decorator {
                name,
                args,
                range: self.range_from(start),
            });
        }
        decorators
    }

    fn parse_decorator_args(&mut self) -> DecoratorArgs {
        let start = self.start();
        self.bump();
        let mut args = Vec::new();
        while !self.at_eof() && !self.at(SyntaxKind::R_PAREN) {
            let key = if self.at_name() && self.nth(1) == SyntaxKind::COLON {
                let key = self.name();
                self.bump();
                key
            } else {
                None
            };
            let before = self.pos;
            let value = self.parse_expr();
            args.push(DecoratorArg { key, value });
            if !self.eat(SyntaxKind::COMMA) {
                break;
            }
            if self.pos == before {
                break;
            }
        }
        self.expect(SyntaxKind::R_PAREN);
        DecoratorArgs {
            args,
            range: self.range_from(start),
        }
    }

    fn parse_import(&mut self, start: TextSize) -> Stmt {
        self.bump();
        let items = if self.at(SyntaxKind::STAR) {
            let star = self.bump().map(|t| t.range).unwrap_or_default();
            ImportItems::Wildcard(star)
        } else {
            let mut names = Vec::new();
            while self.at_name() && !self.at(SyntaxKind::FROM_KW) {
                if let Some(name) = self.name() {
                    names.push(name);
                }
                if !self.eat(SyntaxKind::COMMA) {
                    break;
                }
            }
            if names.is_empty() {
                self.error("expected '*' or imported names");
            }
            ImportItems::Named(names)
        };

        let path = if self.expect(SyntaxKind::FROM_KW) {
            if self.kind().is_string() && !self.at_eof() {
                self.bump().map(|t| StringLit {
                    raw: SmolStr::new(t.text),
                    range: t.range,
                })
            } else {
                self.error("expected import path string");
                None
            }
        } else {
            None
        };

        Stmt::Import(ImportStmt {
            items,
            path,
            range: self.range_from(start),
        })
    }

    fn parse_schema(&mut self, start: TextSize, decorators: Vec<Decorator>) -> Stmt {
        self.bump();
        let Some(name) = self.name() else {
            return Stmt::Error(self.recover());
        };
        let body_start = self.start();
        let mut properties = Vec::new();
        if self.expect(SyntaxKind::L_BRACE) {
            loop {
                self.skip_separators();
                if self.at_eof() || self.at(SyntaxKind::R_BRACE) {
                    break;
                }
                let before = self.pos;
                match self.parse_schema_property() {
                    Some(property) => properties.push(property),
                    None => {
                        if self.pos == before
                            || !(self.at_line_start() || self.at(SyntaxKind::R_BRACE))
                        {
                            self.recover();
                        }
                    }
                }
            }
            self.expect(SyntaxKind::R_BRACE);
        }
        Stmt::Schema(SchemaDecl {
            decorators,
            name,
            properties,
            body_range: self.range_from(body_start),
            range: self.range_from(start),
        })
    }

    fn parse_schema_property(&mut self) -> Option<SchemaProperty> {
        let start = self.start();
        let decorators = self.parse_decorators();
        let ty = self.parse_type_ref()?;
        let name = self.name()?;
        let default = if self.eat(SyntaxKind::EQ) {
            Some(self.parse_expr())
        } else {
            None
        };
        Some(SchemaProperty {
            decorators,
            ty,
            name,
            default,
            range: self.range_from(start),
        })
    }

    fn parse_resource(&mut self, start: TextSize, decorators: Vec<Decorator>) -> Stmt {
        self.bump();
        let Some(ty) = self.parse_type_ref() else {
            return Stmt::Error(self.recover());
        };
        let name = if self.at_name() { self.name() } else { None };
        let body = self.parse_body(name.is_some());
        Stmt::Resource(ResourceDecl {
            decorators,
            ty,
            name,
            body,
            range: self.range_from(start),
        })
    }

    fn parse_component(&mut self, start: TextSize, decorators: Vec<Decorator>) -> Stmt {
        self.bump();
        let Some(ty) = self.parse_type_ref() else {
            return Stmt::Error(self.recover());
        };
        let name = if self.at_name() { self.name() } else { None };
        let body = self.parse_body(name.is_some());
        Stmt::Component(ComponentDecl {
            decorators,
            ty,
            name,
            body,
            range: self.range_from(start),
        })
    }

    /// Instances hold property assignments; definitions hold statements.
    fn parse_body(&mut self, is_instance: bool) -> Body {
        let start = self.start();
        if !self.expect(SyntaxKind::L_BRACE) {
            let kind = if is_instance {
                BodyKind::Properties(Vec::new())
            } else {
                BodyKind::Statements(Vec::new())
            };
            return Body {
                kind,
                range: TextRange::empty(start),
            };
        }
        let kind = if is_instance {
            BodyKind::Properties(self.parse_property_assignments())
        } else {
            BodyKind::Statements(self.parse_statement_list())
        };
        self.expect(SyntaxKind::R_BRACE);
        Body {
            kind,
            range: self.range_from(start),
        }
    }

    fn parse_property_assignments(&mut self) -> Vec<PropertyAssignment> {
        let mut properties = Vec::new();
        loop {
            self.skip_separators();
            if self.at_eof() || self.at(SyntaxKind::R_BRACE) || self.too_deep {
                break;
            }
            let start = self.start();
            if !self.at_name() {
                self.error("expected property name");
                self.recover();
                continue;
            }
            let Some(key) = self.name() else {
                continue;
            };
            if !self.eat(SyntaxKind::EQ) && !self.eat(SyntaxKind::COLON) {
                self.error(format!("expected '=' after property '{}'", key.text));
                if !self.at_line_start() && !self.at(SyntaxKind::R_BRACE) {
                    self.recover();
                }
                continue;
            }
            let value = self.parse_expr();
            properties.push(PropertyAssignment {
                key,
                value,
                range: self.range_from(start),
            });
        }
        properties
    }

    fn parse_function(&mut self, start: TextSize, decorators: Vec<Decorator>) -> Stmt {
        self.bump();
        let Some(name) = self.name() else {
            return Stmt::Error(self.recover());
        };
        let mut params = Vec::new();
        if self.expect(SyntaxKind::L_PAREN) {
            while !self.at_eof() && !self.at(SyntaxKind::R_PAREN) {
                match self.parse_param() {
                    Some(param) => params.push(param),
                    None => break,
                }
                if !self.eat(SyntaxKind::COMMA) {
                    break;
                }
            }
            self.expect(SyntaxKind::R_PAREN);
        }
        let return_type = if self.at_name() && !self.at(SyntaxKind::L_BRACE) {
            self.parse_type_ref()
        } else {
            None
        };
        let body = self.parse_block();
        Stmt::Function(FunctionDecl {
            decorators,
            name,
            params,
            return_type,
            body,
            range: self.range_from(start),
        })
    }

    fn parse_param(&mut self) -> Option<Param> {
        let start = self.start();
        let first = self.parse_type_ref()?;
        let (ty, name) = if self.at_name() {
            (Some(first), self.name()?)
        } else {
            (None, type_ref_as_name(first)?)
        };
        Some(Param {
            ty,
            name,
            range: self.range_from(start),
        })
    }

    fn parse_block(&mut self) -> Block {
        let start = self.start();
        if !self.expect(SyntaxKind::L_BRACE) {
            return Block {
                statements: Vec::new(),
                range: TextRange::empty(start),
            };
        }
        let statements = self.parse_statement_list();
        self.expect(SyntaxKind::R_BRACE);
        Block {
            statements,
            range: self.range_from(start),
        }
    }

    /// `[type] name [= value]` shared by `var`, `input` and `output`.
    fn parse_typed_binding(&mut self) -> Option<(Option<TypeRef>, Name, Option<Expr>)> {
        let first = self.parse_type_ref()?;
        let (ty, name) = if self.at_name() && !self.at_line_start() {
            (Some(first), self.name()?)
        } else {
            match type_ref_as_name(first) {
                Some(name) => (None, name),
                None => {
                    self.error("expected identifier");
                    return None;
                }
            }
        };
        let value = if self.eat(SyntaxKind::EQ) {
            Some(self.parse_expr())
        } else {
            None
        };
        Some((ty, name, value))
    }

    fn parse_var(&mut self, start: TextSize, decorators: Vec<Decorator>) -> Stmt {
        self.bump();
        match self.parse_typed_binding() {
            Some((ty, name, value)) => Stmt::Var(VarDecl {
                decorators,
                ty,
                name,
                value,
                range: self.range_from(start),
            }),
            None => Stmt::Error(self.range_from(start)),
        }
    }

    fn parse_member(&mut self, start: TextSize, decorators: Vec<Decorator>) -> MemberDecl {
        self.bump();
        let (ty, name, value) = match self.parse_typed_binding() {
            Some(binding) => binding,
            None => {
                let name = Name {
                    text: SmolStr::default(),
                    range: TextRange::empty(self.prev_end),
                };
                (None, name, None)
            }
        };
        MemberDecl {
            decorators,
            ty,
            name,
            value,
            range: self.range_from(start),
        }
    }

    fn parse_type_alias(&mut self, start: TextSize, decorators: Vec<Decorator>) -> Stmt {
        self.bump();
        let Some(name) = self.name() else {
            return Stmt::Error(self.recover());
        };
        self.expect(SyntaxKind::EQ);
        let mut members = Vec::new();
        loop {
            let kind = self.kind();
            if kind.is_literal() || kind == SyntaxKind::MINUS {
                members.push(TypeAliasMember::Literal(self.parse_unary()));
            } else if self.at_name() {
                match self.parse_type_ref() {
                    Some(ty) => members.push(TypeAliasMember::Type(ty)),
                    None => break,
                }
            } else {
                self.error("expected type or literal");
                break;
            }
            if !self.eat(SyntaxKind::PIPE) {
                break;
            }
        }
        Stmt::TypeAlias(TypeAliasDecl {
            decorators,
            name,
            members,
            range: self.range_from(start),
        })
    }

    fn parse_for(&mut self, start: TextSize) -> Stmt {
        self.bump();
        let parenthesized = self.eat(SyntaxKind::L_PAREN);
        let mut bindings = Vec::new();
        while self.at_name() && !self.at(SyntaxKind::IN_KW) {
            if let Some(name) = self.name() {
                bindings.push(name);
            }
            if !self.eat(SyntaxKind::COMMA) {
                break;
            }
        }
        if parenthesized {
            self.expect(SyntaxKind::R_PAREN);
        }
        if bindings.is_empty() {
            self.error("expected loop variable");
        }
        self.expect(SyntaxKind::IN_KW);
        let iterable = self.parse_expr();
        let body = self.parse_block();
        Stmt::For(ForStmt {
            bindings,
            iterable,
            body,
            range: self.range_from(start),
        })
    }

    fn parse_while(&mut self, start: TextSize) -> Stmt {
        self.bump();
        let condition = self.parse_expr();
        let body = self.parse_block();
        Stmt::While(WhileStmt {
            condition,
            body,
            range: self.range_from(start),
        })
    }

    fn parse_if(&mut self, start: TextSize) -> IfStmt {
        self.bump();
        let condition = self.parse_expr();
        let then_block = self.parse_block();
        let else_branch = if self.eat(SyntaxKind::ELSE_KW) {
            if self.at(SyntaxKind::IF_KW) {
                let nested_start = self.start();
                Some(ElseBranch::If(Box::new(self.parse_if(nested_start))))
            } else {
                Some(ElseBranch::Block(self.parse_block()))
            }
        } else {
            None
        };
        IfStmt {
            condition,
            then_block,
            else_branch,
            range: self.range_from(start),
        }
    }

    /// `[for x in src (if cond)?]` after the opening bracket.
    fn parse_for_clause(&mut self, start: TextSize) -> Option<ForClause> {
        self.expect(SyntaxKind::FOR_KW);
        let binding = self.name()?;
        // Extra bindings (`for i, x in ...`) are accepted; the first is primary.
        while self.eat(SyntaxKind::COMMA) {
            self.name();
        }
        self.expect(SyntaxKind::IN_KW);
        let iterable = self.parse_expr();
        let filter = if self.eat(SyntaxKind::IF_KW) {
            Some(self.parse_expr())
        } else {
            None
        };
        Some(ForClause {
            binding,
            iterable,
            filter,
            range: self.range_from(start),
        })
    }

    fn parse_comprehension_statement(&mut self, start: TextSize) -> Stmt {
        self.bump();
        let Some(clause) = self.parse_for_clause(start) else {
            return Stmt::Error(self.recover());
        };
        if self.eat(SyntaxKind::COLON) {
            let expr = self.finish_comprehension_expr(start, clause);
            return self.finish_expression_statement(start, expr);
        }
        self.expect(SyntaxKind::R_BRACKET);
        self.skip_separators();
        let body = if self.at_eof() || self.at(SyntaxKind::R_BRACE) {
            self.error("expected statement after comprehension");
            Stmt::Error(TextRange::empty(self.prev_end))
        } else {
            self.parse_statement()
        };
        Stmt::Comprehension(ComprehensionStmt {
            clause,
            body: Box::new(body),
            range: self.range_from(start),
        })
    }

    fn parse_expression_statement(&mut self, start: TextSize) -> Stmt {
        let expr = self.parse_expr();
        if matches!(expr, Expr::Error(_)) && self.prev_end <= start {
            return Stmt::Error(expr.range());
        }
        self.finish_expression_statement(start, expr)
    }

    fn finish_expression_statement(&mut self, start: TextSize, expr: Expr) -> Stmt {
        let op = match self.kind() {
            _ if self.at_eof() => None,
            SyntaxKind::EQ => Some(AssignOp::Assign),
            SyntaxKind::PLUS_EQ => Some(AssignOp::Add),
            SyntaxKind::MINUS_EQ => Some(AssignOp::Sub),
            SyntaxKind::STAR_EQ => Some(AssignOp::Mul),
            SyntaxKind::SLASH_EQ => Some(AssignOp::Div),
            _ => None,
        };
        match op {
            Some(op) => {
                self.bump();
                let value = self.parse_expr();
                Stmt::Assign(AssignStmt {
                    target: expr,
                    op,
                    value,
                    range: self.range_from(start),
                })
            }
            None => Stmt::Expr(expr),
        }
    }

    // =========================================================================
    // Types
    // =========================================================================

    fn parse_type_ref(&mut self) -> Option<TypeRef> {
        let start = self.start();
        let mut path = vec![self.name()?];
        while self.at(SyntaxKind::DOT) && self.nth_is_name(1) {
            self.bump();
            path.push(self.name()?);
        }
        let mut array_depth = 0u8;
        while self.at(SyntaxKind::L_BRACKET) && self.nth(1) == SyntaxKind::R_BRACKET {
            self.bump();
            self.bump();
            array_depth = array_depth.saturating_add(1);
        }
        Some(TypeRef {
            path,
            array_depth,
            range: self.range_from(start),
        })
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    fn parse_expr(&mut self) -> Expr {
        if !self.enter() {
            self.exit();
            return Expr::Error(TextRange::empty(self.start()));
        }
        let expr = self.parse_binary(0);
        self.exit();
        expr
    }

    fn parse_binary(&mut self, min_prec: u8) -> Expr {
        let start = self.start();
        let mut lhs = self.parse_unary();
        loop {
            if self.at_eof() {
                break;
            }
            if self.at(SyntaxKind::DOT_DOT) {
                if RANGE_PREC < min_prec {
                    break;
                }
                self.bump();
                let rhs = self.parse_binary(RANGE_PREC + 1);
                lhs = Expr::Range {
                    start: Box::new(lhs),
                    end: Box::new(rhs),
                    range: self.range_from(start),
                };
                continue;
            }
            let Some((op, prec)) = binary_op(self.kind()) else {
                break;
            };
            if prec < min_prec {
                break;
            }
            self.bump();
            let rhs = self.parse_binary(prec + 1);
            lhs = Expr::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
                range: self.range_from(start),
            };
        }
        lhs
    }

    fn parse_unary(&mut self) -> Expr {
        let start = self.start();
        let op = match self.kind() {
            _ if self.at_eof() => None,
            SyntaxKind::MINUS => Some(UnaryOp::Neg),
            SyntaxKind::BANG => Some(UnaryOp::Not),
            _ => None,
        };
        match op {
            Some(op) => {
                if !self.enter() {
                    self.exit();
                    return Expr::Error(TextRange::empty(start));
                }
                self.bump();
                let operand = self.parse_unary();
                self.exit();
                Expr::Unary {
                    op,
                    operand: Box::new(operand),
                    range: self.range_from(start),
                }
            }
            None => self.parse_postfix(),
        }
    }

    fn parse_postfix(&mut self) -> Expr {
        let start = self.start();
        let mut expr = self.parse_primary();
        if matches!(expr, Expr::Error(_)) {
            return expr;
        }
        loop {
            if self.at(SyntaxKind::DOT) && self.nth_is_name(1) {
                self.bump();
                let Some(member) = self.name() else {
                    break;
                };
                expr = Expr::Member {
                    object: Box::new(expr),
                    member,
                    range: self.range_from(start),
                };
            } else if self.at(SyntaxKind::L_PAREN) && !self.at_line_start() {
                self.bump();
                let args = self.parse_expr_list(SyntaxKind::R_PAREN);
                self.expect(SyntaxKind::R_PAREN);
                expr = Expr::Call {
                    callee: Box::new(expr),
                    args,
                    range: self.range_from(start),
                };
            } else if self.at(SyntaxKind::L_BRACKET) && !self.at_line_start() {
                self.bump();
                let index = self.parse_expr();
                self.expect(SyntaxKind::R_BRACKET);
                expr = Expr::Index {
                    object: Box::new(expr),
                    index: Box::new(index),
                    range: self.range_from(start),
                };
            } else {
                break;
            }
        }
        expr
    }

    fn parse_expr_list(&mut self, close: SyntaxKind) -> Vec<Expr> {
        let mut items = Vec::new();
        while !self.at_eof() && !self.at(close) {
            let before = self.pos;
            items.push(self.parse_expr());
            if self.pos == before {
                break;
            }
            if !self.eat(SyntaxKind::COMMA) {
                break;
            }
        }
        items
    }

    fn parse_primary(&mut self) -> Expr {
        let start = self.start();
        let Some(token) = self.current().copied() else {
            self.error("expected expression");
            return Expr::Error(TextRange::empty(self.len));
        };
        match token.kind {
            SyntaxKind::STRING | SyntaxKind::UNTERMINATED_STRING => {
                self.bump();
                Expr::String(StringLit {
                    raw: SmolStr::new(token.text),
                    range: token.range,
                })
            }
            SyntaxKind::INTEGER | SyntaxKind::DECIMAL => {
                self.bump();
                Expr::Number {
                    text: SmolStr::new(token.text),
                    range: token.range,
                }
            }
            SyntaxKind::TRUE_KW | SyntaxKind::FALSE_KW => {
                self.bump();
                Expr::Bool {
                    value: token.kind == SyntaxKind::TRUE_KW,
                    range: token.range,
                }
            }
            SyntaxKind::NULL_KW => {
                self.bump();
                Expr::Null(token.range)
            }
            SyntaxKind::L_PAREN => {
                self.bump();
                let inner = self.parse_expr();
                self.expect(SyntaxKind::R_PAREN);
                Expr::Paren {
                    inner: Box::new(inner),
                    range: self.range_from(start),
                }
            }
            SyntaxKind::L_BRACKET => {
                self.bump();
                if self.at(SyntaxKind::FOR_KW) {
                    let Some(clause) = self.parse_for_clause(start) else {
                        return Expr::Error(self.range_from(start));
                    };
                    self.expect(SyntaxKind::COLON);
                    return self.finish_comprehension_expr(start, clause);
                }
                let items = self.parse_expr_list(SyntaxKind::R_BRACKET);
                self.expect(SyntaxKind::R_BRACKET);
                Expr::Array {
                    items,
                    range: self.range_from(start),
                }
            }
            SyntaxKind::L_BRACE => self.parse_object(start),
            kind if is_expr_name_kind(kind) => {
                self.bump();
                Expr::Ident(Name {
                    text: SmolStr::new(token.text),
                    range: token.range,
                })
            }
            _ => {
                self.error("expected expression");
                Expr::Error(token.range)
            }
        }
    }

    /// Body of `[for x in src: body]` after the colon.
    fn finish_comprehension_expr(&mut self, start: TextSize, clause: ForClause) -> Expr {
        let body = self.parse_expr();
        self.expect(SyntaxKind::R_BRACKET);
        Expr::Comprehension {
            clause: Box::new(clause),
            body: Box::new(body),
            range: self.range_from(start),
        }
    }

    fn parse_object(&mut self, start: TextSize) -> Expr {
        self.bump();
        let mut entries = Vec::new();
        loop {
            self.skip_separators();
            if self.at_eof() || self.at(SyntaxKind::R_BRACE) || self.too_deep {
                break;
            }
            let key = if self.at_name() {
                self.name()
            } else if self.kind().is_string() {
                self.bump().map(|t| {
                    let lit = StringLit {
                        raw: SmolStr::new(t.text),
                        range: t.range,
                    };
                    Name {
                        text: SmolStr::new(lit.value()),
                        range: t.range,
                    }
                })
            } else {
                self.error("expected object key");
                self.recover();
                continue;
            };
            let Some(key) = key else {
                continue;
            };
            if !self.eat(SyntaxKind::COLON) && !self.eat(SyntaxKind::EQ) {
                self.error("expected ':' after object key");
                continue;
            }
            let value = self.parse_expr();
            entries.push(ObjectEntry { key, value });
        }
        self.expect(SyntaxKind::R_BRACE);
        Expr::Object {
            entries,
            range: self.range_from(start),
        }
    }
}

const RANGE_PREC: u8 = 4;

fn binary_op(kind: SyntaxKind) -> Option<(BinaryOp, u8)> {
    let op = match kind {
        SyntaxKind::PIPE_PIPE => (BinaryOp::Or, 1),
        SyntaxKind::AMP_AMP => (BinaryOp::And, 2),
        SyntaxKind::EQ_EQ => (BinaryOp::Eq, 3),
        SyntaxKind::BANG_EQ => (BinaryOp::NotEq, 3),
        SyntaxKind::LT => (BinaryOp::Lt, 3),
        SyntaxKind::GT => (BinaryOp::Gt, 3),
        SyntaxKind::LT_EQ => (BinaryOp::LtEq, 3),
        SyntaxKind::GT_EQ => (BinaryOp::GtEq, 3),
        SyntaxKind::PLUS => (BinaryOp::Add, 5),
        SyntaxKind::MINUS => (BinaryOp::Sub, 5),
        SyntaxKind::STAR => (BinaryOp::Mul, 6),
        SyntaxKind::SLASH => (BinaryOp::Div, 6),
        SyntaxKind::PERCENT => (BinaryOp::Rem, 6),
        _ => return None,
    };
    Some(op)
}

fn is_name_kind(kind: SyntaxKind) -> bool {
    kind == SyntaxKind::IDENT || kind.is_keyword()
}

/// Keywords that may still appear as plain identifiers inside expressions.
fn is_expr_name_kind(kind: SyntaxKind) -> bool {
    matches!(
        kind,
        SyntaxKind::IDENT
            | SyntaxKind::FROM_KW
            | SyntaxKind::SCHEMA_KW
            | SyntaxKind::RESOURCE_KW
            | SyntaxKind::COMPONENT_KW
            | SyntaxKind::INPUT_KW
            | SyntaxKind::OUTPUT_KW
            | SyntaxKind::TYPE_KW
    )
}

/// A lone, non-array, single-segment type is really a binding name.
fn type_ref_as_name(ty: TypeRef) -> Option<Name> {
    if ty.array_depth == 0 && ty.path.len() == 1 {
        ty.path.into_iter().next()
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_ok(input: &str) -> Arc<SourceFile> {
        let parse = parse(input);
        assert!(parse.errors.is_empty(), "unexpected errors: {:?}", parse.errors);
        parse.tree.unwrap()
    }

    #[test]
    fn test_parse_schema_with_defaults() {
        let file = parse_ok("schema Config { string host; number port = 8080 }");
        let Stmt::Schema(schema) = &file.statements[0] else {
            panic!("expected schema");
        };
        assert_eq!(schema.name.as_str(), "Config");
        assert_eq!(schema.properties.len(), 2);
        assert!(schema.properties[0].default.is_none());
        assert!(schema.properties[1].default.is_some());
    }

    #[test]
    fn test_resource_instance_vs_component_definition() {
        let file = parse_ok(
            "resource AWS.S3.Bucket photos { name = \"p\" }\
             \ncomponent Web { input string port = \"80\" }",
        );
        let Stmt::Resource(resource) = &file.statements[0] else {
            panic!("expected resource");
        };
        assert_eq!(resource.ty.path_text(), "AWS.S3.Bucket");
        assert_eq!(resource.body.properties().len(), 1);
        let Stmt::Component(component) = &file.statements[1] else {
            panic!("expected component");
        };
        assert!(component.is_definition());
        assert!(matches!(component.body.statements()[0], Stmt::Input(_)));
    }

    #[test]
    fn test_keyword_property_names_in_instances() {
        let file = parse_ok("resource EC2.Instance web { type = \"t3.micro\"\n input = 1 }");
        let Stmt::Resource(resource) = &file.statements[0] else {
            panic!("expected resource");
        };
        let keys: Vec<_> = resource.body.properties().iter().map(|p| p.key.as_str()).collect();
        assert_eq!(keys, vec!["type", "input"]);
    }

    #[test]
    fn test_newline_separates_call_from_paren() {
        let file = parse_ok("var a = b\n(c)");
        assert_eq!(file.statements.len(), 2);
    }

    #[test]
    fn test_function_without_params() {
        let file = parse_ok("fun f() number { var x = 1\n return x }");
        let Stmt::Function(function) = &file.statements[0] else {
            panic!("expected function");
        };
        assert!(function.params.is_empty());
        assert_eq!(function.body.statements.len(), 2);
        assert_eq!(function.return_type.as_ref().unwrap().display(), "number");
    }

    #[test]
    fn test_comprehension_statement() {
        let file = parse_ok("[for env in [\"dev\", \"prod\"]]\nresource Bucket b { name = env }");
        let Stmt::Comprehension(comp) = &file.statements[0] else {
            panic!("expected comprehension");
        };
        assert_eq!(comp.clause.binding.as_str(), "env");
        assert!(matches!(*comp.body, Stmt::Resource(_)));
    }

    #[test]
    fn test_recovers_after_bad_statement() {
        let parse = parse("var = \nvar ok = 1\n}");
        assert!(!parse.errors.is_empty());
        let tree = parse.tree.unwrap();
        assert!(
            tree.statements
                .iter()
                .any(|s| matches!(s, Stmt::Var(v) if v.name.as_str() == "ok"))
        );
    }

    #[test]
    fn test_deep_nesting_yields_no_tree() {
        let input = format!("var x = {}1{}", "(".repeat(400), ")".repeat(400));
        let parse = parse(&input);
        assert!(parse.tree.is_none());
        assert!(!parse.errors.is_empty());
    }

    #[test]
    fn test_decorated_resource() {
        let file = parse_ok("@count(3)\n@tags({env: \"prod\"})\nresource Bucket b {}");
        assert_eq!(file.statements[0].decorators().len(), 2);
    }
}
