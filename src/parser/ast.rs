//! Typed AST for Kite source files.
//!
//! Every node is a plain enum or struct carrying its [`TextRange`], so
//! consumers dispatch with exhaustive `match` instead of probing node types
//! at runtime. Trees are built once per document snapshot and never mutated.

use smol_str::SmolStr;
use text_size::TextRange;

// ============================================================================
// Root
// ============================================================================

/// A parsed document.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceFile {
    pub statements: Vec<Stmt>,
    pub range: TextRange,
}

/// An identifier with its location.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Name {
    pub text: SmolStr,
    pub range: TextRange,
}

impl Name {
    pub fn as_str(&self) -> &str {
        &self.text
    }
}

/// A type annotation: `string`, `number[]`, `AWS.S3.Bucket`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeRef {
    pub path: Vec<Name>,
    pub array_depth: u8,
    pub range: TextRange,
}

impl TypeRef {
    /// Dotted path without array suffixes (`AWS.S3.Bucket`).
    pub fn path_text(&self) -> String {
        self.path
            .iter()
            .map(|n| n.as_str())
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Full display form including array suffixes (`string[]`).
    pub fn display(&self) -> String {
        let mut text = self.path_text();
        for _ in 0..self.array_depth {
            text.push_str("[]");
        }
        text
    }

    /// The last path segment, used to match declarations by name.
    pub fn last_segment(&self) -> Option<&Name> {
        self.path.last()
    }
}

// ============================================================================
// Decorators
// ============================================================================

/// `@name` or `@name(args)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Decorator {
    pub name: Name,
    pub args: Option<DecoratorArgs>,
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DecoratorArgs {
    pub args: Vec<DecoratorArg>,
    pub range: TextRange,
}

/// A positional (`3`) or named (`regex: "x"`) decorator argument.
#[derive(Debug, Clone, PartialEq)]
pub struct DecoratorArg {
    pub key: Option<Name>,
    pub value: Expr,
}

impl Decorator {
    /// Positional and named arguments, empty for `@name` and `@name()`.
    pub fn arguments(&self) -> &[DecoratorArg] {
        self.args.as_ref().map(|a| a.args.as_slice()).unwrap_or(&[])
    }
}

// ============================================================================
// Statements
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Import(ImportStmt),
    Schema(SchemaDecl),
    Resource(ResourceDecl),
    Component(ComponentDecl),
    Function(FunctionDecl),
    Var(VarDecl),
    Input(MemberDecl),
    Output(MemberDecl),
    TypeAlias(TypeAliasDecl),
    For(ForStmt),
    While(WhileStmt),
    If(IfStmt),
    Return(ReturnStmt),
    Break(TextRange),
    Continue(TextRange),
    /// `[for x in src] statement`
    Comprehension(ComprehensionStmt),
    Assign(AssignStmt),
    Expr(Expr),
    /// Tokens skipped during error recovery.
    Error(TextRange),
}

impl Stmt {
    pub fn range(&self) -> TextRange {
        match self {
            Stmt::Import(s) => s.range,
            Stmt::Schema(s) => s.range,
            Stmt::Resource(s) => s.range,
            Stmt::Component(s) => s.range,
            Stmt::Function(s) => s.range,
            Stmt::Var(s) => s.range,
            Stmt::Input(s) | Stmt::Output(s) => s.range,
            Stmt::TypeAlias(s) => s.range,
            Stmt::For(s) => s.range,
            Stmt::While(s) => s.range,
            Stmt::If(s) => s.range,
            Stmt::Return(s) => s.range,
            Stmt::Comprehension(s) => s.range,
            Stmt::Assign(s) => s.range,
            Stmt::Expr(e) => e.range(),
            Stmt::Break(r) | Stmt::Continue(r) | Stmt::Error(r) => *r,
        }
    }

    /// Decorators attached to a declaration statement.
    pub fn decorators(&self) -> &[Decorator] {
        match self {
            Stmt::Schema(s) => &s.decorators,
            Stmt::Resource(s) => &s.decorators,
            Stmt::Component(s) => &s.decorators,
            Stmt::Function(s) => &s.decorators,
            Stmt::Var(s) => &s.decorators,
            Stmt::Input(s) | Stmt::Output(s) => &s.decorators,
            Stmt::TypeAlias(s) => &s.decorators,
            Stmt::Comprehension(s) => s.body.decorators(),
            _ => &[],
        }
    }
}

/// `import * from "path"` or `import A, B from "path"`.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportStmt {
    pub items: ImportItems,
    pub path: Option<StringLit>,
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ImportItems {
    Wildcard(TextRange),
    Named(Vec<Name>),
}

/// `schema Name { type prop = default ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaDecl {
    pub decorators: Vec<Decorator>,
    pub name: Name,
    pub properties: Vec<SchemaProperty>,
    pub body_range: TextRange,
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SchemaProperty {
    pub decorators: Vec<Decorator>,
    pub ty: TypeRef,
    pub name: Name,
    pub default: Option<Expr>,
    pub range: TextRange,
}

/// The braces of a resource or component, holding either statements
/// (a definition) or property assignments (an instance).
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub kind: BodyKind,
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BodyKind {
    Statements(Vec<Stmt>),
    Properties(Vec<PropertyAssignment>),
}

impl Body {
    pub fn statements(&self) -> &[Stmt] {
        match &self.kind {
            BodyKind::Statements(stmts) => stmts,
            BodyKind::Properties(_) => &[],
        }
    }

    pub fn properties(&self) -> &[PropertyAssignment] {
        match &self.kind {
            BodyKind::Properties(props) => props,
            BodyKind::Statements(_) => &[],
        }
    }
}

/// `key = value` inside a resource or component instance.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyAssignment {
    pub key: Name,
    pub value: Expr,
    pub range: TextRange,
}

/// `resource Type name { ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceDecl {
    pub decorators: Vec<Decorator>,
    pub ty: TypeRef,
    pub name: Option<Name>,
    pub body: Body,
    pub range: TextRange,
}

/// `component Name { ... }` (definition) or `component Name instance { ... }`.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentDecl {
    pub decorators: Vec<Decorator>,
    pub ty: TypeRef,
    pub name: Option<Name>,
    pub body: Body,
    pub range: TextRange,
}

impl ComponentDecl {
    pub fn is_definition(&self) -> bool {
        self.name.is_none()
    }
}

/// `fun name(type a, type b) returnType { ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    pub decorators: Vec<Decorator>,
    pub name: Name,
    pub params: Vec<Param>,
    pub return_type: Option<TypeRef>,
    pub body: Block,
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub ty: Option<TypeRef>,
    pub name: Name,
    pub range: TextRange,
}

/// A braced statement list.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub statements: Vec<Stmt>,
    pub range: TextRange,
}

/// `var [type] name = value`
#[derive(Debug, Clone, PartialEq)]
pub struct VarDecl {
    pub decorators: Vec<Decorator>,
    pub ty: Option<TypeRef>,
    pub name: Name,
    pub value: Option<Expr>,
    pub range: TextRange,
}

/// `input type name [= default]` / `output type name [= value]`
#[derive(Debug, Clone, PartialEq)]
pub struct MemberDecl {
    pub decorators: Vec<Decorator>,
    pub ty: Option<TypeRef>,
    pub name: Name,
    pub value: Option<Expr>,
    pub range: TextRange,
}

/// `type Region = "us" | "eu"`
#[derive(Debug, Clone, PartialEq)]
pub struct TypeAliasDecl {
    pub decorators: Vec<Decorator>,
    pub name: Name,
    pub members: Vec<TypeAliasMember>,
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeAliasMember {
    Literal(Expr),
    Type(TypeRef),
}

/// `for x in source { ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct ForStmt {
    pub bindings: Vec<Name>,
    pub iterable: Expr,
    pub body: Block,
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WhileStmt {
    pub condition: Expr,
    pub body: Block,
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfStmt {
    pub condition: Expr,
    pub then_block: Block,
    pub else_branch: Option<ElseBranch>,
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ElseBranch {
    Block(Block),
    If(Box<IfStmt>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStmt {
    pub value: Option<Expr>,
    pub range: TextRange,
}

/// `[for x in source if cond]` shared by statements and expressions.
#[derive(Debug, Clone, PartialEq)]
pub struct ForClause {
    pub binding: Name,
    pub iterable: Expr,
    pub filter: Option<Expr>,
    pub range: TextRange,
}

/// `[for env in envs] resource Bucket b { ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct ComprehensionStmt {
    pub clause: ForClause,
    pub body: Box<Stmt>,
    pub range: TextRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    Assign,
    Add,
    Sub,
    Mul,
    Div,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssignStmt {
    pub target: Expr,
    pub op: AssignOp,
    pub value: Expr,
    pub range: TextRange,
}

// ============================================================================
// Expressions
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct StringLit {
    /// Source text including quotes.
    pub raw: SmolStr,
    pub range: TextRange,
}

impl StringLit {
    /// Contents between the quotes.
    pub fn value(&self) -> &str {
        let raw = self.raw.as_str();
        let inner = raw.get(1..).unwrap_or("");
        match raw.chars().next() {
            Some(q) if inner.ends_with(q) => &inner[..inner.len() - 1],
            _ => inner,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Or,
    And,
    Eq,
    NotEq,
    Lt,
    Gt,
    LtEq,
    GtEq,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectEntry {
    pub key: Name,
    pub value: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    String(StringLit),
    Number { text: SmolStr, range: TextRange },
    Bool { value: bool, range: TextRange },
    Null(TextRange),
    Ident(Name),
    Paren { inner: Box<Expr>, range: TextRange },
    Member { object: Box<Expr>, member: Name, range: TextRange },
    Call { callee: Box<Expr>, args: Vec<Expr>, range: TextRange },
    Index { object: Box<Expr>, index: Box<Expr>, range: TextRange },
    Array { items: Vec<Expr>, range: TextRange },
    Object { entries: Vec<ObjectEntry>, range: TextRange },
    Comprehension { clause: Box<ForClause>, body: Box<Expr>, range: TextRange },
    Range { start: Box<Expr>, end: Box<Expr>, range: TextRange },
    Unary { op: UnaryOp, operand: Box<Expr>, range: TextRange },
    Binary { op: BinaryOp, lhs: Box<Expr>, rhs: Box<Expr>, range: TextRange },
    Error(TextRange),
}

impl Expr {
    pub fn range(&self) -> TextRange {
        match self {
            Expr::String(s) => s.range,
            Expr::Ident(n) => n.range,
            Expr::Null(range) | Expr::Error(range) => *range,
            Expr::Number { range, .. }
            | Expr::Bool { range, .. }
            | Expr::Paren { range, .. }
            | Expr::Member { range, .. }
            | Expr::Call { range, .. }
            | Expr::Index { range, .. }
            | Expr::Array { range, .. }
            | Expr::Object { range, .. }
            | Expr::Comprehension { range, .. }
            | Expr::Range { range, .. }
            | Expr::Unary { range, .. }
            | Expr::Binary { range, .. } => *range,
        }
    }

    /// Strip redundant parentheses.
    pub fn unparenthesized(&self) -> &Expr {
        let mut expr = self;
        while let Expr::Paren { inner, .. } = expr {
            expr = inner;
        }
        expr
    }

    /// The identifier this expression names, if it is a bare identifier.
    pub fn as_ident(&self) -> Option<&Name> {
        match self.unparenthesized() {
            Expr::Ident(name) => Some(name),
            _ => None,
        }
    }
}
