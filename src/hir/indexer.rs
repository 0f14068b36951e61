//! Declaration indexer: a single walk over the AST producing a flat,
//! scope-annotated list of declarations.
//!
//! Context flows downward in an immutable [`IndexContext`] that each
//! recursive call extends with struct-update syntax.

use smol_str::SmolStr;
use text_size::TextRange;

use super::declarations::{Declaration, DeclarationKind, IndexType, IndexedBy, Parameter};
use super::decorators;
use crate::base::DocumentUri;
use crate::parser::{
    Body, ComponentDecl, Decorator, ElseBranch, Expr, ForClause, FunctionDecl, IfStmt, ImportItems,
    ImportStmt, MemberDecl, ResourceDecl, SourceFile, Stmt, TypeAliasMember, TypeRef,
};

// ============================================================================
// CONTEXT
// ============================================================================

/// The enclosing function or component definition.
#[derive(Debug, Clone, Copy)]
struct ScopeInfo<'a> {
    owner: &'a str,
    range: TextRange,
}

/// Index shape induced by an enclosing `for` loop or comprehension.
#[derive(Debug, Clone)]
struct LoopContext {
    variable: SmolStr,
    index_type: IndexType,
    range_start: Option<i64>,
    range_end: Option<i64>,
    string_keys: Option<Vec<SmolStr>>,
}

impl LoopContext {
    fn from_source(variable: &str, source: &Expr) -> Self {
        let mut ctx = LoopContext {
            variable: SmolStr::new(variable),
            index_type: IndexType::String,
            range_start: None,
            range_end: None,
            string_keys: None,
        };
        match source.unparenthesized() {
            Expr::Range { start, end, .. } => {
                ctx.index_type = IndexType::Numeric;
                ctx.range_start = int_literal(start);
                ctx.range_end = int_literal(end);
            }
            Expr::Array { items, .. } => {
                let keys: Option<Vec<SmolStr>> = items
                    .iter()
                    .map(|item| match item.unparenthesized() {
                        Expr::String(lit) => Some(SmolStr::new(lit.value())),
                        _ => None,
                    })
                    .collect();
                ctx.string_keys = keys;
            }
            _ => {}
        }
        ctx
    }

    fn indexed_by(&self) -> IndexedBy {
        IndexedBy {
            index_type: self.index_type,
            loop_variable: self.variable.clone(),
            range_start: self.range_start,
            range_end: self.range_end,
            count_value: None,
            string_keys: self.string_keys.clone(),
        }
    }
}

fn int_literal(expr: &Expr) -> Option<i64> {
    match expr.unparenthesized() {
        Expr::Number { text, .. } => text.parse().ok(),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct IndexContext<'a> {
    scope: Option<ScopeInfo<'a>>,
    /// Innermost `if`, `else`, `while` or `for` body; bounds `var`s.
    block: Option<TextRange>,
    loop_ctx: Option<&'a LoopContext>,
}

impl IndexContext<'_> {
    fn in_block(self, block: TextRange) -> Self {
        Self {
            block: Some(block),
            ..self
        }
    }

    fn var_scope(&self) -> Option<TextRange> {
        self.block.or(self.scope.map(|s| s.range))
    }
}

// ============================================================================
// INDEXER
// ============================================================================

/// Index every declaration in a parsed document.
pub fn index_document(uri: &DocumentUri, file: &SourceFile) -> Vec<Declaration> {
    let mut indexer = Indexer {
        uri: uri.clone(),
        declarations: Vec::new(),
    };
    indexer.statements(&file.statements, IndexContext::default());
    tracing::debug!(uri = %uri, count = indexer.declarations.len(), "indexed document");
    indexer.declarations
}

struct Indexer {
    uri: DocumentUri,
    declarations: Vec<Declaration>,
}

impl Indexer {
    fn declare(
        &self,
        name: &str,
        kind: DeclarationKind,
        source_range: TextRange,
        name_range: TextRange,
    ) -> Declaration {
        Declaration::new(name, kind, source_range, name_range, self.uri.clone())
    }

    fn push(&mut self, decl: Declaration) {
        tracing::trace!(name = %decl.name, kind = decl.kind.display(), "declaration");
        self.declarations.push(decl);
    }

    fn statements(&mut self, statements: &[Stmt], cx: IndexContext<'_>) {
        for stmt in statements {
            self.statement(stmt, cx);
        }
    }

    fn statement(&mut self, stmt: &Stmt, cx: IndexContext<'_>) {
        match stmt {
            Stmt::Import(import) => self.import(import),
            Stmt::Schema(schema) => {
                let mut decl = self.declare(
                    &schema.name.text,
                    DeclarationKind::Schema,
                    schema.range,
                    schema.name.range,
                );
                decl.documentation = documentation(&schema.decorators);
                decl.scope = cx.scope.map(|s| s.range);
                self.push(decl);
            }
            Stmt::Resource(resource) => self.resource(resource, cx),
            Stmt::Component(component) => self.component(component, cx),
            Stmt::Function(function) => self.function(function, cx),
            Stmt::Var(var) => {
                let mut decl = self.declare(
                    &var.name.text,
                    DeclarationKind::Variable,
                    var.range,
                    var.name.range,
                );
                decl.type_name = var.ty.as_ref().map(|t| SmolStr::new(t.display()));
                decl.documentation = documentation(&var.decorators);
                decl.scope = cx.var_scope();
                decl.container = cx.scope.map(|s| SmolStr::new(s.owner));
                self.push(decl);
                if let Some(value) = &var.value {
                    self.expr(value, cx);
                }
            }
            Stmt::Input(member) => self.member(member, DeclarationKind::Input, cx),
            Stmt::Output(member) => self.member(member, DeclarationKind::Output, cx),
            Stmt::TypeAlias(alias) => {
                let mut decl = self.declare(
                    &alias.name.text,
                    DeclarationKind::Type,
                    alias.range,
                    alias.name.range,
                );
                let members: Vec<String> = alias
                    .members
                    .iter()
                    .map(|m| match m {
                        TypeAliasMember::Type(ty) => ty.display(),
                        TypeAliasMember::Literal(expr) => literal_text(expr),
                    })
                    .collect();
                decl.type_name = Some(SmolStr::new(members.join(" | ")));
                decl.documentation = documentation(&alias.decorators);
                decl.scope = cx.scope.map(|s| s.range);
                self.push(decl);
            }
            Stmt::For(for_stmt) => {
                self.expr(&for_stmt.iterable, cx);
                let body_cx = cx.in_block(for_stmt.body.range);
                let Some(first) = for_stmt.bindings.first() else {
                    self.statements(&for_stmt.body.statements, body_cx);
                    return;
                };
                for binding in &for_stmt.bindings {
                    let mut decl = self.declare(
                        &binding.text,
                        DeclarationKind::ForVar,
                        for_stmt.range,
                        binding.range,
                    );
                    decl.scope = Some(for_stmt.body.range);
                    decl.container = cx.scope.map(|s| SmolStr::new(s.owner));
                    self.push(decl);
                }
                let loop_ctx = LoopContext::from_source(&first.text, &for_stmt.iterable);
                self.statements(
                    &for_stmt.body.statements,
                    IndexContext {
                        loop_ctx: Some(&loop_ctx),
                        ..body_cx
                    },
                );
            }
            Stmt::Comprehension(comp) => {
                let loop_ctx = self.for_clause(&comp.clause, comp.range, cx);
                self.statement(
                    &comp.body,
                    IndexContext {
                        loop_ctx: Some(&loop_ctx),
                        ..cx
                    },
                );
            }
            Stmt::While(while_stmt) => {
                self.expr(&while_stmt.condition, cx);
                let body_cx = cx.in_block(while_stmt.body.range);
                self.statements(&while_stmt.body.statements, body_cx);
            }
            Stmt::If(if_stmt) => self.if_stmt(if_stmt, cx),
            Stmt::Return(ret) => {
                if let Some(value) = &ret.value {
                    self.expr(value, cx);
                }
            }
            Stmt::Assign(assign) => {
                self.expr(&assign.target, cx);
                self.expr(&assign.value, cx);
            }
            Stmt::Expr(expr) => self.expr(expr, cx),
            Stmt::Break(_) | Stmt::Continue(_) | Stmt::Error(_) => {}
        }
    }

    /// Wildcard imports produce nothing: their exports are unknown until
    /// the target file is resolved.
    fn import(&mut self, import: &ImportStmt) {
        let ImportItems::Named(names) = &import.items else {
            return;
        };
        let path = import.path.as_ref().map(|p| SmolStr::new(p.value()));
        for name in names {
            let mut decl =
                self.declare(&name.text, DeclarationKind::Import, import.range, name.range);
            decl.import_path = path.clone();
            decl.documentation = path.as_ref().map(|p| format!("imported from `{p}`"));
            self.push(decl);
        }
    }

    fn resource(&mut self, resource: &ResourceDecl, cx: IndexContext<'_>) {
        let Some(name) = &resource.name else {
            self.body(&resource.body, cx);
            return;
        };
        let mut decl =
            self.declare(&name.text, DeclarationKind::Resource, resource.range, name.range);
        let schema = SmolStr::new(resource.ty.path_text());
        decl.type_name = Some(schema.clone());
        decl.schema_name = Some(schema);
        decl.documentation = documentation(&resource.decorators);
        decl.indexed_by = indexed_by(&resource.decorators, cx);
        decl.scope = cx.scope.map(|s| s.range);
        decl.container = cx.scope.map(|s| SmolStr::new(s.owner));
        self.push(decl);
        self.body(&resource.body, cx);
    }

    fn component(&mut self, component: &ComponentDecl, cx: IndexContext<'_>) {
        let type_name = component.ty.path_text();
        match &component.name {
            Some(name) => {
                let mut decl = self.declare(
                    &name.text,
                    DeclarationKind::Component,
                    component.range,
                    name.range,
                );
                decl.type_name = Some(SmolStr::new(&type_name));
                decl.component_type = Some(SmolStr::new(&type_name));
                decl.documentation = documentation(&component.decorators);
                decl.indexed_by = indexed_by(&component.decorators, cx);
                decl.scope = cx.scope.map(|s| s.range);
                decl.container = cx.scope.map(|s| SmolStr::new(s.owner));
                self.push(decl);
                self.body(&component.body, cx);
            }
            None => {
                let mut decl = self.declare(
                    &type_name,
                    DeclarationKind::Component,
                    component.range,
                    component.ty.range,
                );
                decl.documentation = documentation(&component.decorators);
                decl.scope = cx.scope.map(|s| s.range);
                self.push(decl);
                self.statements(
                    component.body.statements(),
                    IndexContext {
                        scope: Some(ScopeInfo {
                            owner: &type_name,
                            range: component.body.range,
                        }),
                        block: None,
                        loop_ctx: None,
                    },
                );
            }
        }
    }

    /// Property values may hold comprehensions with their own bindings.
    fn body(&mut self, body: &Body, cx: IndexContext<'_>) {
        self.statements(body.statements(), cx);
        for property in body.properties() {
            self.expr(&property.value, cx);
        }
    }

    fn function(&mut self, function: &FunctionDecl, cx: IndexContext<'_>) {
        let mut decl = self.declare(
            &function.name.text,
            DeclarationKind::Function,
            function.range,
            function.name.range,
        );
        decl.parameters = function
            .params
            .iter()
            .map(|p| Parameter {
                type_name: p.ty.as_ref().map(|t| SmolStr::new(t.display())),
                name: p.name.text.clone(),
            })
            .collect();
        decl.return_type = function.return_type.as_ref().map(type_text);
        decl.documentation = documentation(&function.decorators);
        decl.scope = cx.scope.map(|s| s.range);
        self.push(decl);

        let body_scope = function.body.range;
        for param in &function.params {
            let mut decl = self.declare(
                &param.name.text,
                DeclarationKind::Variable,
                param.range,
                param.name.range,
            );
            decl.type_name = param.ty.as_ref().map(type_text);
            decl.documentation = Some(format!("parameter of `{}`", function.name.text));
            decl.scope = Some(body_scope);
            decl.container = Some(function.name.text.clone());
            self.push(decl);
        }

        // Walk the body even when there are no parameters.
        self.statements(
            &function.body.statements,
            IndexContext {
                scope: Some(ScopeInfo {
                    owner: &function.name.text,
                    range: body_scope,
                }),
                block: None,
                loop_ctx: None,
            },
        );
    }

    fn member(&mut self, member: &MemberDecl, kind: DeclarationKind, cx: IndexContext<'_>) {
        if member.name.text.is_empty() {
            return;
        }
        let mut decl = self.declare(&member.name.text, kind, member.range, member.name.range);
        decl.type_name = member.ty.as_ref().map(type_text);
        decl.documentation = documentation(&member.decorators);
        decl.scope = cx.scope.map(|s| s.range);
        decl.container = cx.scope.map(|s| SmolStr::new(s.owner));
        self.push(decl);
        if let Some(value) = &member.value {
            self.expr(value, cx);
        }
    }

    fn if_stmt(&mut self, if_stmt: &IfStmt, cx: IndexContext<'_>) {
        self.expr(&if_stmt.condition, cx);
        self.statements(&if_stmt.then_block.statements, cx.in_block(if_stmt.then_block.range));
        match &if_stmt.else_branch {
            Some(ElseBranch::Block(block)) => {
                self.statements(&block.statements, cx.in_block(block.range))
            }
            Some(ElseBranch::If(nested)) => self.if_stmt(nested, cx),
            None => {}
        }
    }

    /// Declare a comprehension binding scoped to `scope` and return the loop
    /// context it induces.
    fn for_clause(
        &mut self,
        clause: &ForClause,
        scope: TextRange,
        cx: IndexContext<'_>,
    ) -> LoopContext {
        self.expr(&clause.iterable, cx);
        let mut decl = self.declare(
            &clause.binding.text,
            DeclarationKind::ForVar,
            scope,
            clause.binding.range,
        );
        decl.scope = Some(scope);
        decl.container = cx.scope.map(|s| SmolStr::new(s.owner));
        self.push(decl);
        if let Some(filter) = &clause.filter {
            self.expr(filter, cx);
        }
        LoopContext::from_source(&clause.binding.text, &clause.iterable)
    }

    /// Only comprehension expressions introduce names inside expressions.
    fn expr(&mut self, expr: &Expr, cx: IndexContext<'_>) {
        match expr {
            Expr::Comprehension { clause, body, range } => {
                self.for_clause(clause, *range, cx);
                self.expr(body, cx);
            }
            Expr::Paren { inner, .. } => self.expr(inner, cx),
            Expr::Member { object, .. } => self.expr(object, cx),
            Expr::Call { callee, args, .. } => {
                self.expr(callee, cx);
                for arg in args {
                    self.expr(arg, cx);
                }
            }
            Expr::Index { object, index, .. } => {
                self.expr(object, cx);
                self.expr(index, cx);
            }
            Expr::Array { items, .. } => {
                for item in items {
                    self.expr(item, cx);
                }
            }
            Expr::Object { entries, .. } => {
                for entry in entries {
                    self.expr(&entry.value, cx);
                }
            }
            Expr::Range { start, end, .. } => {
                self.expr(start, cx);
                self.expr(end, cx);
            }
            Expr::Unary { operand, .. } => self.expr(operand, cx),
            Expr::Binary { lhs, rhs, .. } => {
                self.expr(lhs, cx);
                self.expr(rhs, cx);
            }
            Expr::String(_)
            | Expr::Number { .. }
            | Expr::Bool { .. }
            | Expr::Null(_)
            | Expr::Ident(_)
            | Expr::Error(_) => {}
        }
    }
}

fn type_text(ty: &TypeRef) -> SmolStr {
    SmolStr::new(ty.display())
}

fn literal_text(expr: &Expr) -> String {
    match expr.unparenthesized() {
        Expr::String(lit) => lit.raw.to_string(),
        Expr::Number { text, .. } => text.to_string(),
        Expr::Bool { value, .. } => value.to_string(),
        Expr::Null(_) => "null".to_string(),
        Expr::Unary { operand, .. } => format!("-{}", literal_text(operand)),
        _ => "?".to_string(),
    }
}

fn documentation(decorators: &[Decorator]) -> Option<String> {
    decorators
        .iter()
        .find(|d| d.name.as_str() == "description")
        .and_then(decorators::description_text)
}

/// `@count` wins over an enclosing loop.
fn indexed_by(decorators: &[Decorator], cx: IndexContext<'_>) -> Option<IndexedBy> {
    if let Some(count) = decorators.iter().find(|d| d.name.as_str() == "count") {
        return Some(IndexedBy {
            index_type: IndexType::Numeric,
            loop_variable: SmolStr::new_static("count"),
            range_start: None,
            range_end: None,
            count_value: decorators::count_value(count),
            string_keys: None,
        });
    }
    cx.loop_ctx.map(LoopContext::indexed_by)
}
