//! Definition and property locator.
//!
//! Name-indexed linear scans over a parsed document. Every lookup returns
//! `None` (or an empty list) when nothing matches; callers treat that as
//! "cannot resolve" and skip or downgrade whatever depended on it.

use smol_str::SmolStr;
use text_size::TextRange;

use super::declarations::DeclarationKind;
use crate::base::LineIndex;
use crate::parser::{
    Body, ComponentDecl, Decorator, ElseBranch, FunctionDecl, IfStmt, ImportItems, Name, SchemaDecl,
    SourceFile, Stmt, TypeAliasDecl, TypeRef,
};

// ============================================================================
// TYPES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberKind {
    Property,
    Input,
    Output,
}

impl MemberKind {
    pub fn display(self) -> &'static str {
        match self {
            MemberKind::Property => "property",
            MemberKind::Input => "input",
            MemberKind::Output => "output",
        }
    }
}

/// A schema property or component input/output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberInfo {
    pub name: SmolStr,
    pub type_name: SmolStr,
    pub kind: MemberKind,
    pub has_default: bool,
    /// Populated by the provisioning backend (`@cloud`), never by the user.
    pub is_cloud: bool,
    pub name_range: TextRange,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportInfo {
    pub path: SmolStr,
    pub is_wildcard: bool,
    pub symbols: Vec<Name>,
    pub source_range: TextRange,
    /// 0-indexed line of the import statement.
    pub line: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstanceKind {
    Resource,
    Component,
}

/// A resource or component instance (a declaration with an instance name).
#[derive(Debug, Clone, Copy)]
pub struct Instance<'a> {
    pub kind: InstanceKind,
    pub ty: &'a TypeRef,
    pub name: &'a Name,
    pub body: &'a Body,
    pub decorators: &'a [Decorator],
    pub range: TextRange,
}

impl Instance<'_> {
    /// Last segment of the instance type, matched against definition names.
    pub fn type_name(&self) -> &str {
        self.ty.last_segment().map(|n| n.as_str()).unwrap_or("")
    }
}

// ============================================================================
// DEFINITIONS
// ============================================================================

/// Final segment of a possibly dotted owner name (`Vendor.Service.Bucket`).
pub fn last_segment(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}

/// Name range of the top-level definition of `name` with the given kind.
pub fn find_definition(file: &SourceFile, kind: DeclarationKind, name: &str) -> Option<TextRange> {
    let name = last_segment(name);
    file.statements.iter().find_map(|stmt| match (kind, stmt) {
        (DeclarationKind::Schema, Stmt::Schema(s)) if s.name.as_str() == name => Some(s.name.range),
        (DeclarationKind::Function, Stmt::Function(f)) if f.name.as_str() == name => {
            Some(f.name.range)
        }
        (DeclarationKind::Type, Stmt::TypeAlias(t)) if t.name.as_str() == name => {
            Some(t.name.range)
        }
        (DeclarationKind::Component, Stmt::Component(c))
            if c.is_definition() && c.ty.last_segment().is_some_and(|n| n.as_str() == name) =>
        {
            Some(c.ty.range)
        }
        (DeclarationKind::Resource, Stmt::Resource(r)) => {
            r.name.as_ref().filter(|n| n.as_str() == name).map(|n| n.range)
        }
        (DeclarationKind::Variable, Stmt::Var(v)) if v.name.as_str() == name => Some(v.name.range),
        _ => None,
    })
}

pub fn find_schema<'a>(file: &'a SourceFile, name: &str) -> Option<&'a SchemaDecl> {
    let name = last_segment(name);
    file.statements.iter().find_map(|stmt| match stmt {
        Stmt::Schema(s) if s.name.as_str() == name => Some(s),
        _ => None,
    })
}

pub fn find_component_definition<'a>(
    file: &'a SourceFile,
    name: &str,
) -> Option<&'a ComponentDecl> {
    let name = last_segment(name);
    file.statements.iter().find_map(|stmt| match stmt {
        Stmt::Component(c)
            if c.is_definition() && c.ty.last_segment().is_some_and(|n| n.as_str() == name) =>
        {
            Some(c)
        }
        _ => None,
    })
}

pub fn find_function<'a>(file: &'a SourceFile, name: &str) -> Option<&'a FunctionDecl> {
    file.statements.iter().find_map(|stmt| match stmt {
        Stmt::Function(f) if f.name.as_str() == name => Some(f),
        _ => None,
    })
}

pub fn find_type_alias<'a>(file: &'a SourceFile, name: &str) -> Option<&'a TypeAliasDecl> {
    file.statements.iter().find_map(|stmt| match stmt {
        Stmt::TypeAlias(t) if t.name.as_str() == name => Some(t),
        _ => None,
    })
}

// ============================================================================
// MEMBERS
// ============================================================================

pub fn schema_properties(file: &SourceFile, schema: &str) -> Option<Vec<MemberInfo>> {
    let schema = find_schema(file, schema)?;
    Some(
        schema
            .properties
            .iter()
            .map(|p| MemberInfo {
                name: p.name.text.clone(),
                type_name: SmolStr::new(p.ty.display()),
                kind: MemberKind::Property,
                has_default: p.default.is_some(),
                is_cloud: p.decorators.iter().any(|d| d.name.as_str() == "cloud"),
                name_range: p.name.range,
            })
            .collect(),
    )
}

/// Inputs and outputs of a component definition, in declaration order.
pub fn component_members(file: &SourceFile, component: &str) -> Option<Vec<MemberInfo>> {
    let component = find_component_definition(file, component)?;
    Some(
        component
            .body
            .statements()
            .iter()
            .filter_map(|stmt| {
                let (member, kind) = match stmt {
                    Stmt::Input(m) => (m, MemberKind::Input),
                    Stmt::Output(m) => (m, MemberKind::Output),
                    _ => return None,
                };
                Some(MemberInfo {
                    name: member.name.text.clone(),
                    type_name: member
                        .ty
                        .as_ref()
                        .map(|t| SmolStr::new(t.display()))
                        .unwrap_or_else(|| SmolStr::new_static("any")),
                    kind,
                    has_default: member.value.is_some(),
                    is_cloud: false,
                    name_range: member.name.range,
                })
            })
            .collect(),
    )
}

/// Name range of `property` inside schema or component `owner`.
pub fn find_property(file: &SourceFile, owner: &str, property: &str) -> Option<TextRange> {
    let in_schema = schema_properties(file, owner)
        .and_then(|props| props.into_iter().find(|p| p.name == property));
    in_schema
        .or_else(|| {
            component_members(file, owner)
                .and_then(|members| members.into_iter().find(|m| m.name == property))
        })
        .map(|m| m.name_range)
}

// ============================================================================
// IMPORTS & INSTANCES
// ============================================================================

pub fn imports(file: &SourceFile, line_index: &LineIndex) -> Vec<ImportInfo> {
    file.statements
        .iter()
        .filter_map(|stmt| match stmt {
            Stmt::Import(import) => {
                let path = import.path.as_ref()?;
                let (is_wildcard, symbols) = match &import.items {
                    ImportItems::Wildcard(_) => (true, Vec::new()),
                    ImportItems::Named(names) => (false, names.clone()),
                };
                Some(ImportInfo {
                    path: SmolStr::new(path.value()),
                    is_wildcard,
                    symbols,
                    source_range: import.range,
                    line: line_index.line_col(import.range.start()).line,
                })
            }
            _ => None,
        })
        .collect()
}

/// Every resource and component instance, including those nested in
/// component definitions, loops, conditionals and comprehensions.
pub fn instances(file: &SourceFile) -> Vec<Instance<'_>> {
    let mut out = Vec::new();
    walk_statements(&file.statements, &mut |stmt| out.extend(instance(stmt)));
    out
}

/// Instances whose type's last segment matches `type_name`'s last segment.
pub fn instances_of<'a>(file: &'a SourceFile, type_name: &str) -> Vec<Instance<'a>> {
    let wanted = last_segment(type_name);
    instances(file)
        .into_iter()
        .filter(|i| i.type_name() == wanted)
        .collect()
}

fn instance(stmt: &Stmt) -> Option<Instance<'_>> {
    match stmt {
        Stmt::Resource(r) => Some(Instance {
            kind: InstanceKind::Resource,
            ty: &r.ty,
            name: r.name.as_ref()?,
            body: &r.body,
            decorators: &r.decorators,
            range: r.range,
        }),
        Stmt::Component(c) => Some(Instance {
            kind: InstanceKind::Component,
            ty: &c.ty,
            name: c.name.as_ref()?,
            body: &c.body,
            decorators: &c.decorators,
            range: c.range,
        }),
        _ => None,
    }
}

/// Pre-order walk over every statement, descending into definition
/// bodies, blocks and comprehension prefixes.
pub fn walk_statements<'a>(statements: &'a [Stmt], f: &mut dyn FnMut(&'a Stmt)) {
    for stmt in statements {
        f(stmt);
        match stmt {
            Stmt::Resource(r) => walk_statements(r.body.statements(), f),
            Stmt::Component(c) => walk_statements(c.body.statements(), f),
            Stmt::Function(func) => walk_statements(&func.body.statements, f),
            Stmt::For(for_stmt) => walk_statements(&for_stmt.body.statements, f),
            Stmt::While(w) => walk_statements(&w.body.statements, f),
            Stmt::If(i) => walk_if(i, f),
            Stmt::Comprehension(c) => walk_statements(std::slice::from_ref(&*c.body), f),
            _ => {}
        }
    }
}

fn walk_if<'a>(if_stmt: &'a IfStmt, f: &mut dyn FnMut(&'a Stmt)) {
    walk_statements(&if_stmt.then_block.statements, f);
    match &if_stmt.else_branch {
        Some(ElseBranch::Block(block)) => walk_statements(&block.statements, f),
        Some(ElseBranch::If(nested)) => walk_if(nested, f),
        None => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    const SOURCE: &str = r#"
import * from "common.kite"
import Bucket, Queue from "aws.kite"

schema Config {
    string host
    number port = 8080
    @cloud
    string arn
}

component Web {
    input string name
    output string url = "http://${name}"
}

resource Vendor.Config cfg { host = "x" }
component Web site { name = "a" }
"#;

    fn tree() -> std::sync::Arc<SourceFile> {
        parse(SOURCE).tree.unwrap()
    }

    #[test]
    fn test_find_definition_matches_last_segment() {
        let tree = tree();
        assert!(find_definition(&tree, DeclarationKind::Schema, "Vendor.Service.Config").is_some());
        assert!(find_definition(&tree, DeclarationKind::Schema, "Missing").is_none());
        assert!(find_definition(&tree, DeclarationKind::Component, "Web").is_some());
    }

    #[test]
    fn test_schema_properties_flags() {
        let props = schema_properties(&tree(), "Config").unwrap();
        assert_eq!(props.len(), 3);
        assert!(!props[0].has_default);
        assert!(props[1].has_default);
        assert!(props[2].is_cloud);
    }

    #[test]
    fn test_find_property_in_component() {
        let tree = tree();
        let range = find_property(&tree, "Web", "url").unwrap();
        assert_eq!(&SOURCE[range], "url");
    }

    #[test]
    fn test_imports_and_instances() {
        let tree = tree();
        let imports = imports(&tree, &LineIndex::new(SOURCE));
        assert_eq!(imports.len(), 2);
        assert!(imports[0].is_wildcard);
        assert_eq!(imports[1].symbols.len(), 2);
        assert_eq!(imports[1].line, 2);
        assert_eq!(instances_of(&tree, "Config").len(), 1);
        assert_eq!(instances(&tree).len(), 2);
    }

    #[test]
    fn test_walk_reaches_nested_statements() {
        let source = "fun f() {\n  if true {\n    var a = 1\n  } else {\n    var b = 2\n  }\n}\
                      \n[for i in 0..2] resource S r {}";
        let tree = parse(source).tree.unwrap();
        let mut kinds = Vec::new();
        walk_statements(&tree.statements, &mut |stmt| {
            kinds.push(match stmt {
                Stmt::Var(v) => v.name.text.to_string(),
                Stmt::Resource(_) => "resource".to_string(),
                _ => String::new(),
            })
        });
        kinds.retain(|k| !k.is_empty());
        assert_eq!(kinds, vec!["a", "b", "resource"]);
    }
}
