//! Closed registry of recognized decorators.
//!
//! Both the indexer (for `@count` and `@description`) and the decorator
//! validation pass consult this table. Argument checks only reject literal
//! shapes that can never fit; identifiers and other non-literal expressions
//! are accepted because their value is only known at evaluation time.

use indexmap::IndexMap;
use once_cell::sync::Lazy;

use crate::parser::{Decorator, Expr, UnaryOp};

/// Expected argument shape of a decorator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgShape {
    None,
    Number,
    String,
    Array,
    Object,
    /// An identifier, member path, or array of them.
    Reference,
    StringOrObject,
    Any,
}

impl ArgShape {
    /// Phrase naming the expectation, used in diagnostics.
    pub fn expectation(self) -> &'static str {
        match self {
            ArgShape::None => "no arguments",
            ArgShape::Number => "a number",
            ArgShape::String => "a string",
            ArgShape::Array => "an array",
            ArgShape::Object => "an object or named arguments",
            ArgShape::Reference => "a reference to a resource or component",
            ArgShape::StringOrObject => "a string or an object",
            ArgShape::Any => "an argument",
        }
    }
}

/// Declaration sites a decorator may be attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecoratorTarget {
    Schema,
    SchemaProperty,
    Resource,
    Component,
    Input,
    Output,
    Var,
    Function,
}

impl DecoratorTarget {
    pub fn display(self) -> &'static str {
        match self {
            DecoratorTarget::Schema => "schemas",
            DecoratorTarget::SchemaProperty => "schema properties",
            DecoratorTarget::Resource => "resources",
            DecoratorTarget::Component => "components",
            DecoratorTarget::Input => "inputs",
            DecoratorTarget::Output => "outputs",
            DecoratorTarget::Var => "variables",
            DecoratorTarget::Function => "functions",
        }
    }
}

#[derive(Debug, Clone)]
pub struct DecoratorSpec {
    pub name: &'static str,
    pub shape: ArgShape,
    /// Arguments may be omitted entirely.
    pub optional_args: bool,
    pub targets: &'static [DecoratorTarget],
    pub description: &'static str,
}

impl DecoratorSpec {
    pub fn applies_to(&self, target: DecoratorTarget) -> bool {
        self.targets.contains(&target)
    }
}

use DecoratorTarget as T;

const VALUE_TARGETS: &[DecoratorTarget] = &[T::Input, T::Output, T::SchemaProperty, T::Var];
const INPUT_TARGETS: &[DecoratorTarget] = &[T::Input, T::SchemaProperty, T::Var];
const INSTANCE_TARGETS: &[DecoratorTarget] = &[T::Resource, T::Component];
const ALL_TARGETS: &[DecoratorTarget] = &[
    T::Schema,
    T::SchemaProperty,
    T::Resource,
    T::Component,
    T::Input,
    T::Output,
    T::Var,
    T::Function,
];

static REGISTRY: Lazy<IndexMap<&'static str, DecoratorSpec>> = Lazy::new(|| {
    let specs = [
        spec("minValue", ArgShape::Number, VALUE_TARGETS, "Minimum numeric value"),
        spec("maxValue", ArgShape::Number, VALUE_TARGETS, "Maximum numeric value"),
        spec("minLength", ArgShape::Number, VALUE_TARGETS, "Minimum string or array length"),
        spec("maxLength", ArgShape::Number, VALUE_TARGETS, "Maximum string or array length"),
        spec("nonEmpty", ArgShape::None, INPUT_TARGETS, "Value must not be empty"),
        spec(
            "validate",
            ArgShape::StringOrObject,
            VALUE_TARGETS,
            "Validate against a preset or regex",
        ),
        spec("allowed", ArgShape::Array, INPUT_TARGETS, "Restrict the value to a fixed set"),
        spec("unique", ArgShape::None, INPUT_TARGETS, "Array elements must be unique"),
        spec("existing", ArgShape::String, &[T::Resource], "Reference an existing cloud resource"),
        spec("sensitive", ArgShape::None, VALUE_TARGETS, "Hide the value in output"),
        spec("dependsOn", ArgShape::Reference, INSTANCE_TARGETS, "Explicit dependency"),
        spec("tags", ArgShape::Any, INSTANCE_TARGETS, "Cloud provider tags"),
        spec("provider", ArgShape::Any, INSTANCE_TARGETS, "Provider(s) that provision this"),
        spec("count", ArgShape::Number, INSTANCE_TARGETS, "Create N instances"),
        DecoratorSpec {
            optional_args: true,
            ..spec(
                "cloud",
                ArgShape::Any,
                &[T::SchemaProperty],
                "Value is set by the cloud provider",
            )
        },
        spec("description", ArgShape::String, ALL_TARGETS, "Documentation for the declaration"),
    ];
    specs.into_iter().map(|s| (s.name, s)).collect()
});

fn spec(
    name: &'static str,
    shape: ArgShape,
    targets: &'static [DecoratorTarget],
    description: &'static str,
) -> DecoratorSpec {
    DecoratorSpec {
        name,
        shape,
        optional_args: false,
        targets,
        description,
    }
}

/// Look up a recognized decorator by exact (case-sensitive) name.
pub fn lookup(name: &str) -> Option<&'static DecoratorSpec> {
    REGISTRY.get(name)
}

/// All recognized decorators in registry order.
pub fn all() -> impl Iterator<Item = &'static DecoratorSpec> {
    REGISTRY.values()
}

// ============================================================================
// ARGUMENT CHECKS
// ============================================================================

/// Literal shape of an argument expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArgKind {
    Number,
    String,
    Bool,
    Null,
    Array,
    Object,
    /// Identifiers, calls and other expressions evaluated later.
    Dynamic,
}

fn classify(expr: &Expr) -> ArgKind {
    match expr.unparenthesized() {
        Expr::Number { .. } => ArgKind::Number,
        Expr::Unary {
            op: UnaryOp::Neg,
            operand,
            ..
        } if matches!(operand.unparenthesized(), Expr::Number { .. }) => ArgKind::Number,
        Expr::String(_) => ArgKind::String,
        Expr::Bool { .. } => ArgKind::Bool,
        Expr::Null(_) => ArgKind::Null,
        Expr::Array { .. } | Expr::Comprehension { .. } => ArgKind::Array,
        Expr::Object { .. } => ArgKind::Object,
        _ => ArgKind::Dynamic,
    }
}

fn shape_accepts(shape: ArgShape, expr: &Expr) -> bool {
    let kind = classify(expr);
    if kind == ArgKind::Dynamic {
        return shape != ArgShape::None;
    }
    match shape {
        ArgShape::None => false,
        ArgShape::Number => kind == ArgKind::Number,
        ArgShape::String => kind == ArgKind::String,
        ArgShape::Array => kind == ArgKind::Array,
        ArgShape::Object => kind == ArgKind::Object,
        ArgShape::StringOrObject => matches!(kind, ArgKind::String | ArgKind::Object),
        ArgShape::Reference => match expr.unparenthesized() {
            Expr::Array { items, .. } => {
                items.iter().all(|item| classify(item) == ArgKind::Dynamic)
            }
            _ => false,
        },
        ArgShape::Any => true,
    }
}

/// Check a decorator's arguments against its registry entry.
///
/// Returns a message naming the expectation on mismatch.
pub fn check_arguments(spec: &DecoratorSpec, decorator: &Decorator) -> Result<(), String> {
    let args = decorator.arguments();
    let expected = || format!("@{} expects {}", spec.name, spec.shape.expectation());

    if args.is_empty() {
        return if spec.shape == ArgShape::None || spec.optional_args {
            Ok(())
        } else {
            Err(expected())
        };
    }
    if spec.shape == ArgShape::None {
        return Err(format!("@{} takes no arguments", spec.name));
    }
    if args.iter().any(|arg| arg.key.is_some()) {
        return match spec.shape {
            ArgShape::Object | ArgShape::StringOrObject | ArgShape::Any => Ok(()),
            _ => Err(expected()),
        };
    }
    if args.len() > 1 {
        return Err(format!(
            "@{} expects a single argument ({}), found {}",
            spec.name,
            spec.shape.expectation(),
            args.len()
        ));
    }
    if shape_accepts(spec.shape, &args[0].value) {
        Ok(())
    } else {
        Err(expected())
    }
}

/// Integer literal argument of `@count`, unwrapping parentheses and
/// single-argument call wrappers. `None` means the count is dynamic.
pub fn count_value(decorator: &Decorator) -> Option<i64> {
    let arg = decorator.arguments().first()?;
    integer_literal(&arg.value)
}

fn integer_literal(expr: &Expr) -> Option<i64> {
    match expr.unparenthesized() {
        Expr::Number { text, .. } => text.parse().ok(),
        Expr::Unary {
            op: UnaryOp::Neg,
            operand,
            ..
        } => integer_literal(operand).map(|n: i64| -n),
        Expr::Call { args, .. } if args.len() == 1 => integer_literal(&args[0]),
        _ => None,
    }
}

/// String literal argument of `@description`.
pub fn description_text(decorator: &Decorator) -> Option<String> {
    match decorator.arguments().first()?.value.unparenthesized() {
        Expr::String(lit) => Some(lit.value().to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{Stmt, parse};

    fn first_decorator(source: &str) -> Decorator {
        let parse = parse(source);
        let tree = parse.tree.unwrap();
        match &tree.statements[0] {
            Stmt::Resource(r) => r.decorators[0].clone(),
            Stmt::Var(v) => v.decorators[0].clone(),
            other => panic!("unexpected statement {other:?}"),
        }
    }

    #[test]
    fn test_registry_is_case_sensitive() {
        assert!(lookup("minValue").is_some());
        assert!(lookup("minvalue").is_none());
        assert_eq!(all().count(), 16);
    }

    #[test]
    fn test_string_given_to_number_decorator() {
        let decorator = first_decorator("@minValue(\"x\")\nvar number n = 1");
        let spec = lookup("minValue").unwrap();
        let err = check_arguments(spec, &decorator).unwrap_err();
        assert!(err.contains("a number"));
    }

    #[test]
    fn test_arguments_to_flag_decorator() {
        let decorator = first_decorator("@sensitive(1)\nvar string s = \"a\"");
        let err = check_arguments(lookup("sensitive").unwrap(), &decorator).unwrap_err();
        assert!(err.contains("no arguments"));
    }

    #[test]
    fn test_identifier_argument_is_accepted() {
        let decorator = first_decorator("@count(replicas)\nresource Bucket b {}");
        assert!(check_arguments(lookup("count").unwrap(), &decorator).is_ok());
        assert_eq!(count_value(&decorator), None);
    }

    #[test]
    fn test_count_unwraps_wrappers() {
        let decorator = first_decorator("@count((3))\nresource Bucket b {}");
        assert_eq!(count_value(&decorator), Some(3));
        let decorator = first_decorator("@count(int(4))\nresource Bucket b {}");
        assert_eq!(count_value(&decorator), Some(4));
    }
}
