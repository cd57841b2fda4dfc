//! fax-eval - call-by-value normalization of the core AST (Component E).
//!
//! [`normalize`] is the only entry point a caller needs; everything else
//! here is the force/apply machinery it relies on. Per §7, a term that
//! inference accepted cannot get stuck except on a free variable, so
//! every other mismatch handled below (applying a non-function, merging
//! a non-variant, projecting a field out of a non-record) is treated as
//! an implementation bug and panics rather than returning a `Result`.

mod value;

pub use value::{Environment, Neutral, Value};

use fax_syntax::{Node, Operator, Scalar, Syntax};
use fax_util::Symbol;
use indexmap::IndexMap;
use std::rc::Rc;

/// `normalize(environment, syntax) -> value` (§4.E / §6's `evaluate`).
#[tracing::instrument(level = "trace", skip(environment, node), fields(node = ?node.span))]
pub fn normalize(environment: &Environment, node: &Node) -> Value {
    match &node.kind {
        Syntax::Variable { name, index } => {
            lookup(environment, name, *index).unwrap_or_else(|| Value::Neutral(Neutral::Variable { name: name.clone(), index: *index }))
        }

        Syntax::Lambda { parameter, body } => Value::Closure {
            parameter: parameter.clone(),
            body: Rc::new((**body).clone()),
            environment: environment.clone(),
        },

        Syntax::Application { function, argument } => {
            let f = normalize(environment, function);
            let x = normalize(environment, argument);
            apply(f, x)
        }

        Syntax::Let { bindings, body } => {
            let mut extended = environment.clone();
            for binding in bindings {
                let value = normalize(&extended, &binding.value);
                extended.push((binding.name.clone(), value));
            }
            normalize(&extended, body)
        }

        Syntax::Annotation { expression, .. } => normalize(environment, expression),

        Syntax::List(items) => Value::List(items.iter().map(|item| normalize(environment, item)).collect()),

        Syntax::Record(fields) => {
            let mut map = IndexMap::with_capacity(fields.len());
            for (label, field_node) in fields {
                map.insert(label.clone(), normalize(environment, field_node));
            }
            Value::Record(map)
        }

        Syntax::Field { record, label } => match normalize(environment, record) {
            Value::Record(fields) => fields
                .get(label)
                .cloned()
                .unwrap_or_else(|| panic!("record has no field `{label}`")),
            Value::Neutral(n) => Value::Neutral(Neutral::Field {
                record: Box::new(n),
                label: label.clone(),
            }),
            other => panic!("field projection on a non-record value: {other:?}"),
        },

        Syntax::Alternative(tag) => Value::Constructor(tag.clone()),

        Syntax::Merge(handlers) => Value::Merge(Box::new(normalize(environment, handlers))),

        Syntax::If {
            condition,
            then_branch,
            else_branch,
        } => match normalize(environment, condition) {
            Value::Bool(true) => normalize(environment, then_branch),
            Value::Bool(false) => normalize(environment, else_branch),
            Value::Neutral(n) => Value::Neutral(Neutral::If {
                condition: Box::new(n),
                then_branch: Box::new(normalize(environment, then_branch)),
                else_branch: Box::new(normalize(environment, else_branch)),
            }),
            other => panic!("if condition is not a boolean: {other:?}"),
        },

        Syntax::Scalar(scalar) => Value::from(scalar),

        Syntax::Operator { operator, left, right } => {
            let l = normalize(environment, left);
            let r = normalize(environment, right);
            apply_operator(*operator, l, r)
        }

        Syntax::Builtin(name) => Value::Builtin(name.clone()),

        Syntax::Embed(_) => {
            panic!("Embed node reached fax-eval: the import layer must resolve embeds before calling into the core")
        }
    }
}

fn lookup(environment: &Environment, name: &Symbol, index: usize) -> Option<Value> {
    environment.iter().rev().filter(|(n, _)| n == name).nth(index).map(|(_, v)| v.clone())
}

/// Apply a normalized function to a normalized argument.
pub fn apply(function: Value, argument: Value) -> Value {
    match function {
        Value::Closure { parameter, body, environment } => {
            let mut extended = environment;
            extended.push((parameter, argument));
            normalize(&extended, &body)
        }
        Value::Builtin(name) => apply_builtin(&name, argument),
        Value::Constructor(tag) => Value::Alternative { tag, payload: Box::new(argument) },
        Value::Merge(handlers) => apply_merge(*handlers, argument),
        Value::Neutral(n) => Value::Neutral(Neutral::Application(Box::new(n), Box::new(argument))),
        other => panic!("applied a non-function value: {other:?}"),
    }
}

fn apply_builtin(name: &Symbol, argument: Value) -> Value {
    match (name.as_str(), &argument) {
        ("Natural/even", Value::Natural(n)) => Value::Bool(n % 2 == 0),
        ("Natural/odd", Value::Natural(n)) => Value::Bool(n % 2 != 0),
        ("List/length", Value::List(items)) => Value::Natural(items.len() as u64),
        (_, Value::Neutral(n)) => Value::Neutral(Neutral::Builtin {
            name: name.clone(),
            argument: Box::new(n.clone()),
        }),
        (_, other) => panic!("builtin `{name}` applied to a mismatched argument: {other:?}"),
    }
}

fn apply_merge(handlers: Value, scrutinee: Value) -> Value {
    match scrutinee {
        Value::Alternative { tag, payload } => {
            let handler = match &handlers {
                Value::Record(fields) => fields.get(&tag).cloned().unwrap_or_else(|| panic!("merge: no handler for `{tag}`")),
                other => panic!("merge argument is not a handler record: {other:?}"),
            };
            apply(handler, *payload)
        }
        Value::Neutral(n) => Value::Neutral(Neutral::Merge {
            handlers: Box::new(handlers),
            scrutinee: Box::new(n),
        }),
        other => panic!("merge applied to a non-variant value: {other:?}"),
    }
}

fn apply_operator(operator: Operator, left: Value, right: Value) -> Value {
    match (operator, left, right) {
        (Operator::Plus, Value::Natural(a), Value::Natural(b)) => Value::Natural(a + b),
        (Operator::Times, Value::Natural(a), Value::Natural(b)) => Value::Natural(a * b),
        (Operator::And, Value::Bool(a), Value::Bool(b)) => Value::Bool(a && b),
        (Operator::Or, Value::Bool(a), Value::Bool(b)) => Value::Bool(a || b),
        (Operator::Append, Value::Text(a), Value::Text(b)) => Value::Text(a + &b),
        (Operator::Append, Value::List(mut a), Value::List(b)) => {
            a.extend(b);
            Value::List(a)
        }
        (operator, left, right) => match (left, right) {
            (Value::Neutral(l), r) => Value::Neutral(Neutral::Operator {
                operator,
                left: Box::new(Value::Neutral(l)),
                right: Box::new(r),
            }),
            (l, Value::Neutral(r)) => Value::Neutral(Neutral::Operator {
                operator,
                left: Box::new(l),
                right: Box::new(Value::Neutral(r)),
            }),
            (l, r) => panic!("operator {operator:?} applied to mismatched operands: {l:?}, {r:?}"),
        },
    }
}

impl From<&Scalar> for Value {
    fn from(scalar: &Scalar) -> Self {
        match scalar {
            Scalar::Bool(b) => Value::Bool(*b),
            Scalar::Natural(n) => Value::Natural(*n),
            Scalar::Text(t) => Value::Text(t.clone()),
        }
    }
}
