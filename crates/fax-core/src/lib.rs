//! fax-core - the external interface (§6): `type_of`, `evaluate`, and the
//! `interpret` convenience that combines them. This crate owns no
//! algorithm of its own; it wires [`fax_infer`] and [`fax_eval`] together
//! over a single, already-resolved [`fax_syntax::Node`].

pub use fax_eval::{Environment, Neutral, Value};
pub use fax_infer::TypeError;
pub use fax_types::Type;

use fax_syntax::{Node, Syntax};

/// `type_of(syntax) -> Result<Type, ErrorMessage>` (§6): infer a
/// principal type for `node` under an empty context.
pub fn type_of(node: &Node) -> Result<Type, TypeError> {
    fax_infer::type_of(node)
}

/// `evaluate(env, syntax) -> Value` (§6): normalize `node` under
/// `environment`. Never fails on a term that `type_of` accepted (§7);
/// see [`fax_eval::normalize`] for the panic-on-bug rationale.
pub fn evaluate(environment: &Environment, node: &Node) -> Value {
    fax_eval::normalize(environment, node)
}

/// `interpret(optional_annotation, syntax) -> (Type, Value)` (§6).
///
/// When `annotation` is present the syntax is wrapped in an `Annotation`
/// node before type-checking (the shape the import layer relies on when
/// threading a surface type into a resolved embed); evaluation always
/// runs over the original, un-annotated tree.
pub fn interpret(annotation: Option<Type>, node: &Node) -> Result<(Type, Value), TypeError> {
    let checked = match annotation {
        Some(ty) => Syntax::Annotation {
            expression: Box::new(node.clone()),
            annotation: ty,
        }
        .at(node.span),
        None => node.clone(),
    };
    let inferred = type_of(&checked)?;
    let value = evaluate(&Environment::new(), node);
    Ok((inferred, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use fax_types::{Kind, Monotype};
    use fax_util::{Span, Symbol};

    fn node(kind: Syntax) -> Node {
        Node::new(Span::DUMMY, kind)
    }

    #[test]
    fn identity_lambda_is_polymorphic_and_reduces_to_a_closure() {
        let identity = node(Syntax::Lambda {
            parameter: Symbol::new("x"),
            body: Box::new(node(Syntax::Variable { name: Symbol::new("x"), index: 0 })),
        });
        let (ty, value) = interpret(None, &identity).expect("identity type-checks");
        match ty {
            Type::Forall(_, Kind::Type, _) => {}
            other => panic!("expected a forall, got {other:?}"),
        }
        assert!(matches!(value, Value::Closure { .. }));
    }

    #[test]
    fn applying_identity_to_a_literal_yields_the_literal() {
        let identity = node(Syntax::Lambda {
            parameter: Symbol::new("x"),
            body: Box::new(node(Syntax::Variable { name: Symbol::new("x"), index: 0 })),
        });
        let applied = node(Syntax::Application {
            function: Box::new(identity),
            argument: Box::new(node(Syntax::Scalar(fax_syntax::Scalar::Natural(1)))),
        });
        let (ty, value) = interpret(None, &applied).expect("application type-checks");
        assert_eq!(ty, Type::Mono(Monotype::Natural));
        assert_eq!(value, Value::Natural(1));
    }

    #[test]
    fn applying_a_non_function_is_reported_as_not_a_function() {
        let bad = node(Syntax::Application {
            function: Box::new(node(Syntax::Scalar(fax_syntax::Scalar::Natural(1)))),
            argument: Box::new(node(Syntax::Scalar(fax_syntax::Scalar::Bool(true)))),
        });
        assert!(matches!(type_of(&bad), Err(TypeError::NotAFunction { .. })));
    }

    #[test]
    fn missing_field_projection_is_reported() {
        let record = node(Syntax::Record(vec![(Symbol::new("a"), node(Syntax::Scalar(fax_syntax::Scalar::Natural(1))))]));
        let projection = node(Syntax::Field {
            record: Box::new(record),
            label: Symbol::new("b"),
        });
        assert!(matches!(type_of(&projection), Err(TypeError::MissingField { .. })));
    }

    #[test]
    fn let_polymorphism_lets_id_be_reused_at_two_types() {
        let id_lambda = node(Syntax::Lambda {
            parameter: Symbol::new("x"),
            body: Box::new(node(Syntax::Variable { name: Symbol::new("x"), index: 0 })),
        });
        let id_applied_to_id = node(Syntax::Application {
            function: Box::new(node(Syntax::Variable { name: Symbol::new("id"), index: 0 })),
            argument: Box::new(node(Syntax::Variable { name: Symbol::new("id"), index: 0 })),
        });
        let body = node(Syntax::Application {
            function: Box::new(id_applied_to_id),
            argument: Box::new(node(Syntax::Scalar(fax_syntax::Scalar::Natural(5)))),
        });
        let let_expr = node(Syntax::Let {
            bindings: vec![fax_syntax::Binding {
                name: Symbol::new("id"),
                annotation: None,
                value: Box::new(id_lambda),
            }],
            body: Box::new(body),
        });
        let (ty, value) = interpret(None, &let_expr).expect("let id = \\x.x in id id 5 type-checks");
        assert_eq!(ty, Type::Mono(Monotype::Natural));
        assert_eq!(value, Value::Natural(5));
    }
}
