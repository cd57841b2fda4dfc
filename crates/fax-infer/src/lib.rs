//! fax-infer - bidirectional type inference (Component D).
//!
//! [`Infer`] threads a single [`Context`] through mutually recursive
//! `check`/`synthesize` judgments (`check.rs`/`synth.rs`), a subtyping and
//! instantiation engine (`subtype.rs`), and a final generalization pass
//! (`generalize.rs`). [`type_of`] is the component's external entry
//! point: synthesize the whole program, apply the final context, and
//! generalize any existentials still free.

pub mod builtins;
mod check;
mod error;
mod generalize;
mod subtype;
mod synth;

use fax_context::Context;
use fax_syntax::Node;
use fax_types::Type;

pub use error::TypeError;

/// A single inference session: one [`Context`], threaded through
/// `check`/`synthesize` by `&mut self`. Sessions never share state
/// (§5) and may be run concurrently by a caller that owns several.
pub struct Infer {
    ctx: Context,
}

impl Default for Infer {
    fn default() -> Self {
        Self::new()
    }
}

impl Infer {
    pub fn new() -> Self {
        Infer { ctx: Context::new() }
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }
}

/// `type_of(syntax) -> Result<Type, ErrorMessage>` (§6): synthesize a
/// principal type for `node` under an empty context.
#[tracing::instrument(level = "debug", skip(node))]
pub fn type_of(node: &Node) -> Result<Type, TypeError> {
    let mut infer = Infer::new();
    let synthesized = infer.synthesize(node)?;
    let applied = infer.ctx.apply(&synthesized);
    let generalized = generalize::generalize(&infer.ctx, &applied);
    tracing::debug!(%generalized, "inference complete");
    Ok(generalized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fax_syntax::{Binding, Operator, Scalar, Syntax};
    use fax_types::{Kind, Monotype, Variant};
    use fax_util::{Span, Symbol};

    fn node(kind: Syntax) -> Node {
        Node::new(Span::DUMMY, kind)
    }

    fn var(name: &str) -> Node {
        node(Syntax::Variable { name: Symbol::new(name), index: 0 })
    }

    fn nat(n: u64) -> Node {
        node(Syntax::Scalar(Scalar::Natural(n)))
    }

    // Scenario 1: `\x. x` : `forall a. a -> a`.
    #[test]
    fn identity_synthesizes_a_forall() {
        let identity = node(Syntax::Lambda {
            parameter: Symbol::new("x"),
            body: Box::new(var("x")),
        });
        let ty = type_of(&identity).expect("identity type-checks");
        match ty {
            Type::Forall(_, Kind::Type, body) => match *body {
                Type::Mono(Monotype::Function(a, b)) => assert_eq!(a, b),
                other => panic!("expected a -> a, got {other:?}"),
            },
            other => panic!("expected a forall, got {other:?}"),
        }
    }

    // §8 property 3, principality: the inferred type of `\x. x` subsumes
    // any other valid annotation for it.
    #[test]
    fn identity_type_is_principal_against_narrower_annotations() {
        let identity = node(Syntax::Lambda { parameter: Symbol::new("x"), body: Box::new(var("x")) });
        let inferred = type_of(&identity).expect("identity type-checks");

        let mut infer = Infer::new();
        let natural_to_natural = Type::mono(Monotype::function(Monotype::Natural, Monotype::Natural));
        infer
            .subtype(&inferred, &natural_to_natural, Span::DUMMY)
            .expect("the principal type subsumes Natural -> Natural");

        let bool_to_bool = Type::mono(Monotype::function(Monotype::Bool, Monotype::Bool));
        infer
            .subtype(&inferred, &bool_to_bool, Span::DUMMY)
            .expect("the principal type subsumes Bool -> Bool");
    }

    // Scenario 3: `{a = 1, b = "hi"}.a` : `Natural`.
    #[test]
    fn field_projection_synthesizes_the_projected_labels_type() {
        let record = node(Syntax::Record(vec![
            (Symbol::new("a"), nat(1)),
            (Symbol::new("b"), node(Syntax::Scalar(Scalar::Text("hi".into())))),
        ]));
        let projection = node(Syntax::Field { record: Box::new(record), label: Symbol::new("a") });
        assert_eq!(type_of(&projection).unwrap(), Type::Mono(Monotype::Natural));
    }

    // Scenario 4: `[1, 2, 3]` : `List Natural`.
    #[test]
    fn homogeneous_list_synthesizes_list_of_element_type() {
        let list = node(Syntax::List(vec![nat(1), nat(2), nat(3)]));
        assert_eq!(type_of(&list).unwrap(), Type::Mono(Monotype::list(Monotype::Natural)));
    }

    // Scenario 5: `[1, 2] : List (exists a. a)` - an existentially
    // quantified element type checks against a list whose elements all
    // happen to share a monotype. `Monotype::List`'s element slot is a
    // bare `Monotype` (never a quantified `Type`), so this exercises the
    // `Exists`-under-`List` interaction the open question in spec §9
    // calls out without claiming element-by-element heterogeneity the
    // data model has no way to represent.
    #[test]
    fn list_checks_against_an_existentially_quantified_element_type() {
        let a = Symbol::new("a");
        let annotation = Type::exists(a.clone(), Kind::Type, Type::mono(Monotype::list(Monotype::Variable(a))));
        let annotated = node(Syntax::Annotation {
            expression: Box::new(node(Syntax::List(vec![nat(1), nat(2)]))),
            annotation,
        });
        assert!(type_of(&annotated).is_ok());
    }

    // Scenario 6: `if true then 1 else 2` : `Natural`.
    #[test]
    fn if_expression_joins_both_branches() {
        let expr = node(Syntax::If {
            condition: Box::new(node(Syntax::Scalar(Scalar::Bool(true)))),
            then_branch: Box::new(nat(1)),
            else_branch: Box::new(nat(2)),
        });
        assert_eq!(type_of(&expr).unwrap(), Type::Mono(Monotype::Natural));
    }

    // Scenario 7 (already covered end-to-end in fax-core, repeated here at
    // the fax-infer level since it is this crate's own generalization
    // logic under test): `let id = \x. x in id id 5` : `Natural`.
    #[test]
    fn let_bound_identity_is_generalized_before_reuse() {
        let id_lambda = node(Syntax::Lambda { parameter: Symbol::new("x"), body: Box::new(var("x")) });
        let id_id = node(Syntax::Application { function: Box::new(var("id")), argument: Box::new(var("id")) });
        let body = node(Syntax::Application { function: Box::new(id_id), argument: Box::new(nat(5)) });
        let let_expr = node(Syntax::Let {
            bindings: vec![Binding { name: Symbol::new("id"), annotation: None, value: Box::new(id_lambda) }],
            body: Box::new(body),
        });
        assert_eq!(type_of(&let_expr).unwrap(), Type::Mono(Monotype::Natural));
    }

    #[test]
    fn operators_use_their_fixed_signature() {
        let plus = node(Syntax::Operator { operator: Operator::Plus, left: Box::new(nat(1)), right: Box::new(nat(2)) });
        assert_eq!(type_of(&plus).unwrap(), Type::Mono(Monotype::Natural));
    }

    fn identity_handler() -> Node {
        node(Syntax::Lambda { parameter: Symbol::new("x"), body: Box::new(var("x")) })
    }

    fn tagged(tag: &str, payload: Node) -> Node {
        node(Syntax::Application {
            function: Box::new(node(Syntax::Alternative(Symbol::new(tag)))),
            argument: Box::new(payload),
        })
    }

    // `Syntax::Alternative("Foo")` applied to a value synthesizes a
    // single-tag union left open by a fresh variant tail.
    #[test]
    fn alternative_application_synthesizes_a_single_tag_open_union() {
        let applied = tagged("Foo", nat(5));
        let ty = type_of(&applied).expect("tagging a value type-checks");
        match ty {
            Type::Forall(_, Kind::Alternatives, body) => match *body {
                Type::Mono(Monotype::Union(alternatives)) => {
                    assert_eq!(alternatives.labeled, vec![(Symbol::new("Foo"), Monotype::Natural)]);
                    assert!(matches!(alternatives.variant, Variant::Variable(_)));
                }
                other => panic!("expected a union, got {other:?}"),
            },
            other => panic!("expected a forall over the variant tail, got {other:?}"),
        }
    }

    // Variant-subtyping asymmetry: a handler record may cover *more* tags
    // than the scrutinee actually needs. The scrutinee only produces
    // `Left`, but `merge` is given handlers for both `Left` and `Right`;
    // the spare `Right` case must not be rejected.
    #[test]
    fn merge_accepts_a_handler_record_with_more_tags_than_the_scrutinee_needs() {
        let handlers = node(Syntax::Record(vec![
            (Symbol::new("Left"), identity_handler()),
            (Symbol::new("Right"), identity_handler()),
        ]));
        let applied = node(Syntax::Application {
            function: Box::new(node(Syntax::Merge(Box::new(handlers)))),
            argument: Box::new(tagged("Left", nat(1))),
        });
        assert!(type_of(&applied).is_ok());
    }

    // The dual direction: a scrutinee tagged with a label the handler
    // record has no case for must fail with `MissingAlternative`.
    #[test]
    fn merge_without_a_handler_for_the_scrutinees_tag_is_a_missing_alternative() {
        let handlers = node(Syntax::Record(vec![(Symbol::new("Left"), identity_handler())]));
        let applied = node(Syntax::Application {
            function: Box::new(node(Syntax::Merge(Box::new(handlers)))),
            argument: Box::new(tagged("Right", nat(1))),
        });
        assert!(matches!(type_of(&applied), Err(TypeError::MissingAlternative { .. })));
    }

    // Negative: `(1 true)` -> NotAFunction.
    #[test]
    fn applying_a_natural_is_not_a_function() {
        let bad = node(Syntax::Application {
            function: Box::new(nat(1)),
            argument: Box::new(node(Syntax::Scalar(Scalar::Bool(true)))),
        });
        assert!(matches!(type_of(&bad), Err(TypeError::NotAFunction { .. })));
    }

    // Negative: `{a=1}.b` -> MissingField.
    #[test]
    fn projecting_an_absent_label_is_a_missing_field() {
        let record = node(Syntax::Record(vec![(Symbol::new("a"), nat(1))]));
        let projection = node(Syntax::Field { record: Box::new(record), label: Symbol::new("b") });
        assert!(matches!(type_of(&projection), Err(TypeError::MissingField { .. })));
    }

    // Negative: `\x. x x` -> OccursCheck (x would have to be a function of
    // itself: solving the argument existential to `x`'s own type loops).
    #[test]
    fn self_application_fails_the_occurs_check() {
        let self_apply = node(Syntax::Lambda {
            parameter: Symbol::new("x"),
            body: Box::new(node(Syntax::Application { function: Box::new(var("x")), argument: Box::new(var("x")) })),
        });
        assert!(matches!(type_of(&self_apply), Err(TypeError::OccursCheck { .. })));
    }
}
