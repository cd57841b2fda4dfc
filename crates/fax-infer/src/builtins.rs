//! Fixed signatures for operators (§4.D.2) and the small builtin table
//! shared with `fax-eval`'s evaluator.

use fax_syntax::Operator;
use fax_types::{Kind, Monotype, Type};
use fax_util::Symbol;

/// `(left, right, result)` for a binary operator. `++` is polymorphic
/// over `Text` and `List a`, so `synthesize_operator` special-cases it
/// by synthesizing the left operand first rather than calling here; this
/// table covers the remaining, genuinely monomorphic operators.
pub fn operator_signature(op: Operator) -> (Monotype, Monotype, Monotype) {
    match op {
        Operator::Plus | Operator::Times => (Monotype::Natural, Monotype::Natural, Monotype::Natural),
        Operator::And | Operator::Or => (Monotype::Bool, Monotype::Bool, Monotype::Bool),
        Operator::Append => (Monotype::Text, Monotype::Text, Monotype::Text),
    }
}

/// The type of a named builtin, or `None` if no such builtin exists.
/// `List/length` is the one polymorphic entry, so it returns a `Type`
/// rather than a bare `Monotype`.
pub fn builtin_type(name: &Symbol) -> Option<Type> {
    match name.as_str() {
        "Natural/even" => Some(Type::mono(Monotype::function(Monotype::Natural, Monotype::Bool))),
        "Natural/odd" => Some(Type::mono(Monotype::function(Monotype::Natural, Monotype::Bool))),
        "List/length" => {
            let a = Symbol::new("a");
            Some(Type::forall(
                a.clone(),
                Kind::Type,
                Type::mono(Monotype::function(
                    Monotype::list(Monotype::Variable(a)),
                    Monotype::Natural,
                )),
            ))
        }
        _ => None,
    }
}
