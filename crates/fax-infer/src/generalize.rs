//! Generalization (§4.D.6): close over existentials still free in a
//! synthesized type by quantifying them with `forall`.
//!
//! The same routine backs two call sites: [`generalize`] closes the
//! whole program at the top of [`crate::type_of`], and
//! [`generalize_from`] closes just the existentials introduced while
//! synthesizing one `let` binding, giving that binding's uses their
//! own fresh instantiation (classic let-polymorphism — without it,
//! `let id = \x. x in id id 5` cannot type-check, since the second
//! application of `id` needs a different instantiation than the
//! first).

use fax_context::{Context, ContextEntry};
use fax_types::{domain, existential::pretty_name, free_existentials, Alternatives, Existential, Fields, Kind, Monotype, Row, Type, Variant};
use fax_util::Symbol;

pub(crate) fn generalize(ctx: &Context, ty: &Type) -> Type {
    generalize_from(ctx, 0, ty)
}

/// Quantify over every existential in `ctx.entries()[from..]` that
/// occurs free in `ty`, innermost entry first (so the leftmost,
/// earliest-introduced existential ends up as the outermost `forall`).
pub(crate) fn generalize_from(ctx: &Context, from: usize, ty: &Type) -> Type {
    let free = free_existentials(ty);
    if free.is_empty() {
        return ty.clone();
    }

    let mut targets = Vec::new();
    for entry in &ctx.entries()[from..] {
        match entry {
            ContextEntry::UnsolvedMono(e) if free.mono.contains(e) => {
                targets.push((Symbol::from(pretty_name(e.index())), Kind::Type, Target::Mono(*e)));
            }
            ContextEntry::UnsolvedRow(e) if free.row.contains(e) => {
                targets.push((Symbol::from(pretty_name(e.index())), Kind::Fields, Target::Row(*e)));
            }
            ContextEntry::UnsolvedVariant(e) if free.variant.contains(e) => {
                targets.push((Symbol::from(pretty_name(e.index())), Kind::Alternatives, Target::Variant(*e)));
            }
            _ => {}
        }
    }

    let mut body = ty.clone();
    for (name, _, target) in &targets {
        body = replace_type(&body, target, name);
    }
    for (name, kind, _) in targets.into_iter().rev() {
        body = Type::forall(name, kind, body);
    }
    body
}

enum Target {
    Mono(Existential<domain::Mono>),
    Row(Existential<domain::Row>),
    Variant(Existential<domain::Variant>),
}

fn replace_type(ty: &Type, target: &Target, name: &Symbol) -> Type {
    match ty {
        Type::Mono(m) => Type::Mono(replace_monotype(m, target, name)),
        Type::Forall(n, kind, body) => Type::Forall(n.clone(), *kind, Box::new(replace_type(body, target, name))),
        Type::Exists(n, kind, body) => Type::Exists(n.clone(), *kind, Box::new(replace_type(body, target, name))),
    }
}

fn replace_monotype(m: &Monotype, target: &Target, name: &Symbol) -> Monotype {
    match m {
        Monotype::Unsolved(e) => match target {
            Target::Mono(t) if e == t => Monotype::Variable(name.clone()),
            _ => m.clone(),
        },
        Monotype::Function(a, b) => Monotype::function(replace_monotype(a, target, name), replace_monotype(b, target, name)),
        Monotype::List(a) => Monotype::list(replace_monotype(a, target, name)),
        Monotype::Record(fields) => Monotype::Record(Fields {
            labeled: fields
                .labeled
                .iter()
                .map(|(l, t)| (l.clone(), replace_monotype(t, target, name)))
                .collect(),
            row: replace_row(&fields.row, target, name),
        }),
        Monotype::Union(alts) => Monotype::Union(Alternatives {
            labeled: alts
                .labeled
                .iter()
                .map(|(l, t)| (l.clone(), replace_monotype(t, target, name)))
                .collect(),
            variant: replace_variant(&alts.variant, target, name),
        }),
        Monotype::Variable(_) | Monotype::Bool | Monotype::Natural | Monotype::Text => m.clone(),
    }
}

fn replace_row(row: &Row, target: &Target, name: &Symbol) -> Row {
    match row {
        Row::Unsolved(e) => match target {
            Target::Row(t) if e == t => Row::Variable(name.clone()),
            _ => row.clone(),
        },
        Row::Empty | Row::Variable(_) => row.clone(),
    }
}

fn replace_variant(variant: &Variant, target: &Target, name: &Symbol) -> Variant {
    match variant {
        Variant::Unsolved(e) => match target {
            Target::Variant(t) if e == t => Variant::Variable(name.clone()),
            _ => variant.clone(),
        },
        Variant::Empty | Variant::Variable(_) => variant.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closes_a_free_mono_existential_into_a_forall() {
        let mut ctx = Context::new();
        let e = ctx.fresh_mono();
        let ty = Type::Mono(Monotype::function(Monotype::Unsolved(e), Monotype::Unsolved(e)));
        let generalized = generalize(&ctx, &ty);
        match generalized {
            Type::Forall(_, Kind::Type, body) => {
                assert_eq!(*body, Type::Mono(Monotype::function(Monotype::Variable(Symbol::from("a")), Monotype::Variable(Symbol::from("a")))));
            }
            other => panic!("expected a forall, got {other:?}"),
        }
    }

    #[test]
    fn leaves_solved_existentials_alone() {
        let mut ctx = Context::new();
        let e = ctx.fresh_mono();
        ctx.solve_mono(e, Monotype::Natural).unwrap();
        let applied = ctx.apply_monotype(&Monotype::Unsolved(e));
        let generalized = generalize(&ctx, &Type::Mono(applied));
        assert_eq!(generalized, Type::Mono(Monotype::Natural));
    }
}
