//! The polymorphic type former: universal and existential quantification
//! over a [`Kind`] (Component B, polymorphic side).

use crate::existential::{domain, Existential};
use crate::monotype::{Alternatives, Fields, Monotype, Row, Variant};
use fax_util::Symbol;

/// What a quantified variable ranges over. A plain type (`Type`), a row
/// of record fields (`Fields`), or a row of union alternatives
/// (`Alternatives`) - three distinct sorts kept apart so a `∀(r: Fields)`
/// can never be instantiated with an ordinary monotype.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Type,
    Fields,
    Alternatives,
}

/// A (possibly) polymorphic type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
    Mono(Monotype),
    /// `∀(name: kind). body`
    Forall(Symbol, Kind, Box<Type>),
    /// `∃(name: kind). body`
    Exists(Symbol, Kind, Box<Type>),
}

impl Type {
    pub fn mono(m: Monotype) -> Type {
        Type::Mono(m)
    }

    pub fn forall(name: Symbol, kind: Kind, body: Type) -> Type {
        Type::Forall(name, kind, Box::new(body))
    }

    pub fn exists(name: Symbol, kind: Kind, body: Type) -> Type {
        Type::Exists(name, kind, Box::new(body))
    }

    /// A monotype with no quantifiers at all, if this is one.
    pub fn as_monotype(&self) -> Option<&Monotype> {
        match self {
            Type::Mono(m) => Some(m),
            _ => None,
        }
    }
}

/// What a bound variable of a given [`Kind`] may be replaced by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Replacement {
    Mono(Monotype),
    Row(Row),
    Variant(Variant),
}

/// Capture-avoiding substitution of the rigid variable `name` of sort
/// `kind` by `replacement` inside `ty`. Used to eliminate a quantifier
/// when checking against a `Forall`/`Exists` (§4.D.1): the bound name is
/// replaced either by a fresh existential (when entering an `Exists`) or
/// by a caller-supplied instantiation.
///
/// A nested binder that shadows `name` at the same `kind` stops the
/// substitution from descending into its body.
pub fn substitute(ty: &Type, name: &Symbol, kind: Kind, replacement: &Replacement) -> Type {
    match ty {
        Type::Mono(m) => Type::Mono(substitute_monotype(m, name, kind, replacement)),
        Type::Forall(n, k, body) => {
            if n == name && *k == kind {
                ty.clone()
            } else {
                Type::Forall(n.clone(), *k, Box::new(substitute(body, name, kind, replacement)))
            }
        }
        Type::Exists(n, k, body) => {
            if n == name && *k == kind {
                ty.clone()
            } else {
                Type::Exists(n.clone(), *k, Box::new(substitute(body, name, kind, replacement)))
            }
        }
    }
}

fn substitute_monotype(m: &Monotype, name: &Symbol, kind: Kind, replacement: &Replacement) -> Monotype {
    match m {
        Monotype::Variable(n) => {
            if kind == Kind::Type && n == name {
                match replacement {
                    Replacement::Mono(r) => r.clone(),
                    _ => m.clone(),
                }
            } else {
                m.clone()
            }
        }
        Monotype::Unsolved(_) | Monotype::Bool | Monotype::Natural | Monotype::Text => m.clone(),
        Monotype::Function(a, b) => Monotype::Function(
            Box::new(substitute_monotype(a, name, kind, replacement)),
            Box::new(substitute_monotype(b, name, kind, replacement)),
        ),
        Monotype::List(a) => Monotype::List(Box::new(substitute_monotype(a, name, kind, replacement))),
        Monotype::Record(fields) => Monotype::Record(Fields {
            labeled: fields
                .labeled
                .iter()
                .map(|(l, t)| (l.clone(), substitute_monotype(t, name, kind, replacement)))
                .collect(),
            row: substitute_row(&fields.row, name, kind, replacement),
        }),
        Monotype::Union(alts) => Monotype::Union(Alternatives {
            labeled: alts
                .labeled
                .iter()
                .map(|(l, t)| (l.clone(), substitute_monotype(t, name, kind, replacement)))
                .collect(),
            variant: substitute_variant(&alts.variant, name, kind, replacement),
        }),
    }
}

fn substitute_row(row: &Row, name: &Symbol, kind: Kind, replacement: &Replacement) -> Row {
    match row {
        Row::Variable(n) if kind == Kind::Fields && n == name => match replacement {
            Replacement::Row(r) => r.clone(),
            _ => row.clone(),
        },
        _ => row.clone(),
    }
}

fn substitute_variant(variant: &Variant, name: &Symbol, kind: Kind, replacement: &Replacement) -> Variant {
    match variant {
        Variant::Variable(n) if kind == Kind::Alternatives && n == name => match replacement {
            Replacement::Variant(r) => r.clone(),
            _ => variant.clone(),
        },
        _ => variant.clone(),
    }
}

/// The free existentials mentioned in a type, one bucket per domain, in
/// first-seen (left-to-right, outside-in) order with duplicates removed.
/// Generalization (§4.D.6) walks the context rather than this directly,
/// but this is what tells a caller which existentials a synthesized type
/// still depends on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FreeExistentials {
    pub mono: Vec<Existential<domain::Mono>>,
    pub row: Vec<Existential<domain::Row>>,
    pub variant: Vec<Existential<domain::Variant>>,
}

impl FreeExistentials {
    pub fn is_empty(&self) -> bool {
        self.mono.is_empty() && self.row.is_empty() && self.variant.is_empty()
    }
}

pub fn free_existentials(ty: &Type) -> FreeExistentials {
    let mut out = FreeExistentials::default();
    collect_type(ty, &mut out);
    out
}

fn collect_type(ty: &Type, out: &mut FreeExistentials) {
    match ty {
        Type::Mono(m) => collect_monotype(m, out),
        Type::Forall(_, _, body) | Type::Exists(_, _, body) => collect_type(body, out),
    }
}

fn collect_monotype(m: &Monotype, out: &mut FreeExistentials) {
    match m {
        Monotype::Variable(_) | Monotype::Bool | Monotype::Natural | Monotype::Text => {}
        Monotype::Unsolved(e) => push_unique(&mut out.mono, *e),
        Monotype::Function(a, b) => {
            collect_monotype(a, out);
            collect_monotype(b, out);
        }
        Monotype::List(a) => collect_monotype(a, out),
        Monotype::Record(fields) => {
            for (_, t) in &fields.labeled {
                collect_monotype(t, out);
            }
            if let Row::Unsolved(e) = fields.row {
                push_unique(&mut out.row, e);
            }
        }
        Monotype::Union(alts) => {
            for (_, t) in &alts.labeled {
                collect_monotype(t, out);
            }
            if let Variant::Unsolved(e) = alts.variant {
                push_unique(&mut out.variant, e);
            }
        }
    }
}

fn push_unique<D>(v: &mut Vec<Existential<D>>, e: Existential<D>) {
    if !v.contains(&e) {
        v.push(e);
    }
}
