//! The monomorphic half of the type model (Component B, monotype side).
//!
//! A [`Monotype`] is exactly one of the shapes enumerated below: a rigid
//! variable, an unsolved placeholder, a function, a list, a record, a
//! union, or a primitive. Records and unions carry an open "tail" -
//! [`Row`] and [`Variant`] respectively - admitting width subtyping.
//! Label order inside a record or union is preserved for pretty-printing
//! but is not semantic: `{x: Bool, y: Text}` and `{y: Text, x: Bool}` denote
//! the same type, even though `derive(PartialEq)` below is order-sensitive
//! (callers that need the semantic equivalence compare via row/variant
//! subtyping in both directions, as `fax-infer` does).

use crate::existential::{domain, Existential};
use fax_util::Symbol;

/// A monomorphic type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Monotype {
    /// A rigid (bound) type variable, referenced by source name.
    Variable(Symbol),
    /// A placeholder existential not yet solved.
    Unsolved(Existential<domain::Mono>),
    /// `A -> B`, right-associative.
    Function(Box<Monotype>, Box<Monotype>),
    /// `List A`.
    List(Box<Monotype>),
    /// `{ l1: T1, ..., ln: Tn | row }`.
    Record(Fields),
    /// `< l1: T1, ..., ln: Tn | variant >`.
    Union(Alternatives),
    Bool,
    Natural,
    Text,
}

/// The labeled fields of a record type together with its row tail.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Fields {
    pub labeled: Vec<(Symbol, Monotype)>,
    pub row: Row,
}

impl Fields {
    pub fn closed(labeled: Vec<(Symbol, Monotype)>) -> Self {
        Fields {
            labeled,
            row: Row::Empty,
        }
    }

    pub fn lookup(&self, label: &Symbol) -> Option<&Monotype> {
        self.labeled.iter().find(|(l, _)| l == label).map(|(_, t)| t)
    }
}

/// The open tail of a record type.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Row {
    #[default]
    Empty,
    Unsolved(Existential<domain::Row>),
    Variable(Symbol),
}

/// The labeled alternatives of a union type together with its variant tail.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Alternatives {
    pub labeled: Vec<(Symbol, Monotype)>,
    pub variant: Variant,
}

impl Alternatives {
    pub fn closed(labeled: Vec<(Symbol, Monotype)>) -> Self {
        Alternatives {
            labeled,
            variant: Variant::Empty,
        }
    }

    pub fn lookup(&self, label: &Symbol) -> Option<&Monotype> {
        self.labeled.iter().find(|(l, _)| l == label).map(|(_, t)| t)
    }
}

/// The open tail of a union type. Isomorphic to [`Row`] but kept as a
/// distinct type so the domain tag on its existential can't be confused
/// with a row's.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Variant {
    #[default]
    Empty,
    Unsolved(Existential<domain::Variant>),
    Variable(Symbol),
}

impl Monotype {
    pub fn function(a: Monotype, b: Monotype) -> Monotype {
        Monotype::Function(Box::new(a), Box::new(b))
    }

    pub fn list(a: Monotype) -> Monotype {
        Monotype::List(Box::new(a))
    }

    /// True for the handful of shapes that never contain a nested type
    /// (used by the pretty printer to decide when parens are unnecessary).
    pub fn is_atomic(&self) -> bool {
        matches!(
            self,
            Monotype::Variable(_)
                | Monotype::Unsolved(_)
                | Monotype::Bool
                | Monotype::Natural
                | Monotype::Text
                | Monotype::Record(_)
                | Monotype::Union(_)
        )
    }
}
