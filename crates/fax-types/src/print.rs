//! Pretty-printing for [`Type`] and [`Monotype`].
//!
//! Precedence has three layers, loosest to tightest: function arrows,
//! single-argument application (`List A`), and atoms (variables,
//! primitives, records, unions - anything that never needs parenthesizing
//! on its own). A child is wrapped in parens only when its own layer is
//! looser than the layer its parent is printing at.

use std::fmt;

use crate::monotype::{Alternatives, Fields, Monotype, Row, Variant};
use crate::poly::{Kind, Type};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Prec {
    Function,
    Application,
    Atom,
}

impl fmt::Display for Monotype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_monotype(f, self, Prec::Function)
    }
}

fn write_monotype(f: &mut fmt::Formatter<'_>, m: &Monotype, max: Prec) -> fmt::Result {
    let prec = monotype_prec(m);
    let needs_parens = prec < max;
    if needs_parens {
        write!(f, "(")?;
    }
    match m {
        Monotype::Variable(n) => write!(f, "{n}")?,
        Monotype::Unsolved(e) => write!(f, "{}", e.pretty())?,
        Monotype::Bool => write!(f, "Bool")?,
        Monotype::Natural => write!(f, "Natural")?,
        Monotype::Text => write!(f, "Text")?,
        Monotype::Function(a, b) => {
            write_monotype(f, a, Prec::Application)?;
            write!(f, " -> ")?;
            write_monotype(f, b, Prec::Function)?;
        }
        Monotype::List(a) => {
            write!(f, "List ")?;
            write_monotype(f, a, Prec::Atom)?;
        }
        Monotype::Record(fields) => write_fields(f, fields)?,
        Monotype::Union(alts) => write_alternatives(f, alts)?,
    }
    if needs_parens {
        write!(f, ")")?;
    }
    Ok(())
}

fn monotype_prec(m: &Monotype) -> Prec {
    match m {
        Monotype::Function(..) => Prec::Function,
        Monotype::List(..) => Prec::Application,
        _ => Prec::Atom,
    }
}

fn write_fields(f: &mut fmt::Formatter<'_>, fields: &Fields) -> fmt::Result {
    write!(f, "{{")?;
    write_labeled(f, &fields.labeled)?;
    match &fields.row {
        Row::Empty => {}
        Row::Unsolved(e) => {
            write!(f, "{}{}", separator(&fields.labeled), e.pretty())?;
        }
        Row::Variable(n) => {
            write!(f, "{}{n}", separator(&fields.labeled))?;
        }
    }
    write!(f, "}}")
}

fn write_alternatives(f: &mut fmt::Formatter<'_>, alts: &Alternatives) -> fmt::Result {
    write!(f, "<")?;
    write_labeled(f, &alts.labeled)?;
    match &alts.variant {
        Variant::Empty => {}
        Variant::Unsolved(e) => {
            write!(f, "{}{}", separator(&alts.labeled), e.pretty())?;
        }
        Variant::Variable(n) => {
            write!(f, "{}{n}", separator(&alts.labeled))?;
        }
    }
    write!(f, ">")
}

fn write_labeled(f: &mut fmt::Formatter<'_>, labeled: &[(fax_util::Symbol, Monotype)]) -> fmt::Result {
    for (i, (label, ty)) in labeled.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{label}: ")?;
        write_monotype(f, ty, Prec::Function)?;
    }
    Ok(())
}

fn separator(labeled: &[(fax_util::Symbol, Monotype)]) -> &'static str {
    if labeled.is_empty() {
        ""
    } else {
        " | "
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Mono(m) => write_monotype(f, m, Prec::Function),
            Type::Forall(name, kind, body) => {
                write!(f, "forall ({name}{}). {body}", kind_suffix(*kind))
            }
            Type::Exists(name, kind, body) => {
                write!(f, "exists ({name}{}). {body}", kind_suffix(*kind))
            }
        }
    }
}

fn kind_suffix(kind: Kind) -> &'static str {
    match kind {
        Kind::Type => "",
        Kind::Fields => ": Fields",
        Kind::Alternatives => ": Alternatives",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::existential::Counter;
    use fax_util::Symbol;

    fn sym(s: &str) -> Symbol {
        Symbol::new(s)
    }

    #[test]
    fn prints_function_right_associatively_without_redundant_parens() {
        let ty = Monotype::function(Monotype::Bool, Monotype::function(Monotype::Natural, Monotype::Text));
        assert_eq!(ty.to_string(), "Bool -> Natural -> Text");
    }

    #[test]
    fn parenthesizes_function_on_the_left_of_an_arrow() {
        let ty = Monotype::function(Monotype::function(Monotype::Bool, Monotype::Bool), Monotype::Bool);
        assert_eq!(ty.to_string(), "(Bool -> Bool) -> Bool");
    }

    #[test]
    fn closed_record_has_no_bar() {
        let ty = Monotype::Record(Fields::closed(vec![(sym("x"), Monotype::Bool)]));
        assert_eq!(ty.to_string(), "{x: Bool}");
    }

    #[test]
    fn empty_record_prints_as_empty_braces() {
        let ty = Monotype::Record(Fields::default());
        assert_eq!(ty.to_string(), "{}");
    }

    #[test]
    fn open_record_shows_unsolved_row_as_existential() {
        let mut c = Counter::new();
        let row = c.fresh();
        let ty = Monotype::Record(Fields {
            labeled: vec![(sym("x"), Monotype::Bool)],
            row: Row::Unsolved(row),
        });
        assert_eq!(ty.to_string(), "{x: Bool | a?}");
    }

    #[test]
    fn union_uses_angle_brackets() {
        let ty = Monotype::Union(Alternatives::closed(vec![(sym("Left"), Monotype::Bool)]));
        assert_eq!(ty.to_string(), "<Left: Bool>");
    }

    #[test]
    fn list_of_function_is_parenthesized() {
        let ty = Monotype::list(Monotype::function(Monotype::Bool, Monotype::Bool));
        assert_eq!(ty.to_string(), "List (Bool -> Bool)");
    }

    #[test]
    fn forall_prints_kind_suffix_only_when_not_type() {
        let body = Type::Mono(Monotype::Variable(sym("a")));
        let plain = Type::forall(sym("a"), Kind::Type, body.clone());
        let fields = Type::forall(sym("r"), Kind::Fields, body);
        assert_eq!(plain.to_string(), "forall (a). a");
        assert_eq!(fields.to_string(), "forall (r: Fields). a");
    }
}
