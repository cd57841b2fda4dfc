//! Well-formedness checks, shared by [`crate::Context::well_formed`] and
//! by the `solve*` family (which must check well-formedness against a
//! strict prefix rather than the whole context).

use fax_types::{Kind, Monotype, Row, Type, Variant};

use crate::ContextEntry;

pub fn type_in(entries: &[ContextEntry], ty: &Type) -> bool {
    match ty {
        Type::Mono(m) => monotype_in(entries, m),
        Type::Forall(name, kind, body) | Type::Exists(name, kind, body) => {
            let mut extended = entries.to_vec();
            extended.push(ContextEntry::Variable(name.clone(), *kind));
            type_in(&extended, body)
        }
    }
}

pub fn monotype_in(entries: &[ContextEntry], m: &Monotype) -> bool {
    match m {
        Monotype::Variable(name) => entries
            .iter()
            .any(|e| matches!(e, ContextEntry::Variable(n, Kind::Type) if n == name)),
        Monotype::Unsolved(e) => entries.iter().any(|entry| {
            matches!(entry, ContextEntry::UnsolvedMono(u) if u == e)
                || matches!(entry, ContextEntry::SolvedMono(u, _) if u == e)
        }),
        Monotype::Bool | Monotype::Natural | Monotype::Text => true,
        Monotype::Function(a, b) => monotype_in(entries, a) && monotype_in(entries, b),
        Monotype::List(a) => monotype_in(entries, a),
        Monotype::Record(fields) => {
            fields.labeled.iter().all(|(_, t)| monotype_in(entries, t)) && row_in(entries, &fields.row)
        }
        Monotype::Union(alts) => {
            alts.labeled.iter().all(|(_, t)| monotype_in(entries, t)) && variant_in(entries, &alts.variant)
        }
    }
}

pub fn row_in(entries: &[ContextEntry], row: &Row) -> bool {
    match row {
        Row::Empty => true,
        Row::Variable(name) => entries
            .iter()
            .any(|e| matches!(e, ContextEntry::Variable(n, Kind::Fields) if n == name)),
        Row::Unsolved(e) => entries.iter().any(|entry| {
            matches!(entry, ContextEntry::UnsolvedRow(u) if u == e) || matches!(entry, ContextEntry::SolvedRow(u, _) if u == e)
        }),
    }
}

pub fn variant_in(entries: &[ContextEntry], variant: &Variant) -> bool {
    match variant {
        Variant::Empty => true,
        Variant::Variable(name) => entries
            .iter()
            .any(|e| matches!(e, ContextEntry::Variable(n, Kind::Alternatives) if n == name)),
        Variant::Unsolved(e) => entries.iter().any(|entry| {
            matches!(entry, ContextEntry::UnsolvedVariant(u) if u == e)
                || matches!(entry, ContextEntry::SolvedVariant(u, _) if u == e)
        }),
    }
}

/// Convenience entry point mirroring `Context::well_formed` for callers
/// that already have a raw entry slice (used by `fax-infer`'s tests).
pub fn is_well_formed(entries: &[ContextEntry], ty: &Type) -> bool {
    type_in(entries, ty)
}
