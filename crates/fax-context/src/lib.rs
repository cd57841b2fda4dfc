//! fax-context - the ordered typing context (Component C).
//!
//! A [`Context`] is a single `Vec<ContextEntry>` with append-and-truncate
//! discipline: every recursive call into `fax-infer` that extends the
//! context also discards its own extensions before returning, so a plain
//! mutable vector stands in for the functional, persistent context the
//! algorithm is specified against. [`Context::mark`]/[`Context::truncate`]
//! give the generic version of that discipline; [`Context::push_marker`]/
//! [`Context::discard_to`] give the named-checkpoint version the
//! existential-introduction rule uses explicitly.

use fax_types::{domain, Existential, Fields, Kind, Monotype, Row, Type, Variant};
use fax_util::Symbol;

mod well_formed;

pub use well_formed::is_well_formed;

/// One entry in the ordered context (§3.5).
#[derive(Debug, Clone, PartialEq)]
pub enum ContextEntry {
    /// A rigid, in-scope binder introduced by a `Forall`/`Exists`.
    Variable(Symbol, Kind),
    /// A term variable's type.
    Annotation(Symbol, Type),
    UnsolvedMono(Existential<domain::Mono>),
    SolvedMono(Existential<domain::Mono>, Monotype),
    UnsolvedRow(Existential<domain::Row>),
    SolvedRow(Existential<domain::Row>, Row),
    UnsolvedVariant(Existential<domain::Variant>),
    SolvedVariant(Existential<domain::Variant>, Variant),
    Marker(Existential<domain::Mark>),
}

/// Raised when a `solve*` call would violate the left-of-solution
/// ordering invariant (§4.C): the right-hand side mentions a rigid
/// variable or existential not yet in scope to the left of the
/// existential being solved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("solution out of scope")]
pub struct OutOfScope;

#[derive(Debug, Default, Clone)]
pub struct Context {
    entries: Vec<ContextEntry>,
    counter: fax_types::Counter,
}

impl Context {
    pub fn new() -> Self {
        Context::default()
    }

    pub fn entries(&self) -> &[ContextEntry] {
        &self.entries
    }

    /// A checkpoint into the entry vector, for the generic push/truncate
    /// pattern used by rigid-variable and term-variable introduction.
    pub fn mark(&self) -> usize {
        self.entries.len()
    }

    /// Discard every entry pushed since `mark`.
    pub fn truncate(&mut self, mark: usize) {
        self.entries.truncate(mark);
    }

    pub fn push_variable(&mut self, name: Symbol, kind: Kind) {
        self.entries.push(ContextEntry::Variable(name, kind));
    }

    pub fn push_annotation(&mut self, name: Symbol, ty: Type) {
        self.entries.push(ContextEntry::Annotation(name, ty));
    }

    /// Append an explicit `Marker` entry and return its id, for the
    /// existential-introduction checkpoint pattern (§4.D.1).
    pub fn push_marker(&mut self) -> Existential<domain::Mark> {
        let id = self.counter.fresh();
        self.entries.push(ContextEntry::Marker(id));
        id
    }

    /// Truncate the context at (and including) the entry for `marker`.
    /// A no-op if the marker is not present (already discarded).
    pub fn discard_to(&mut self, marker: Existential<domain::Mark>) {
        if let Some(idx) = self
            .entries
            .iter()
            .position(|e| matches!(e, ContextEntry::Marker(m) if *m == marker))
        {
            self.entries.truncate(idx);
        }
    }

    pub fn fresh_mono(&mut self) -> Existential<domain::Mono> {
        let id = self.counter.fresh();
        self.entries.push(ContextEntry::UnsolvedMono(id));
        id
    }

    pub fn fresh_row(&mut self) -> Existential<domain::Row> {
        let id = self.counter.fresh();
        self.entries.push(ContextEntry::UnsolvedRow(id));
        id
    }

    pub fn fresh_variant(&mut self) -> Existential<domain::Variant> {
        let id = self.counter.fresh();
        self.entries.push(ContextEntry::UnsolvedVariant(id));
        id
    }

    /// Insert a fresh unsolved existential of `kind` immediately before
    /// `before`, used by `instantiate_L`/`instantiate_R` to manufacture
    /// `ε1, ε2` to the left of the existential being split (§4.D.5).
    pub fn insert_mono_before(&mut self, before: Existential<domain::Mono>) -> Existential<domain::Mono> {
        let id = self.counter.fresh();
        let idx = self.position_mono(before).expect("existential not in context");
        self.entries.insert(idx, ContextEntry::UnsolvedMono(id));
        id
    }

    fn position_mono(&self, e: Existential<domain::Mono>) -> Option<usize> {
        self.entries
            .iter()
            .position(|entry| matches!(entry, ContextEntry::UnsolvedMono(u) if *u == e))
    }

    /// The index of `e`'s entry (solved or not), for ordering comparisons
    /// in `instantiate_L`/`instantiate_R` (§4.D.5).
    pub fn mono_rank(&self, e: Existential<domain::Mono>) -> Option<usize> {
        self.entries.iter().position(|entry| match entry {
            ContextEntry::UnsolvedMono(u) => *u == e,
            ContextEntry::SolvedMono(u, _) => *u == e,
            _ => false,
        })
    }

    pub fn row_rank(&self, e: Existential<domain::Row>) -> Option<usize> {
        self.entries.iter().position(|entry| match entry {
            ContextEntry::UnsolvedRow(u) => *u == e,
            ContextEntry::SolvedRow(u, _) => *u == e,
            _ => false,
        })
    }

    pub fn variant_rank(&self, e: Existential<domain::Variant>) -> Option<usize> {
        self.entries.iter().position(|entry| match entry {
            ContextEntry::UnsolvedVariant(u) => *u == e,
            ContextEntry::SolvedVariant(u, _) => *u == e,
            _ => false,
        })
    }

    /// Right-to-left lookup of a term variable's annotation, skipping
    /// `index` matches for variables shadowed by the same name.
    pub fn lookup_annotation(&self, name: &Symbol, index: usize) -> Option<&Type> {
        self.entries
            .iter()
            .rev()
            .filter_map(|e| match e {
                ContextEntry::Annotation(n, t) if n == name => Some(t),
                _ => None,
            })
            .nth(index)
    }

    pub fn has_variable(&self, name: &Symbol, kind: Kind) -> bool {
        self.entries
            .iter()
            .any(|e| matches!(e, ContextEntry::Variable(n, k) if n == name && *k == kind))
    }

    /// `solve(ε, monotype)` (§4.C): splits at ε's `Unsolved` entry,
    /// requires `monotype` well-formed in the prefix strictly left of it,
    /// and replaces the entry in place.
    #[tracing::instrument(level = "trace", skip(self))]
    pub fn solve_mono(&mut self, existential: Existential<domain::Mono>, monotype: Monotype) -> Result<(), OutOfScope> {
        let idx = self.position_mono(existential).ok_or(OutOfScope)?;
        if !well_formed::monotype_in(&self.entries[..idx], &monotype) {
            return Err(OutOfScope);
        }
        self.entries[idx] = ContextEntry::SolvedMono(existential, monotype);
        Ok(())
    }

    pub fn solve_row(&mut self, existential: Existential<domain::Row>, row: Row) -> Result<(), OutOfScope> {
        let idx = self
            .entries
            .iter()
            .position(|entry| matches!(entry, ContextEntry::UnsolvedRow(u) if *u == existential))
            .ok_or(OutOfScope)?;
        if !well_formed::row_in(&self.entries[..idx], &row) {
            return Err(OutOfScope);
        }
        self.entries[idx] = ContextEntry::SolvedRow(existential, row);
        Ok(())
    }

    pub fn solve_variant(&mut self, existential: Existential<domain::Variant>, variant: Variant) -> Result<(), OutOfScope> {
        let idx = self
            .entries
            .iter()
            .position(|entry| matches!(entry, ContextEntry::UnsolvedVariant(u) if *u == existential))
            .ok_or(OutOfScope)?;
        if !well_formed::variant_in(&self.entries[..idx], &variant) {
            return Err(OutOfScope);
        }
        self.entries[idx] = ContextEntry::SolvedVariant(existential, variant);
        Ok(())
    }

    pub fn lookup_solved_mono(&self, existential: Existential<domain::Mono>) -> Option<Monotype> {
        self.entries.iter().find_map(|e| match e {
            ContextEntry::SolvedMono(u, m) if *u == existential => Some(m.clone()),
            _ => None,
        })
    }

    pub fn lookup_solved_row(&self, existential: Existential<domain::Row>) -> Option<Row> {
        self.entries.iter().find_map(|e| match e {
            ContextEntry::SolvedRow(u, r) if *u == existential => Some(r.clone()),
            _ => None,
        })
    }

    pub fn lookup_solved_variant(&self, existential: Existential<domain::Variant>) -> Option<Variant> {
        self.entries.iter().find_map(|e| match e {
            ContextEntry::SolvedVariant(u, v) if *u == existential => Some(v.clone()),
            _ => None,
        })
    }

    pub fn is_mono_unsolved(&self, existential: Existential<domain::Mono>) -> bool {
        self.entries
            .iter()
            .any(|e| matches!(e, ContextEntry::UnsolvedMono(u) if *u == existential))
    }

    /// `apply(context, type)` (§4.C): eagerly and recursively substitutes
    /// every solved existential. Idempotent - applying twice equals
    /// applying once - because a `Solved` entry's RHS only ever mentions
    /// existentials strictly to its left (§3.5 invariant ii), so the
    /// recursive substitution below terminates and leaves no further
    /// solved existential behind.
    pub fn apply(&self, ty: &Type) -> Type {
        match ty {
            Type::Mono(m) => Type::Mono(self.apply_monotype(m)),
            Type::Forall(name, kind, body) => Type::Forall(name.clone(), *kind, Box::new(self.apply(body))),
            Type::Exists(name, kind, body) => Type::Exists(name.clone(), *kind, Box::new(self.apply(body))),
        }
    }

    pub fn apply_monotype(&self, m: &Monotype) -> Monotype {
        match m {
            Monotype::Unsolved(e) => match self.lookup_solved_mono(*e) {
                Some(solved) => self.apply_monotype(&solved),
                None => m.clone(),
            },
            Monotype::Variable(_) | Monotype::Bool | Monotype::Natural | Monotype::Text => m.clone(),
            Monotype::Function(a, b) => Monotype::Function(Box::new(self.apply_monotype(a)), Box::new(self.apply_monotype(b))),
            Monotype::List(a) => Monotype::List(Box::new(self.apply_monotype(a))),
            Monotype::Record(fields) => Monotype::Record(Fields {
                labeled: fields.labeled.iter().map(|(l, t)| (l.clone(), self.apply_monotype(t))).collect(),
                row: self.apply_row(&fields.row),
            }),
            Monotype::Union(alts) => Monotype::Union(fax_types::Alternatives {
                labeled: alts.labeled.iter().map(|(l, t)| (l.clone(), self.apply_monotype(t))).collect(),
                variant: self.apply_variant(&alts.variant),
            }),
        }
    }

    pub fn apply_row(&self, row: &Row) -> Row {
        match row {
            Row::Unsolved(e) => match self.lookup_solved_row(*e) {
                Some(solved) => self.apply_row(&solved),
                None => row.clone(),
            },
            _ => row.clone(),
        }
    }

    pub fn apply_variant(&self, variant: &Variant) -> Variant {
        match variant {
            Variant::Unsolved(e) => match self.lookup_solved_variant(*e) {
                Some(solved) => self.apply_variant(&solved),
                None => variant.clone(),
            },
            _ => variant.clone(),
        }
    }

    /// `well_formed(type)` (§4.C): every rigid variable and every
    /// existential (solved or not) mentioned in `type` has a matching
    /// entry somewhere in the context.
    pub fn well_formed(&self, ty: &Type) -> bool {
        well_formed::type_in(&self.entries, ty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fax_types::Monotype;

    fn sym(s: &str) -> Symbol {
        Symbol::new(s)
    }

    #[test]
    fn solve_replaces_unsolved_entry_in_place() {
        let mut ctx = Context::new();
        let a = ctx.fresh_mono();
        ctx.solve_mono(a, Monotype::Bool).unwrap();
        assert_eq!(ctx.lookup_solved_mono(a), Some(Monotype::Bool));
    }

    #[test]
    fn solve_rejects_reference_to_existential_on_the_right() {
        let mut ctx = Context::new();
        let a = ctx.fresh_mono();
        let b = ctx.fresh_mono();
        let err = ctx.solve_mono(a, Monotype::Unsolved(b));
        assert!(err.is_err());
    }

    #[test]
    fn solve_accepts_reference_to_existential_on_the_left() {
        let mut ctx = Context::new();
        let a = ctx.fresh_mono();
        let b = ctx.fresh_mono();
        assert!(ctx.solve_mono(b, Monotype::Unsolved(a)).is_ok());
    }

    #[test]
    fn apply_is_idempotent() {
        let mut ctx = Context::new();
        let a = ctx.fresh_mono();
        let b = ctx.fresh_mono();
        ctx.solve_mono(a, Monotype::Unsolved(b)).unwrap();
        ctx.solve_mono(b, Monotype::Bool).unwrap();
        let ty = Type::Mono(Monotype::Unsolved(a));
        let once = ctx.apply(&ty);
        let twice = ctx.apply(&once);
        assert_eq!(once, twice);
        assert_eq!(once, Type::Mono(Monotype::Bool));
    }

    #[test]
    fn discard_to_marker_truncates_inclusive() {
        let mut ctx = Context::new();
        ctx.push_variable(sym("x"), Kind::Type);
        let marker = ctx.push_marker();
        ctx.fresh_mono();
        ctx.fresh_mono();
        ctx.discard_to(marker);
        assert_eq!(ctx.entries().len(), 1);
    }

    #[test]
    fn variable_lookup_uses_de_bruijn_index_among_homonyms() {
        let mut ctx = Context::new();
        ctx.push_annotation(sym("x"), Type::Mono(Monotype::Bool));
        ctx.push_annotation(sym("x"), Type::Mono(Monotype::Natural));
        assert_eq!(ctx.lookup_annotation(&sym("x"), 0), Some(&Type::Mono(Monotype::Natural)));
        assert_eq!(ctx.lookup_annotation(&sym("x"), 1), Some(&Type::Mono(Monotype::Bool)));
        assert_eq!(ctx.lookup_annotation(&sym("x"), 2), None);
    }

    #[test]
    fn well_formed_requires_matching_rigid_variable() {
        let mut ctx = Context::new();
        let ty = Type::Mono(Monotype::Variable(sym("a")));
        assert!(!ctx.well_formed(&ty));
        ctx.push_variable(sym("a"), Kind::Type);
        assert!(ctx.well_formed(&ty));
    }

    #[test]
    fn well_formed_descends_into_quantifier_with_its_own_binder() {
        let ty = Type::forall(sym("a"), Kind::Type, Type::Mono(Monotype::Variable(sym("a"))));
        let ctx = Context::new();
        assert!(ctx.well_formed(&ty));
    }
}
