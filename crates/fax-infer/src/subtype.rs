//! Subtyping, instantiation, and row/variant unification (§4.D.3-§4.D.5).

use fax_types::{domain, Alternatives, Existential, Fields, Kind, Monotype, Replacement, Row, Type, Variant};
use fax_util::Span;

use crate::error::TypeError;
use crate::Infer;

impl Infer {
    /// `subtype(Gamma, A, B) -> Gamma'` (§4.D.3).
    pub(crate) fn subtype(&mut self, a: &Type, b: &Type, span: Span) -> Result<(), TypeError> {
        match (a, b) {
            (Type::Forall(name, kind, body), _) => {
                let marker = self.ctx.push_marker();
                let replacement = self.fresh_replacement(*kind);
                let instantiated = fax_types::substitute(body, name, *kind, &replacement);
                self.subtype(&instantiated, b, span)?;
                self.ctx.discard_to(marker);
                Ok(())
            }
            (_, Type::Forall(name, kind, body)) => {
                let mark = self.ctx.mark();
                self.ctx.push_variable(name.clone(), *kind);
                self.subtype(a, body, span)?;
                self.ctx.truncate(mark);
                Ok(())
            }
            (Type::Exists(name, kind, body), _) => {
                let mark = self.ctx.mark();
                self.ctx.push_variable(name.clone(), *kind);
                self.subtype(body, b, span)?;
                self.ctx.truncate(mark);
                Ok(())
            }
            (_, Type::Exists(name, kind, body)) => {
                let marker = self.ctx.push_marker();
                let replacement = self.fresh_replacement(*kind);
                let instantiated = fax_types::substitute(body, name, *kind, &replacement);
                self.subtype(a, &instantiated, span)?;
                self.ctx.discard_to(marker);
                Ok(())
            }
            (Type::Mono(m1), Type::Mono(m2)) => self.subtype_monotype(m1, m2, span),
        }
    }

    pub(crate) fn fresh_replacement(&mut self, kind: Kind) -> Replacement {
        match kind {
            Kind::Type => Replacement::Mono(Monotype::Unsolved(self.ctx.fresh_mono())),
            Kind::Fields => Replacement::Row(Row::Unsolved(self.ctx.fresh_row())),
            Kind::Alternatives => Replacement::Variant(Variant::Unsolved(self.ctx.fresh_variant())),
        }
    }

    fn subtype_monotype(&mut self, a: &Monotype, b: &Monotype, span: Span) -> Result<(), TypeError> {
        match (a, b) {
            (Monotype::Bool, Monotype::Bool) | (Monotype::Natural, Monotype::Natural) | (Monotype::Text, Monotype::Text) => Ok(()),
            (Monotype::Variable(n1), Monotype::Variable(n2)) if n1 == n2 => Ok(()),
            (Monotype::Unsolved(e1), Monotype::Unsolved(e2)) if e1 == e2 => Ok(()),
            (Monotype::Function(a1, a2), Monotype::Function(b1, b2)) => {
                self.subtype_monotype(b1, a1, span)?;
                let a2r = self.ctx.apply_monotype(a2);
                let b2r = self.ctx.apply_monotype(b2);
                self.subtype_monotype(&a2r, &b2r, span)
            }
            (Monotype::List(a1), Monotype::List(b1)) => self.subtype_monotype(a1, b1, span),
            (Monotype::Record(f1), Monotype::Record(f2)) => self.row_subtype(f1, f2, span),
            (Monotype::Union(u1), Monotype::Union(u2)) => self.variant_subtype(u1, u2, span),
            (Monotype::Unsolved(e), _) if !occurs_in_monotype(*e, b) => self.instantiate_l(*e, b, span),
            (_, Monotype::Unsolved(e)) if !occurs_in_monotype(*e, a) => self.instantiate_r(a, *e, span),
            (Monotype::Unsolved(e), _) => Err(TypeError::OccursCheck {
                existential: e.pretty(),
                offending_type: b.clone(),
            }),
            (_, Monotype::Unsolved(e)) => Err(TypeError::OccursCheck {
                existential: e.pretty(),
                offending_type: a.clone(),
            }),
            _ => Err(TypeError::NotSubtype {
                actual: Type::Mono(a.clone()),
                expected: Type::Mono(b.clone()),
                location: span,
            }),
        }
    }

    /// `instantiate_L(Gamma, eps, A) -> Gamma'` (§4.D.5).
    pub(crate) fn instantiate_l(&mut self, e: Existential<domain::Mono>, a: &Monotype, span: Span) -> Result<(), TypeError> {
        match a {
            Monotype::Unsolved(e2) if mono_is_right_of(self, e, *e2) => self
                .ctx
                .solve_mono(*e2, Monotype::Unsolved(e))
                .map_err(|_| TypeError::OutOfScope(e2.pretty())),
            Monotype::Function(a1, a2) => {
                let e1 = self.ctx.insert_mono_before(e);
                let e2out = self.ctx.insert_mono_before(e);
                self.ctx
                    .solve_mono(e, Monotype::function(Monotype::Unsolved(e1), Monotype::Unsolved(e2out)))
                    .map_err(|_| TypeError::OutOfScope(e.pretty()))?;
                self.instantiate_r(a1, e1, span)?;
                let applied = self.ctx.apply_monotype(a2);
                self.instantiate_l(e2out, &applied, span)
            }
            _ => self.ctx.solve_mono(e, a.clone()).map_err(|_| TypeError::OutOfScope(e.pretty())),
        }
    }

    /// `instantiate_R(Gamma, A, eps) -> Gamma'` (§4.D.5), the mirror image.
    pub(crate) fn instantiate_r(&mut self, a: &Monotype, e: Existential<domain::Mono>, span: Span) -> Result<(), TypeError> {
        match a {
            Monotype::Unsolved(e2) if mono_is_right_of(self, e, *e2) => self
                .ctx
                .solve_mono(*e2, Monotype::Unsolved(e))
                .map_err(|_| TypeError::OutOfScope(e2.pretty())),
            Monotype::Function(a1, a2) => {
                let e1 = self.ctx.insert_mono_before(e);
                let e2out = self.ctx.insert_mono_before(e);
                self.ctx
                    .solve_mono(e, Monotype::function(Monotype::Unsolved(e1), Monotype::Unsolved(e2out)))
                    .map_err(|_| TypeError::OutOfScope(e.pretty()))?;
                self.instantiate_l(e1, a1, span)?;
                let applied = self.ctx.apply_monotype(a2);
                self.instantiate_r(&applied, e2out, span)
            }
            _ => self.ctx.solve_mono(e, a.clone()).map_err(|_| TypeError::OutOfScope(e.pretty())),
        }
    }

    /// `{F1|rho1} <: {F2|rho2}` (§4.D.4): common labels recurse
    /// structurally; extras on either side must be absorbed by the
    /// other's tail, failing if that tail is closed.
    fn row_subtype(&mut self, f1: &Fields, f2: &Fields, span: Span) -> Result<(), TypeError> {
        for (label, t1) in &f1.labeled {
            if let Some(t2) = f2.lookup(label) {
                let t1a = self.ctx.apply_monotype(t1);
                let t2a = self.ctx.apply_monotype(t2);
                self.subtype_monotype(&t1a, &t2a, span)?;
            }
        }
        let extra1_empty = f1.labeled.iter().all(|(l, _)| f2.lookup(l).is_some());
        let extra2_empty = f2.labeled.iter().all(|(l, _)| f1.lookup(l).is_some());

        if !extra1_empty {
            match &f2.row {
                Row::Unsolved(_) => {}
                _ => {
                    let missing = f1.labeled.iter().find(|(l, _)| f2.lookup(l).is_none()).unwrap().0.clone();
                    return Err(TypeError::MissingField {
                        label: missing,
                        record_type: Type::Mono(Monotype::Record(f2.clone())),
                        location: span,
                    });
                }
            }
        }
        if !extra2_empty {
            match &f1.row {
                Row::Unsolved(_) => {}
                _ => {
                    let missing = f2.labeled.iter().find(|(l, _)| f1.lookup(l).is_none()).unwrap().0.clone();
                    return Err(TypeError::MissingField {
                        label: missing,
                        record_type: Type::Mono(Monotype::Record(f1.clone())),
                        location: span,
                    });
                }
            }
        }
        if extra1_empty && extra2_empty {
            self.reconcile_row(&f1.row, &f2.row, span)?;
        }
        Ok(())
    }

    fn reconcile_row(&mut self, row1: &Row, row2: &Row, span: Span) -> Result<(), TypeError> {
        match (row1, row2) {
            (Row::Empty, Row::Empty) => Ok(()),
            (Row::Variable(n1), Row::Variable(n2)) if n1 == n2 => Ok(()),
            (Row::Unsolved(e1), Row::Unsolved(e2)) if e1 == e2 => Ok(()),
            (Row::Unsolved(e1), Row::Unsolved(e2)) => {
                if row_is_right_of(self, *e1, *e2) {
                    self.ctx.solve_row(*e2, Row::Unsolved(*e1)).map_err(|_| TypeError::OutOfScope(e2.pretty()))
                } else {
                    self.ctx.solve_row(*e1, Row::Unsolved(*e2)).map_err(|_| TypeError::OutOfScope(e1.pretty()))
                }
            }
            (Row::Unsolved(e1), _) => self.ctx.solve_row(*e1, row2.clone()).map_err(|_| TypeError::OutOfScope(e1.pretty())),
            (_, Row::Unsolved(e2)) => self.ctx.solve_row(*e2, row1.clone()).map_err(|_| TypeError::OutOfScope(e2.pretty())),
            _ => Err(TypeError::NotSubtype {
                actual: Type::Mono(Monotype::Record(Fields { labeled: vec![], row: row1.clone() })),
                expected: Type::Mono(Monotype::Record(Fields { labeled: vec![], row: row2.clone() })),
                location: span,
            }),
        }
    }

    /// Variant subtyping (§4.D.4), polarity inverted from records: only
    /// extras on the left need absorbing by the right tail. A right side
    /// with strictly more alternatives than the left names is always
    /// fine - the left simply never produces the extra tags.
    fn variant_subtype(&mut self, u1: &Alternatives, u2: &Alternatives, span: Span) -> Result<(), TypeError> {
        for (label, t1) in &u1.labeled {
            if let Some(t2) = u2.lookup(label) {
                let t1a = self.ctx.apply_monotype(t1);
                let t2a = self.ctx.apply_monotype(t2);
                self.subtype_monotype(&t1a, &t2a, span)?;
            }
        }
        let extra1_empty = u1.labeled.iter().all(|(l, _)| u2.lookup(l).is_some());
        let extra2_empty = u2.labeled.iter().all(|(l, _)| u1.lookup(l).is_some());

        if !extra1_empty {
            match &u2.variant {
                Variant::Unsolved(_) => {}
                _ => {
                    let missing = u1.labeled.iter().find(|(l, _)| u2.lookup(l).is_none()).unwrap().0.clone();
                    return Err(TypeError::MissingAlternative {
                        label: missing,
                        union_type: Type::Mono(Monotype::Union(u2.clone())),
                        location: span,
                    });
                }
            }
        }
        if extra1_empty && extra2_empty {
            self.reconcile_variant(&u1.variant, &u2.variant, span)?;
        }
        Ok(())
    }

    fn reconcile_variant(&mut self, v1: &Variant, v2: &Variant, span: Span) -> Result<(), TypeError> {
        match (v1, v2) {
            (Variant::Empty, Variant::Empty) => Ok(()),
            (Variant::Variable(n1), Variant::Variable(n2)) if n1 == n2 => Ok(()),
            (Variant::Unsolved(e1), Variant::Unsolved(e2)) if e1 == e2 => Ok(()),
            (Variant::Unsolved(e1), Variant::Unsolved(e2)) => {
                if variant_is_right_of(self, *e1, *e2) {
                    self.ctx
                        .solve_variant(*e2, Variant::Unsolved(*e1))
                        .map_err(|_| TypeError::OutOfScope(e2.pretty()))
                } else {
                    self.ctx
                        .solve_variant(*e1, Variant::Unsolved(*e2))
                        .map_err(|_| TypeError::OutOfScope(e1.pretty()))
                }
            }
            (Variant::Unsolved(e1), _) => self.ctx.solve_variant(*e1, v2.clone()).map_err(|_| TypeError::OutOfScope(e1.pretty())),
            (_, Variant::Unsolved(e2)) => self.ctx.solve_variant(*e2, v1.clone()).map_err(|_| TypeError::OutOfScope(e2.pretty())),
            _ => Err(TypeError::NotSubtype {
                actual: Type::Mono(Monotype::Union(Alternatives { labeled: vec![], variant: v1.clone() })),
                expected: Type::Mono(Monotype::Union(Alternatives { labeled: vec![], variant: v2.clone() })),
                location: span,
            }),
        }
    }
}

fn occurs_in_monotype(e: Existential<domain::Mono>, m: &Monotype) -> bool {
    match m {
        Monotype::Unsolved(e2) => *e2 == e,
        Monotype::Function(a, b) => occurs_in_monotype(e, a) || occurs_in_monotype(e, b),
        Monotype::List(a) => occurs_in_monotype(e, a),
        Monotype::Record(fields) => fields.labeled.iter().any(|(_, t)| occurs_in_monotype(e, t)),
        Monotype::Union(alts) => alts.labeled.iter().any(|(_, t)| occurs_in_monotype(e, t)),
        Monotype::Variable(_) | Monotype::Bool | Monotype::Natural | Monotype::Text => false,
    }
}

fn mono_is_right_of(infer: &Infer, left: Existential<domain::Mono>, other: Existential<domain::Mono>) -> bool {
    matches!((infer.ctx.mono_rank(left), infer.ctx.mono_rank(other)), (Some(l), Some(o)) if o > l)
}

fn row_is_right_of(infer: &Infer, left: Existential<domain::Row>, other: Existential<domain::Row>) -> bool {
    matches!((infer.ctx.row_rank(left), infer.ctx.row_rank(other)), (Some(l), Some(o)) if o > l)
}

fn variant_is_right_of(infer: &Infer, left: Existential<domain::Variant>, other: Existential<domain::Variant>) -> bool {
    matches!((infer.ctx.variant_rank(left), infer.ctx.variant_rank(other)), (Some(l), Some(o)) if o > l)
}
