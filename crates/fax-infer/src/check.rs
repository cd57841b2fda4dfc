//! Check mode (§4.D.1).

use fax_syntax::{Node, Syntax};
use fax_types::{Fields, Monotype, Row, Type};
use fax_util::Span;

use crate::error::TypeError;
use crate::Infer;

impl Infer {
    /// `check(Gamma, expression, type) -> Gamma'`.
    pub fn check(&mut self, expr: &Node, expected: &Type) -> Result<(), TypeError> {
        let expected = self.ctx.apply(expected);
        match &expected {
            Type::Forall(name, kind, body) => {
                let mark = self.ctx.mark();
                self.ctx.push_variable(name.clone(), *kind);
                self.check(expr, body)?;
                self.ctx.truncate(mark);
                Ok(())
            }
            Type::Exists(name, kind, body) => {
                let marker = self.ctx.push_marker();
                let replacement = self.fresh_replacement(*kind);
                let substituted = fax_types::substitute(body, name, *kind, &replacement);
                self.check(expr, &substituted)?;
                self.ctx.discard_to(marker);
                Ok(())
            }
            Type::Mono(Monotype::Function(a, b)) => match &expr.kind {
                Syntax::Lambda { parameter, body } => {
                    let mark = self.ctx.mark();
                    self.ctx.push_annotation(parameter.clone(), Type::Mono((**a).clone()));
                    self.check(body, &Type::Mono((**b).clone()))?;
                    self.ctx.truncate(mark);
                    Ok(())
                }
                _ => self.check_by_synthesis(expr, &expected),
            },
            Type::Mono(Monotype::Record(expected_fields)) => match &expr.kind {
                Syntax::Record(literal_fields) => self.check_record(expr.span, literal_fields, expected_fields),
                _ => self.check_by_synthesis(expr, &expected),
            },
            Type::Mono(_) => self.check_by_synthesis(expr, &expected),
        }
    }

    /// The default rule: synthesize, then subtype the result against the
    /// expected type (both applied).
    fn check_by_synthesis(&mut self, expr: &Node, expected: &Type) -> Result<(), TypeError> {
        let synthesized = self.synthesize(expr)?;
        let synthesized = self.ctx.apply(&synthesized);
        let expected = self.ctx.apply(expected);
        self.subtype(&synthesized, &expected, expr.span)
    }

    fn check_record(
        &mut self,
        span: Span,
        literal_fields: &[(fax_util::Symbol, Node)],
        expected: &Fields,
    ) -> Result<(), TypeError> {
        for (label, expected_ty) in &expected.labeled {
            match literal_fields.iter().find(|(l, _)| l == label) {
                Some((_, value_node)) => self.check(value_node, &Type::Mono(expected_ty.clone()))?,
                None => {
                    return Err(TypeError::MissingField {
                        label: label.clone(),
                        record_type: Type::Mono(Monotype::Record(expected.clone())),
                        location: span,
                    })
                }
            }
        }

        let mut leftover = Vec::new();
        for (label, value_node) in literal_fields {
            if expected.lookup(label).is_none() {
                let synthesized = self.synthesize(value_node)?;
                let mono = self.instantiate_to_monotype(synthesized);
                leftover.push((label.clone(), mono));
            }
        }

        match &expected.row {
            Row::Empty | Row::Variable(_) if !leftover.is_empty() => Err(TypeError::NotSubtype {
                actual: Type::Mono(Monotype::Record(Fields {
                    labeled: leftover,
                    row: Row::Empty,
                })),
                expected: Type::Mono(Monotype::Record(expected.clone())),
                location: span,
            }),
            _ => Ok(()),
        }
    }

    /// Instantiate a (possibly polymorphic) type down to a bare
    /// `Monotype` by peeling off its leading quantifiers with fresh
    /// existentials/rigids, used where the data model demands a
    /// `Monotype` (record/union field slots).
    pub(crate) fn instantiate_to_monotype(&mut self, ty: Type) -> Monotype {
        match ty {
            Type::Mono(m) => m,
            Type::Forall(name, kind, body) | Type::Exists(name, kind, body) => {
                let replacement = self.fresh_replacement(kind);
                let substituted = fax_types::substitute(&body, &name, kind, &replacement);
                self.instantiate_to_monotype(substituted)
            }
        }
    }
}
