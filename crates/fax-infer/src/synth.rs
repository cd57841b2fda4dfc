//! Synthesize mode (§4.D.2).

use fax_syntax::{Node, Operator, Scalar, Syntax};
use fax_types::{Alternatives, Fields, Kind, Monotype, Row, Type, Variant};
use fax_util::Span;

use crate::builtins;
use crate::error::TypeError;
use crate::Infer;

impl Infer {
    /// `synthesize(Gamma, expression) -> (type, Gamma')`.
    pub fn synthesize(&mut self, expr: &Node) -> Result<Type, TypeError> {
        match &expr.kind {
            Syntax::Variable { name, index } => match self.ctx.lookup_annotation(name, *index) {
                Some(ty) => {
                    let ty = ty.clone();
                    Ok(self.ctx.apply(&ty))
                }
                None => Err(TypeError::UnboundVariable {
                    name: name.clone(),
                    index: *index,
                    location: expr.span,
                }),
            },

            Syntax::Lambda { parameter, body } => {
                let e_in = self.ctx.fresh_mono();
                let e_out = self.ctx.fresh_mono();
                let mark = self.ctx.mark();
                self.ctx.push_annotation(parameter.clone(), Type::Mono(Monotype::Unsolved(e_in)));
                self.check(body, &Type::Mono(Monotype::Unsolved(e_out)))?;
                self.ctx.truncate(mark);
                Ok(Type::Mono(Monotype::function(Monotype::Unsolved(e_in), Monotype::Unsolved(e_out))))
            }

            Syntax::Application { function, argument } => {
                let f_ty = self.synthesize(function)?;
                let f_ty = self.ctx.apply(&f_ty);
                self.synthesize_application(&f_ty, argument, expr.span)
            }

            Syntax::Let { bindings, body } => {
                let mark = self.ctx.mark();
                for binding in bindings {
                    let ty = match &binding.annotation {
                        Some(annotation) => {
                            if !self.ctx.well_formed(annotation) {
                                return Err(TypeError::NotWellFormed(annotation.clone()));
                            }
                            self.check(&binding.value, annotation)?;
                            annotation.clone()
                        }
                        None => {
                            let binding_mark = self.ctx.mark();
                            let synthesized = self.synthesize(&binding.value)?;
                            let applied = self.ctx.apply(&synthesized);
                            crate::generalize::generalize_from(&self.ctx, binding_mark, &applied)
                        }
                    };
                    self.ctx.push_annotation(binding.name.clone(), ty);
                }
                let result = self.synthesize(body)?;
                let result = self.ctx.apply(&result);
                self.ctx.truncate(mark);
                Ok(result)
            }

            Syntax::Annotation { expression, annotation } => {
                if !self.ctx.well_formed(annotation) {
                    return Err(TypeError::NotWellFormed(annotation.clone()));
                }
                self.check(expression, annotation)?;
                Ok(annotation.clone())
            }

            Syntax::List(items) => {
                let e = self.ctx.fresh_mono();
                for item in items {
                    self.check(item, &Type::Mono(Monotype::Unsolved(e)))?;
                }
                Ok(Type::Mono(Monotype::list(Monotype::Unsolved(e))))
            }

            Syntax::Record(fields) => {
                let mut labeled = Vec::with_capacity(fields.len());
                for (label, node) in fields {
                    let ty = self.synthesize(node)?;
                    let mono = self.instantiate_to_monotype(ty);
                    labeled.push((label.clone(), mono));
                }
                Ok(Type::Mono(Monotype::Record(Fields { labeled, row: Row::Empty })))
            }

            Syntax::Field { record, label } => {
                let record_ty = self.synthesize(record)?;
                let record_ty = self.ctx.apply(&record_ty);
                let field_ty = self.ctx.fresh_mono();
                let tail = self.ctx.fresh_row();
                let expected = Type::Mono(Monotype::Record(Fields {
                    labeled: vec![(label.clone(), Monotype::Unsolved(field_ty))],
                    row: Row::Unsolved(tail),
                }));
                self.subtype(&record_ty, &expected, expr.span)?;
                Ok(Type::Mono(Monotype::Unsolved(field_ty)))
            }

            Syntax::Alternative(tag) => {
                let payload = fax_util::Symbol::new("a");
                let variant_tail = self.ctx.fresh_variant();
                let union = Monotype::Union(Alternatives {
                    labeled: vec![(tag.clone(), Monotype::Variable(payload.clone()))],
                    variant: Variant::Unsolved(variant_tail),
                });
                Ok(Type::forall(
                    payload.clone(),
                    Kind::Type,
                    Type::Mono(Monotype::function(Monotype::Variable(payload), union)),
                ))
            }

            Syntax::Merge(handlers) => self.synthesize_merge(handlers, expr.span),

            Syntax::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.check(condition, &Type::Mono(Monotype::Bool))?;
                let then_ty = self.synthesize(then_branch)?;
                let then_ty = self.ctx.apply(&then_ty);
                let then_mono = self.instantiate_to_monotype(then_ty);
                let else_ty = self.synthesize(else_branch)?;
                let else_ty = self.ctx.apply(&else_ty);
                let else_mono = self.instantiate_to_monotype(else_ty);
                let join = self.ctx.fresh_mono();
                self.subtype(&Type::Mono(then_mono), &Type::Mono(Monotype::Unsolved(join)), expr.span)?;
                let else_applied = self.ctx.apply_monotype(&else_mono);
                self.subtype(&Type::Mono(else_applied), &Type::Mono(Monotype::Unsolved(join)), expr.span)?;
                Ok(Type::Mono(Monotype::Unsolved(join)))
            }

            Syntax::Scalar(scalar) => Ok(Type::Mono(match scalar {
                Scalar::Bool(_) => Monotype::Bool,
                Scalar::Natural(_) => Monotype::Natural,
                Scalar::Text(_) => Monotype::Text,
            })),

            Syntax::Operator { operator, left, right } => self.synthesize_operator(*operator, left, right, expr.span),

            Syntax::Builtin(name) => builtins::builtin_type(name).ok_or_else(|| TypeError::UnboundVariable {
                name: name.clone(),
                index: 0,
                location: expr.span,
            }),

            Syntax::Embed(_) => {
                panic!("Embed node reached fax-infer: the import layer must resolve embeds before calling into the core")
            }
        }
    }

    /// `synthesize_application(Gamma, F, x)` (§4.D.2): the three-way split
    /// over a quantifier, an unsolved existential, or a concrete function.
    fn synthesize_application(&mut self, f: &Type, argument: &Node, span: Span) -> Result<Type, TypeError> {
        match f {
            Type::Forall(name, kind, body) => {
                let replacement = self.fresh_replacement(*kind);
                let instantiated = fax_types::substitute(body, name, *kind, &replacement);
                self.synthesize_application(&instantiated, argument, span)
            }
            Type::Exists(name, kind, body) => {
                let mark = self.ctx.mark();
                self.ctx.push_variable(name.clone(), *kind);
                let result = self.synthesize_application(body, argument, span)?;
                self.ctx.truncate(mark);
                Ok(result)
            }
            Type::Mono(Monotype::Unsolved(e)) => {
                let e = *e;
                let e1 = self.ctx.insert_mono_before(e);
                let e2 = self.ctx.insert_mono_before(e);
                self.ctx
                    .solve_mono(e, Monotype::function(Monotype::Unsolved(e1), Monotype::Unsolved(e2)))
                    .map_err(|_| TypeError::OutOfScope(e.pretty()))?;
                self.check(argument, &Type::Mono(Monotype::Unsolved(e1)))?;
                Ok(Type::Mono(Monotype::Unsolved(e2)))
            }
            Type::Mono(Monotype::Function(a, b)) => {
                self.check(argument, &Type::Mono((**a).clone()))?;
                Ok(Type::Mono((**b).clone()))
            }
            other => Err(TypeError::NotAFunction {
                inferred: other.clone(),
                location: span,
            }),
        }
    }

    fn synthesize_operator(&mut self, operator: Operator, left: &Node, right: &Node, span: Span) -> Result<Type, TypeError> {
        if operator == Operator::Append {
            let left_ty = self.synthesize(left)?;
            let left_ty = self.ctx.apply(&left_ty);
            let left_mono = self.instantiate_to_monotype(left_ty);
            return match &left_mono {
                Monotype::Text => {
                    self.check(right, &Type::Mono(Monotype::Text))?;
                    Ok(Type::Mono(Monotype::Text))
                }
                Monotype::List(elem) => {
                    let list_ty = Monotype::list((**elem).clone());
                    self.check(right, &Type::Mono(list_ty.clone()))?;
                    Ok(Type::Mono(list_ty))
                }
                Monotype::Unsolved(e) => {
                    self.ctx.solve_mono(*e, Monotype::Text).map_err(|_| TypeError::OutOfScope(e.pretty()))?;
                    self.check(right, &Type::Mono(Monotype::Text))?;
                    Ok(Type::Mono(Monotype::Text))
                }
                other => Err(TypeError::NotSubtype {
                    actual: Type::Mono(other.clone()),
                    expected: Type::Mono(Monotype::Text),
                    location: span,
                }),
            };
        }
        let (lhs, rhs, result) = builtins::operator_signature(operator);
        self.check(left, &Type::Mono(lhs))?;
        self.check(right, &Type::Mono(rhs))?;
        Ok(Type::Mono(result))
    }

    /// `merge m` (§4.D.2): `m` is a record of per-tag handlers; every
    /// handler must be a function, and all must return a common `B`.
    fn synthesize_merge(&mut self, handlers: &Node, span: Span) -> Result<Type, TypeError> {
        let handlers_ty = self.synthesize(handlers)?;
        let handlers_ty = self.ctx.apply(&handlers_ty);
        let handlers_mono = self.instantiate_to_monotype(handlers_ty.clone());
        let fields = match handlers_mono {
            Monotype::Record(fields) if !fields.labeled.is_empty() => fields,
            _ => {
                return Err(TypeError::MergeNotAUnionHandler {
                    found: handlers_ty,
                    location: span,
                })
            }
        };

        let mut alternatives = Vec::with_capacity(fields.labeled.len());
        let mut result: Option<Monotype> = None;
        for (label, handler_ty) in &fields.labeled {
            match handler_ty {
                Monotype::Function(payload, branch_result) => {
                    alternatives.push((label.clone(), (**payload).clone()));
                    match &result {
                        None => result = Some((**branch_result).clone()),
                        Some(expected) => {
                            let expected = expected.clone();
                            self.subtype(&Type::Mono((**branch_result).clone()), &Type::Mono(expected), span)?;
                        }
                    }
                }
                _ => {
                    return Err(TypeError::MergeNotAUnionHandler {
                        found: handlers_ty,
                        location: span,
                    })
                }
            }
        }

        let union = Monotype::Union(Alternatives {
            labeled: alternatives,
            variant: Variant::Empty,
        });
        Ok(Type::Mono(Monotype::function(union, result.expect("non-empty handler record"))))
    }
}
