//! The typing error taxonomy (§7). Every category here must be
//! distinguishable by a test; the message text itself is free-form.

use fax_types::{Monotype, Type};
use fax_util::{Span, Symbol};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TypeError {
    #[error("unbound variable `{name}` (index {index}) at {location}")]
    UnboundVariable { name: Symbol, index: usize, location: Span },

    #[error("`{inferred}` is not a function, at {location}")]
    NotAFunction { inferred: Type, location: Span },

    #[error("expected `{expected}`, found `{actual}`, at {location}")]
    NotSubtype { actual: Type, expected: Type, location: Span },

    #[error("record `{record_type}` has no field `{label}`, at {location}")]
    MissingField {
        label: Symbol,
        record_type: Type,
        location: Span,
    },

    #[error("union `{union_type}` has no alternative `{label}`, at {location}")]
    MissingAlternative {
        label: Symbol,
        union_type: Type,
        location: Span,
    },

    #[error("occurs check failed: {existential} occurs in `{offending_type}`")]
    OccursCheck { existential: String, offending_type: Monotype },

    #[error("type `{0}` is not well-formed")]
    NotWellFormed(Type),

    #[error("existential {0} solved out of scope")]
    OutOfScope(String),

    #[error("`merge` argument `{found}` is not a union of handlers, at {location}")]
    MergeNotAUnionHandler { found: Type, location: Span },
}
