//! fax-types - the type model: existentials, monotypes, rows, variants,
//! and quantified types, plus their pretty printer.
//!
//! This crate is pure data and pure functions over that data. It knows
//! nothing about a type-checking context or an inference algorithm; those
//! live in `fax-context` and `fax-infer` respectively, built on top of the
//! shapes defined here.

pub mod existential;
pub mod monotype;
mod poly;
mod print;

pub use existential::{domain, Counter, Existential};
pub use monotype::{Alternatives, Fields, Monotype, Row, Variant};
pub use poly::{free_existentials, substitute, FreeExistentials, Kind, Replacement, Type};
