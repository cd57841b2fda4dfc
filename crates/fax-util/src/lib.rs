//! fax-util - shared foundation types for the fax core.
//!
//! Everything here is deliberately small: the core is a single-threaded,
//! single-session type inference engine and evaluator, not a full compiler
//! front end. This crate carries only the two concerns every other crate in
//! the workspace needs: [`span::Span`] for tagging errors with a source
//! location, and [`Symbol`] for cheap-to-clone, content-hashed identifiers.

pub mod span;
mod symbol;

pub use span::{FileId, Span};
pub use symbol::Symbol;
