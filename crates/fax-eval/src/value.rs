//! The runtime domain (§3.6): values mirror source terms closely enough
//! that a closure, a record, and a tagged alternative are each exactly
//! one constructor, plus a family of stuck "neutral" forms for the one
//! case inference does not rule out statically — a free variable.

use std::rc::Rc;

use fax_syntax::{Node, Operator};
use fax_util::Symbol;
use indexmap::IndexMap;

/// `(name, value)` pairs in binding order; lookup walks back-to-front.
pub type Environment = Vec<(Symbol, Value)>;

/// A fully or partially normalized term.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// `\x. e` paired with the environment it closed over.
    Closure {
        parameter: Symbol,
        body: Rc<Node>,
        environment: Environment,
    },
    /// A builtin name not yet applied to its argument.
    Builtin(Symbol),
    /// A bare alternative tag not yet applied to its payload, e.g. `Left`.
    Constructor(Symbol),
    /// `merge m`, with `m` already normalized, waiting for its scrutinee.
    Merge(Box<Value>),
    Record(IndexMap<Symbol, Value>),
    Alternative { tag: Symbol, payload: Box<Value> },
    List(Vec<Value>),
    Bool(bool),
    Natural(u64),
    Text(String),
    /// A computation stuck on a free variable.
    Neutral(Neutral),
}

/// A stuck computation, parameterized by the free variable it is
/// ultimately blocked on.
#[derive(Debug, Clone, PartialEq)]
pub enum Neutral {
    Variable { name: Symbol, index: usize },
    Application(Box<Neutral>, Box<Value>),
    Field { record: Box<Neutral>, label: Symbol },
    Merge { handlers: Box<Value>, scrutinee: Box<Neutral> },
    If { condition: Box<Neutral>, then_branch: Box<Value>, else_branch: Box<Value> },
    Operator { operator: Operator, left: Box<Value>, right: Box<Value> },
    Builtin { name: Symbol, argument: Box<Neutral> },
}
