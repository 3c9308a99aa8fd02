//! Query compiler: string parameters to a structured filter.

pub mod compiler;
pub mod spec;

pub use compiler::{compile, QueryError, KEY_FIELDS, KEY_LIMIT, KEY_OFFSET, KEY_ORDER};
pub use spec::{
    Condition, Direction, Operand, Operator, OrderSpec, QuerySpec, DEFAULT_LIMIT, DEFAULT_OFFSET,
};
