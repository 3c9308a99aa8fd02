//! Compiled filter, ordering and pagination for one request.

use std::fmt;

pub const DEFAULT_LIMIT: u64 = 1000;
pub const DEFAULT_OFFSET: u64 = 0;

/// Declaration order is the emission order for conditions on the same field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Operator {
    Eq,
    Lt,
    Lte,
    Gt,
    Gte,
    In,
}

impl Operator {
    /// Operator for a `{op}-{field}` key prefix. Equality has no prefix.
    pub fn from_prefix(token: &str) -> Option<Self> {
        match token {
            "lt" => Some(Operator::Lt),
            "lte" => Some(Operator::Lte),
            "gt" => Some(Operator::Gt),
            "gte" => Some(Operator::Gte),
            "in" => Some(Operator::In),
            _ => None,
        }
    }

    pub fn sql(self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Lt => "<",
            Operator::Lte => "<=",
            Operator::Gt => ">",
            Operator::Gte => ">=",
            Operator::In => "IN",
        }
    }
}

/// Raw query-string literal(s). Typing happens in the executor.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Operand {
    Single(String),
    /// `in` values, split on `,` in input order.
    List(Vec<String>),
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Condition {
    /// Schema field name (not the raw key).
    pub field: String,
    pub operator: Operator,
    pub value: Operand,
}

impl Condition {
    pub fn new(field: impl Into<String>, operator: Operator, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            operator,
            value: Operand::Single(value.into()),
        }
    }

    pub fn within<S: Into<String>>(field: impl Into<String>, values: impl IntoIterator<Item = S>) -> Self {
        Self {
            field: field.into(),
            operator: Operator::In,
            value: Operand::List(values.into_iter().map(Into::into).collect()),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrderSpec {
    pub field: String,
    pub direction: Direction,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuerySpec {
    pub conditions: Vec<Condition>,
    pub order: Option<OrderSpec>,
    pub limit: u64,
    pub offset: u64,
    /// JSON keys requested with `q-fields`; None returns full records.
    pub fields: Option<Vec<String>>,
}

impl Default for QuerySpec {
    fn default() -> Self {
        Self {
            conditions: Vec::new(),
            order: None,
            limit: DEFAULT_LIMIT,
            offset: DEFAULT_OFFSET,
            fields: None,
        }
    }
}
