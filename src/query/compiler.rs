//! Query-string parameters -> QuerySpec.

use crate::config::Schema;
use crate::query::spec::*;
use std::collections::HashSet;
use thiserror::Error;

pub const KEY_ORDER: &str = "q-order";
pub const KEY_LIMIT: &str = "q-limit";
pub const KEY_OFFSET: &str = "q-offset";
pub const KEY_FIELDS: &str = "q-fields";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("q-order format invalid: '{0}' (expected asc-field or desc-field)")]
    InvalidOrderFormat(String),
    #[error("q-order field '{0}' isn't present in the resource")]
    UnknownOrderField(String),
    #[error("q-order ordering '{0}' is invalid, must use asc or desc")]
    InvalidOrderDirection(String),
}

/// Compile query parameters against a schema.
///
/// Keys that name no persisted field, and operators outside `lt|lte|gt|gte|in`, are dropped
/// without error. Only a malformed `q-order` fails. When a key repeats the first value wins.
/// Conditions come out sorted by field, then operator, then value.
pub fn compile<I, K, V>(schema: &Schema, params: I) -> Result<QuerySpec, QueryError>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut spec = QuerySpec::default();
    let mut seen = HashSet::new();

    for (key, value) in params {
        let (key, value) = (key.as_ref(), value.as_ref());
        if !seen.insert(key.to_string()) {
            continue;
        }
        match key {
            KEY_ORDER => spec.order = Some(order_from_value(schema, value)?),
            KEY_LIMIT => spec.limit = uint_or(value, DEFAULT_LIMIT),
            KEY_OFFSET => spec.offset = uint_or(value, DEFAULT_OFFSET),
            KEY_FIELDS => spec.fields = Some(field_list(value)),
            _ => match condition_for_key(schema, key, value) {
                Some(cond) => spec.conditions.push(cond),
                None => tracing::debug!(key, "dropping unmatched query parameter"),
            },
        }
    }

    spec.conditions.sort();
    Ok(spec)
}

fn condition_for_key(schema: &Schema, key: &str, value: &str) -> Option<Condition> {
    let parts: Vec<&str> = key.split('-').collect();
    match parts.as_slice() {
        [field] => Some(Condition::new(filterable(schema, field)?, Operator::Eq, value)),
        [op, field] => {
            let operator = Operator::from_prefix(op)?;
            let field = filterable(schema, field)?;
            Some(match operator {
                Operator::In => Condition::within(field, value.split(',')),
                op => Condition::new(field, op, value),
            })
        }
        _ => None,
    }
}

/// Canonical name of a persisted field matching `key` by name or JSON key, ignoring case.
fn filterable<'a>(schema: &'a Schema, key: &str) -> Option<&'a str> {
    let field = &schema.fields[schema.lookup(key)?];
    field.is_persisted().then_some(field.name.as_str())
}

/// Format, then field, then direction.
fn order_from_value(schema: &Schema, value: &str) -> Result<OrderSpec, QueryError> {
    let parts: Vec<&str> = value.split('-').collect();
    let [direction, field] = parts.as_slice() else {
        return Err(QueryError::InvalidOrderFormat(value.to_string()));
    };
    let field = filterable(schema, field)
        .ok_or_else(|| QueryError::UnknownOrderField((*field).to_string()))?;
    let direction = match *direction {
        "asc" => Direction::Asc,
        "desc" => Direction::Desc,
        other => return Err(QueryError::InvalidOrderDirection(other.to_string())),
    };
    Ok(OrderSpec {
        field: field.to_string(),
        direction,
    })
}

fn uint_or(value: &str, default: u64) -> u64 {
    match value.trim().parse::<i64>() {
        Ok(n) if n >= 0 => n as u64,
        _ => default,
    }
}

fn field_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
