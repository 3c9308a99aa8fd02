//! Builds parameterized SELECT, INSERT and UPDATE statements from a schema.

use crate::config::{FieldDescriptor, Schema};
use crate::error::AppError;
use crate::query::{Condition, Operand, QuerySpec};
use crate::record::{Record, Resource};
use crate::sql::PgBindValue;
use crate::value::Value;

/// Quote identifier for PostgreSQL (safe: only from descriptors).
fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

#[derive(Debug, Default)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<PgBindValue>,
}

impl QueryBuf {
    fn push_param(&mut self, v: &Value) -> Result<u32, AppError> {
        self.params.push(PgBindValue::from_value(v)?);
        Ok(self.params.len() as u32)
    }

    /// `$n::type` placeholder for a newly bound value.
    fn placeholder(&mut self, field: &FieldDescriptor, v: &Value) -> Result<String, AppError> {
        let n = self.push_param(v)?;
        Ok(format!("${}::{}", n, field.kind.pg_type()))
    }
}

fn column(field: &FieldDescriptor) -> &str {
    field.column.as_deref().unwrap_or(&field.name)
}

fn select_column_list(schema: &Schema) -> String {
    schema
        .persisted()
        .map(|(_, f)| quoted(column(f)))
        .collect::<Vec<_>>()
        .join(", ")
}

fn condition_sql(q: &mut QueryBuf, schema: &Schema, cond: &Condition) -> Result<String, AppError> {
    let field = schema
        .field(&cond.field)
        .ok_or_else(|| AppError::Internal(format!("condition on unknown field {}", cond.field)))?;
    let col = quoted(column(field));
    match &cond.value {
        Operand::Single(raw) => {
            let ph = q.placeholder(field, &field.parse_literal(raw)?)?;
            Ok(format!("{} {} {}", col, cond.operator.sql(), ph))
        }
        Operand::List(items) => {
            let phs = items
                .iter()
                .map(|raw| q.placeholder(field, &field.parse_literal(raw)?))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(format!("{} IN ({})", col, phs.join(", ")))
        }
    }
}

/// SELECT with the query's conditions ANDed in order, ORDER BY the order field (or the primary key), LIMIT/OFFSET.
pub fn select(schema: &Schema, spec: &QuerySpec) -> Result<QueryBuf, AppError> {
    let mut q = QueryBuf::default();
    let mut where_parts = Vec::with_capacity(spec.conditions.len());
    for cond in &spec.conditions {
        where_parts.push(condition_sql(&mut q, schema, cond)?);
    }
    let where_clause = if where_parts.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", where_parts.join(" AND "))
    };
    let order_clause = match &spec.order {
        Some(order) => {
            let field = schema.field(&order.field).ok_or_else(|| {
                AppError::Internal(format!("order on unknown field {}", order.field))
            })?;
            format!(" ORDER BY {} {}", quoted(column(field)), order.direction)
        }
        None => format!(" ORDER BY {}", quoted(column(schema.primary_key_field()))),
    };
    q.sql = format!(
        "SELECT {} FROM {}{}{} LIMIT {} OFFSET {}",
        select_column_list(schema),
        quoted(&schema.collection),
        where_clause,
        order_clause,
        spec.limit,
        spec.offset
    );
    Ok(q)
}

/// SELECT by primary key.
pub fn select_by_id(schema: &Schema, id: &Value) -> Result<QueryBuf, AppError> {
    let mut q = QueryBuf::default();
    let pk = schema.primary_key_field();
    let ph = q.placeholder(pk, id)?;
    q.sql = format!(
        "SELECT {} FROM {} WHERE {} = {}",
        select_column_list(schema),
        quoted(&schema.collection),
        quoted(column(pk)),
        ph
    );
    Ok(q)
}

/// INSERT every persisted field. A zero auto-key primary key is left to the database.
pub fn insert(record: &Record) -> Result<QueryBuf, AppError> {
    let schema = record.schema();
    let mut q = QueryBuf::default();
    let mut cols = Vec::new();
    let mut placeholders = Vec::new();
    for (i, field) in schema.persisted() {
        let value = record.value_at(i);
        if i == schema.primary_key && schema.auto_key && value.is_zero() {
            continue;
        }
        placeholders.push(q.placeholder(field, value)?);
        cols.push(quoted(column(field)));
    }
    q.sql = format!(
        "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
        quoted(&schema.collection),
        cols.join(", "),
        placeholders.join(", "),
        select_column_list(schema)
    );
    Ok(q)
}

/// UPDATE every persisted non-key column by primary key.
pub fn update(record: &Record) -> Result<QueryBuf, AppError> {
    let schema = record.schema();
    let mut q = QueryBuf::default();
    let mut sets = Vec::new();
    for (i, field) in schema.persisted() {
        if i == schema.primary_key {
            continue;
        }
        let ph = q.placeholder(field, record.value_at(i))?;
        sets.push(format!("{} = {}", quoted(column(field)), ph));
    }
    let pk = schema.primary_key_field();
    let id_ph = q.placeholder(pk, record.primary_key())?;
    if sets.is_empty() {
        q.sql = format!(
            "SELECT {} FROM {} WHERE {} = {}",
            select_column_list(schema),
            quoted(&schema.collection),
            quoted(column(pk)),
            id_ph
        );
        return Ok(q);
    }
    q.sql = format!(
        "UPDATE {} SET {} WHERE {} = {} RETURNING {}",
        quoted(&schema.collection),
        sets.join(", "),
        quoted(column(pk)),
        id_ph,
        select_column_list(schema)
    );
    Ok(q)
}
