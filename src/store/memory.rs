//! In-process store. Evaluates a QuerySpec directly over stored records.

use crate::config::Schema;
use crate::error::AppError;
use crate::query::{Condition, Direction, Operand, Operator, QuerySpec};
use crate::record::{Record, Resource};
use crate::store::Store;
use crate::value::{FieldKind, Value};
use async_trait::async_trait;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

#[derive(Default)]
struct Table {
    rows: Vec<Record>,
    next_key: i64,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<HashMap<String, Table>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(_: T) -> AppError {
    AppError::Internal("memory store lock poisoned".into())
}

/// A condition with its operand already typed.
struct Compiled {
    index: usize,
    operator: Operator,
    operands: Vec<Value>,
}

impl Compiled {
    fn new(schema: &Schema, cond: &Condition) -> Result<Self, AppError> {
        let index = schema
            .index_of(&cond.field)
            .ok_or_else(|| AppError::Internal(format!("condition on unknown field {}", cond.field)))?;
        let field = &schema.fields[index];
        let operands = match &cond.value {
            Operand::Single(raw) => vec![field.parse_literal(raw)?],
            Operand::List(items) => items
                .iter()
                .map(|raw| field.parse_literal(raw))
                .collect::<Result<_, _>>()?,
        };
        Ok(Self {
            index,
            operator: cond.operator,
            operands,
        })
    }

    fn matches(&self, record: &Record) -> bool {
        let value = record.value_at(self.index);
        let cmp = |other: &Value| match value.compare(other) {
            Some(ord) => Some(ord),
            None if value == other => Some(Ordering::Equal),
            None => None,
        };
        match self.operator {
            Operator::In => self.operands.iter().any(|o| cmp(o) == Some(Ordering::Equal)),
            op => {
                let Some(ord) = self.operands.first().and_then(cmp) else {
                    return false;
                };
                match op {
                    Operator::Eq => ord == Ordering::Equal,
                    Operator::Lt => ord == Ordering::Less,
                    Operator::Lte => ord != Ordering::Greater,
                    Operator::Gt => ord == Ordering::Greater,
                    Operator::Gte => ord != Ordering::Less,
                    Operator::In => false,
                }
            }
        }
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn select(&self, schema: &Arc<Schema>, spec: &QuerySpec) -> Result<Vec<Record>, AppError> {
        let filters = spec
            .conditions
            .iter()
            .map(|c| Compiled::new(schema, c))
            .collect::<Result<Vec<_>, _>>()?;
        let order = match &spec.order {
            Some(o) => Some((
                schema.index_of(&o.field).ok_or_else(|| {
                    AppError::Internal(format!("order on unknown field {}", o.field))
                })?,
                o.direction,
            )),
            None => None,
        };

        let tables = self.tables.read().map_err(poisoned)?;
        let mut rows: Vec<Record> = tables
            .get(&schema.collection)
            .map(|t| t.rows.as_slice())
            .unwrap_or_default()
            .iter()
            .filter(|r| filters.iter().all(|f| f.matches(r)))
            .cloned()
            .collect();
        drop(tables);

        // Stable sort keeps insertion order among equal keys.
        if let Some((index, direction)) = order {
            rows.sort_by(|a, b| {
                let ord = a
                    .value_at(index)
                    .compare(b.value_at(index))
                    .unwrap_or(Ordering::Equal);
                match direction {
                    Direction::Asc => ord,
                    Direction::Desc => ord.reverse(),
                }
            });
        }
        Ok(rows
            .into_iter()
            .skip(spec.offset as usize)
            .take(spec.limit as usize)
            .collect())
    }

    async fn find(&self, schema: &Arc<Schema>, id: &Value) -> Result<Option<Record>, AppError> {
        let tables = self.tables.read().map_err(poisoned)?;
        Ok(tables.get(&schema.collection).and_then(|t| {
            t.rows
                .iter()
                .find(|r| same_key(r.primary_key(), id))
                .cloned()
        }))
    }

    async fn insert(&self, record: &Record) -> Result<Record, AppError> {
        let schema = record.schema();
        let mut tables = self.tables.write().map_err(poisoned)?;
        let table = tables.entry(schema.collection.clone()).or_default();
        let mut stored = record.clone();

        if schema.auto_key && stored.primary_key().is_zero() {
            let pk = schema.primary_key_field();
            // Skip keys already taken by rows inserted with an explicit key.
            let key = loop {
                table.next_key += 1;
                let candidate = match pk.kind {
                    FieldKind::String => Value::String(table.next_key.to_string()),
                    _ => Value::Int(table.next_key),
                };
                if !table.rows.iter().any(|r| same_key(r.primary_key(), &candidate)) {
                    break candidate;
                }
            };
            stored.set_at(schema.primary_key, key)?;
        } else if table
            .rows
            .iter()
            .any(|r| same_key(r.primary_key(), stored.primary_key()))
        {
            return Err(AppError::BadRequest(format!(
                "{} with key {} already exists",
                schema.collection,
                stored.primary_key()
            )));
        }

        // Mirror a database: fields excluded from persistence are not stored.
        for (i, field) in schema.fields.iter().enumerate() {
            if !field.is_persisted() {
                stored.set_at(i, Value::zero(field.kind))?;
            }
        }
        table.rows.push(stored.clone());
        Ok(stored)
    }

    async fn update(&self, record: &Record) -> Result<Record, AppError> {
        let schema = record.schema();
        let mut tables = self.tables.write().map_err(poisoned)?;
        let row = tables
            .get_mut(&schema.collection)
            .and_then(|t| {
                t.rows
                    .iter_mut()
                    .find(|r| same_key(r.primary_key(), record.primary_key()))
            })
            .ok_or_else(|| AppError::not_found(&schema.collection))?;
        let mut stored = record.clone();
        for (i, field) in schema.fields.iter().enumerate() {
            if !field.is_persisted() {
                stored.set_at(i, Value::zero(field.kind))?;
            }
        }
        *row = stored.clone();
        Ok(stored)
    }
}

fn same_key(a: &Value, b: &Value) -> bool {
    a == b || a.compare(b) == Some(Ordering::Equal)
}
