//! Schema-bound entity instances and the resource contract generic handlers rely on.

use crate::config::Schema;
use crate::value::Value;
use serde_json::Map;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("malformed json: {0}")]
    Syntax(String),
    #[error("body must be a JSON object")]
    NotAnObject,
    #[error("{key}: expected {expected}, got {got}")]
    KindMismatch {
        key: String,
        expected: String,
        got: &'static str,
    },
}

#[derive(Error, Debug)]
pub enum RecordError {
    #[error("{schema} has no field '{field}'")]
    UnknownField { schema: String, field: String },
    #[error("{schema}.{field}: expected {expected}, got {got}")]
    KindMismatch {
        schema: String,
        field: String,
        expected: String,
        got: &'static str,
    },
}

/// Minimal identity a servable type exposes to the generic handlers.
pub trait Resource {
    fn collection(&self) -> &str;
    fn primary_key(&self) -> &Value;
    /// Flag the record as deleted. Returns false when the type has no soft-delete field.
    fn mark_deleted(&mut self) -> bool;
}

#[derive(Clone, Debug)]
pub struct Record {
    schema: Arc<Schema>,
    values: Vec<Value>,
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.schema.name == other.schema.name && self.values == other.values
    }
}

impl Record {
    /// Every field at its kind's zero value.
    pub fn new(schema: Arc<Schema>) -> Self {
        let values = schema.fields.iter().map(|f| Value::zero(f.kind)).collect();
        Self { schema, values }
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.schema.index_of(name).map(|i| &self.values[i])
    }

    pub(crate) fn value_at(&self, index: usize) -> &Value {
        &self.values[index]
    }

    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<(), RecordError> {
        let index = self
            .schema
            .index_of(name)
            .ok_or_else(|| RecordError::UnknownField {
                schema: self.schema.name.clone(),
                field: name.to_string(),
            })?;
        self.set_at(index, value.into())
    }

    pub(crate) fn set_at(&mut self, index: usize, value: Value) -> Result<(), RecordError> {
        let field = &self.schema.fields[index];
        let got = value.kind_name();
        let coerced = value
            .coerce(field.kind)
            .ok_or_else(|| RecordError::KindMismatch {
                schema: self.schema.name.clone(),
                field: field.name.clone(),
                expected: field.kind.to_string(),
                got,
            })?;
        self.values[index] = coerced;
        Ok(())
    }

    /// Caller guarantees both records share a schema.
    pub(crate) fn copy_from(&mut self, other: &Record, index: usize) {
        self.values[index] = other.values[index].clone();
    }

    /// Decode a request body by JSON keys. Unknown keys are ignored, absent keys stay zero.
    pub fn from_json(schema: Arc<Schema>, body: &serde_json::Value) -> Result<Self, DecodeError> {
        let obj = body.as_object().ok_or(DecodeError::NotAnObject)?;
        let mut record = Record::new(schema);
        for index in 0..record.schema.fields.len() {
            let field = &record.schema.fields[index];
            let Some(key) = field.json_key.as_deref() else {
                continue;
            };
            let Some(raw) = obj.get(key) else { continue };
            let value = Value::from_json(raw);
            let got = value.kind_name();
            let coerced = value
                .coerce(field.kind)
                .ok_or_else(|| DecodeError::KindMismatch {
                    key: key.to_string(),
                    expected: field.kind.to_string(),
                    got,
                })?;
            record.values[index] = coerced;
        }
        Ok(record)
    }

    pub fn to_json(&self) -> serde_json::Value {
        let mut out = Map::new();
        for (field, value) in self.schema.fields.iter().zip(&self.values) {
            let Some(key) = field.json_key.as_deref() else {
                continue;
            };
            if field.omit_empty && value.is_zero() {
                continue;
            }
            out.insert(key.to_string(), value.to_json());
        }
        serde_json::Value::Object(out)
    }

    /// Only the primary key plus the requested JSON keys. Unknown keys are ignored.
    pub fn to_json_projected(&self, keys: &[String]) -> serde_json::Value {
        let mut out = Map::new();
        for (i, (field, value)) in self.schema.fields.iter().zip(&self.values).enumerate() {
            let Some(key) = field.json_key.as_deref() else {
                continue;
            };
            let wanted = i == self.schema.primary_key || keys.iter().any(|k| k == key);
            if wanted {
                out.insert(key.to_string(), value.to_json());
            }
        }
        serde_json::Value::Object(out)
    }
}

impl Resource for Record {
    fn collection(&self) -> &str {
        &self.schema.collection
    }

    fn primary_key(&self) -> &Value {
        &self.values[self.schema.primary_key]
    }

    fn mark_deleted(&mut self) -> bool {
        match self.schema.soft_delete {
            Some(index) => {
                self.values[index] = Value::Bool(true);
                true
            }
            None => false,
        }
    }
}
