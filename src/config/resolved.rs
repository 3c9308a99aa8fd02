//! Resolved schema model: descriptors validated and flattened for runtime use.

use crate::config::Operation;
use crate::error::AppError;
use crate::validate::Rule;
use crate::value::{FieldKind, Value};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

#[derive(Clone, Debug)]
pub struct FieldDescriptor {
    pub name: String,
    pub kind: FieldKind,
    /// None when the field is never read from or written to JSON.
    pub json_key: Option<String>,
    /// None when the field is excluded from persistence.
    pub column: Option<String>,
    pub omit_empty: bool,
    /// Raw validation tag as declared.
    pub tag: String,
    /// Rule pipeline parsed from `tag`.
    pub rules: Vec<Rule>,
    /// Some(true) for `merge:"true"`, Some(false) for `merge:"false"`, None when unset.
    pub mergeable: Option<bool>,
}

impl FieldDescriptor {
    pub fn is_persisted(&self) -> bool {
        self.column.is_some()
    }

    /// Type a query-string literal by this field's kind. An unparsable literal is a client error.
    pub fn parse_literal(&self, raw: &str) -> Result<Value, AppError> {
        Value::parse_as(self.kind, raw).ok_or_else(|| {
            AppError::BadRequest(format!("{}: '{}' is not a valid {}", self.name, raw, self.kind))
        })
    }
}

#[derive(Clone, Debug)]
pub struct Schema {
    pub name: String,
    pub collection: String,
    /// Declaration order; record values are stored in the same order.
    pub fields: Vec<FieldDescriptor>,
    pub primary_key: usize,
    pub auto_key: bool,
    pub created: Option<usize>,
    pub updated: Option<usize>,
    pub soft_delete: Option<usize>,
    pub operations: HashSet<Operation>,
    pub(crate) by_name: HashMap<String, usize>,
}

impl Schema {
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.index_of(name).map(|i| &self.fields[i])
    }

    pub fn primary_key_field(&self) -> &FieldDescriptor {
        &self.fields[self.primary_key]
    }

    /// Case-insensitive lookup by field name or JSON key.
    pub fn lookup(&self, key: &str) -> Option<usize> {
        self.fields.iter().position(|f| {
            f.name.eq_ignore_ascii_case(key)
                || f.json_key
                    .as_deref()
                    .is_some_and(|j| j.eq_ignore_ascii_case(key))
        })
    }

    pub fn persisted(&self) -> impl Iterator<Item = (usize, &FieldDescriptor)> {
        self.fields.iter().enumerate().filter(|(_, f)| f.is_persisted())
    }

    pub fn allows(&self, op: Operation) -> bool {
        self.operations.contains(&op)
    }
}

/// Immutable set of schemas, built once at start and shared read-only.
#[derive(Clone, Debug, Default)]
pub struct Registry {
    schemas: Vec<Arc<Schema>>,
    by_name: HashMap<String, Arc<Schema>>,
}

impl Registry {
    pub(crate) fn new(schemas: Vec<Arc<Schema>>) -> Self {
        let by_name = schemas
            .iter()
            .map(|s| (s.name.clone(), Arc::clone(s)))
            .collect();
        Self { schemas, by_name }
    }

    pub fn get(&self, name: &str) -> Option<&Arc<Schema>> {
        self.by_name.get(name)
    }

    pub fn schemas(&self) -> &[Arc<Schema>] {
        &self.schemas
    }
}
