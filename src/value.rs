//! Discriminated value type shared by the query compiler, validator, merge engine and stores.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Semantic kind of a schema field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    String,
    #[serde(alias = "integer")]
    Int,
    Uint,
    #[serde(alias = "double")]
    Float,
    #[serde(alias = "boolean")]
    Bool,
    #[serde(alias = "array")]
    Sequence,
    #[serde(alias = "map", alias = "mapping")]
    Struct,
}

impl FieldKind {
    /// PostgreSQL type used to cast bound parameters for this kind.
    pub fn pg_type(self) -> &'static str {
        match self {
            FieldKind::String => "text",
            FieldKind::Int | FieldKind::Uint => "bigint",
            FieldKind::Float => "double precision",
            FieldKind::Bool => "boolean",
            FieldKind::Sequence | FieldKind::Struct => "jsonb",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FieldKind::String => "string",
            FieldKind::Int => "int",
            FieldKind::Uint => "uint",
            FieldKind::Float => "float",
            FieldKind::Bool => "bool",
            FieldKind::Sequence => "sequence",
            FieldKind::Struct => "struct",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
    String(String),
    Seq(Vec<Value>),
    /// Mappings and struct-kind fields.
    Map(BTreeMap<String, Value>),
}

impl Value {
    pub fn zero(kind: FieldKind) -> Value {
        match kind {
            FieldKind::String => Value::String(String::new()),
            FieldKind::Int => Value::Int(0),
            FieldKind::Uint => Value::Uint(0),
            FieldKind::Float => Value::Float(0.0),
            FieldKind::Bool => Value::Bool(false),
            FieldKind::Sequence => Value::Seq(Vec::new()),
            FieldKind::Struct => Value::Map(BTreeMap::new()),
        }
    }

    /// A map is zero when every entry is zero, the same way a struct is zero when all its fields are.
    pub fn is_zero(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Bool(b) => !*b,
            Value::Int(n) => *n == 0,
            Value::Uint(n) => *n == 0,
            Value::Float(n) => *n == 0.0,
            Value::String(s) => s.is_empty(),
            Value::Seq(items) => items.is_empty(),
            Value::Map(entries) => entries.values().all(Value::is_zero),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(n) => Some(*n as f64),
            Value::Uint(n) => Some(*n as f64),
            Value::Float(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Character count for strings, element count for sequences and maps.
    pub fn len(&self) -> Option<usize> {
        match self {
            Value::String(s) => Some(s.chars().count()),
            Value::Seq(items) => Some(items.len()),
            Value::Map(entries) => Some(entries.len()),
            _ => None,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Uint(_) => "uint",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Seq(_) => "sequence",
            Value::Map(_) => "struct",
        }
    }

    /// Conform a value to a field kind. Returns None on a kind mismatch.
    pub fn coerce(self, kind: FieldKind) -> Option<Value> {
        match (kind, self) {
            (kind, Value::Null) => Some(Value::zero(kind)),
            (FieldKind::String, v @ Value::String(_)) => Some(v),
            (FieldKind::Bool, v @ Value::Bool(_)) => Some(v),
            (FieldKind::Int, v @ Value::Int(_)) => Some(v),
            (FieldKind::Int, Value::Uint(n)) => i64::try_from(n).ok().map(Value::Int),
            (FieldKind::Uint, v @ Value::Uint(_)) => Some(v),
            (FieldKind::Uint, Value::Int(n)) => u64::try_from(n).ok().map(Value::Uint),
            (FieldKind::Float, v @ Value::Float(_)) => Some(v),
            (FieldKind::Float, Value::Int(n)) => Some(Value::Float(n as f64)),
            (FieldKind::Float, Value::Uint(n)) => Some(Value::Float(n as f64)),
            (FieldKind::Sequence, v @ Value::Seq(_)) => Some(v),
            (FieldKind::Struct, v @ Value::Map(_)) => Some(v),
            _ => None,
        }
    }

    /// Parse a query-string literal as the given kind.
    pub fn parse_as(kind: FieldKind, s: &str) -> Option<Value> {
        match kind {
            FieldKind::String => Some(Value::String(s.to_string())),
            FieldKind::Int => s.trim().parse().ok().map(Value::Int),
            FieldKind::Uint => s.trim().parse().ok().map(Value::Uint),
            FieldKind::Float => s.trim().parse().ok().map(Value::Float),
            FieldKind::Bool => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "1" => Some(Value::Bool(true)),
                "false" | "0" => Some(Value::Bool(false)),
                _ => None,
            },
            FieldKind::Sequence | FieldKind::Struct => serde_json::from_str::<serde_json::Value>(s)
                .ok()
                .and_then(|j| Value::from_json(&j).coerce(kind)),
        }
    }

    pub fn from_json(v: &serde_json::Value) -> Value {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else if let Some(u) = n.as_u64() {
                    Value::Uint(u)
                } else {
                    Value::Float(n.as_f64().unwrap_or(0.0))
                }
            }
            serde_json::Value::String(s) => Value::String(s.clone()),
            serde_json::Value::Array(items) => Value::Seq(items.iter().map(Value::from_json).collect()),
            serde_json::Value::Object(obj) => Value::Map(
                obj.iter()
                    .map(|(k, v)| (k.clone(), Value::from_json(v)))
                    .collect(),
            ),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(n) => serde_json::Value::Number((*n).into()),
            Value::Uint(n) => serde_json::Value::Number((*n).into()),
            Value::Float(n) => serde_json::Number::from_f64(*n)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Seq(items) => serde_json::Value::Array(items.iter().map(Value::to_json).collect()),
            Value::Map(entries) => serde_json::Value::Object(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }

    /// Ordering between two values of the same kind. Numbers compare across Int/Uint/Float.
    pub fn compare(&self, other: &Value) -> Option<std::cmp::Ordering> {
        match (self, other) {
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            (Value::Uint(a), Value::Uint(b)) => Some(a.cmp(b)),
            (a, b) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => f.write_str(s),
            other => write!(f, "{}", other.to_json()),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n.into())
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Uint(n.into())
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Value::Uint(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::Seq(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(entries: BTreeMap<String, Value>) -> Self {
        Value::Map(entries)
    }
}
