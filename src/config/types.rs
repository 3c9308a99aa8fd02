//! Raw descriptor types matching the resource descriptor JSON.

use crate::value::FieldKind;
use serde::{Deserialize, Serialize};

/// Generic operations a resource can expose.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    List,
    Read,
    Create,
    Update,
    Delete,
}

impl Operation {
    pub const ALL: [Operation; 5] = [
        Operation::List,
        Operation::Read,
        Operation::Create,
        Operation::Update,
        Operation::Delete,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Operation::List => "list",
            Operation::Read => "read",
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Delete => "delete",
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TimestampsConfig {
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub updated: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FieldConfig {
    pub name: String,
    pub kind: FieldKind,
    /// JSON key; absent means camelCase of `name`, "-" means never read or written.
    #[serde(default)]
    pub json: Option<String>,
    /// Column name; absent means `name`, "-" means not persisted.
    #[serde(default)]
    pub column: Option<String>,
    #[serde(default)]
    pub omit_empty: bool,
    /// Raw validation tag, e.g. `"nonzero | maxlen(64)"`.
    #[serde(default)]
    pub validate: Option<String>,
    /// Raw merge tag: `"true"`, `"false"` or anything else (unset).
    #[serde(default)]
    pub merge: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ResourceConfig {
    /// Path segment and registry key.
    pub name: String,
    /// Table name; defaults to `name`.
    #[serde(default)]
    pub collection: Option<String>,
    #[serde(default = "default_primary_key")]
    pub primary_key: String,
    /// Primary key is assigned by the store when left at its zero value.
    #[serde(default = "default_true")]
    pub auto_key: bool,
    #[serde(default)]
    pub timestamps: TimestampsConfig,
    #[serde(default)]
    pub soft_delete: Option<String>,
    #[serde(default = "default_operations")]
    pub operations: Vec<Operation>,
    pub fields: Vec<FieldConfig>,
}

fn default_primary_key() -> String {
    "id".into()
}

fn default_true() -> bool {
    true
}

fn default_operations() -> Vec<Operation> {
    Operation::ALL.to_vec()
}

/// All resource descriptors in one document.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RegistryConfig {
    pub resources: Vec<ResourceConfig>,
}
