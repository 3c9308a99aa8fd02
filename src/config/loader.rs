//! Load descriptors from a file or string and resolve them into a registry.

use crate::case::{resolve_key, to_camel_case};
use crate::config::resolved::{FieldDescriptor, Registry, Schema};
use crate::config::types::*;
use crate::config::validate;
use crate::error::ConfigError;
use crate::validate::parse_tag;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Build the registry from descriptors (validates first).
pub fn resolve(config: &RegistryConfig) -> Result<Registry, ConfigError> {
    validate(config)?;
    let schemas = config
        .resources
        .iter()
        .map(|res| resolve_resource(res).map(Arc::new))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Registry::new(schemas))
}

fn resolve_resource(res: &ResourceConfig) -> Result<Schema, ConfigError> {
    let mut fields = Vec::with_capacity(res.fields.len());
    for f in &res.fields {
        let tag = f.validate.clone().unwrap_or_default();
        let rules = parse_tag(&tag).map_err(|source| ConfigError::InvalidRule {
            resource: res.name.clone(),
            field: f.name.clone(),
            source,
        })?;
        fields.push(FieldDescriptor {
            name: f.name.clone(),
            kind: f.kind,
            json_key: resolve_key(f.json.as_deref(), || to_camel_case(&f.name)),
            column: resolve_key(f.column.as_deref(), || f.name.clone()),
            omit_empty: f.omit_empty,
            tag,
            rules,
            mergeable: merge_flag(f.merge.as_deref()),
        });
    }

    let by_name: HashMap<String, usize> = fields
        .iter()
        .enumerate()
        .map(|(i, f)| (f.name.clone(), i))
        .collect();
    let index = |name: &str| {
        by_name
            .get(name)
            .copied()
            .ok_or_else(|| ConfigError::MissingReference {
                kind: "field",
                id: format!("{}.{}", res.name, name),
            })
    };
    let primary_key = index(&res.primary_key)?;
    let created = res.timestamps.created.as_deref().map(index).transpose()?;
    let updated = res.timestamps.updated.as_deref().map(index).transpose()?;
    let soft_delete = res.soft_delete.as_deref().map(index).transpose()?;

    Ok(Schema {
        name: res.name.clone(),
        collection: res.collection.clone().unwrap_or_else(|| res.name.clone()),
        fields,
        primary_key,
        auto_key: res.auto_key,
        created,
        updated,
        soft_delete,
        operations: res.operations.iter().copied().collect(),
        by_name,
    })
}

fn merge_flag(tag: Option<&str>) -> Option<bool> {
    match tag.map(str::trim) {
        Some("true") => Some(true),
        Some("false") => Some(false),
        _ => None,
    }
}

pub fn load_from_str(json: &str) -> Result<RegistryConfig, ConfigError> {
    serde_json::from_str(json).map_err(|e| ConfigError::Load(e.to_string()))
}

/// Read a descriptor document from disk.
pub async fn load_from_path(path: impl AsRef<Path>) -> Result<RegistryConfig, ConfigError> {
    let path = path.as_ref();
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ConfigError::Load(format!("{}: {}", path.display(), e)))?;
    tracing::debug!(path = %path.display(), "loaded resource descriptors");
    load_from_str(&raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::FieldKind;
    use serde_json::json;

    fn config(v: serde_json::Value) -> RegistryConfig {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn key_grammar_defaults_and_exclusions() {
        let registry = resolve(&config(json!({"resources": [{
            "name": "members",
            "operations": ["list", "read"],
            "fields": [
                {"name": "id", "kind": "int"},
                {"name": "password_hash", "kind": "string", "json": "-"},
                {"name": "login_token", "kind": "string", "column": "-"},
                {"name": "deleted", "kind": "bool", "merge": " true "}
            ]
        }]})))
        .unwrap();
        let schema = registry.get("members").unwrap();
        assert_eq!(schema.collection, "members");
        assert_eq!(schema.field("password_hash").unwrap().json_key, None);
        assert_eq!(schema.field("login_token").unwrap().column, None);
        assert_eq!(
            schema.field("login_token").unwrap().json_key.as_deref(),
            Some("loginToken")
        );
        assert_eq!(schema.field("deleted").unwrap().mergeable, Some(true));
        assert_eq!(schema.field("id").unwrap().kind, FieldKind::Int);
    }

    #[test]
    fn malformed_rule_argument_is_rejected() {
        let err = resolve(&config(json!({"resources": [{
            "name": "members",
            "operations": ["list"],
            "fields": [
                {"name": "id", "kind": "int"},
                {"name": "age", "kind": "int", "validate": "gt(abc)"}
            ]
        }]})))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRule { ref field, .. } if field == "age"));
    }

    #[test]
    fn delete_requires_soft_delete_field() {
        let err = resolve(&config(json!({"resources": [{
            "name": "members",
            "fields": [{"name": "id", "kind": "int"}]
        }]})))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn unpersisted_primary_key_is_rejected() {
        let err = resolve(&config(json!({"resources": [{
            "name": "members",
            "operations": ["read"],
            "fields": [{"name": "id", "kind": "int", "column": "-"}]
        }]})))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPrimaryKey { .. }));
    }
}
