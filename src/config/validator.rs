//! Descriptor validation: referential integrity and kind consistency.

use crate::config::{Operation, RegistryConfig, ResourceConfig};
use crate::error::ConfigError;
use crate::value::FieldKind;
use std::collections::HashSet;

pub fn validate(config: &RegistryConfig) -> Result<(), ConfigError> {
    if config.resources.is_empty() {
        return Err(ConfigError::Validation("at least one resource required".into()));
    }
    let mut names = HashSet::new();
    for res in &config.resources {
        if !names.insert(res.name.as_str()) {
            return Err(ConfigError::DuplicateResource(res.name.clone()));
        }
        validate_resource(res)?;
    }
    Ok(())
}

fn validate_resource(res: &ResourceConfig) -> Result<(), ConfigError> {
    let mut fields = HashSet::new();
    for f in &res.fields {
        if !fields.insert(f.name.as_str()) {
            return Err(ConfigError::DuplicateField {
                resource: res.name.clone(),
                field: f.name.clone(),
            });
        }
    }
    let find = |name: &str| res.fields.iter().find(|f| f.name == name);

    let pk = find(&res.primary_key).ok_or_else(|| ConfigError::MissingReference {
        kind: "primary key field",
        id: format!("{}.{}", res.name, res.primary_key),
    })?;
    if pk.column.as_deref().map(str::trim) == Some("-") {
        return Err(ConfigError::InvalidPrimaryKey {
            resource: res.name.clone(),
            field: pk.name.clone(),
            reason: "must be persisted",
        });
    }
    if !matches!(pk.kind, FieldKind::Int | FieldKind::Uint | FieldKind::String) {
        return Err(ConfigError::InvalidPrimaryKey {
            resource: res.name.clone(),
            field: pk.name.clone(),
            reason: "kind must be int, uint or string",
        });
    }

    for (role, name) in [
        ("created timestamp", res.timestamps.created.as_deref()),
        ("updated timestamp", res.timestamps.updated.as_deref()),
    ] {
        let Some(name) = name else { continue };
        let field = find(name).ok_or_else(|| ConfigError::MissingReference {
            kind: role,
            id: format!("{}.{}", res.name, name),
        })?;
        if !matches!(field.kind, FieldKind::Int | FieldKind::Uint) {
            return Err(ConfigError::Validation(format!(
                "{}.{}: {role} must be int or uint",
                res.name, name
            )));
        }
    }

    match res.soft_delete.as_deref() {
        Some(name) => {
            let field = find(name).ok_or_else(|| ConfigError::MissingReference {
                kind: "soft delete field",
                id: format!("{}.{}", res.name, name),
            })?;
            if field.kind != FieldKind::Bool {
                return Err(ConfigError::Validation(format!(
                    "{}.{}: soft delete field must be bool",
                    res.name, name
                )));
            }
        }
        None if res.operations.contains(&Operation::Delete) => {
            return Err(ConfigError::Validation(format!(
                "{}: delete operation requires a soft_delete field",
                res.name
            )));
        }
        None => {}
    }
    Ok(())
}
