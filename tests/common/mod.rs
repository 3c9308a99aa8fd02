//! Shared schema fixtures and app builders for integration tests.

#![allow(dead_code)]

use resource_sdk::{app, resolve, AppState, MemoryStore, Registry, RegistryConfig, Schema};
use serde_json::json;
use std::sync::Arc;

pub fn registry(doc: serde_json::Value) -> Registry {
    let config: RegistryConfig = serde_json::from_value(doc).unwrap();
    resolve(&config).unwrap()
}

pub fn schema(registry: &Registry, name: &str) -> Arc<Schema> {
    Arc::clone(registry.get(name).unwrap())
}

/// `id`, `name`, `timestamp` and a JSON-only `email` field.
pub fn timeline() -> Arc<Schema> {
    let reg = registry(json!({"resources": [{
        "name": "timeline",
        "operations": ["list", "read"],
        "fields": [
            {"name": "id", "kind": "int"},
            {"name": "name", "kind": "string"},
            {"name": "timestamp", "kind": "int"},
            {"name": "email", "kind": "string", "column": "-"}
        ]
    }]}));
    schema(&reg, "timeline")
}

/// `one` tagged mergeable, `two` tagged immutable, `three` untagged.
pub fn mergeable() -> Arc<Schema> {
    let reg = registry(json!({"resources": [{
        "name": "things",
        "operations": ["read"],
        "fields": [
            {"name": "id", "kind": "int", "merge": "false"},
            {"name": "one", "kind": "string", "merge": "true"},
            {"name": "two", "kind": "string", "merge": "false"},
            {"name": "three", "kind": "string"}
        ]
    }]}));
    schema(&reg, "things")
}

pub fn members_doc() -> serde_json::Value {
    json!({"resources": [
        {
            "name": "members",
            "timestamps": {"created": "created", "updated": "updated"},
            "soft_delete": "deleted",
            "fields": [
                {"name": "id", "kind": "int", "merge": "false"},
                {"name": "name", "kind": "string", "validate": "nonzero|maxlen(32)", "merge": "true"},
                {"name": "email", "kind": "string", "validate": "nonzero|email", "merge": "true"},
                {"name": "age", "kind": "int", "validate": "gte(0)", "merge": "true"},
                {"name": "password_hash", "kind": "string", "json": "-", "merge": "false"},
                {"name": "created", "kind": "int", "validate": "nonzero", "merge": "false"},
                {"name": "updated", "kind": "int", "validate": "nonzero", "merge": "false"},
                {"name": "deleted", "kind": "bool", "merge": "true"}
            ]
        },
        {
            "name": "notes",
            "operations": ["list", "read", "create"],
            "fields": [
                {"name": "id", "kind": "int"},
                {"name": "tags", "kind": "sequence", "validate": "panic(nonzero)"}
            ]
        }
    ]})
}

pub fn members_state() -> AppState {
    AppState::new(registry(members_doc()), Arc::new(MemoryStore::new()))
}

pub fn members_app() -> axum::Router {
    app(members_state(), "/api/v1", 1024 * 1024)
}
