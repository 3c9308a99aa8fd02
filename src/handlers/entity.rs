//! Resource CRUD handlers: list, create, read, update, delete.

use crate::config::{Operation, Schema};
use crate::error::AppError;
use crate::record::DecodeError;
use crate::response::{success_created, success_many, success_one};
use crate::state::AppState;
use crate::value::{FieldKind, Value};
use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, Path, Query, State},
    response::IntoResponse,
};

/// Parse a path id by the primary key's kind.
fn parse_id(schema: &Schema, id_str: &str) -> Result<Value, AppError> {
    let pk = schema.primary_key_field();
    match pk.kind {
        FieldKind::String => Ok(Value::String(id_str.to_string())),
        kind => Value::parse_as(kind, id_str)
            .ok_or_else(|| AppError::BadRequest(format!("invalid id '{id_str}'"))),
    }
}

fn parse_body(schema: &Schema, body: &Bytes) -> Result<serde_json::Value, AppError> {
    serde_json::from_slice(body).map_err(|e| AppError::Decode {
        resource: schema.collection.clone(),
        source: DecodeError::Syntax(e.to_string()),
    })
}

pub async fn list(
    State(state): State<AppState>,
    Path(resource): Path<String>,
    params: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Query(params) = params.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let rows = state.service.list(&resource, &params).await?;
    Ok(success_many(rows))
}

pub async fn create(
    State(state): State<AppState>,
    Path(resource): Path<String>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let schema = state.service.schema(&resource, Operation::Create)?;
    let body = parse_body(schema, &body)?;
    let record = state.service.create(&resource, &body).await?;
    Ok(success_created(record.to_json()))
}

pub async fn read(
    State(state): State<AppState>,
    Path((resource, id_str)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let schema = state.service.schema(&resource, Operation::Read)?;
    let id = parse_id(schema, &id_str)?;
    let record = state.service.read(&resource, &id).await?;
    Ok(success_one(record.to_json()))
}

pub async fn update(
    State(state): State<AppState>,
    Path((resource, id_str)): Path<(String, String)>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let schema = state.service.schema(&resource, Operation::Update)?;
    let id = parse_id(schema, &id_str)?;
    let body = parse_body(schema, &body)?;
    let record = state.service.update(&resource, &id, &body).await?;
    Ok(success_one(record.to_json()))
}

/// Soft delete; responds with the flagged record.
pub async fn delete(
    State(state): State<AppState>,
    Path((resource, id_str)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let schema = state.service.schema(&resource, Operation::Delete)?;
    let id = parse_id(schema, &id_str)?;
    let record = state.service.delete(&resource, &id).await?;
    Ok(success_one(record.to_json()))
}
