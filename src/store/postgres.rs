//! PostgreSQL store over a sqlx pool.

use crate::config::{FieldDescriptor, Schema};
use crate::error::AppError;
use crate::query::QuerySpec;
use crate::record::{Record, Resource};
use crate::sql::{self, QueryBuf};
use crate::store::Store;
use crate::value::{FieldKind, Value};
use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use std::sync::Arc;

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(url: &str) -> Result<Self, AppError> {
        let pool = PgPoolOptions::new().max_connections(10).connect(url).await?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn fetch_all(&self, schema: &Arc<Schema>, q: &QueryBuf) -> Result<Vec<Record>, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query(&q.sql);
        for p in &q.params {
            query = query.bind(p.clone());
        }
        let rows = query.fetch_all(&self.pool).await?;
        rows.iter().map(|r| row_to_record(schema, r)).collect()
    }

    async fn fetch_optional(
        &self,
        schema: &Arc<Schema>,
        q: &QueryBuf,
    ) -> Result<Option<Record>, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let mut query = sqlx::query(&q.sql);
        for p in &q.params {
            query = query.bind(p.clone());
        }
        let row = query.fetch_optional(&self.pool).await?;
        row.map(|r| row_to_record(schema, &r)).transpose()
    }
}

#[async_trait]
impl Store for PgStore {
    async fn select(&self, schema: &Arc<Schema>, spec: &QuerySpec) -> Result<Vec<Record>, AppError> {
        let q = sql::select(schema, spec)?;
        self.fetch_all(schema, &q).await
    }

    async fn find(&self, schema: &Arc<Schema>, id: &Value) -> Result<Option<Record>, AppError> {
        let q = sql::select_by_id(schema, id)?;
        self.fetch_optional(schema, &q).await
    }

    async fn insert(&self, record: &Record) -> Result<Record, AppError> {
        let q = sql::insert(record)?;
        self.fetch_optional(record.schema(), &q)
            .await?
            .ok_or(AppError::Db(sqlx::Error::RowNotFound))
    }

    async fn update(&self, record: &Record) -> Result<Record, AppError> {
        let q = sql::update(record)?;
        self.fetch_optional(record.schema(), &q)
            .await?
            .ok_or_else(|| AppError::not_found(record.collection()))
    }
}

/// Rows carry only persisted columns; other fields keep their zero values.
fn row_to_record(schema: &Arc<Schema>, row: &PgRow) -> Result<Record, AppError> {
    let mut record = Record::new(Arc::clone(schema));
    for (i, field) in schema.persisted() {
        let value = cell_to_value(row, field)?;
        record.set_at(i, value)?;
    }
    Ok(record)
}

fn cell_to_value(row: &PgRow, field: &FieldDescriptor) -> Result<Value, AppError> {
    let col = field.column.as_deref().unwrap_or(&field.name);
    let value: Value = match field.kind {
        FieldKind::String => row.try_get::<Option<String>, _>(col)?.into(),
        FieldKind::Int => integer(row, col)?.into(),
        FieldKind::Uint => match integer(row, col)? {
            Some(n) => Value::Uint(u64::try_from(n).map_err(|_| {
                AppError::Internal(format!("{col}: negative value {n} in uint column"))
            })?),
            None => Value::Null,
        },
        FieldKind::Float => match row.try_get::<Option<f64>, _>(col) {
            Ok(v) => v.into(),
            Err(_) => row.try_get::<Option<f32>, _>(col)?.map(f64::from).into(),
        },
        FieldKind::Bool => row.try_get::<Option<bool>, _>(col)?.into(),
        FieldKind::Sequence | FieldKind::Struct => row
            .try_get::<Option<serde_json::Value>, _>(col)?
            .map(|j| Value::from_json(&j))
            .unwrap_or(Value::Null),
    };
    Ok(value)
}

/// Integer columns may be int2, int4 or int8.
fn integer(row: &PgRow, col: &str) -> Result<Option<i64>, AppError> {
    if let Ok(v) = row.try_get::<Option<i64>, _>(col) {
        return Ok(v);
    }
    if let Ok(v) = row.try_get::<Option<i32>, _>(col) {
        return Ok(v.map(i64::from));
    }
    Ok(row.try_get::<Option<i16>, _>(col)?.map(i64::from))
}
