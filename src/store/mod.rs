//! Persistence seam: executes compiled queries and stores records.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use crate::config::Schema;
use crate::error::AppError;
use crate::query::QuerySpec;
use crate::record::Record;
use crate::value::Value;
use async_trait::async_trait;
use std::sync::Arc;

#[async_trait]
pub trait Store: Send + Sync {
    /// Rows matching the query's conditions, ordered and paginated.
    async fn select(&self, schema: &Arc<Schema>, spec: &QuerySpec) -> Result<Vec<Record>, AppError>;

    async fn find(&self, schema: &Arc<Schema>, id: &Value) -> Result<Option<Record>, AppError>;

    /// Returns the stored record, including an assigned primary key.
    async fn insert(&self, record: &Record) -> Result<Record, AppError>;

    /// Overwrites the row with the record's primary key.
    async fn update(&self, record: &Record) -> Result<Record, AppError>;
}
