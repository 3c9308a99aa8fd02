//! Generic resource operations composed from the query compiler, merge engine and store.

use crate::config::{Operation, Registry, Schema};
use crate::error::AppError;
use crate::merge::MergeRule;
use crate::query::compile;
use crate::record::{Record, Resource};
use crate::service::lifecycle::{Lifecycle, Stamped};
use crate::store::Store;
use crate::value::Value;
use std::collections::HashMap;
use std::sync::Arc;

pub struct ResourceService {
    registry: Arc<Registry>,
    store: Arc<dyn Store>,
    default_hooks: Arc<dyn Lifecycle>,
    hooks: HashMap<String, Arc<dyn Lifecycle>>,
}

impl ResourceService {
    /// Uses `Stamped` hooks for every resource unless overridden.
    pub fn new(registry: Arc<Registry>, store: Arc<dyn Store>) -> Self {
        Self {
            registry,
            store,
            default_hooks: Arc::new(Stamped),
            hooks: HashMap::new(),
        }
    }

    pub fn with_default_hooks(mut self, hooks: Arc<dyn Lifecycle>) -> Self {
        self.default_hooks = hooks;
        self
    }

    pub fn with_hooks(mut self, resource: impl Into<String>, hooks: Arc<dyn Lifecycle>) -> Self {
        self.hooks.insert(resource.into(), hooks);
        self
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    fn hooks_for(&self, schema: &Schema) -> &dyn Lifecycle {
        self.hooks
            .get(&schema.name)
            .unwrap_or(&self.default_hooks)
            .as_ref()
    }

    /// Schema for a resource that exposes `op`.
    pub fn schema(&self, resource: &str, op: Operation) -> Result<&Arc<Schema>, AppError> {
        let schema = self
            .registry
            .get(resource)
            .ok_or_else(|| AppError::NotFound(format!("Unknown resource {resource}.")))?;
        if !schema.allows(op) {
            return Err(AppError::BadRequest(format!(
                "{} not allowed on {}",
                op.as_str(),
                resource
            )));
        }
        Ok(schema)
    }

    /// Compile the parameters, select, and render each row (projected when `q-fields` is set).
    pub async fn list<K, V>(
        &self,
        resource: &str,
        params: &[(K, V)],
    ) -> Result<Vec<serde_json::Value>, AppError>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let schema = self.schema(resource, Operation::List)?;
        let spec = compile(schema, params.iter().map(|(k, v)| (k.as_ref(), v.as_ref())))?;
        tracing::debug!(resource, conditions = spec.conditions.len(), limit = spec.limit, offset = spec.offset, "list");
        let rows = self.store.select(schema, &spec).await?;
        Ok(rows
            .iter()
            .map(|r| match &spec.fields {
                Some(keys) => r.to_json_projected(keys),
                None => r.to_json(),
            })
            .collect())
    }

    async fn fetch(&self, schema: &Arc<Schema>, id: &Value) -> Result<Record, AppError> {
        self.store
            .find(schema, id)
            .await?
            .ok_or_else(|| AppError::not_found(&schema.collection))
    }

    fn decode(schema: &Arc<Schema>, body: &serde_json::Value) -> Result<Record, AppError> {
        Record::from_json(Arc::clone(schema), body).map_err(|source| AppError::Decode {
            resource: schema.collection.clone(),
            source,
        })
    }

    pub async fn read(&self, resource: &str, id: &Value) -> Result<Record, AppError> {
        let schema = self.schema(resource, Operation::Read)?;
        self.fetch(schema, id).await
    }

    pub async fn create(&self, resource: &str, body: &serde_json::Value) -> Result<Record, AppError> {
        let schema = self.schema(resource, Operation::Create)?;
        let mut record = Self::decode(schema, body)?;
        self.hooks_for(schema).pre_insert(&mut record)?;
        let created = self.store.insert(&record).await?;
        tracing::debug!(resource, id = %created.primary_key(), "created");
        Ok(created)
    }

    /// Merge the decoded patch onto the stored record using the fields tagged mergeable.
    pub async fn update(
        &self,
        resource: &str,
        id: &Value,
        body: &serde_json::Value,
    ) -> Result<Record, AppError> {
        let schema = self.schema(resource, Operation::Update)?;
        let mut original = self.fetch(schema, id).await?;
        let patch = Self::decode(schema, body)?;
        MergeRule::tag_whitelist(schema).apply(&patch, &mut original)?;
        self.hooks_for(schema).pre_update(&mut original)?;
        self.store.update(&original).await
    }

    /// Soft delete: flags the record and writes it back.
    pub async fn delete(&self, resource: &str, id: &Value) -> Result<Record, AppError> {
        let schema = self.schema(resource, Operation::Delete)?;
        let mut record = self.fetch(schema, id).await?;
        if !record.mark_deleted() {
            return Err(AppError::Internal(format!(
                "{} has no soft delete field",
                schema.name
            )));
        }
        self.hooks_for(schema).pre_update(&mut record)?;
        let deleted = self.store.update(&record).await?;
        tracing::debug!(resource, id = %deleted.primary_key(), "soft deleted");
        Ok(deleted)
    }
}
