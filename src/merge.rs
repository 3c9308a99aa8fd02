//! Selective field copy between two records of the same schema.
//!
//! Every mode resolves to a whitelist of field names and copies exactly those from `from` onto
//! `to`. Fields outside the resolved set keep their destination values, which is how immutable
//! fields survive a partial update.

use crate::config::Schema;
use crate::record::Record;
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MergeError {
    #[error("cannot merge {from} into {to}: schemas differ")]
    SchemaMismatch { from: String, to: String },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MergeMode {
    /// Copy only the listed fields.
    Whitelist,
    /// Copy every schema field except the listed ones.
    Blacklist,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MergeRule {
    pub mode: MergeMode,
    pub keys: Vec<String>,
}

impl MergeRule {
    pub fn whitelist<S: Into<String>>(keys: impl IntoIterator<Item = S>) -> Self {
        Self {
            mode: MergeMode::Whitelist,
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }

    pub fn blacklist<S: Into<String>>(keys: impl IntoIterator<Item = S>) -> Self {
        Self {
            mode: MergeMode::Blacklist,
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }

    /// Fields tagged `merge:"true"`.
    pub fn tag_whitelist(schema: &Schema) -> Self {
        Self::whitelist(
            schema
                .fields
                .iter()
                .filter(|f| f.mergeable == Some(true))
                .map(|f| f.name.as_str()),
        )
    }

    /// Everything except fields tagged `merge:"false"`; untagged fields are included.
    pub fn tag_blacklist(schema: &Schema) -> Self {
        Self::blacklist(
            schema
                .fields
                .iter()
                .filter(|f| f.mergeable == Some(false))
                .map(|f| f.name.as_str()),
        )
    }

    /// Field indexes to copy, in schema order.
    pub fn resolve(&self, schema: &Schema) -> Vec<usize> {
        match self.mode {
            MergeMode::Whitelist => {
                let mut indexes: Vec<usize> = self
                    .keys
                    .iter()
                    .filter_map(|k| {
                        let index = schema.index_of(k);
                        if index.is_none() {
                            tracing::debug!(resource = %schema.name, key = %k, "skipping unknown merge key");
                        }
                        index
                    })
                    .collect();
                indexes.sort_unstable();
                indexes.dedup();
                indexes
            }
            MergeMode::Blacklist => {
                let excluded: HashSet<&str> = self.keys.iter().map(String::as_str).collect();
                (0..schema.fields.len())
                    .filter(|&i| !excluded.contains(schema.fields[i].name.as_str()))
                    .collect()
            }
        }
    }

    pub fn apply(&self, from: &Record, to: &mut Record) -> Result<(), MergeError> {
        if !same_layout(from.schema(), to.schema()) {
            return Err(MergeError::SchemaMismatch {
                from: from.schema().name.clone(),
                to: to.schema().name.clone(),
            });
        }
        for index in self.resolve(from.schema()) {
            to.copy_from(from, index);
        }
        Ok(())
    }
}

/// Same schema instance, or same name with identical field names and kinds in order.
fn same_layout(a: &Arc<Schema>, b: &Arc<Schema>) -> bool {
    Arc::ptr_eq(a, b)
        || (a.name == b.name
            && a.fields.len() == b.fields.len()
            && a
                .fields
                .iter()
                .zip(&b.fields)
                .all(|(x, y)| x.name == y.name && x.kind == y.kind))
}

pub fn merge_whitelist<S: Into<String>>(
    from: &Record,
    to: &mut Record,
    keys: impl IntoIterator<Item = S>,
) -> Result<(), MergeError> {
    MergeRule::whitelist(keys).apply(from, to)
}

pub fn merge_blacklist<S: Into<String>>(
    from: &Record,
    to: &mut Record,
    keys: impl IntoIterator<Item = S>,
) -> Result<(), MergeError> {
    MergeRule::blacklist(keys).apply(from, to)
}

pub fn merge_tag_whitelist(from: &Record, to: &mut Record) -> Result<(), MergeError> {
    MergeRule::tag_whitelist(from.schema()).apply(from, to)
}

pub fn merge_tag_blacklist(from: &Record, to: &mut Record) -> Result<(), MergeError> {
    MergeRule::tag_blacklist(from.schema()).apply(from, to)
}
