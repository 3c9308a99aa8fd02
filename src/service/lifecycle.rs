//! Persistence lifecycle hooks run before a record is written.

use crate::error::AppError;
use crate::record::{Record, Resource};
use crate::validate::validate_record;
use crate::value::Value;

/// Hooks invoked by the service before insert and update.
///
/// Both default to running the validator only.
pub trait Lifecycle: Send + Sync {
    fn pre_insert(&self, record: &mut Record) -> Result<(), AppError> {
        check(record)
    }

    fn pre_update(&self, record: &mut Record) -> Result<(), AppError> {
        check(record)
    }
}

/// Run the record's rule pipelines. Field failures become `Validation`, fatal rules `Fatal`.
pub fn check(record: &Record) -> Result<(), AppError> {
    let verdict = validate_record(record)?;
    if verdict.is_valid() {
        return Ok(());
    }
    tracing::debug!(resource = %record.collection(), errors = %verdict, "record failed validation");
    Err(AppError::Validation {
        resource: record.collection().to_string(),
        verdict,
    })
}

/// Stamps the created/updated timestamp fields with Unix milliseconds, then validates.
#[derive(Clone, Copy, Debug, Default)]
pub struct Stamped;

impl Stamped {
    fn stamp(record: &mut Record, created: bool) -> Result<(), AppError> {
        let now = Value::Int(chrono::Utc::now().timestamp_millis());
        let schema = record.schema().clone();
        if created {
            if let Some(i) = schema.created {
                record.set_at(i, now.clone())?;
            }
        }
        if let Some(i) = schema.updated {
            record.set_at(i, now)?;
        }
        Ok(())
    }
}

impl Lifecycle for Stamped {
    fn pre_insert(&self, record: &mut Record) -> Result<(), AppError> {
        Self::stamp(record, true)?;
        check(record)
    }

    fn pre_update(&self, record: &mut Record) -> Result<(), AppError> {
        Self::stamp(record, false)?;
        check(record)
    }
}

/// Validation only, no stamping.
#[derive(Clone, Copy, Debug, Default)]
pub struct Plain;

impl Lifecycle for Plain {}
