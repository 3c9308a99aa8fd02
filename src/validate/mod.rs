//! Declarative validation: tag rule language, evaluator and verdicts.

pub mod parser;
pub mod patterns;
pub mod rules;
pub mod verdict;

pub use parser::{parse_tag, RuleError};
pub use rules::Rule;
pub use verdict::{FatalValidation, Verdict};

use crate::record::Record;
use crate::value::Value;

/// Every rule runs; any failure marks the field. A fatal rule aborts the whole pass.
fn evaluate(
    verdict: &mut Verdict,
    field: &str,
    value: &Value,
    rules: &[Rule],
) -> Result<(), FatalValidation> {
    let mut failed = false;
    for rule in rules {
        if !rule.check(field, value)? {
            failed = true;
        }
    }
    if failed {
        verdict.fail(field);
    }
    Ok(())
}

/// Validate every field of a record against its schema's rule pipelines.
pub fn validate_record(record: &Record) -> Result<Verdict, FatalValidation> {
    let mut verdict = Verdict::default();
    for (field, value) in record.schema().fields.iter().zip(record.values()) {
        evaluate(&mut verdict, &field.name, value, &field.rules).map_err(|e| {
            tracing::warn!(
                resource = %record.schema().name,
                field = %e.field,
                rule = %e.rule,
                "fatal validation failure"
            );
            e
        })?;
    }
    Ok(verdict)
}

/// Ad-hoc validation of loose values.
#[derive(Debug, Default)]
pub struct Validator {
    entries: Vec<(String, Value, Vec<Rule>)>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(
        mut self,
        key: impl Into<String>,
        value: impl Into<Value>,
        rules: impl IntoIterator<Item = Rule>,
    ) -> Self {
        self.entries
            .push((key.into(), value.into(), rules.into_iter().collect()));
        self
    }

    /// Same as `add` with rules parsed from tag text.
    pub fn add_tag(
        self,
        key: impl Into<String>,
        value: impl Into<Value>,
        tag: &str,
    ) -> Result<Self, RuleError> {
        let rules = parse_tag(tag)?;
        Ok(self.add(key, value, rules))
    }

    pub fn validate(&self) -> Result<Verdict, FatalValidation> {
        let mut verdict = Verdict::default();
        for (key, value, rules) in &self.entries {
            evaluate(&mut verdict, key, value, rules)?;
        }
        Ok(verdict)
    }
}
