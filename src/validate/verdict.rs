use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Outcome of validating one record or an ad-hoc set of values.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Verdict {
    errors: BTreeMap<String, String>,
}

impl Verdict {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// One message per failing field, keyed by field name.
    pub fn errors(&self) -> &BTreeMap<String, String> {
        &self.errors
    }

    pub(crate) fn fail(&mut self, field: &str) {
        self.errors
            .insert(field.to_string(), format!("{field} did not pass validation."));
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.errors
                .iter()
                .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
                .collect(),
        )
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .errors
            .iter()
            .map(|(k, v)| format!("{k} - {v}"))
            .collect();
        f.write_str(&parts.join(","))
    }
}

/// A `panic(...)` rule failed. Callers decide how to surface it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("fatal validation failure on {field} ({rule})")]
pub struct FatalValidation {
    pub field: String,
    pub rule: String,
}
