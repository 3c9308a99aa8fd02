//! Rule kinds and their evaluation against a single value.

use crate::validate::patterns;
use crate::validate::FatalValidation;
use crate::value::Value;
use regex::Regex;

#[derive(Clone, Debug)]
pub enum Rule {
    NonZero,
    Email,
    HexColor,
    Url,
    Ip,
    Alpha,
    AlphaNum,
    Num,
    Gt(f64),
    Gte(f64),
    Lt(f64),
    Lte(f64),
    Lat,
    Lon,
    In(Vec<String>),
    NotIn(Vec<String>),
    HasKey(String),
    Matches(Regex),
    Len(usize),
    MinLen(usize),
    MaxLen(usize),
    /// Value must be a sequence whose every element passes all inner rules.
    Each(Vec<Rule>),
    /// A failing inner rule is escalated to a fatal error instead of a field error.
    Fatal(Vec<Rule>),
}

impl Rule {
    /// `Ok(true)` passes, `Ok(false)` is a field failure, `Err` is a fatal escalation.
    pub fn check(&self, field: &str, value: &Value) -> Result<bool, FatalValidation> {
        let ok = match self {
            Rule::NonZero => !value.is_zero(),
            Rule::Email => string_matches(value, patterns::email),
            Rule::HexColor => string_matches(value, patterns::hex_color),
            Rule::Url => string_matches(value, patterns::url),
            Rule::Ip => string_matches(value, patterns::ip),
            Rule::Alpha => string_matches(value, patterns::alpha),
            Rule::AlphaNum => string_matches(value, patterns::alpha_num),
            Rule::Num => string_matches(value, patterns::num),
            Rule::Gt(n) => numeric(value, |v| v > *n),
            Rule::Gte(n) => numeric(value, |v| v >= *n),
            Rule::Lt(n) => numeric(value, |v| v < *n),
            Rule::Lte(n) => numeric(value, |v| v <= *n),
            Rule::Lat => numeric(value, |v| (-90.0..=90.0).contains(&v)),
            Rule::Lon => numeric(value, |v| (-180.0..=180.0).contains(&v)),
            Rule::In(items) => member_of(items, value),
            Rule::NotIn(items) => !member_of(items, value),
            Rule::HasKey(key) => matches!(value, Value::Map(m) if m.contains_key(key)),
            Rule::Matches(re) => value.as_str().is_some_and(|s| re.is_match(s)),
            Rule::Len(n) => value.len().is_some_and(|l| l == *n),
            Rule::MinLen(n) => value.len().is_some_and(|l| l >= *n),
            Rule::MaxLen(n) => value.len().is_some_and(|l| l <= *n),
            Rule::Each(inner) => {
                let Value::Seq(items) = value else {
                    return Ok(false);
                };
                for item in items {
                    for rule in inner {
                        if !rule.check(field, item)? {
                            return Ok(false);
                        }
                    }
                }
                true
            }
            Rule::Fatal(inner) => {
                for rule in inner {
                    if !rule.check(field, value)? {
                        return Err(FatalValidation {
                            field: field.to_string(),
                            rule: rule.name().to_string(),
                        });
                    }
                }
                true
            }
        };
        Ok(ok)
    }

    /// Tag name the rule is declared with.
    pub fn name(&self) -> &'static str {
        match self {
            Rule::NonZero => "nonzero",
            Rule::Email => "email",
            Rule::HexColor => "hexcolor",
            Rule::Url => "url",
            Rule::Ip => "ip",
            Rule::Alpha => "alpha",
            Rule::AlphaNum => "alphanum",
            Rule::Num => "num",
            Rule::Gt(_) => "gt",
            Rule::Gte(_) => "gte",
            Rule::Lt(_) => "lt",
            Rule::Lte(_) => "lte",
            Rule::Lat => "lat",
            Rule::Lon => "lon",
            Rule::In(_) => "in",
            Rule::NotIn(_) => "notin",
            Rule::HasKey(_) => "haskey",
            Rule::Matches(_) => "matches",
            Rule::Len(_) => "len",
            Rule::MinLen(_) => "minlen",
            Rule::MaxLen(_) => "maxlen",
            Rule::Each(_) => "each",
            Rule::Fatal(_) => "panic",
        }
    }
}

fn string_matches(value: &Value, pred: fn(&str) -> bool) -> bool {
    value.as_str().is_some_and(pred)
}

fn numeric(value: &Value, pred: impl Fn(f64) -> bool) -> bool {
    value.as_f64().is_some_and(pred)
}

/// List items are string literals; only string values can equal them.
fn member_of(items: &[String], value: &Value) -> bool {
    value
        .as_str()
        .is_some_and(|s| items.iter().any(|item| item == s))
}
