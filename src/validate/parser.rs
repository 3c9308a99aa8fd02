//! Tag text -> rule pipeline.
//!
//! A tag is a `|`-separated list of tokens, each `name` or `name(arg)`. Splitting only happens
//! at parenthesis depth zero, so `each(gt(0) | lt(10))` and `matches(a|b)` stay whole.
//! Unrecognized names are ignored.

use crate::validate::patterns;
use crate::validate::rules::Rule;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RuleError {
    #[error("{rule}: missing argument")]
    MissingArgument { rule: String },
    #[error("{rule}: '{arg}' is not a number")]
    InvalidNumber { rule: String, arg: String },
    #[error("{rule}: '{arg}' is not a length")]
    InvalidLength { rule: String, arg: String },
    #[error("matches: invalid pattern '{arg}': {source}")]
    InvalidPattern {
        arg: String,
        #[source]
        source: regex::Error,
    },
}

pub fn parse_tag(tag: &str) -> Result<Vec<Rule>, RuleError> {
    let mut rules = Vec::new();
    for token in split_tokens(tag) {
        if let Some(rule) = parse_token(token)? {
            rules.push(rule);
        }
    }
    Ok(rules)
}

fn split_tokens(tag: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in tag.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            '|' if depth == 0 => {
                tokens.push(&tag[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    tokens.push(&tag[start..]);
    tokens
        .into_iter()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect()
}

/// Name before the first `(`, argument between it and the last `)`.
fn split_name(token: &str) -> (&str, &str) {
    let Some(open) = token.find('(') else {
        return (token.trim(), "");
    };
    let name = token[..open].trim();
    let arg = match token.rfind(')') {
        Some(close) if close > open => token[open + 1..close].trim(),
        _ => "",
    };
    (name, arg)
}

fn parse_token(token: &str) -> Result<Option<Rule>, RuleError> {
    let (name, arg) = split_name(token);
    let rule = match name {
        "nonzero" => Rule::NonZero,
        "email" => Rule::Email,
        "hexcolor" => Rule::HexColor,
        "url" => Rule::Url,
        "ip" => Rule::Ip,
        "alpha" => Rule::Alpha,
        "alphanum" => Rule::AlphaNum,
        "num" => Rule::Num,
        "lat" => Rule::Lat,
        "lon" => Rule::Lon,
        "gt" => Rule::Gt(number(name, arg)?),
        "gte" => Rule::Gte(number(name, arg)?),
        "lt" => Rule::Lt(number(name, arg)?),
        "lte" => Rule::Lte(number(name, arg)?),
        "len" => Rule::Len(length(name, arg)?),
        "minlen" => Rule::MinLen(length(name, arg)?),
        "maxlen" => Rule::MaxLen(length(name, arg)?),
        "in" => Rule::In(list(arg)),
        "notin" => Rule::NotIn(list(arg)),
        "haskey" => Rule::HasKey(required(name, arg)?.to_string()),
        "matches" => {
            let pattern = required(name, arg)?;
            Rule::Matches(patterns::anchored(pattern).map_err(|source| {
                RuleError::InvalidPattern {
                    arg: pattern.to_string(),
                    source,
                }
            })?)
        }
        "each" => Rule::Each(parse_tag(arg)?),
        "panic" => Rule::Fatal(parse_tag(arg)?),
        other => {
            tracing::debug!(token = %other, "ignoring unknown validation token");
            return Ok(None);
        }
    };
    Ok(Some(rule))
}

fn required<'a>(rule: &str, arg: &'a str) -> Result<&'a str, RuleError> {
    if arg.is_empty() {
        return Err(RuleError::MissingArgument { rule: rule.into() });
    }
    Ok(arg)
}

fn number(rule: &str, arg: &str) -> Result<f64, RuleError> {
    required(rule, arg)?
        .parse()
        .map_err(|_| RuleError::InvalidNumber {
            rule: rule.into(),
            arg: arg.into(),
        })
}

fn length(rule: &str, arg: &str) -> Result<usize, RuleError> {
    required(rule, arg)?
        .parse()
        .map_err(|_| RuleError::InvalidLength {
            rule: rule.into(),
            arg: arg.into(),
        })
}

fn list(arg: &str) -> Vec<String> {
    arg.split(',').map(|s| s.trim().to_string()).collect()
}
