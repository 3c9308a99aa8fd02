//! Fixed string patterns used by the named rules. Compiled once on first use.

use regex::Regex;
use std::sync::OnceLock;

const EMAIL: &str = r"^([a-z0-9_\.-]+)@([0-9a-z\.-]+)\.([a-z\.]{2,6})$";
const HEX_COLOR: &str = r"^#([A-Fa-f0-9]{6}|[A-Fa-f0-9]{3})$";
const URL: &str = r"^(https?://)?([0-9a-z\.-]+)\.([a-z\.]{2,6})([/\w \.-]*)*/?$";
const IP: &str = r"^(?:(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)\.){3}(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)$";
const NUM: &str = r"^[1-9][0-9]*(\.[0-9]+)?$";
const ALPHA: &str = r"^[a-zA-Z]*$";
const HAS_LETTER: &str = r"[a-zA-Z]+";
const HAS_DIGIT: &str = r"[0-9]+";

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();
static HEX_COLOR_RE: OnceLock<Regex> = OnceLock::new();
static URL_RE: OnceLock<Regex> = OnceLock::new();
static IP_RE: OnceLock<Regex> = OnceLock::new();
static NUM_RE: OnceLock<Regex> = OnceLock::new();
static ALPHA_RE: OnceLock<Regex> = OnceLock::new();
static HAS_LETTER_RE: OnceLock<Regex> = OnceLock::new();
static HAS_DIGIT_RE: OnceLock<Regex> = OnceLock::new();

/// Patterns are compile-time constants; a failure here is a bug, and the rule then never matches.
fn compiled(cell: &'static OnceLock<Regex>, pattern: &str) -> Option<&'static Regex> {
    if let Some(re) = cell.get() {
        return Some(re);
    }
    match Regex::new(pattern) {
        Ok(re) => Some(cell.get_or_init(|| re)),
        Err(e) => {
            tracing::error!(pattern, error = %e, "built-in validation pattern failed to compile");
            None
        }
    }
}

fn is_match(cell: &'static OnceLock<Regex>, pattern: &str, s: &str) -> bool {
    compiled(cell, pattern).is_some_and(|re| re.is_match(s))
}

pub fn email(s: &str) -> bool {
    is_match(&EMAIL_RE, EMAIL, s)
}

pub fn hex_color(s: &str) -> bool {
    is_match(&HEX_COLOR_RE, HEX_COLOR, s)
}

pub fn url(s: &str) -> bool {
    is_match(&URL_RE, URL, s)
}

pub fn ip(s: &str) -> bool {
    is_match(&IP_RE, IP, s)
}

pub fn num(s: &str) -> bool {
    is_match(&NUM_RE, NUM, s)
}

pub fn alpha(s: &str) -> bool {
    is_match(&ALPHA_RE, ALPHA, s)
}

/// Letters and digits must both be present.
pub fn alpha_num(s: &str) -> bool {
    is_match(&HAS_LETTER_RE, HAS_LETTER, s) && is_match(&HAS_DIGIT_RE, HAS_DIGIT, s)
}

/// Anchor a caller pattern so it must match the whole value.
pub fn anchored(pattern: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!("^(?:{pattern})$"))
}
