//! Key grammar helpers: field names are snake_case, JSON keys default to camelCase.

/// Convert a single identifier from snake_case to camelCase.
/// e.g. "user_id" -> "userId", "created_at" -> "createdAt"
pub fn to_camel_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut capitalize_next = false;
    for c in s.chars() {
        if c == '_' {
            capitalize_next = !out.is_empty();
        } else if capitalize_next {
            out.extend(c.to_uppercase());
            capitalize_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Resolve a descriptor key override: absent uses `default`, "-" means excluded.
pub fn resolve_key(explicit: Option<&str>, default: impl FnOnce() -> String) -> Option<String> {
    match explicit.map(str::trim) {
        Some("-") => None,
        Some(k) if !k.is_empty() => Some(k.to_string()),
        _ => Some(default()),
    }
}
