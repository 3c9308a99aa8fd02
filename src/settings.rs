//! Process settings read from the environment (and `.env`, when present).

use crate::error::ConfigError;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_RESOURCES_PATH: &str = "demos/resources.json";
pub const DEFAULT_API_PREFIX: &str = "/api/v1";
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Postgres connection string; `None` runs on the in-memory store.
    pub database_url: Option<String>,
    pub bind_addr: String,
    pub resources_path: String,
    pub api_prefix: String,
    pub max_body_bytes: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_url: None,
            bind_addr: DEFAULT_BIND_ADDR.into(),
            resources_path: DEFAULT_RESOURCES_PATH.into(),
            api_prefix: DEFAULT_API_PREFIX.into(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from any key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();
        let max_body_bytes = match get("MAX_BODY_BYTES") {
            Some(raw) => raw.trim().parse::<usize>().map_err(|e| {
                ConfigError::Load(format!("MAX_BODY_BYTES '{raw}': {e}"))
            })?,
            None => defaults.max_body_bytes,
        };
        Ok(Self {
            database_url: get("DATABASE_URL"),
            bind_addr: get("BIND_ADDR").unwrap_or(defaults.bind_addr),
            resources_path: get("RESOURCES_PATH").unwrap_or(defaults.resources_path),
            api_prefix: get("API_PREFIX").unwrap_or(defaults.api_prefix),
            max_body_bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let settings = Settings::from_lookup(lookup(&[])).unwrap();
        assert_eq!(settings, Settings::default());
        assert!(settings.database_url.is_none());
    }

    #[test]
    fn reads_overrides() {
        let settings = Settings::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/news"),
            ("BIND_ADDR", "127.0.0.1:8080"),
            ("API_PREFIX", ""),
            ("MAX_BODY_BYTES", " 2048 "),
        ]))
        .unwrap();
        assert_eq!(settings.database_url.as_deref(), Some("postgres://localhost/news"));
        assert_eq!(settings.bind_addr, "127.0.0.1:8080");
        assert_eq!(settings.api_prefix, DEFAULT_API_PREFIX);
        assert_eq!(settings.max_body_bytes, 2048);
    }

    #[test]
    fn malformed_body_limit_is_a_load_error() {
        let err = Settings::from_lookup(lookup(&[("MAX_BODY_BYTES", "lots")])).unwrap_err();
        assert!(matches!(err, ConfigError::Load(msg) if msg.contains("MAX_BODY_BYTES")));
    }
}
