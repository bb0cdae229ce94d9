//! Environment-driven suite configuration.

use std::path::PathBuf;

use thiserror::Error;

pub const BASE_URL_VAR: &str = "TODO_API_BASE_URL";
pub const INCORRECT_ID_VAR: &str = "TODO_API_INCORRECT_ID";
pub const SCHEMA_DIR_VAR: &str = "TODO_SCHEMA_DIR";

/// Absent from the 200-record dataset.
pub const DEFAULT_INCORRECT_TODO_ID: u64 = 9999;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} must be a non-negative integer, got {value:?}")]
    InvalidId { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuiteConfig {
    /// Remote backend root. `None` runs the suite against a local fake backend.
    pub base_url: Option<String>,
    pub incorrect_todo_id: u64,
    pub schema_dir: PathBuf,
}

impl SuiteConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base_url = lookup(BASE_URL_VAR).filter(|url| !url.trim().is_empty());
        let incorrect_todo_id = match lookup(INCORRECT_ID_VAR) {
            Some(value) => value.trim().parse().map_err(|_| ConfigError::InvalidId {
                var: INCORRECT_ID_VAR,
                value,
            })?,
            None => DEFAULT_INCORRECT_TODO_ID,
        };
        let schema_dir = lookup(SCHEMA_DIR_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(default_schema_dir);
        Ok(Self {
            base_url,
            incorrect_todo_id,
            schema_dir,
        })
    }
}

pub fn default_schema_dir() -> PathBuf {
    PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/../schemas"))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Result<SuiteConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        SuiteConfig::from_lookup(|var| vars.get(var).cloned())
    }

    #[test]
    fn defaults_to_local_backend() {
        let config = config(&[]).unwrap();
        assert_eq!(config.base_url, None);
        assert_eq!(config.incorrect_todo_id, DEFAULT_INCORRECT_TODO_ID);
        assert!(config.schema_dir.join("todo_schema.json").is_file());
    }

    #[test]
    fn reads_overrides() {
        let config = config(&[
            (BASE_URL_VAR, "https://jsonplaceholder.typicode.com"),
            (INCORRECT_ID_VAR, " 0 "),
            (SCHEMA_DIR_VAR, "/tmp/schemas"),
        ])
        .unwrap();
        assert_eq!(config.base_url.as_deref(), Some("https://jsonplaceholder.typicode.com"));
        assert_eq!(config.incorrect_todo_id, 0);
        assert_eq!(config.schema_dir, PathBuf::from("/tmp/schemas"));
    }

    #[test]
    fn blank_base_url_means_local() {
        assert_eq!(config(&[(BASE_URL_VAR, "  ")]).unwrap().base_url, None);
    }

    #[test]
    fn rejects_non_numeric_id() {
        let err = config(&[(INCORRECT_ID_VAR, "abc")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidId { value, .. } if value == "abc"));
    }
}
