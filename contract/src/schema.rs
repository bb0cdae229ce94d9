//! JSON Schema validation of response bodies.
//!
//! Schemas are read from disk on every call; nothing is cached between
//! validations.

use std::path::{Path, PathBuf};

use jsonschema::Draft;
use serde_json::Value;
use thiserror::Error;

pub const TODO_SCHEMA: &str = "todo_schema.json";
pub const TODOS_SCHEMA: &str = "todos_schema.json";

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("failed to read schema {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("schema {} is not valid JSON: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("schema {} does not compile: {message}", .path.display())]
    Compile { path: PathBuf, message: String },

    #[error("instance does not conform to {}: {}", .path.display(), .errors.join("; "))]
    Mismatch { path: PathBuf, errors: Vec<String> },
}

/// Validate `instance` against the schema document at `path`.
pub fn assert_valid_schema(instance: &Value, path: &Path) -> Result<(), SchemaError> {
    let raw = std::fs::read_to_string(path).map_err(|source| SchemaError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let schema: Value = serde_json::from_str(&raw).map_err(|source| SchemaError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    let validator = jsonschema::options()
        .with_draft(Draft::Draft7)
        .build(&schema)
        .map_err(|err| SchemaError::Compile {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;

    let errors: Vec<String> = validator.iter_errors(instance).map(|err| err.to_string()).collect();
    if errors.is_empty() {
        Ok(())
    } else {
        Err(SchemaError::Mismatch {
            path: path.to_path_buf(),
            errors,
        })
    }
}

/// The record and collection schemas under one directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaSet {
    dir: PathBuf,
}

impl SchemaSet {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn todo(&self) -> PathBuf {
        self.dir.join(TODO_SCHEMA)
    }

    pub fn todos(&self) -> PathBuf {
        self.dir.join(TODOS_SCHEMA)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::config::default_schema_dir;

    fn schemas() -> SchemaSet {
        SchemaSet::new(default_schema_dir())
    }

    fn record() -> Value {
        json!({"userId": 1, "id": 1, "title": "delectus aut autem", "completed": false})
    }

    #[test]
    fn record_validates() {
        assert_valid_schema(&record(), &schemas().todo()).unwrap();
    }

    #[test]
    fn collection_validates() {
        assert_valid_schema(&json!([record(), record()]), &schemas().todos()).unwrap();
        assert_valid_schema(&json!([]), &schemas().todos()).unwrap();
    }

    #[test]
    fn string_completed_is_rejected() {
        let instance = json!({"userId": 10, "id": 201, "title": "t", "completed": "false"});
        let err = assert_valid_schema(&instance, &schemas().todo()).unwrap_err();
        assert!(matches!(err, SchemaError::Mismatch { ref errors, .. } if errors.len() == 1));
    }

    #[test]
    fn missing_required_fields_are_all_reported() {
        let err = assert_valid_schema(&json!({"title": "t"}), &schemas().todo()).unwrap_err();
        match err {
            SchemaError::Mismatch { errors, .. } => assert_eq!(errors.len(), 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn single_record_is_not_a_collection() {
        assert!(assert_valid_schema(&record(), &schemas().todos()).is_err());
    }

    #[test]
    fn missing_schema_file_is_read_error() {
        let err = assert_valid_schema(&record(), Path::new("/nonexistent/todo_schema.json")).unwrap_err();
        assert!(matches!(err, SchemaError::Read { .. }));
    }
}
