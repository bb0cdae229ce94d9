//! Domain DTOs for the todo API.
//!
//! # Design
//! These types mirror the fake backend's records but are defined
//! independently; the contract suite catches any drift between the two.
//! Field names follow the wire format, so `user_id` travels as `userId`.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single todo item returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Todo {
    #[serde(rename = "userId")]
    pub user_id: u64,
    pub id: u64,
    pub title: String,
    pub completed: bool,
}

/// Full write payload, used by POST and PUT.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewTodo {
    #[serde(rename = "userId")]
    pub user_id: u64,
    pub title: String,
    pub completed: bool,
}

/// Partial update payload for PATCH. Only the fields present are sent.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TodoPatch {
    #[serde(rename = "userId", skip_serializing_if = "Option::is_none")]
    pub user_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

/// Filterable todo fields, named as they appear on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TodoField {
    #[serde(rename = "id")]
    Id,
    #[serde(rename = "userId")]
    UserId,
    #[serde(rename = "title")]
    Title,
    #[serde(rename = "completed")]
    Completed,
}

impl TodoField {
    pub const ALL: [TodoField; 4] = [
        TodoField::UserId,
        TodoField::Id,
        TodoField::Title,
        TodoField::Completed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TodoField::Id => "id",
            TodoField::UserId => "userId",
            TodoField::Title => "title",
            TodoField::Completed => "completed",
        }
    }
}

impl fmt::Display for TodoField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One `field=value` equality filter on the collection.
#[derive(Debug, Clone, PartialEq)]
pub struct TodoFilter {
    pub field: TodoField,
    pub value: Value,
}

impl TodoFilter {
    pub fn new(field: TodoField, value: impl Into<Value>) -> Self {
        Self {
            field,
            value: value.into(),
        }
    }

    /// The value as sent in the query string. Strings go out unquoted and
    /// booleans lower-case.
    pub fn query_value(&self) -> String {
        match &self.value {
            Value::String(s) => s.clone(),
            Value::Bool(b) => b.to_string(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn todo_uses_camel_case_user_id() {
        let todo: Todo =
            serde_json::from_str(r#"{"userId":1,"id":1,"title":"delectus aut autem","completed":false}"#)
                .unwrap();
        assert_eq!(todo.user_id, 1);
        let json = serde_json::to_value(&todo).unwrap();
        assert_eq!(json["userId"], 1);
    }

    #[test]
    fn todo_rejects_string_completed() {
        let result: Result<Todo, _> =
            serde_json::from_str(r#"{"userId":1,"id":1,"title":"t","completed":"false"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn empty_patch_serializes_to_empty_object() {
        let json = serde_json::to_string(&TodoPatch::default()).unwrap();
        assert_eq!(json, "{}");
    }

    #[test]
    fn patch_serializes_only_present_fields() {
        let patch = TodoPatch {
            user_id: Some(2),
            ..TodoPatch::default()
        };
        assert_eq!(serde_json::to_string(&patch).unwrap(), r#"{"userId":2}"#);
    }

    #[test]
    fn filter_query_values() {
        assert_eq!(TodoFilter::new(TodoField::Completed, true).query_value(), "true");
        assert_eq!(TodoFilter::new(TodoField::UserId, 9).query_value(), "9");
        assert_eq!(
            TodoFilter::new(TodoField::Title, "vel non beatae est").query_value(),
            "vel non beatae est"
        );
    }

    #[test]
    fn field_names_match_wire_format() {
        let names: Vec<&str> = TodoField::ALL.iter().map(|f| f.as_str()).collect();
        assert_eq!(names, ["userId", "id", "title", "completed"]);
    }
}
