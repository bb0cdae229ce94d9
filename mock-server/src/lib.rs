//! In-process fake of the public todo collection.
//!
//! Serves a fixed 200-record dataset with the observable behaviour of the
//! public JSON placeholder backend. Write operations compute their response
//! from the dataset but never store anything, so any number of test cases can
//! share one server without ordering constraints.

use std::{future::Future, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{debug, warn};

/// Embedded seed data, ids 1..=200.
const SEED: &str = include_str!("../data/todos.json");

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("failed to load seed dataset: {0}")]
    Dataset(#[from] serde_json::Error),

    #[error("server I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    #[serde(rename = "userId")]
    pub user_id: u64,
    pub id: u64,
    pub title: String,
    pub completed: bool,
}

/// Query-string filters for the collection. Each present key must match the
/// field's string form exactly; unknown keys are ignored.
#[derive(Debug, Default, Deserialize)]
pub struct TodoFilter {
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
    pub id: Option<String>,
    pub title: Option<String>,
    pub completed: Option<String>,
}

impl TodoFilter {
    pub fn matches(&self, todo: &Todo) -> bool {
        fn check(wanted: &Option<String>, actual: String) -> bool {
            wanted.as_ref().map_or(true, |w| *w == actual)
        }
        check(&self.user_id, todo.user_id.to_string())
            && check(&self.id, todo.id.to_string())
            && check(&self.title, todo.title.clone())
            && check(&self.completed, todo.completed.to_string())
    }
}

pub type Db = Arc<Vec<Todo>>;

pub fn seed() -> Result<Vec<Todo>, ServerError> {
    Ok(serde_json::from_str(SEED)?)
}

pub fn app() -> Result<Router, ServerError> {
    Ok(router(seed()?))
}

pub fn router(todos: Vec<Todo>) -> Router {
    let db: Db = Arc::new(todos);
    Router::new()
        .route("/todos", get(list_todos).post(create_todo))
        .route(
            "/todos/{id}",
            get(get_todo)
                .put(replace_todo)
                .patch(patch_todo)
                .delete(delete_todo),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(db)
}

/// Serve until `shutdown` resolves, then drain in-flight requests.
pub async fn run_until<F>(listener: TcpListener, shutdown: F) -> Result<(), ServerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, app()?)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

fn empty_object() -> Json<Value> {
    Json(json!({}))
}

fn find(db: &Db, id: u64) -> Option<&Todo> {
    db.iter().find(|todo| todo.id == id)
}

async fn list_todos(State(db): State<Db>, Query(filter): Query<TodoFilter>) -> Json<Vec<Todo>> {
    let todos: Vec<Todo> = db.iter().filter(|t| filter.matches(t)).cloned().collect();
    debug!(?filter, matched = todos.len(), "listed todos");
    Json(todos)
}

async fn get_todo(
    State(db): State<Db>,
    Path(id): Path<u64>,
) -> Result<Json<Todo>, (StatusCode, Json<Value>)> {
    find(&db, id)
        .cloned()
        .map(Json)
        .ok_or((StatusCode::NOT_FOUND, empty_object()))
}

async fn create_todo(
    State(db): State<Db>,
    Json(mut input): Json<Map<String, Value>>,
) -> (StatusCode, Json<Map<String, Value>>) {
    let id = db.len() as u64 + 1;
    input.insert("id".to_string(), json!(id));
    debug!(id, "created todo");
    (StatusCode::CREATED, Json(input))
}

async fn replace_todo(
    State(db): State<Db>,
    Path(id): Path<u64>,
    Json(mut input): Json<Map<String, Value>>,
) -> Result<Json<Map<String, Value>>, (StatusCode, Json<Value>)> {
    if find(&db, id).is_none() {
        warn!(id, "replace of missing todo");
        return Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": format!("todo {id} does not exist") })),
        ));
    }
    input.insert("id".to_string(), json!(id));
    Ok(Json(input))
}

async fn patch_todo(
    State(db): State<Db>,
    Path(id): Path<u64>,
    Json(input): Json<Map<String, Value>>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let todo = find(&db, id).ok_or((StatusCode::NOT_FOUND, empty_object()))?;
    let mut merged = match serde_json::to_value(todo) {
        Ok(Value::Object(fields)) => fields,
        _ => return Err((StatusCode::INTERNAL_SERVER_ERROR, empty_object())),
    };
    merged.extend(input);
    merged.insert("id".to_string(), json!(id));
    Ok(Json(Value::Object(merged)))
}

async fn delete_todo(
    State(db): State<Db>,
    Path(id): Path<u64>,
) -> (StatusCode, Json<Value>) {
    match find(&db, id) {
        Some(_) => (StatusCode::OK, empty_object()),
        None => (StatusCode::NOT_FOUND, empty_object()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn todo() -> Todo {
        Todo {
            user_id: 9,
            id: 165,
            title: "vel non beatae est".to_string(),
            completed: true,
        }
    }

    #[test]
    fn todo_serializes_with_camel_case_user_id() {
        let json = serde_json::to_value(todo()).unwrap();
        assert_eq!(json["userId"], 9);
        assert_eq!(json["id"], 165);
        assert!(json.get("user_id").is_none());
    }

    #[test]
    fn seed_has_two_hundred_records_in_id_order() {
        let todos = seed().unwrap();
        assert_eq!(todos.len(), 200);
        for (index, todo) in todos.iter().enumerate() {
            assert_eq!(todo.id, index as u64 + 1);
            assert_eq!(todo.user_id, index as u64 / 20 + 1);
        }
    }

    #[test]
    fn seed_starts_with_known_record() {
        let first = seed().unwrap().remove(0);
        assert_eq!(first.title, "delectus aut autem");
        assert!(!first.completed);
    }

    #[test]
    fn empty_filter_matches_everything() {
        assert!(TodoFilter::default().matches(&todo()));
    }

    #[test]
    fn filter_compares_string_forms() {
        let filter = TodoFilter {
            completed: Some("true".to_string()),
            user_id: Some("9".to_string()),
            ..TodoFilter::default()
        };
        assert!(filter.matches(&todo()));
    }

    #[test]
    fn filter_rejects_non_matching_value() {
        let filter = TodoFilter {
            completed: Some("0".to_string()),
            ..TodoFilter::default()
        };
        assert!(!filter.matches(&todo()));
    }

    #[test]
    fn filter_deserializes_camel_case_key() {
        let filter: TodoFilter = serde_json::from_str(r#"{"userId":"3"}"#).unwrap();
        assert_eq!(filter.user_id.as_deref(), Some("3"));
    }
}
