//! Contract cases for the todo collection.
//!
//! Each case issues one request through the harness and checks the response
//! that request actually produced. A case returns `Ok(())` when the backend
//! honours the contract and a `CaseFailure` describing the first violation
//! otherwise.

use serde_json::{Map, Value};
use thiserror::Error;
use todo_core::{ApiError, HttpResponse, NewTodo, TodoFilter, TodoPatch};
use tracing::debug;

use crate::fixtures::Harness;
use crate::schema::{assert_valid_schema, SchemaError};

/// Records in the public dataset.
pub const DATASET_SIZE: usize = 200;

/// Status the public backend answers a PUT on an absent id with.
pub const MISSING_PUT_STATUS: u16 = 500;

#[derive(Debug, Error)]
pub enum CaseFailure {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("expected status {expected}, got {actual} with body {body:?}")]
    Status { expected: u16, actual: u16, body: String },

    #[error("field `{field}`: expected {expected}, got {actual}")]
    Field {
        field: String,
        expected: Value,
        actual: Value,
    },

    #[error("unexpected body: {0}")]
    Body(String),

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

pub type CaseResult = Result<(), CaseFailure>;

fn expect_status(response: &HttpResponse, expected: u16) -> CaseResult {
    if response.status == expected {
        return Ok(());
    }
    Err(CaseFailure::Status {
        expected,
        actual: response.status,
        body: response.body.clone(),
    })
}

fn expect_field(body: &Value, field: &str, expected: &Value) -> CaseResult {
    let actual = body.get(field).cloned().unwrap_or(Value::Null);
    if actual == *expected {
        return Ok(());
    }
    Err(CaseFailure::Field {
        field: field.to_string(),
        expected: expected.clone(),
        actual,
    })
}

/// `null`, `{}` and `[]` all count as an empty body.
fn is_empty(body: &Value) -> bool {
    match body {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

fn expect_empty(body: &Value) -> CaseResult {
    if is_empty(body) {
        Ok(())
    } else {
        Err(CaseFailure::Body(format!("expected an empty body, got {body}")))
    }
}

fn as_array(body: &Value) -> Result<&Vec<Value>, CaseFailure> {
    body.as_array()
        .ok_or_else(|| CaseFailure::Body(format!("expected an array, got {body}")))
}

fn to_fields<T: serde::Serialize>(payload: &T) -> Result<Map<String, Value>, CaseFailure> {
    match serde_json::to_value(payload) {
        Ok(Value::Object(fields)) => Ok(fields),
        Ok(other) => Err(CaseFailure::Body(format!("payload is not an object: {other}"))),
        Err(e) => Err(ApiError::SerializationError(e.to_string()).into()),
    }
}

/// `GET /todos/{id}` answers 200 with the requested id.
pub fn getting_positive(h: &Harness, id: u64) -> CaseResult {
    let response = h.send(&h.client.build_get_todo(id))?;
    expect_status(&response, 200)?;
    expect_field(&response.json()?, "id", &Value::from(id))
}

/// `GET /todos/{absent}` answers 404 with an empty body.
pub fn getting_negative(h: &Harness) -> CaseResult {
    let response = h.send(&h.client.build_get_todo(h.incorrect_todo_id))?;
    expect_status(&response, 404)?;
    expect_empty(&response.json()?)
}

/// `GET /todos` answers the whole dataset in id order.
pub fn listing_all(h: &Harness, index: usize, expected_user_id: u64) -> CaseResult {
    let response = h.send(&h.client.build_list_todos())?;
    expect_status(&response, 200)?;
    let body = response.json()?;
    let todos = as_array(&body)?;
    if todos.len() != DATASET_SIZE {
        return Err(CaseFailure::Body(format!(
            "expected {DATASET_SIZE} todos, got {}",
            todos.len()
        )));
    }
    let todo = todos
        .get(index)
        .ok_or_else(|| CaseFailure::Body(format!("no todo at index {index}")))?;
    expect_field(todo, "userId", &Value::from(expected_user_id))
}

/// `POST /todos` answers 201, echoing the payload plus a server-assigned id.
pub fn creating(h: &Harness, payload: &NewTodo, expected_id: u64) -> CaseResult {
    let response = h.send(&h.client.build_create_todo(payload)?)?;
    expect_status(&response, 201)?;
    let body = response.json()?;
    for (field, value) in to_fields(payload)? {
        expect_field(&body, &field, &value)?;
    }
    expect_field(&body, "id", &Value::from(expected_id))
}

/// `PUT /todos/{id}` answers 200 with exactly the payload plus the id.
pub fn updating_with_put_positive(h: &Harness, id: u64, payload: &NewTodo) -> CaseResult {
    let response = h.send(&h.client.build_replace_todo(id, payload)?)?;
    expect_status(&response, 200)?;
    let mut expected = to_fields(payload)?;
    expected.insert("id".to_string(), Value::from(id));
    let body = response.json()?;
    if body != Value::Object(expected.clone()) {
        return Err(CaseFailure::Body(format!(
            "expected {}, got {body}",
            Value::Object(expected)
        )));
    }
    Ok(())
}

/// `PUT /todos/{absent}` fails with `MISSING_PUT_STATUS`.
pub fn updating_with_put_negative(h: &Harness, payload: &NewTodo) -> CaseResult {
    let response = h.send(&h.client.build_replace_todo(h.incorrect_todo_id, payload)?)?;
    expect_status(&response, MISSING_PUT_STATUS)
}

/// `PATCH /todos/{id}` answers 200 with every submitted field applied and the
/// id unchanged.
pub fn updating_with_patch(h: &Harness, id: u64, patch: &TodoPatch) -> CaseResult {
    let response = h.send(&h.client.build_patch_todo(id, patch)?)?;
    expect_status(&response, 200)?;
    let body = response.json()?;
    let fields = to_fields(patch)?;
    debug!(id, fields = fields.len(), "checking patched fields");
    for (field, value) in fields {
        expect_field(&body, &field, &value)?;
    }
    expect_field(&body, "id", &Value::from(id))
}

/// `DELETE /todos/{id}` answers 200 with an empty body.
pub fn deleting(h: &Harness, id: u64) -> CaseResult {
    let response = h.send(&h.client.build_delete_todo(id))?;
    expect_status(&response, 200)?;
    expect_empty(&response.json()?)
}

/// A filter on a present value answers only, and at least one, matching
/// records.
pub fn filtering_positive(h: &Harness, filter: &TodoFilter) -> CaseResult {
    let response = h.send(&h.client.build_filter_todos(std::slice::from_ref(filter)))?;
    expect_status(&response, 200)?;
    let body = response.json()?;
    let todos = as_array(&body)?;
    if todos.is_empty() {
        return Err(CaseFailure::Body(format!(
            "no todos matched {}={}",
            filter.field,
            filter.query_value()
        )));
    }
    todos
        .iter()
        .try_for_each(|todo| expect_field(todo, filter.field.as_str(), &filter.value))
}

/// A filter on an absent value answers an empty array.
pub fn filtering_negative(h: &Harness, filter: &TodoFilter) -> CaseResult {
    let response = h.send(&h.client.build_filter_todos(std::slice::from_ref(filter)))?;
    expect_status(&response, 200)?;
    let body = response.json()?;
    if body != Value::Array(Vec::new()) {
        return Err(CaseFailure::Body(format!("expected [], got {body}")));
    }
    Ok(())
}

/// A fetched record conforms to the single-record schema.
pub fn schema_getting(h: &Harness, id: u64) -> CaseResult {
    let response = h.send(&h.client.build_get_todo(id))?;
    expect_status(&response, 200)?;
    assert_valid_schema(&response.json()?, &h.schemas.todo())?;
    Ok(())
}

/// The fetched collection conforms to the collection schema.
pub fn schema_listing_all(h: &Harness) -> CaseResult {
    let response = h.send(&h.client.build_list_todos())?;
    expect_status(&response, 200)?;
    assert_valid_schema(&response.json()?, &h.schemas.todos())?;
    Ok(())
}

/// The typed client decodes a record to the same fields the raw body carries.
pub fn typed_round_trip(h: &Harness, id: u64) -> CaseResult {
    let response = h.send(&h.client.build_get_todo(id))?;
    let todo = h.client.parse_get_todo(response.clone())?;
    let raw = response.json()?;
    let typed = serde_json::to_value(&todo).map_err(|e| ApiError::SerializationError(e.to_string()))?;
    if typed != raw {
        return Err(CaseFailure::Body(format!("typed {typed} differs from raw {raw}")));
    }
    Ok(())
}
