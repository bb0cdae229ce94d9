mod common;

use common::{check, harness};
use rstest::rstest;
use serde_json::{json, Value};
use todo_contract::{cases, Harness};
use todo_core::{TodoField, TodoFilter};

#[rstest]
#[case(TodoField::UserId, json!(9))]
#[case(TodoField::Id, json!(4))]
#[case(TodoField::Title, json!("vel non beatae est"))]
#[case(TodoField::Completed, json!(true))]
fn filtering_positive(harness: &'static Harness, #[case] field: TodoField, #[case] value: Value) {
    check(cases::filtering_positive(harness, &TodoFilter::new(field, value)));
}

#[rstest]
fn filtering_negative(
    harness: &'static Harness,
    #[values(TodoField::UserId, TodoField::Id, TodoField::Title, TodoField::Completed)] field: TodoField,
) {
    check(cases::filtering_negative(harness, &TodoFilter::new(field, 0)));
}
