//! Contract suite for a todo resource collection.
//!
//! # Overview
//! `cases` holds one function per CRUD or filtering scenario. Each runs
//! against a `Harness`, which pairs the stateless `TodoClient` with whichever
//! `Transport` was chosen when the harness was built: `UreqTransport` for a
//! live backend, `StubTransport` for canned responses.
//!
//! # Design
//! - Cases check the response their own request produced; nothing is
//!   substituted after the call.
//! - With no `TODO_API_BASE_URL` configured, `Harness::from_env` starts the
//!   in-process fake backend from `mock-server` on a random port.
//! - Schema documents are loaded from disk on every validation.

pub mod cases;
pub mod config;
pub mod fixtures;
pub mod schema;
pub mod transport;

pub use cases::{CaseFailure, CaseResult};
pub use config::{ConfigError, SuiteConfig};
pub use fixtures::{FixtureError, Harness, LocalServer};
pub use schema::{assert_valid_schema, SchemaError, SchemaSet};
pub use transport::UreqTransport;
