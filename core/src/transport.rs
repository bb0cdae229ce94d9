//! The response source seam.
//!
//! A `Transport` turns an `HttpRequest` into an `HttpResponse`. The caller
//! picks the implementation when it wires the client up: a real HTTP adapter
//! for live runs, or `StubTransport` for deterministic canned responses.

use std::sync::Mutex;

use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};

/// Executes requests. Status codes are returned as data, never as `Err`;
/// `Err` means no response was obtained at all.
pub trait Transport: Send + Sync {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError>;
}

/// Canned responses keyed by method, path and query.
///
/// Headers and bodies of incoming requests are not part of the key. Every
/// executed request is recorded so tests can assert on what was sent.
#[derive(Debug, Default)]
pub struct StubTransport {
    routes: Vec<(HttpRequest, HttpResponse)>,
    sent: Mutex<Vec<HttpRequest>>,
}

impl StubTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer requests matching `request` with `response`. Later
    /// registrations for the same key take precedence.
    pub fn respond(mut self, request: &HttpRequest, response: HttpResponse) -> Self {
        self.routes.push((request.clone(), response));
        self
    }

    pub fn sent(&self) -> Vec<HttpRequest> {
        self.sent.lock().map(|sent| sent.clone()).unwrap_or_default()
    }
}

impl Transport for StubTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(request.clone());
        }
        self.routes
            .iter()
            .rev()
            .find(|(key, _)| {
                key.method == request.method && key.path == request.path && key.query == request.query
            })
            .map(|(_, response)| response.clone())
            .ok_or_else(|| {
                ApiError::Transport(format!("no stub for {} {}", request.method, request.path))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::TodoClient;

    fn client() -> TodoClient {
        TodoClient::new("http://stub")
    }

    #[test]
    fn registered_request_gets_canned_response() {
        let req = client().build_get_todo(1);
        let stub = StubTransport::new().respond(&req, HttpResponse::new(200, r#"{"id":1}"#));
        let resp = stub.execute(&req).unwrap();
        assert_eq!(resp.status, 200);
        assert_eq!(stub.sent(), vec![req]);
    }

    #[test]
    fn unregistered_request_is_transport_error() {
        let stub = StubTransport::new();
        let err = stub.execute(&client().build_get_todo(7)).unwrap_err();
        assert!(matches!(err, ApiError::Transport(msg) if msg.contains("/todos/7")));
    }

    #[test]
    fn query_is_part_of_the_key() {
        use crate::types::{TodoField, TodoFilter};

        let c = client();
        let all = c.build_list_todos();
        let filtered = c.build_filter_todos(&[TodoFilter::new(TodoField::UserId, 9)]);
        let stub = StubTransport::new()
            .respond(&all, HttpResponse::new(200, "[1]"))
            .respond(&filtered, HttpResponse::new(200, "[]"));
        assert_eq!(stub.execute(&filtered).unwrap().body, "[]");
        assert_eq!(stub.execute(&all).unwrap().body, "[1]");
    }

    #[test]
    fn later_registration_wins() {
        let req = client().build_delete_todo(1);
        let stub = StubTransport::new()
            .respond(&req, HttpResponse::new(404, ""))
            .respond(&req, HttpResponse::new(200, "{}"));
        assert_eq!(stub.execute(&req).unwrap().status, 200);
    }
}
