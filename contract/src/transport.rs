//! Live `Transport` backed by a blocking `ureq` agent.

use todo_core::{ApiError, HttpMethod, HttpRequest, HttpResponse, Transport};
use tracing::debug;

/// Executes requests over real HTTP.
///
/// ureq's automatic status-code-as-error behaviour is disabled so 4xx/5xx
/// responses come back as data rather than `Err`, leaving status
/// interpretation to the caller.
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

/// Apply the request's query pairs and headers to a ureq builder.
fn prepare<B>(builder: ureq::RequestBuilder<B>, req: &HttpRequest) -> ureq::RequestBuilder<B> {
    let builder = req
        .query
        .iter()
        .fold(builder, |b, (key, value)| b.query(key, value));
    req.headers
        .iter()
        .fold(builder, |b, (name, value)| b.header(name.as_str(), value.as_str()))
}

fn has_content_type(req: &HttpRequest) -> bool {
    req.headers
        .iter()
        .any(|(name, _)| name.eq_ignore_ascii_case("content-type"))
}

fn send_body(
    builder: ureq::RequestBuilder<ureq::typestate::WithBody>,
    req: &HttpRequest,
) -> Result<ureq::http::Response<ureq::Body>, ureq::Error> {
    let mut builder = prepare(builder, req);
    if !has_content_type(req) {
        builder = builder.content_type("application/json");
    }
    builder.send(req.body.as_deref().unwrap_or("").as_bytes())
}

impl Transport for UreqTransport {
    fn execute(&self, req: &HttpRequest) -> Result<HttpResponse, ApiError> {
        let url = req.path.as_str();
        let result = match req.method {
            HttpMethod::Get => prepare(self.agent.get(url), req).call(),
            HttpMethod::Delete => prepare(self.agent.delete(url), req).call(),
            HttpMethod::Post => send_body(self.agent.post(url), req),
            HttpMethod::Put => send_body(self.agent.put(url), req),
            HttpMethod::Patch => send_body(self.agent.patch(url), req),
        };
        let mut response = result.map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| Some((name.as_str().to_string(), value.to_str().ok()?.to_string())))
            .collect();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        debug!(method = %req.method, url, status, "executed request");

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
