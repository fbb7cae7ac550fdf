//! HTTP transport seam
//!
//! Adapters speak to providers through the `HttpClient` trait so the
//! retry/polling scenarios can run against a scripted transport in tests.
//! The production implementation builds a fresh `ureq` agent per request
//! with a hard wall-clock timeout; non-2xx statuses come back as normal
//! responses and are classified by the adapter, not here.

use serde_json::Value;
use std::time::Duration;

/// A provider response: status code plus parsed JSON body. Bodies that are
/// not valid JSON (proxy error pages) are surfaced as a JSON string.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Value,
}

impl HttpResponse {
    /// 2xx check
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Failure below the HTTP layer: the request never produced a status code
#[derive(Debug, Clone)]
pub enum TransportError {
    /// The hard wall-clock timeout elapsed
    Timeout(String),
    /// Connection-level failure (refused, reset, DNS)
    Network(String),
}

impl TransportError {
    pub fn message(&self) -> &str {
        match self {
            TransportError::Timeout(m) | TransportError::Network(m) => m,
        }
    }
}

/// Blocking JSON transport used by all provider adapters
pub trait HttpClient: Send + Sync {
    /// POST a JSON body, returning status + parsed body
    fn post_json(
        &self,
        url: &str,
        headers: &[(String, String)],
        body: &Value,
        timeout: Duration,
    ) -> Result<HttpResponse, TransportError>;

    /// GET a JSON resource, returning status + parsed body
    fn get_json(
        &self,
        url: &str,
        headers: &[(String, String)],
        timeout: Duration,
    ) -> Result<HttpResponse, TransportError>;
}

/// Production transport built on `ureq`
#[derive(Debug, Clone, Default)]
pub struct UreqClient;

impl UreqClient {
    pub fn new() -> Self {
        Self
    }
}

fn build_agent(timeout: Duration) -> ureq::Agent {
    let config = ureq::Agent::config_builder()
        .timeout_global(Some(timeout))
        .http_status_as_error(false)
        .build();
    config.into()
}

fn map_error(e: ureq::Error) -> TransportError {
    match e {
        ureq::Error::Timeout(_) => TransportError::Timeout(e.to_string()),
        _ => TransportError::Network(e.to_string()),
    }
}

fn read_body(
    response: &mut ureq::http::Response<ureq::Body>,
) -> Result<Value, TransportError> {
    let text = response.body_mut().read_to_string().map_err(map_error)?;
    Ok(serde_json::from_str(&text).unwrap_or(Value::String(text)))
}

impl HttpClient for UreqClient {
    fn post_json(
        &self,
        url: &str,
        headers: &[(String, String)],
        body: &Value,
        timeout: Duration,
    ) -> Result<HttpResponse, TransportError> {
        let agent = build_agent(timeout);
        let mut request = agent.post(url);
        for (name, value) in headers {
            request = request.header(name.as_str(), value.as_str());
        }
        let mut response = request.send_json(body).map_err(map_error)?;
        let status = response.status().as_u16();
        let body = read_body(&mut response)?;
        Ok(HttpResponse { status, body })
    }

    fn get_json(
        &self,
        url: &str,
        headers: &[(String, String)],
        timeout: Duration,
    ) -> Result<HttpResponse, TransportError> {
        let agent = build_agent(timeout);
        let mut request = agent.get(url);
        for (name, value) in headers {
            request = request.header(name.as_str(), value.as_str());
        }
        let mut response = request.call().map_err(map_error)?;
        let status = response.status().as_u16();
        let body = read_body(&mut response)?;
        Ok(HttpResponse { status, body })
    }
}
