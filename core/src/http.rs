//! HTTP transport seam.
//!
//! # Design
//! Requests and responses are described as plain data. `CoinGeckoClient`
//! builds an `HttpRequest`, hands it to a `Transport`, and interprets the
//! returned `HttpResponse` itself (status check, JSON decode). The default
//! transport runs on a `ureq` agent; tests plug in a recording transport
//! instead so no network is needed.
//!
//! All fields use owned types so values can be recorded and replayed freely.

use std::io;
use std::time::Duration;

use crate::error::TransportError;

/// HTTP method for a request. The wrapped API is read-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
}

/// An HTTP request described as plain data.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    /// Absolute URL: base URL followed by the route.
    pub url: String,
    pub timeout: Duration,
}

/// An HTTP response described as plain data. Any status may appear here;
/// the client decides which ones are failures.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

/// Largest response body `UreqTransport` reads. Full coin lists with
/// platform data exceed ureq's 10 MB default.
pub const MAX_BODY_BYTES: u64 = 64 * 1024 * 1024;

/// Executes one request/response round trip.
///
/// Implementations must be shareable across threads; the client holds a
/// transport for its whole lifetime and may be used from several threads.
pub trait Transport: Send + Sync {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).execute(request)
    }
}

/// Blocking transport backed by a pooled `ureq` agent.
///
/// Status codes are returned as data rather than errors so the client can
/// include the error body in `TransportError::Status`.
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl std::fmt::Debug for UreqTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UreqTransport").finish_non_exhaustive()
    }
}

impl UreqTransport {
    pub fn new(timeout: Duration) -> Self {
        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut response = match request.method {
            HttpMethod::Get => self
                .agent
                .get(&request.url)
                .header("accept", "application/json")
                .config()
                .timeout_global(Some(request.timeout))
                .build()
                .call(),
        }
        .map_err(map_ureq_error)?;

        let status = response.status().as_u16();
        let body = response
            .body_mut()
            .with_config()
            .limit(MAX_BODY_BYTES)
            .read_to_string()
            .map_err(map_ureq_error)?;

        Ok(HttpResponse { status, body })
    }
}

fn map_ureq_error(err: ureq::Error) -> TransportError {
    match err {
        ureq::Error::Timeout(_) => TransportError::Timeout,
        ureq::Error::Io(e) if matches!(e.kind(), io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock) => {
            TransportError::Timeout
        }
        ureq::Error::StatusCode(status) => TransportError::Status {
            status,
            body: String::new(),
        },
        other => TransportError::Network(other.to_string()),
    }
}
