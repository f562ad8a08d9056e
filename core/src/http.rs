//! HTTP transport types and the transport seam.
//!
//! # Design
//! Requests and responses are plain data. `MoodleClient` builds an
//! `HttpRequest`, hands it to a `Transport`, and parses the `HttpResponse`
//! it gets back. The client itself never touches a socket, so tests can
//! swap the transport for an in-process fake.
//!
//! `HttpRequest::url` is always fully percent-encoded; the raw form of the
//! query lives on `QueryParams`.

use std::fmt::{Debug, Formatter};

use log::debug;

use crate::error::ApiError;

/// A GET request described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    /// Absolute, percent-encoded URL including the query string.
    pub url: String,
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

/// Executes a single GET round-trip.
///
/// Implementations must return non-2xx responses as data; only failures to
/// obtain a response at all map to `ApiError::Connectivity`.
pub trait Transport {
    fn get(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn get(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        (**self).get(request)
    }
}

/// Blocking transport backed by a shared `ureq` agent.
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl Debug for UreqTransport {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UreqTransport").finish_non_exhaustive()
    }
}

impl UreqTransport {
    pub fn new() -> Self {
        // Moodle reports most failures with a 200 status, but the ones it
        // does not must still reach the envelope parser.
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

impl Transport for UreqTransport {
    fn get(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        let mut response = self
            .agent
            .get(&request.url)
            .call()
            .map_err(|e| ApiError::Connectivity(e.to_string()))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| ApiError::Connectivity(e.to_string()))?;
        debug!("received HTTP {status} with {} bytes", body.len());

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
