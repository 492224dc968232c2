//! Outbound HTTP.
//!
//! The engine talks to the provider under test only through [`Transport`],
//! so tests substitute an in-memory fake. [`ReqwestTransport`] is the
//! production implementation: a blocking `reqwest` client with a
//! per-request deadline, optional basic credentials and a response size cap.

use std::io::Read;
use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::{ACCEPT, CONTENT_LENGTH, CONTENT_TYPE, LOCATION};
use tracing::debug;

use crate::config::{Config, Credentials};
use crate::error::{ConfigError, FetchError};

/// Name of the OSLC version negotiation header.
pub const CORE_VERSION_HEADER: &str = "OSLC-Core-Version";

/// Upper bound on a response body.
pub const MAX_RESPONSE_BYTES: usize = 32 * 1024 * 1024;

/// HTTP method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// `GET`
    Get,
    /// `POST`
    Post,
}

/// One outbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    /// Method.
    pub method: Method,
    /// Absolute URL.
    pub url: String,
    /// `Accept` header value.
    pub accept: String,
    /// `OSLC-Core-Version` header value, if sent.
    pub core_version: Option<&'static str>,
    /// `Content-Type` of the body, if any.
    pub content_type: Option<String>,
    /// Request body.
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    /// A `GET` with content negotiation.
    #[must_use]
    pub fn get(url: impl Into<String>, accept: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            accept: accept.into(),
            core_version: None,
            content_type: None,
            body: None,
        }
    }

    /// A `POST` of `body`, declared as `content_type`, accepting the same.
    #[must_use]
    pub fn post(url: impl Into<String>, content_type: &str, body: Vec<u8>) -> Self {
        Self {
            method: Method::Post,
            url: url.into(),
            accept: content_type.to_string(),
            core_version: None,
            content_type: Some(content_type.to_string()),
            body: Some(body),
        }
    }

    /// Sets the `OSLC-Core-Version` header.
    #[must_use]
    pub fn with_core_version(mut self, version: Option<&'static str>) -> Self {
        self.core_version = version;
        self
    }
}

/// A response, whatever its status.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpResponse {
    /// Status code.
    pub status: u16,
    /// Declared `Content-Type`.
    pub content_type: Option<String>,
    /// `Location` header.
    pub location: Option<String>,
    /// Body bytes.
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Returns true for 2xx statuses.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Request/response exchange with the provider under test.
///
/// Implementations report only transport-level failures as errors; any
/// HTTP status is a successful exchange.
pub trait Transport: Send + Sync {
    /// Sends one request.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Transport`] or [`FetchError::Timeout`] when no
    /// response was received.
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, FetchError>;
}

/// Blocking `reqwest` transport.
pub struct ReqwestTransport {
    client: Client,
    credentials: Option<Credentials>,
}

impl ReqwestTransport {
    /// Builds a transport with the given deadline and credentials.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::HttpClient`] when the client cannot be built.
    pub fn new(timeout: Duration, credentials: Option<Credentials>) -> Result<Self, ConfigError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("oslc-conformance/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;
        Ok(Self {
            client,
            credentials,
        })
    }

    /// Builds a transport from the run configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::HttpClient`] when the client cannot be built.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        Self::new(config.timeout, config.credentials.clone())
    }

    fn builder(&self, request: &HttpRequest) -> RequestBuilder {
        let mut builder = match request.method {
            Method::Get => self.client.get(&request.url),
            Method::Post => self.client.post(&request.url),
        };
        builder = builder.header(ACCEPT, &request.accept);
        if let Some(version) = request.core_version {
            builder = builder.header(CORE_VERSION_HEADER, version);
        }
        if let Some(content_type) = &request.content_type {
            builder = builder.header(CONTENT_TYPE, content_type);
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }
        if let Some(credentials) = &self.credentials {
            builder = builder.basic_auth(&credentials.user, Some(&credentials.password));
        }
        builder
    }
}

fn classify(url: &str, err: &reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else {
        FetchError::Transport {
            url: url.to_string(),
            message: err.to_string(),
        }
    }
}

fn header(response: &reqwest::blocking::Response, name: reqwest::header::HeaderName) -> Option<String> {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

impl Transport for ReqwestTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, FetchError> {
        debug!(method = ?request.method, url = %request.url, accept = %request.accept, "sending request");
        let response = self
            .builder(request)
            .send()
            .map_err(|e| classify(&request.url, &e))?;
        let status = response.status().as_u16();
        let content_type = header(&response, CONTENT_TYPE);
        let location = header(&response, LOCATION);
        let declared = header(&response, CONTENT_LENGTH).and_then(|v| v.parse::<u64>().ok());
        let body = read_limited(&request.url, response, declared)?;
        debug!(url = %request.url, status, bytes = body.len(), "received response");
        Ok(HttpResponse {
            status,
            content_type,
            location,
            body,
        })
    }
}

/// Reads a body, refusing anything over [`MAX_RESPONSE_BYTES`].
fn read_limited(
    url: &str,
    response: reqwest::blocking::Response,
    declared: Option<u64>,
) -> Result<Vec<u8>, FetchError> {
    let too_large = || FetchError::Transport {
        url: url.to_string(),
        message: format!("response exceeds {MAX_RESPONSE_BYTES} bytes"),
    };
    let limit = u64::try_from(MAX_RESPONSE_BYTES).unwrap_or(u64::MAX);
    if declared.is_some_and(|len| len > limit) {
        return Err(too_large());
    }
    let mut body = Vec::new();
    response
        .take(limit.saturating_add(1))
        .read_to_end(&mut body)
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::TimedOut {
                FetchError::Timeout {
                    url: url.to_string(),
                }
            } else {
                FetchError::Transport {
                    url: url.to_string(),
                    message: e.to_string(),
                }
            }
        })?;
    if body.len() > MAX_RESPONSE_BYTES {
        return Err(too_large());
    }
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn post_accepts_what_it_sends() {
        let request = HttpRequest::post("http://host/f", "application/rdf+xml", b"<x/>".to_vec())
            .with_core_version(Some("2.0"));
        assert_eq!(request.method, Method::Post);
        assert_eq!(request.accept, "application/rdf+xml");
        assert_eq!(request.content_type.as_deref(), Some("application/rdf+xml"));
        assert_eq!(request.core_version, Some("2.0"));
    }

    #[test]
    fn success_range() {
        let mut response = HttpResponse {
            status: 201,
            ..HttpResponse::default()
        };
        assert!(response.is_success());
        response.status = 404;
        assert!(!response.is_success());
    }
}
