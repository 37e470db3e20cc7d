//! Request/response capture
//!
//! Builds the bounded [`RequestView`] and [`ResponseView`] projections that
//! are attached to "Incoming request" and "Outgoing response" entries.

use super::config::RequestLoggingConfig;
use super::error::Result;
use super::log_entry::{RequestView, ResponseView};
use super::truncation::truncate_body;
use http::{HeaderMap, Method, StatusCode, Uri};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Instant;

pub const CORRELATION_ID_HEADER: &str = "x-correlation-id";

/// Inbound request as seen by the logger
#[derive(Debug, Clone)]
pub struct HttpRequest<B = Value> {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    pub body: Option<B>,
    /// Route parameters extracted by the router
    pub params: BTreeMap<String, String>,
    pub query: BTreeMap<String, String>,
}

impl<B> HttpRequest<B> {
    /// Create a request; query parameters are parsed from the URI
    pub fn new(method: Method, uri: Uri) -> Self {
        let query = uri.query().map(parse_query).unwrap_or_default();
        Self {
            method,
            uri,
            headers: HeaderMap::new(),
            body: None,
            params: BTreeMap::new(),
            query,
        }
    }

    #[must_use]
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: B) -> Self {
        self.body = Some(body);
        self
    }

    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn path(&self) -> &str {
        self.uri.path()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

impl<B> From<http::Request<B>> for HttpRequest<B> {
    fn from(request: http::Request<B>) -> Self {
        let (parts, body) = request.into_parts();
        let mut converted = Self::new(parts.method, parts.uri).with_headers(parts.headers);
        converted.body = Some(body);
        converted
    }
}

/// Outgoing response as seen by the logger
#[derive(Debug, Clone)]
pub struct HttpResponse<B = Value> {
    pub status: StatusCode,
    pub headers: HeaderMap,
    /// Body captured by the response writer, if any
    pub captured_body: Option<B>,
}

impl<B> HttpResponse<B> {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            captured_body: None,
        }
    }

    #[must_use]
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    #[must_use]
    pub fn with_captured_body(mut self, body: B) -> Self {
        self.captured_body = Some(body);
        self
    }
}

/// Percent- and `+`-decoded query pairs; a repeated key keeps its last value
fn parse_query(query: &str) -> BTreeMap<String, String> {
    url::form_urlencoded::parse(query.as_bytes())
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect()
}

/// Serialize and bound a body, treating `null` and `""` as no body
fn captured_body<B: Serialize>(body: &B, max_length: usize) -> Result<Option<Value>> {
    let value = serde_json::to_value(body)?;
    match &value {
        Value::Null => Ok(None),
        Value::String(s) if s.is_empty() => Ok(None),
        _ => truncate_body(&value, max_length).map(Some),
    }
}

/// Header values that are not visible ASCII are skipped
fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(String::from)
}

/// Applies a [`RequestLoggingConfig`] to requests and responses
#[derive(Debug, Clone)]
pub struct RequestCapture {
    config: RequestLoggingConfig,
}

impl RequestCapture {
    pub fn new(config: RequestLoggingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RequestLoggingConfig {
        &self.config
    }

    pub fn is_excluded<B>(&self, request: &HttpRequest<B>) -> bool {
        self.config.is_excluded(request.path())
    }

    /// Project a request through the capture policy
    ///
    /// Only configured headers are kept; missing ones are skipped. Body,
    /// route params and query are included when enabled and present. A body
    /// that serializes to `null` or an empty string counts as absent.
    pub fn capture_request<B: Serialize>(&self, request: &HttpRequest<B>) -> Result<RequestView> {
        let headers = self
            .config
            .include_headers
            .iter()
            .filter_map(|name| {
                header_value(&request.headers, name).map(|value| (name.to_lowercase(), value))
            })
            .collect();

        let body = match (&request.body, self.config.log_request_body) {
            (Some(body), true) => captured_body(body, self.config.max_body_length)?,
            _ => None,
        };

        let params = (self.config.log_route_params && !request.params.is_empty())
            .then(|| request.params.clone());
        let query = (self.config.log_query_params && !request.query.is_empty())
            .then(|| request.query.clone());

        Ok(RequestView {
            method: request.method.to_string(),
            url: request.uri.to_string(),
            headers,
            body,
            params,
            query,
        })
    }

    /// Project a response; all of its headers are kept
    pub fn capture_response<B: Serialize>(
        &self,
        response: &HttpResponse<B>,
        started_at: Option<Instant>,
    ) -> Result<ResponseView> {
        let headers = response
            .headers
            .keys()
            .filter_map(|name| {
                header_value(&response.headers, name.as_str())
                    .map(|value| (name.as_str().to_string(), value))
            })
            .collect();

        let duration_ms = match (self.config.log_timing, started_at) {
            (true, Some(start)) => Some(start.elapsed().as_millis() as u64),
            _ => None,
        };

        let body = match (&response.captured_body, self.config.log_response_body) {
            (Some(body), true) => captured_body(body, self.config.max_body_length)?,
            _ => None,
        };

        Ok(ResponseView {
            status_code: response.status.as_u16(),
            headers,
            duration_ms,
            body,
        })
    }
}
