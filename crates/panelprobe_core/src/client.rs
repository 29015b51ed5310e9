//! HTTP request wrapper for the admin-panel API.
//!
//! [`ApiClient::send`] never fails: transport errors, timeouts and malformed
//! bodies are folded into an [`ApiResponse`] so every caller gets a status,
//! a JSON body and a `success` flag.

use crate::error::{ProbeError, Result};
use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use serde_json::{Map, Value};
use std::fmt;
use std::time::Duration;
use tracing::{debug, warn};

/// Status reported when no HTTP response was received at all.
pub const TRANSPORT_FAILURE_STATUS: u16 = 0;

/// HTTP methods used by the panel API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    fn as_reqwest(self) -> reqwest::Method {
        match self {
            Self::Get => reqwest::Method::GET,
            Self::Post => reqwest::Method::POST,
            Self::Put => reqwest::Method::PUT,
            Self::Delete => reqwest::Method::DELETE,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        };
        f.write_str(name)
    }
}

/// A file sent as a multipart form part.
#[derive(Debug, Clone)]
pub struct FilePayload {
    /// Form field name (the panel expects `file`).
    pub field: String,
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl FilePayload {
    /// A plain-text file in the `file` field.
    pub fn text(file_name: &str, content: &str) -> Self {
        Self {
            field: "file".to_string(),
            file_name: file_name.to_string(),
            mime: "text/plain".to_string(),
            bytes: content.as_bytes().to_vec(),
        }
    }
}

/// One request against the API, relative to the base URL.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
    pub token: Option<String>,
    pub query: Vec<(String, String)>,
    pub file: Option<FilePayload>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            token: None,
            query: Vec::new(),
            file: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::Put, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    /// Attach a JSON body.
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Attach a bearer token. `None` leaves the request unauthenticated.
    pub fn bearer(mut self, token: Option<&str>) -> Self {
        self.token = token.map(str::to_string);
        self
    }

    /// Append a query parameter.
    pub fn query(mut self, key: &str, value: &str) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    /// Send a multipart file instead of a JSON body.
    pub fn file(mut self, file: FilePayload) -> Self {
        self.file = Some(file);
        self
    }
}

/// Normalized outcome of one request.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    /// HTTP status, or [`TRANSPORT_FAILURE_STATUS`] when nothing came back.
    pub status: u16,
    /// Parsed JSON body; an empty object when the body was empty or not JSON.
    pub body: Value,
    /// Raw body text, kept only when it failed to parse as JSON.
    pub raw: Option<String>,
    /// True for statuses 200..=399 received without a transport error.
    pub success: bool,
    /// Description of the transport failure, if any.
    pub transport_error: Option<String>,
}

impl ApiResponse {
    /// Build a response from a received status and body text.
    pub fn from_parts(status: u16, text: &str) -> Self {
        let (body, raw) = if text.trim().is_empty() {
            (Value::Object(Map::new()), None)
        } else {
            match serde_json::from_str::<Value>(text) {
                Ok(value) => (value, None),
                Err(_) => (Value::Object(Map::new()), Some(text.to_string())),
            }
        };

        Self {
            status,
            body,
            raw,
            success: (200..400).contains(&status),
            transport_error: None,
        }
    }

    /// Build the response for a request that never got an HTTP answer.
    pub fn transport_failure(reason: impl Into<String>) -> Self {
        Self {
            status: TRANSPORT_FAILURE_STATUS,
            body: Value::Object(Map::new()),
            raw: None,
            success: false,
            transport_error: Some(reason.into()),
        }
    }

    /// Top-level field of the body.
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.body.get(key)
    }

    /// Top-level string field of the body.
    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.field(key).and_then(Value::as_str)
    }

    /// Top-level array field, empty when missing or not an array.
    pub fn list(&self, key: &str) -> &[Value] {
        self.field(key)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// True when the top-level field is a JSON array.
    pub fn has_list(&self, key: &str) -> bool {
        self.field(key).is_some_and(Value::is_array)
    }

    /// Short description used in failure messages.
    pub fn describe(&self) -> String {
        match &self.transport_error {
            Some(reason) => format!("No response: {}", reason),
            None => match self.str_field("error") {
                Some(error) => format!("Status: {} ({})", self.status, error),
                None => format!("Status: {}", self.status),
            },
        }
    }
}

/// Blocking client bound to one API base URL.
pub struct ApiClient {
    http: Client,
    base_url: String,
    timeout: Duration,
}

impl ApiClient {
    /// Create a client for `base_url` with a per-request timeout.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProbeError::Client(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL for an API path.
    pub fn url_for(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// Issue one request. Always returns a normalized response.
    pub fn send(&self, request: ApiRequest) -> ApiResponse {
        let url = self.url_for(&request.path);
        let mut builder = self.http.request(request.method.as_reqwest(), &url);

        if let Some(token) = request.token.as_deref() {
            builder = builder.bearer_auth(token);
        }
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }

        builder = match request.file {
            Some(file) => {
                let part = match Part::bytes(file.bytes)
                    .file_name(file.file_name)
                    .mime_str(&file.mime)
                {
                    Ok(part) => part,
                    Err(e) => {
                        return ApiResponse::transport_failure(format!("invalid file payload: {}", e))
                    }
                };
                builder.multipart(Form::new().part(file.field, part))
            }
            None => {
                let builder = builder.header(CONTENT_TYPE, "application/json");
                match request.body {
                    Some(body) => builder.body(body.to_string()),
                    None => builder,
                }
            }
        };

        let response = match builder.send() {
            Ok(response) => response,
            Err(e) => {
                let reason = if e.is_timeout() {
                    format!("timed out after {}s", self.timeout.as_secs())
                } else if e.is_connect() {
                    format!("connection failed: {}", e)
                } else {
                    e.to_string()
                };
                warn!(method = %request.method, path = %request.path, %reason, "request failed");
                return ApiResponse::transport_failure(reason);
            }
        };

        let status = response.status().as_u16();
        let normalized = match response.text() {
            Ok(text) => ApiResponse::from_parts(status, &text),
            Err(e) => {
                warn!(method = %request.method, path = %request.path, status, "failed to read body: {}", e);
                let mut failed = ApiResponse::transport_failure(format!("failed to read body: {}", e));
                failed.status = status;
                failed
            }
        };

        debug!(
            method = %request.method,
            path = %request.path,
            status = normalized.status,
            success = normalized.success,
            "request complete"
        );
        normalized
    }
}
