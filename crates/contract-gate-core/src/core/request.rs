// crates/contract-gate-core/src/core/request.rs
// ============================================================================
// Module: Contract Gate Requests and Responses
// Description: Transport-neutral request descriptions and captured responses.
// Purpose: Give scenarios, probers, and matrices a single request/response model.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! A [`RequestSpec`] describes one HTTP exchange without binding to a client
//! library. Every request carries a finite timeout; [`DEFAULT_TIMEOUT`] applies
//! unless the caller overrides it.
//!
//! A [`Response`] captures status, headers, elapsed time, and the raw body.
//! Non-2xx statuses are ordinary data here.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::time::Duration;

use serde_json::Value;

use crate::core::endpoint::HttpMethod;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Timeout applied to requests that do not set one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Lower-cased `Authorization` header name.
pub const AUTHORIZATION: &str = "authorization";

// ============================================================================
// SECTION: Request Body
// ============================================================================

/// File part of a multipart body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    /// Form field name (for example `image`).
    pub field: String,
    /// File name sent in the content disposition.
    pub file_name: String,
    /// MIME type of the part.
    pub content_type: String,
    /// File contents.
    pub bytes: Vec<u8>,
}

impl FilePart {
    /// Creates a file part.
    #[must_use]
    pub fn new(
        field: impl Into<String>,
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            field: field.into(),
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }
}

/// Request payload variants.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RequestBody {
    /// No body.
    #[default]
    Empty,
    /// JSON document sent as `application/json`.
    Json(Value),
    /// URL-encoded form fields.
    Form(Vec<(String, String)>),
    /// Multipart form with text fields and file parts.
    Multipart {
        /// Text fields in insertion order.
        fields: Vec<(String, String)>,
        /// File parts in insertion order.
        files: Vec<FilePart>,
    },
}

// ============================================================================
// SECTION: Request Spec
// ============================================================================

/// One HTTP request, independent of any client library.
///
/// # Invariants
/// - `timeout` is always finite.
/// - Header names are stored lower-cased; setting a header replaces prior values.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestSpec {
    /// HTTP method.
    pub method: HttpMethod,
    /// Absolute URL without query parameters.
    pub url: String,
    /// Query parameters in insertion order.
    pub params: Vec<(String, String)>,
    /// Request body.
    pub body: RequestBody,
    /// Request headers in insertion order.
    pub headers: Vec<(String, String)>,
    /// Request timeout.
    pub timeout: Duration,
}

impl RequestSpec {
    /// Creates a request with no body and the default timeout.
    #[must_use]
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            params: Vec::new(),
            body: RequestBody::Empty,
            headers: Vec::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Appends a query parameter.
    #[must_use]
    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((name.into(), value.into()));
        self
    }

    /// Sets a JSON body.
    #[must_use]
    pub fn json(mut self, value: Value) -> Self {
        self.body = RequestBody::Json(value);
        self
    }

    /// Appends a URL-encoded form field, replacing any non-form body.
    #[must_use]
    pub fn form_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let pair = (name.into(), value.into());
        match &mut self.body {
            RequestBody::Form(fields) => fields.push(pair),
            _ => self.body = RequestBody::Form(vec![pair]),
        }
        self
    }

    /// Appends a multipart text field, replacing any non-multipart body.
    #[must_use]
    pub fn multipart_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let pair = (name.into(), value.into());
        match &mut self.body {
            RequestBody::Multipart {
                fields, ..
            } => fields.push(pair),
            _ => {
                self.body = RequestBody::Multipart {
                    fields: vec![pair],
                    files: Vec::new(),
                };
            }
        }
        self
    }

    /// Appends a multipart file part, replacing any non-multipart body.
    #[must_use]
    pub fn file(mut self, part: FilePart) -> Self {
        match &mut self.body {
            RequestBody::Multipart {
                files, ..
            } => files.push(part),
            _ => {
                self.body = RequestBody::Multipart {
                    fields: Vec::new(),
                    files: vec![part],
                };
            }
        }
        self
    }

    /// Sets a header, replacing any existing value with the same name.
    #[must_use]
    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_header(name, value);
        self
    }

    /// Sets a header in place, replacing any existing value with the same name.
    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        let name = name.to_ascii_lowercase();
        self.headers.retain(|(existing, _)| *existing != name);
        self.headers.push((name, value.into()));
    }

    /// Sets `Authorization: Bearer <token>`.
    #[must_use]
    pub fn bearer(self, token: &str) -> Self {
        self.header(AUTHORIZATION, format!("Bearer {token}"))
    }

    /// Removes the `Authorization` header.
    #[must_use]
    pub fn without_auth(mut self) -> Self {
        self.headers.retain(|(name, _)| name != AUTHORIZATION);
        self
    }

    /// Overrides the timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the value of a header set on this request.
    #[must_use]
    pub fn header_value(&self, name: &str) -> Option<&str> {
        let name = name.to_ascii_lowercase();
        self.headers.iter().find(|(existing, _)| *existing == name).map(|(_, value)| value.as_str())
    }
}

// ============================================================================
// SECTION: Retry-After
// ============================================================================

/// Parsed `Retry-After` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryAfter {
    /// Raw header text.
    pub raw: String,
    /// Delay when the header is expressed in delta-seconds.
    pub delay: Option<Duration>,
}

impl RetryAfter {
    /// Parses a `Retry-After` header value. HTTP-date forms keep only the raw text.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let delay = raw.trim().parse::<u64>().ok().map(Duration::from_secs);
        Self {
            raw: raw.to_string(),
            delay,
        }
    }
}

// ============================================================================
// SECTION: Response
// ============================================================================

/// Captured HTTP response.
///
/// # Invariants
/// - Header names are lower-cased; repeated headers are joined with `", "`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Status code.
    pub status: u16,
    /// Response headers.
    pub headers: BTreeMap<String, String>,
    /// Time from dispatch through full body read.
    pub elapsed: Duration,
    /// Raw body bytes.
    pub body_raw: Vec<u8>,
}

impl Response {
    /// Creates an empty response with the given status.
    #[must_use]
    pub const fn new(status: u16) -> Self {
        Self {
            status,
            headers: BTreeMap::new(),
            elapsed: Duration::ZERO,
            body_raw: Vec::new(),
        }
    }

    /// Adds a header value, joining with any existing value.
    #[must_use]
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.append_header(name, value);
        self
    }

    /// Adds a header value in place, joining with any existing value.
    pub fn append_header(&mut self, name: &str, value: &str) {
        self.headers
            .entry(name.to_ascii_lowercase())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(value);
            })
            .or_insert_with(|| value.to_string());
    }

    /// Replaces the body with a JSON document.
    #[must_use]
    pub fn with_json(mut self, value: &Value) -> Self {
        self.body_raw = value.to_string().into_bytes();
        self.headers.insert("content-type".to_string(), "application/json".to_string());
        self
    }

    /// Replaces the body bytes.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body_raw = body.into();
        self
    }

    /// Sets the elapsed time.
    #[must_use]
    pub const fn with_elapsed(mut self, elapsed: Duration) -> Self {
        self.elapsed = elapsed;
        self
    }

    /// Returns a header value by case-insensitive name.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    /// Parses the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns the parse error when the body is not valid JSON.
    pub fn json(&self) -> Result<Value, serde_json::Error> {
        serde_json::from_slice(&self.body_raw)
    }

    /// Returns the body as lossy UTF-8 text.
    #[must_use]
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body_raw).into_owned()
    }

    /// Returns the parsed `Retry-After` header, if present.
    #[must_use]
    pub fn retry_after(&self) -> Option<RetryAfter> {
        self.header("retry-after").map(RetryAfter::parse)
    }

    /// Returns true for 2xx statuses.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Returns elapsed time in whole milliseconds.
    #[must_use]
    pub fn elapsed_ms(&self) -> u64 {
        duration_ms(self.elapsed)
    }
}

/// Converts a duration to whole milliseconds, saturating at `u64::MAX`.
#[must_use]
pub fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

// ============================================================================
// SECTION: Tests
// ============================================================================
