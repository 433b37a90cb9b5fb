// crates/contract-gate-http/src/transport.rs
// ============================================================================
// Module: HTTP Transport
// Description: reqwest-backed implementation of the core transport seam.
// Purpose: Send request specs over the network with bounded time and size.
// Dependencies: contract-gate-core, reqwest, serde_json, url
// ============================================================================

//! ## Overview
//! [`HttpTransport`] converts a [`RequestSpec`] into a blocking reqwest call
//! and captures the reply as a core [`Response`].
//!
//! Invariants:
//! - Redirects are not followed; 3xx statuses are returned as captured.
//! - A zero timeout is rejected before any bytes are sent.
//! - Bodies larger than `max_response_bytes` fail the exchange.
//! - Non-2xx statuses are responses, never transport errors.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Read;
use std::time::Instant;

use contract_gate_core::HttpMethod;
use contract_gate_core::RequestBody;
use contract_gate_core::RequestSpec;
use contract_gate_core::Response;
use contract_gate_core::Transport;
use contract_gate_core::TransportError;
use contract_gate_core::duration_ms;
use reqwest::Method;
use reqwest::blocking::Client;
use reqwest::blocking::RequestBuilder;
use reqwest::blocking::multipart::Form;
use reqwest::blocking::multipart::Part;
use reqwest::redirect::Policy;
use tracing::debug;
use url::Url;
use url::form_urlencoded;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Default cap on captured response bodies (4 MiB).
pub const DEFAULT_MAX_RESPONSE_BYTES: usize = 4 * 1024 * 1024;

/// Default `User-Agent` header.
pub const DEFAULT_USER_AGENT: &str = "contract-gate/0.1";

/// Configuration for [`HttpTransport`].
///
/// # Invariants
/// - `max_response_bytes` is a hard upper bound on captured bodies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpTransportConfig {
    /// User agent string for outbound requests.
    pub user_agent: String,
    /// Maximum response size allowed, in bytes.
    pub max_response_bytes: usize,
}

impl Default for HttpTransportConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_response_bytes: DEFAULT_MAX_RESPONSE_BYTES,
        }
    }
}

// ============================================================================
// SECTION: Transport
// ============================================================================

/// Blocking HTTP transport.
///
/// # Invariants
/// - The client is shared across threads; requests carry their own timeout.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    /// Transport configuration.
    config: HttpTransportConfig,
    /// Shared HTTP client.
    client: Client,
}

impl HttpTransport {
    /// Creates a transport with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::InvalidRequest`] when the client cannot be built.
    pub fn new(config: HttpTransportConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .redirect(Policy::none())
            .build()
            .map_err(|err| TransportError::InvalidRequest(format!("http client build failed: {err}")))?;
        Ok(Self {
            config,
            client,
        })
    }

    /// Returns the active configuration.
    #[must_use]
    pub const fn config(&self) -> &HttpTransportConfig {
        &self.config
    }

    /// Builds the reqwest request for a spec.
    fn build(&self, request: &RequestSpec) -> Result<RequestBuilder, TransportError> {
        if request.timeout.is_zero() {
            return Err(TransportError::InvalidRequest(
                "timeout must be greater than zero".to_string(),
            ));
        }
        let url = request_url(request)?;
        let mut builder =
            self.client.request(method_for(request.method), url.as_str()).timeout(request.timeout);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        attach_body(builder, &request.body, request)
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: &RequestSpec) -> Result<Response, TransportError> {
        let builder = self.build(request)?;
        let started = Instant::now();
        let mut reply = builder.send().map_err(|err| classify(&err, request))?;
        let status = reply.status().as_u16();
        let mut response = Response::new(status);
        for (name, value) in reply.headers() {
            response.append_header(name.as_str(), &String::from_utf8_lossy(value.as_bytes()));
        }
        let body = read_response_limited(&mut reply, self.config.max_response_bytes)
            .map_err(|err| match err {
                ReadFailure::TooLarge => TransportError::Exchange(format!(
                    "response exceeds {} bytes",
                    self.config.max_response_bytes
                )),
                ReadFailure::Io(source) => classify(&source, request),
                ReadFailure::Truncated => {
                    TransportError::Exchange("response body truncated".to_string())
                }
            })?;
        let response = response.with_body(body).with_elapsed(started.elapsed());
        debug!(
            method = request.method.as_str(),
            url = request.url.as_str(),
            status,
            elapsed_ms = response.elapsed_ms(),
            "http exchange complete"
        );
        Ok(response)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Maps a core method to the reqwest method.
const fn method_for(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Patch => Method::PATCH,
        HttpMethod::Delete => Method::DELETE,
        HttpMethod::Head => Method::HEAD,
    }
}

/// Parses the request URL and appends query parameters.
fn request_url(request: &RequestSpec) -> Result<Url, TransportError> {
    let mut url = Url::parse(&request.url)
        .map_err(|err| TransportError::InvalidRequest(format!("invalid url {}: {err}", request.url)))?;
    match url.scheme() {
        "http" | "https" => {}
        other => {
            return Err(TransportError::InvalidRequest(format!("unsupported url scheme: {other}")));
        }
    }
    if !request.params.is_empty() {
        let mut pairs = url.query_pairs_mut();
        for (name, value) in &request.params {
            pairs.append_pair(name, value);
        }
    }
    Ok(url)
}

/// Attaches the request body with the matching content type.
fn attach_body(
    builder: RequestBuilder,
    body: &RequestBody,
    request: &RequestSpec,
) -> Result<RequestBuilder, TransportError> {
    match body {
        RequestBody::Empty => Ok(builder),
        RequestBody::Json(value) => {
            let bytes = serde_json::to_vec(value)
                .map_err(|err| TransportError::InvalidRequest(format!("json body: {err}")))?;
            Ok(with_default_content_type(builder, request, "application/json").body(bytes))
        }
        RequestBody::Form(fields) => {
            let mut encoded = form_urlencoded::Serializer::new(String::new());
            for (name, value) in fields {
                encoded.append_pair(name, value);
            }
            Ok(with_default_content_type(builder, request, "application/x-www-form-urlencoded")
                .body(encoded.finish()))
        }
        RequestBody::Multipart {
            fields,
            files,
        } => {
            let mut form = Form::new();
            for (name, value) in fields {
                form = form.text(name.clone(), value.clone());
            }
            for file in files {
                let part = Part::bytes(file.bytes.clone())
                    .file_name(file.file_name.clone())
                    .mime_str(&file.content_type)
                    .map_err(|err| {
                        TransportError::InvalidRequest(format!(
                            "multipart part {}: {err}",
                            file.field
                        ))
                    })?;
                form = form.part(file.field.clone(), part);
            }
            Ok(builder.multipart(form))
        }
    }
}

/// Adds a content type unless the caller already set one.
fn with_default_content_type(
    builder: RequestBuilder,
    request: &RequestSpec,
    content_type: &str,
) -> RequestBuilder {
    if request.header_value("content-type").is_some() {
        builder
    } else {
        builder.header("content-type", content_type)
    }
}

/// Classifies a reqwest failure into a transport error.
fn classify(err: &reqwest::Error, request: &RequestSpec) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout {
            after_ms: duration_ms(request.timeout),
        }
    } else if err.is_connect() {
        TransportError::Connect(err.to_string())
    } else if err.is_builder() {
        TransportError::InvalidRequest(err.to_string())
    } else {
        TransportError::Exchange(err.to_string())
    }
}

/// Reasons a body read can fail.
enum ReadFailure {
    /// Body exceeded the configured limit.
    TooLarge,
    /// Body ended before the advertised length.
    Truncated,
    /// Read error from the client.
    Io(reqwest::Error),
}

/// Reads the response body while enforcing a byte limit.
fn read_response_limited(
    response: &mut reqwest::blocking::Response,
    max_bytes: usize,
) -> Result<Vec<u8>, ReadFailure> {
    let expected_len = response.content_length();
    let max_bytes_u64 = u64::try_from(max_bytes).unwrap_or(u64::MAX);
    if let Some(expected) = expected_len
        && expected > max_bytes_u64
    {
        return Err(ReadFailure::TooLarge);
    }
    let mut buf = Vec::new();
    let mut handle = response.take(max_bytes_u64.saturating_add(1));
    if let Err(err) = handle.read_to_end(&mut buf) {
        return Err(into_read_failure(err));
    }
    if buf.len() > max_bytes {
        return Err(ReadFailure::TooLarge);
    }
    if let Some(expected) = expected_len
        && u64::try_from(buf.len()).unwrap_or(u64::MAX) < expected
    {
        return Err(ReadFailure::Truncated);
    }
    Ok(buf)
}

/// Recovers the client error wrapped in an I/O error when present.
fn into_read_failure(err: std::io::Error) -> ReadFailure {
    match err.into_inner().map(|inner| inner.downcast::<reqwest::Error>()) {
        Some(Ok(source)) => ReadFailure::Io(*source),
        _ => ReadFailure::Truncated,
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
