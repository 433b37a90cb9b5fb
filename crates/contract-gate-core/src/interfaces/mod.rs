// crates/contract-gate-core/src/interfaces/mod.rs
// ============================================================================
// Module: Contract Gate Interfaces
// Description: Backend-agnostic transport interface.
// Purpose: Define the seam between the runtime and any HTTP client.
// Dependencies: crate::core, thiserror
// ============================================================================

//! ## Overview
//! The runtime never talks to the network directly. It issues
//! [`RequestSpec`] values through a [`Transport`] and receives [`Response`]
//! captures back. Implementations must honor the request timeout and must not
//! treat non-2xx statuses as errors.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::core::request::RequestSpec;
use crate::core::request::Response;

// ============================================================================
// SECTION: Transport Errors
// ============================================================================

/// Failures that prevented a response from being captured.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
/// - A received status code, whatever its value, is never an error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Connection refused, reset, or DNS failure.
    #[error("connection failed: {0}")]
    Connect(String),
    /// No complete response before the deadline.
    #[error("request timed out after {after_ms} ms")]
    Timeout {
        /// Timeout that expired, in milliseconds.
        after_ms: u64,
    },
    /// The request could not be built (bad URL, header, or timeout).
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    /// Any other failure while exchanging or reading the response.
    #[error("exchange failed: {0}")]
    Exchange(String),
}

// ============================================================================
// SECTION: Transport
// ============================================================================

/// Sends one request and captures the response.
pub trait Transport: Send + Sync {
    /// Sends the request, waiting at most `request.timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] only when no response could be captured.
    fn send(&self, request: &RequestSpec) -> Result<Response, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn send(&self, request: &RequestSpec) -> Result<Response, TransportError> {
        (**self).send(request)
    }
}

impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    fn send(&self, request: &RequestSpec) -> Result<Response, TransportError> {
        (**self).send(request)
    }
}
