// crates/contract-gate-http/src/lib.rs
// ============================================================================
// Module: Contract Gate HTTP
// Description: Blocking HTTP transport for the contract gate runtime.
// Purpose: Bind the core transport seam to a real HTTP client.
// Dependencies: contract-gate-core, reqwest, url
// ============================================================================

//! ## Overview
//! Provides [`HttpTransport`], the production implementation of
//! [`contract_gate_core::Transport`]. Redirects are never followed, every
//! request carries its own timeout, and response bodies are read under a hard
//! size limit.

pub mod transport;

pub use transport::DEFAULT_MAX_RESPONSE_BYTES;
pub use transport::DEFAULT_USER_AGENT;
pub use transport::HttpTransport;
pub use transport::HttpTransportConfig;
