// crates/contract-gate-core/src/lib.rs
// ============================================================================
// Module: Contract Gate Core
// Description: Black-box REST contract verification engine.
// Purpose: Model endpoint contracts and run scenarios against them.
// Dependencies: serde, serde_json, thiserror, tracing
// ============================================================================

//! ## Overview
//! Contract Gate verifies a running HTTP service from the outside. Endpoint
//! contracts declare status sets, response shapes, latency budgets, rate-limit
//! budgets, and authentication requirements. Scenarios exercise those
//! endpoints through a [`Transport`] and record every failure with concrete
//! expected and actual values.
//! Invariants:
//! - Schema evaluation is pure; only [`Transport`] implementations touch the network.
//! - Every request carries a finite timeout.
//! - Fixtures acquired in setup are released in teardown on every exit path.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use crate::core::*;
pub use interfaces::Transport;
pub use interfaces::TransportError;
pub use runtime::*;
