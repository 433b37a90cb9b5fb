// system-tests/tests/helpers/mod.rs
// ============================================================================
// Module: System Test Helpers
// Description: Shared helpers for Contract Gate system-tests.
// Purpose: Provide the stub storefront, CLI resolution, and artifact utilities.
// Dependencies: system-tests, axum, tokio, serde_json
// ============================================================================

//! ## Overview
//! Shared helpers for Contract Gate system-tests.
//! Invariants:
//! - Every stub storefront is private to one test.
//! - Runs against a live storefront only happen when its URL is configured.

#![allow(dead_code, reason = "Shared helpers are reused across multiple test suites.")]

pub mod artifacts;
pub mod cli;
pub mod storefront_stub;
