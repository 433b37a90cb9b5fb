// system-tests/src/lib.rs
// ============================================================================
// Module: Contract Gate System Tests Library
// Description: Shared configuration for system test scenarios.
// Purpose: Provide common utilities for Contract Gate system-test binaries.
// Dependencies: std
// ============================================================================

//! ## Overview
//! This crate hosts shared configuration used by the Contract Gate
//! system-test binaries in `system-tests/tests`. The stub storefront lives
//! with the test helpers.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
