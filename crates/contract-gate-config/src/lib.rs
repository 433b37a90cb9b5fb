// crates/contract-gate-config/src/lib.rs
// ============================================================================
// Module: Contract Gate Config Library
// Description: Config model, validation, environment overrides, and examples.
// Purpose: Single source of truth for contract-gate.toml semantics.
// Dependencies: contract-gate-core, serde, toml
// ============================================================================

//! ## Overview
//! `contract-gate-config` defines the configuration model for contract runs.
//! It provides strict, fail-closed validation, environment overrides parsed
//! with strict UTF-8 rules, and a canonical example file.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod env;
pub mod examples;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
pub use env::ContractGateEnv;
pub use env::EnvOverrides;
pub use examples::config_toml_example;
