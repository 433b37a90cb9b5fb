// crates/contract-gate-cli/src/lib.rs
// ============================================================================
// Module: Contract Gate CLI Library
// Description: Storefront catalog, scenarios, and run plumbing for the binary.
// Purpose: Keep the suite testable without spawning the executable.
// Dependencies: contract-gate-config, contract-gate-core, contract-gate-http
// ============================================================================

//! ## Overview
//! The `contract-gate` binary is a thin clap layer over this library. The
//! storefront endpoint catalog and scenario suite live here, along with
//! login, artifact writing, and logging setup.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod artifacts;
pub mod catalog;
pub mod error;
pub mod idempotence;
pub mod logging;
pub mod login;
pub mod scenarios;
pub mod suite;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use catalog::Catalog;
pub use error::CliError;
pub use error::CliResult;
pub use suite::RunOptions;
pub use suite::SuiteRun;
pub use suite::run_suite;
