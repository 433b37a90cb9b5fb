// crates/contract-gate-cli/src/error.rs
// ============================================================================
// Module: CLI Errors
// Description: Failures that stop a run before or after scenarios execute.
// Purpose: Give the binary one error type with operator-readable messages.
// Dependencies: contract-gate-config, contract-gate-core, thiserror
// ============================================================================

//! ## Overview
//! Scenario failures are data in the report. [`CliError`] covers everything
//! else: bad configuration, a failed login, unknown scenario names, and
//! artifact or output I/O.

use std::path::PathBuf;

use contract_gate_config::ConfigError;
use contract_gate_core::TransportError;
use thiserror::Error;

/// Errors raised by the CLI library and binary.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration could not be loaded or validated.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    /// The HTTP transport could not be constructed.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
    /// An endpoint id the catalog does not have.
    #[error("unknown endpoint id: {0}")]
    UnknownEndpoint(String),
    /// A scenario name passed to `--only` does not exist.
    #[error("unknown scenario: {0}")]
    UnknownScenario(String),
    /// Token acquisition through the login endpoint failed.
    #[error("login via {path} failed: {reason}")]
    Login {
        /// Login path that was called.
        path: String,
        /// What went wrong.
        reason: String,
    },
    /// Run artifacts could not be written.
    #[error("artifact {}: {reason}", path.display())]
    Artifact {
        /// Target path.
        path: PathBuf,
        /// What went wrong.
        reason: String,
    },
    /// The tracing subscriber could not be installed.
    #[error("logging init failed: {0}")]
    Logging(String),
    /// A report or catalog could not be rendered as JSON.
    #[error("failed to render output: {0}")]
    Render(String),
    /// Writing to stdout or stderr failed.
    #[error("failed to write {stream}: {source}")]
    Output {
        /// Stream name.
        stream: &'static str,
        /// I/O failure.
        source: std::io::Error,
    },
}

/// Result alias for CLI operations.
pub type CliResult<T> = Result<T, CliError>;
