// crates/contract-gate-cli/src/logging.rs
// ============================================================================
// Module: CLI Logging
// Description: tracing subscriber setup for the contract-gate binary.
// Purpose: Route runtime diagnostics to stderr at an operator-chosen level.
// Dependencies: tracing-subscriber
// ============================================================================

//! ## Overview
//! The filter comes from `--log-level`, else `CONTRACT_GATE_LOG`, else
//! `warn`. Logs go to stderr so stdout stays clean for reports.

use tracing_subscriber::EnvFilter;

use crate::error::CliError;
use crate::error::CliResult;

/// Environment variable holding the default log filter.
pub const LOG_ENV: &str = "CONTRACT_GATE_LOG";

/// Filter used when neither the flag nor the environment sets one.
pub const DEFAULT_FILTER: &str = "warn";

/// Picks the filter directive: flag, then environment, then the default.
#[must_use]
pub fn resolve_filter(flag: Option<&str>, env: Option<String>) -> String {
    [flag.map(str::to_string), env]
        .into_iter()
        .flatten()
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
        .unwrap_or_else(|| DEFAULT_FILTER.to_string())
}

/// Installs the global subscriber.
///
/// # Errors
///
/// Returns [`CliError::Logging`] when the directive does not parse or a
/// subscriber is already installed.
pub fn init(flag: Option<&str>) -> CliResult<()> {
    let directive = resolve_filter(flag, std::env::var(LOG_ENV).ok());
    let filter = EnvFilter::try_new(&directive).map_err(|err| CliError::Logging(format!("{directive}: {err}")))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_ansi(false)
        .try_init()
        .map_err(|err| CliError::Logging(err.to_string()))
}
