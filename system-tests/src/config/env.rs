// system-tests/src/config/env.rs
// ============================================================================
// Module: System Test Environment
// Description: Environment-backed configuration for system tests.
// Purpose: Centralize env parsing with strict UTF-8 validation.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Environment values are parsed with strict UTF-8 enforcement to avoid silent
//! misconfiguration. Invalid UTF-8 fails closed. [`SystemTestConfig::from_lookup`]
//! takes any lookup function so parsing is testable without touching the
//! process environment.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;
use std::time::Duration;

// ============================================================================
// SECTION: Environment Constants
// ============================================================================

/// Environment keys for system test configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemTestEnv {
    /// Optional run root override for artifacts.
    RunRoot,
    /// Base URL of a live storefront; live tests are skipped without it.
    LiveTarget,
    /// Bearer token for the live storefront.
    LiveToken,
    /// Bearer token of a non-admin account on the live storefront.
    LiveWrongRoleToken,
    /// Optional timeout override in seconds (positive integer).
    TimeoutSeconds,
    /// Run the rate-limit lane against the live storefront (`true`/`false` or `1`/`0`).
    LiveRateLimits,
}

impl SystemTestEnv {
    /// Returns the canonical environment variable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RunRoot => "CONTRACT_GATE_SYSTEM_TEST_RUN_ROOT",
            Self::LiveTarget => "CONTRACT_GATE_SYSTEM_TEST_TARGET",
            Self::LiveToken => "CONTRACT_GATE_SYSTEM_TEST_TOKEN",
            Self::LiveWrongRoleToken => "CONTRACT_GATE_SYSTEM_TEST_WRONG_ROLE_TOKEN",
            Self::TimeoutSeconds => "CONTRACT_GATE_SYSTEM_TEST_TIMEOUT_SEC",
            Self::LiveRateLimits => "CONTRACT_GATE_SYSTEM_TEST_RATE_LIMITS",
        }
    }
}

// ============================================================================
// SECTION: Config Types
// ============================================================================

/// Typed system test configuration derived from environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SystemTestConfig {
    /// Optional run root override.
    pub run_root: Option<PathBuf>,
    /// Live storefront base URL.
    pub live_target: Option<String>,
    /// Live storefront bearer token.
    pub live_token: Option<String>,
    /// Live storefront non-admin token.
    pub live_wrong_role_token: Option<String>,
    /// Optional timeout override in seconds (positive integer).
    pub timeout: Option<Duration>,
    /// Whether live runs include the rate-limit lane.
    pub live_rate_limits: bool,
}

impl SystemTestConfig {
    /// Loads configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error when an environment value is not valid UTF-8, is empty,
    /// or fails validation (for example, an invalid timeout or boolean value).
    pub fn load() -> Result<Self, String> {
        Self::from_lookup(read_env_strict)
    }

    /// Loads configuration through `lookup`, which returns the raw value of a
    /// variable or `None` when unset.
    ///
    /// # Errors
    ///
    /// Returns an error when a value is empty or fails validation.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Result<Option<String>, String>,
    {
        let read = |key: SystemTestEnv| nonempty(key.as_str(), lookup(key.as_str())?);
        let timeout = read(SystemTestEnv::TimeoutSeconds)?
            .map(|value| parse_timeout_seconds(SystemTestEnv::TimeoutSeconds.as_str(), &value))
            .transpose()?;
        let live_rate_limits =
            parse_bool_env(SystemTestEnv::LiveRateLimits.as_str(), read(SystemTestEnv::LiveRateLimits)?)?;
        Ok(Self {
            run_root: read(SystemTestEnv::RunRoot)?.map(PathBuf::from),
            live_target: read(SystemTestEnv::LiveTarget)?,
            live_token: read(SystemTestEnv::LiveToken)?,
            live_wrong_role_token: read(SystemTestEnv::LiveWrongRoleToken)?,
            timeout,
            live_rate_limits,
        })
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reads an environment variable and enforces UTF-8 validity.
///
/// # Errors
///
/// Returns an error when the environment variable contains invalid UTF-8.
pub fn read_env_strict(name: &str) -> Result<Option<String>, String> {
    std::env::var_os(name).map_or(Ok(None), |raw| {
        raw.into_string().map(Some).map_err(|_| format!("{name} must be valid UTF-8"))
    })
}

/// Rejects set-but-empty values.
///
/// # Errors
///
/// Returns an error when the variable is set but empty or whitespace.
fn nonempty(name: &str, value: Option<String>) -> Result<Option<String>, String> {
    match value {
        Some(value) if value.trim().is_empty() => Err(format!("{name} must not be empty")),
        other => Ok(other),
    }
}

/// Parses a positive timeout value from an environment variable string.
///
/// # Errors
///
/// Returns an error when the value is non-numeric or zero.
fn parse_timeout_seconds(name: &str, raw: &str) -> Result<Duration, String> {
    let secs: u64 = raw
        .trim()
        .parse()
        .map_err(|_| format!("{name} must be a positive integer number of seconds"))?;
    if secs == 0 {
        return Err(format!("{name} must be greater than zero"));
    }
    Ok(Duration::from_secs(secs))
}

/// Parses a boolean environment variable; unset means `false`.
///
/// # Errors
///
/// Returns an error when the value is not a recognized boolean literal.
fn parse_bool_env(name: &str, raw: Option<String>) -> Result<bool, String> {
    let Some(value) = raw else {
        return Ok(false);
    };
    let trimmed = value.trim();
    if trimmed.eq_ignore_ascii_case("true") || trimmed == "1" {
        return Ok(true);
    }
    if trimmed.eq_ignore_ascii_case("false") || trimmed == "0" {
        return Ok(false);
    }
    Err(format!("{name} must be 1, 0, true, or false"))
}
