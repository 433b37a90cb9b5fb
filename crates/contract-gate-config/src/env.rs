// crates/contract-gate-config/src/env.rs
// ============================================================================
// Module: Environment Overrides
// Description: Environment-backed overrides for the loaded configuration.
// Purpose: Centralize env parsing with strict UTF-8 validation.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Environment values are parsed with strict UTF-8 enforcement to avoid silent
//! misconfiguration. Invalid UTF-8, empty values, and malformed numbers fail
//! closed. Lookup is injectable so parsing is testable without touching the
//! process environment.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::ffi::OsString;
use std::time::Duration;

use crate::config::ConfigError;

// ============================================================================
// SECTION: Environment Keys
// ============================================================================

/// Environment keys understood by the contract gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContractGateEnv {
    /// Base URL override.
    BaseUrl,
    /// Valid bearer token.
    Token,
    /// Valid token for a principal lacking the required role.
    WrongRoleToken,
    /// Request timeout in seconds (positive integer).
    TimeoutSeconds,
    /// Parallel-lane worker count (positive integer).
    Workers,
}

impl ContractGateEnv {
    /// All keys in lookup order.
    pub const ALL: [Self; 5] =
        [Self::BaseUrl, Self::Token, Self::WrongRoleToken, Self::TimeoutSeconds, Self::Workers];

    /// Returns the canonical environment variable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BaseUrl => "CONTRACT_GATE_BASE_URL",
            Self::Token => "CONTRACT_GATE_TOKEN",
            Self::WrongRoleToken => "CONTRACT_GATE_WRONG_ROLE_TOKEN",
            Self::TimeoutSeconds => "CONTRACT_GATE_TIMEOUT_SEC",
            Self::Workers => "CONTRACT_GATE_WORKERS",
        }
    }
}

// ============================================================================
// SECTION: Overrides
// ============================================================================

/// Typed overrides read from the environment.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct EnvOverrides {
    /// Base URL override.
    pub base_url: Option<String>,
    /// Valid bearer token override.
    pub token: Option<String>,
    /// Wrong-role token override.
    pub wrong_role_token: Option<String>,
    /// Request timeout override.
    pub timeout: Option<Duration>,
    /// Worker count override.
    pub workers: Option<usize>,
}

impl std::fmt::Debug for EnvOverrides {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvOverrides")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("wrong_role_token", &self.wrong_role_token.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .field("workers", &self.workers)
            .finish()
    }
}

impl EnvOverrides {
    /// Reads overrides from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when a value is not valid UTF-8, is
    /// empty, or fails numeric validation.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(std::env::var_os)
    }

    /// Reads overrides through a custom lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] under the same rules as [`EnvOverrides::load`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Option<OsString>,
    {
        let read = |key: ContractGateEnv| read_nonempty(key.as_str(), lookup(key.as_str()));
        let timeout = read(ContractGateEnv::TimeoutSeconds)?
            .map(|raw| parse_positive(ContractGateEnv::TimeoutSeconds.as_str(), &raw))
            .transpose()?
            .map(Duration::from_secs);
        let workers = read(ContractGateEnv::Workers)?
            .map(|raw| parse_positive(ContractGateEnv::Workers.as_str(), &raw))
            .transpose()?
            .map(usize::try_from)
            .transpose()
            .map_err(|_| {
                ConfigError::Invalid(format!("{} is out of range", ContractGateEnv::Workers.as_str()))
            })?;
        Ok(Self {
            base_url: read(ContractGateEnv::BaseUrl)?.map(|raw| raw.trim().to_string()),
            token: read(ContractGateEnv::Token)?,
            wrong_role_token: read(ContractGateEnv::WrongRoleToken)?,
            timeout,
            workers,
        })
    }

    /// Returns true when no override is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.base_url.is_none()
            && self.token.is_none()
            && self.wrong_role_token.is_none()
            && self.timeout.is_none()
            && self.workers.is_none()
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Enforces UTF-8 and rejects empty values.
fn read_nonempty(name: &str, raw: Option<OsString>) -> Result<Option<String>, ConfigError> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let value =
        raw.into_string().map_err(|_| ConfigError::Invalid(format!("{name} must be valid UTF-8")))?;
    if value.trim().is_empty() {
        return Err(ConfigError::Invalid(format!("{name} must not be empty")));
    }
    Ok(Some(value))
}

/// Parses a positive integer.
fn parse_positive(name: &str, raw: &str) -> Result<u64, ConfigError> {
    let value: u64 = raw
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid(format!("{name} must be a positive integer")))?;
    if value == 0 {
        return Err(ConfigError::Invalid(format!("{name} must be greater than zero")));
    }
    Ok(value)
}
