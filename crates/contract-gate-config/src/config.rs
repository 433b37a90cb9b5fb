// crates/contract-gate-config/src/config.rs
// ============================================================================
// Module: Contract Gate Configuration
// Description: Configuration loading and validation for contract runs.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: contract-gate-core, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! Invalid configuration fails closed; nothing is clamped silently.
//!
//! Resolution order for the file: explicit path, then `CONTRACT_GATE_CONFIG`,
//! then `./contract-gate.toml`. Only the implicit default may be absent, in
//! which case built-in defaults apply.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use contract_gate_core::AuthRequirement;
use contract_gate_core::Credentials;
use contract_gate_core::DEFAULT_INVALID_TOKEN;
use contract_gate_core::DEFAULT_WORKERS;
use contract_gate_core::EndpointSpec;
use contract_gate_core::MAX_PROBE_ATTEMPTS;
use contract_gate_core::ProbeConfig;
use contract_gate_core::RateLimitBudget;
use contract_gate_core::StatusSet;
use serde::Deserialize;
use thiserror::Error;

use crate::env::EnvOverrides;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
pub const DEFAULT_CONFIG_NAME: &str = "contract-gate.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "CONTRACT_GATE_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Default base URL of the system under test.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
/// Default per-request timeout in milliseconds.
pub(crate) const DEFAULT_TIMEOUT_MS: u64 = 30_000;
/// Maximum per-request timeout in milliseconds.
pub(crate) const MAX_TIMEOUT_MS: u64 = 300_000;
/// Default response body cap.
pub(crate) const DEFAULT_MAX_RESPONSE_BYTES: usize = 4 * 1024 * 1024;
/// Maximum response body cap.
pub(crate) const MAX_RESPONSE_BYTES_LIMIT: usize = 64 * 1024 * 1024;
/// Maximum number of scheduler workers.
pub(crate) const MAX_WORKERS: usize = 64;
/// Maximum length of a configured token.
pub(crate) const MAX_TOKEN_LENGTH: usize = 4096;
/// Maximum number of endpoint overrides.
pub(crate) const MAX_ENDPOINT_OVERRIDES: usize = 256;
/// Maximum configured pause between probe requests.
pub(crate) const MAX_PROBE_SPACING_MS: u64 = 10_000;
/// Default report directory.
pub(crate) const DEFAULT_OUTPUT_DIR: &str = "contract-gate-report";
/// Default login path.
pub(crate) const DEFAULT_LOGIN_PATH: &str = "/api/login";

// ============================================================================
// SECTION: Root Config
// ============================================================================

/// Root configuration for a contract run.
///
/// # Invariants
/// - `validate` has succeeded for any value returned by [`ContractGateConfig::load`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContractGateConfig {
    /// System under test.
    #[serde(default)]
    pub target: TargetConfig,
    /// Credentials and optional login.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Scheduler and prober tuning.
    #[serde(default)]
    pub runner: RunnerConfig,
    /// Artifact output.
    #[serde(default)]
    pub report: ReportConfig,
    /// Per-endpoint overrides applied on top of the built-in catalog.
    #[serde(default)]
    pub endpoints: Vec<EndpointOverride>,
    /// File the configuration was read from, when one existed.
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

impl ContractGateConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (resolved, explicit) = resolve_path(path)?;
        validate_path(&resolved)?;
        if !explicit && !resolved.exists() {
            return Ok(Self::default());
        }
        let bytes = fs::read(&resolved)
            .map_err(|err| ConfigError::Io(format!("{}: {err}", resolved.display())))?;
        let mut config = Self::parse_bytes(&bytes)?;
        config.source = Some(resolved);
        Ok(config)
    }

    /// Parses and validates configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn parse_str(content: &str) -> Result<Self, ConfigError> {
        Self::parse_bytes(content.as_bytes())
    }

    /// Parses raw bytes under the size and encoding limits.
    fn parse_bytes(bytes: &[u8]) -> Result<Self, ConfigError> {
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Applies environment overrides and re-validates.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the overridden configuration is invalid.
    pub fn apply_env(&mut self, overrides: &EnvOverrides) -> Result<(), ConfigError> {
        if let Some(base_url) = &overrides.base_url {
            self.target.base_url.clone_from(base_url);
        }
        if let Some(token) = &overrides.token {
            self.auth.valid_token = Some(token.clone());
        }
        if let Some(token) = &overrides.wrong_role_token {
            self.auth.wrong_role_token = Some(token.clone());
        }
        if let Some(timeout) = overrides.timeout {
            self.target.timeout_ms = u64::try_from(timeout.as_millis())
                .map_err(|_| ConfigError::Invalid("timeout override out of range".to_string()))?;
        }
        if let Some(workers) = overrides.workers {
            self.runner.workers = workers;
        }
        self.validate()
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.target.validate()?;
        self.auth.validate()?;
        self.runner.validate()?;
        self.report.validate()?;
        if self.endpoints.len() > MAX_ENDPOINT_OVERRIDES {
            return Err(ConfigError::Invalid("too many endpoint overrides".to_string()));
        }
        let mut seen = BTreeSet::new();
        for entry in &self.endpoints {
            entry.validate()?;
            if !seen.insert(entry.id.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "endpoints.{} is declared more than once",
                    entry.id
                )));
            }
        }
        Ok(())
    }

    /// Credentials for protected endpoints and the auth matrix.
    #[must_use]
    pub fn credentials(&self) -> Credentials {
        Credentials {
            valid_token: self.auth.valid_token.clone(),
            wrong_role_token: self.auth.wrong_role_token.clone(),
            invalid_token: self.auth.invalid_token.clone(),
        }
    }

    /// Default per-request timeout.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.target.timeout_ms)
    }

    /// Prober tuning derived from `[runner]`.
    #[must_use]
    pub fn probe_config(&self) -> ProbeConfig {
        ProbeConfig {
            spacing: Duration::from_millis(self.runner.probe_spacing_ms),
            max_attempts: self.runner.max_probe_attempts,
            confirm_delay: self.runner.confirm_delay_ms.map(Duration::from_millis),
        }
    }

    /// Run deadline, when configured.
    #[must_use]
    pub fn deadline(&self) -> Option<Duration> {
        self.runner.deadline_ms.map(Duration::from_millis)
    }

    /// Returns the override for an endpoint id, if any.
    #[must_use]
    pub fn override_for(&self, id: &str) -> Option<&EndpointOverride> {
        self.endpoints.iter().find(|entry| entry.id == id)
    }
}

// ============================================================================
// SECTION: Target
// ============================================================================

/// System under test.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TargetConfig {
    /// Base URL, for example `http://localhost:8000`.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Response body cap in bytes.
    #[serde(default = "default_max_response_bytes")]
    pub max_response_bytes: usize,
    /// Optional `User-Agent` override.
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_ms: default_timeout_ms(),
            max_response_bytes: default_max_response_bytes(),
            user_agent: None,
        }
    }
}

impl TargetConfig {
    /// Validates target settings.
    fn validate(&self) -> Result<(), ConfigError> {
        let trimmed = self.base_url.trim();
        if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
            return Err(ConfigError::Invalid(
                "target.base_url must include http:// or https://".to_string(),
            ));
        }
        if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("target.base_url exceeds max length".to_string()));
        }
        if self.timeout_ms == 0 || self.timeout_ms > MAX_TIMEOUT_MS {
            return Err(ConfigError::Invalid(format!(
                "target.timeout_ms must be between 1 and {MAX_TIMEOUT_MS}"
            )));
        }
        if self.max_response_bytes == 0 || self.max_response_bytes > MAX_RESPONSE_BYTES_LIMIT {
            return Err(ConfigError::Invalid(format!(
                "target.max_response_bytes must be between 1 and {MAX_RESPONSE_BYTES_LIMIT}"
            )));
        }
        if let Some(agent) = &self.user_agent
            && (agent.trim().is_empty() || agent.chars().any(char::is_control))
        {
            return Err(ConfigError::Invalid(
                "target.user_agent must be non-empty printable text".to_string(),
            ));
        }
        Ok(())
    }
}

/// Default base URL.
fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

/// Default request timeout.
const fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

/// Default response cap.
const fn default_max_response_bytes() -> usize {
    DEFAULT_MAX_RESPONSE_BYTES
}

// ============================================================================
// SECTION: Auth
// ============================================================================

/// Credentials used by protected scenarios and the auth matrix.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthConfig {
    /// Token for the correct-role cell and protected calls.
    #[serde(default)]
    pub valid_token: Option<String>,
    /// Valid token for a principal without the required role.
    #[serde(default)]
    pub wrong_role_token: Option<String>,
    /// Token expected to be rejected.
    #[serde(default = "default_invalid_token")]
    pub invalid_token: String,
    /// Login used to obtain `valid_token` when it is not set.
    #[serde(default)]
    pub login: Option<LoginConfig>,
    /// Login used to obtain `wrong_role_token` when it is not set.
    #[serde(default)]
    pub wrong_role_login: Option<LoginConfig>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            valid_token: None,
            wrong_role_token: None,
            invalid_token: default_invalid_token(),
            login: None,
            wrong_role_login: None,
        }
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("valid_token", &self.valid_token.as_ref().map(|_| "<redacted>"))
            .field("wrong_role_token", &self.wrong_role_token.as_ref().map(|_| "<redacted>"))
            .field("invalid_token", &"<redacted>")
            .field("login", &self.login)
            .field("wrong_role_login", &self.wrong_role_login)
            .finish()
    }
}

impl AuthConfig {
    /// Validates token shapes and login blocks.
    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(token) = &self.valid_token {
            validate_token("auth.valid_token", token)?;
        }
        if let Some(token) = &self.wrong_role_token {
            validate_token("auth.wrong_role_token", token)?;
        }
        validate_token("auth.invalid_token", &self.invalid_token)?;
        if let Some(login) = &self.login {
            login.validate("auth.login")?;
        }
        if let Some(login) = &self.wrong_role_login {
            login.validate("auth.wrong_role_login")?;
        }
        Ok(())
    }
}

/// Default invalid token.
fn default_invalid_token() -> String {
    DEFAULT_INVALID_TOKEN.to_string()
}

/// Login request used to obtain a bearer token.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginConfig {
    /// Login path relative to the base URL.
    #[serde(default = "default_login_path")]
    pub path: String,
    /// Account email.
    pub email: String,
    /// Account password.
    pub password: String,
}

impl std::fmt::Debug for LoginConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginConfig")
            .field("path", &self.path)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl LoginConfig {
    /// Validates a login block.
    fn validate(&self, field: &str) -> Result<(), ConfigError> {
        if !self.path.starts_with('/') {
            return Err(ConfigError::Invalid(format!("{field}.path must start with /")));
        }
        if self.email.trim().is_empty() {
            return Err(ConfigError::Invalid(format!("{field}.email must be non-empty")));
        }
        if self.password.is_empty() {
            return Err(ConfigError::Invalid(format!("{field}.password must be non-empty")));
        }
        Ok(())
    }
}

/// Default login path.
fn default_login_path() -> String {
    DEFAULT_LOGIN_PATH.to_string()
}

// ============================================================================
// SECTION: Runner
// ============================================================================

/// Scheduler and prober tuning.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunnerConfig {
    /// Parallel-lane worker count.
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// Overall run deadline in milliseconds.
    #[serde(default)]
    pub deadline_ms: Option<u64>,
    /// Pause between probe requests in milliseconds.
    #[serde(default)]
    pub probe_spacing_ms: u64,
    /// Probe attempt cap, never above the hard cap.
    #[serde(default = "default_max_probe_attempts")]
    pub max_probe_attempts: usize,
    /// Delay before the confirmation request of an unthrottled burst.
    #[serde(default)]
    pub confirm_delay_ms: Option<u64>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            deadline_ms: None,
            probe_spacing_ms: 0,
            max_probe_attempts: default_max_probe_attempts(),
            confirm_delay_ms: None,
        }
    }
}

impl RunnerConfig {
    /// Validates runner limits.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.workers == 0 || self.workers > MAX_WORKERS {
            return Err(ConfigError::Invalid(format!(
                "runner.workers must be between 1 and {MAX_WORKERS}"
            )));
        }
        if self.deadline_ms == Some(0) {
            return Err(ConfigError::Invalid("runner.deadline_ms must be greater than zero".to_string()));
        }
        if self.probe_spacing_ms > MAX_PROBE_SPACING_MS {
            return Err(ConfigError::Invalid(format!(
                "runner.probe_spacing_ms must be at most {MAX_PROBE_SPACING_MS}"
            )));
        }
        if self.max_probe_attempts == 0 || self.max_probe_attempts > MAX_PROBE_ATTEMPTS {
            return Err(ConfigError::Invalid(format!(
                "runner.max_probe_attempts must be between 1 and {MAX_PROBE_ATTEMPTS}"
            )));
        }
        if let Some(delay) = self.confirm_delay_ms
            && delay > MAX_TIMEOUT_MS
        {
            return Err(ConfigError::Invalid(format!(
                "runner.confirm_delay_ms must be at most {MAX_TIMEOUT_MS}"
            )));
        }
        Ok(())
    }
}

/// Default worker count.
const fn default_workers() -> usize {
    DEFAULT_WORKERS
}

/// Default attempt cap.
const fn default_max_probe_attempts() -> usize {
    MAX_PROBE_ATTEMPTS
}

// ============================================================================
// SECTION: Report
// ============================================================================

/// Artifact output settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReportConfig {
    /// Directory receiving `summary.json` and `summary.md`.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
        }
    }
}

impl ReportConfig {
    /// Validates the output path.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_path_string("report.output_dir", &self.output_dir.to_string_lossy())
    }
}

/// Default artifact directory.
fn default_output_dir() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_DIR)
}

// ============================================================================
// SECTION: Endpoint Overrides
// ============================================================================

/// Per-endpoint override applied to a catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EndpointOverride {
    /// Catalog id, for example `products.list`.
    pub id: String,
    /// Replacement request budget.
    #[serde(default)]
    pub rate_limit: Option<RateLimitBudget>,
    /// Replacement auth requirement.
    #[serde(default)]
    pub auth: Option<AuthRequirement>,
    /// Replacement success statuses.
    #[serde(default)]
    pub success: Option<Vec<u16>>,
    /// Replacement latency budget in milliseconds.
    #[serde(default)]
    pub latency_budget_ms: Option<u64>,
}

impl EndpointOverride {
    /// Validates override values.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.id.trim().is_empty() {
            return Err(ConfigError::Invalid("endpoints.id must be non-empty".to_string()));
        }
        if let Some(budget) = &self.rate_limit
            && (budget.requests == 0 || budget.window_ms == 0)
        {
            return Err(ConfigError::Invalid(format!(
                "endpoints.{}.rate_limit must have positive requests and window_ms",
                self.id
            )));
        }
        if let Some(AuthRequirement::Role(role)) = &self.auth
            && role.trim().is_empty()
        {
            return Err(ConfigError::Invalid(format!(
                "endpoints.{}.auth role must be non-empty",
                self.id
            )));
        }
        if let Some(codes) = &self.success {
            if codes.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "endpoints.{}.success must be non-empty",
                    self.id
                )));
            }
            if let Some(code) = codes.iter().find(|code| !(100 ..= 599).contains(*code)) {
                return Err(ConfigError::Invalid(format!(
                    "endpoints.{}.success contains invalid status {code}",
                    self.id
                )));
            }
        }
        if self.latency_budget_ms == Some(0) {
            return Err(ConfigError::Invalid(format!(
                "endpoints.{}.latency_budget_ms must be greater than zero",
                self.id
            )));
        }
        Ok(())
    }

    /// Applies the override to a catalog entry.
    #[must_use]
    pub fn apply(&self, mut endpoint: EndpointSpec) -> EndpointSpec {
        if let Some(budget) = self.rate_limit {
            endpoint.rate_limit = Some(budget);
        }
        if let Some(auth) = &self.auth {
            endpoint.auth = auth.clone();
        }
        if let Some(codes) = &self.success {
            endpoint.success = StatusSet::of(codes);
        }
        if let Some(millis) = self.latency_budget_ms {
            endpoint.latency_budget_ms = Some(millis);
        }
        endpoint
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path; the flag is false only for the implicit default.
fn resolve_path(path: Option<&Path>) -> Result<(PathBuf, bool), ConfigError> {
    if let Some(path) = path {
        return Ok((path.to_path_buf(), true));
    }
    if let Some(raw) = env::var_os(CONFIG_ENV_VAR) {
        let env_path = raw
            .into_string()
            .map_err(|_| ConfigError::Invalid(format!("{CONFIG_ENV_VAR} must be valid UTF-8")))?;
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok((PathBuf::from(env_path), true));
    }
    Ok((PathBuf::from(DEFAULT_CONFIG_NAME), false))
}

/// Validates the resolved path against length limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a configured path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in Path::new(trimmed).components() {
        if component.as_os_str().len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

/// Validates that a token is usable as a bearer credential.
fn validate_token(field: &str, token: &str) -> Result<(), ConfigError> {
    if token.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if token.len() > MAX_TOKEN_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    if token.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(ConfigError::Invalid(format!(
            "{field} must not contain whitespace or control characters"
        )));
    }
    Ok(())
}

// ============================================================================
// SECTION: Tests
// ============================================================================
