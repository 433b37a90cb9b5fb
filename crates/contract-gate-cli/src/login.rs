// crates/contract-gate-cli/src/login.rs
// ============================================================================
// Module: Token Acquisition
// Description: Obtains bearer tokens from the storefront login endpoint.
// Purpose: Fill credentials that the configuration does not provide directly.
// Dependencies: contract-gate-config, contract-gate-core, serde_json, tracing
// ============================================================================

//! ## Overview
//! A configured token always wins. When a token is absent and a login block
//! is configured, the CLI posts `{email, password}` as JSON and reads the
//! token from the `token` or `access_token` field of the reply.
//! Tokens are never logged.

use std::time::Duration;

use contract_gate_config::ContractGateConfig;
use contract_gate_config::LoginConfig;
use contract_gate_core::Credentials;
use contract_gate_core::HttpMethod;
use contract_gate_core::RequestSpec;
use contract_gate_core::Transport;
use serde_json::Value;
use serde_json::json;
use tracing::info;

use crate::error::CliError;
use crate::error::CliResult;

/// Reply fields that may carry the bearer token, in lookup order.
pub const TOKEN_FIELDS: [&str; 2] = ["token", "access_token"];

/// Reads a bearer token from a login reply.
///
/// Looks at the top level first, then inside a `data` envelope.
#[must_use]
pub fn extract_token(body: &Value) -> Option<String> {
    let from = |object: &Value| {
        TOKEN_FIELDS.iter().find_map(|field| match object.get(field) {
            Some(Value::String(token)) if !token.trim().is_empty() => Some(token.clone()),
            _ => None,
        })
    };
    from(body).or_else(|| body.get("data").and_then(from))
}

/// Posts credentials to the login endpoint and returns the bearer token.
///
/// # Errors
///
/// Returns [`CliError::Login`] when the request fails, the status is not
/// `200`, or the reply carries no token.
pub fn acquire_token(
    transport: &dyn Transport,
    base_url: &str,
    login: &LoginConfig,
    timeout: Duration,
) -> CliResult<String> {
    let failed = |reason: String| CliError::Login {
        path: login.path.clone(),
        reason,
    };
    let url = format!("{}{}", base_url.trim_end_matches('/'), login.path);
    let request = RequestSpec::new(HttpMethod::Post, url)
        .json(json!({"email": login.email, "password": login.password}))
        .header("accept", "application/json")
        .timeout(timeout);
    let response = transport.send(&request).map_err(|err| failed(err.to_string()))?;
    if response.status != 200 {
        return Err(failed(format!("status {}", response.status)));
    }
    let body = response.json().map_err(|err| failed(format!("reply is not JSON ({err})")))?;
    let token = extract_token(&body)
        .ok_or_else(|| failed("reply has no token or access_token field".to_string()))?;
    info!(path = %login.path, "login succeeded");
    Ok(token)
}

/// Builds run credentials from configuration, logging in where needed.
///
/// # Errors
///
/// Returns [`CliError::Login`] when a configured login fails.
pub fn resolve_credentials(
    config: &ContractGateConfig,
    transport: &dyn Transport,
) -> CliResult<Credentials> {
    let mut credentials = config.credentials();
    let base_url = config.target.base_url.as_str();
    let timeout = config.request_timeout();
    if credentials.valid_token.is_none()
        && let Some(login) = &config.auth.login
    {
        credentials.valid_token = Some(acquire_token(transport, base_url, login, timeout)?);
    }
    if credentials.wrong_role_token.is_none()
        && let Some(login) = &config.auth.wrong_role_login
    {
        credentials.wrong_role_token = Some(acquire_token(transport, base_url, login, timeout)?);
    }
    Ok(credentials)
}

// ============================================================================
// SECTION: Tests
// ============================================================================
