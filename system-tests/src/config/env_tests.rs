// system-tests/src/config/env_tests.rs
// ============================================================================
// Module: System Test Env Unit Tests
// Description: Unit coverage for strict environment parsing in system-tests.
// Purpose: Ensure configuration parsing fails closed on invalid inputs.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Parsing runs through [`SystemTestConfig::from_lookup`] with a map standing
//! in for the process environment, so no test mutates global state.

#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    reason = "Test-only assertions favor direct unwrap/expect for clarity."
)]

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use super::SystemTestConfig;
use super::SystemTestEnv;

fn load(pairs: &[(SystemTestEnv, &str)]) -> Result<SystemTestConfig, String> {
    let env: HashMap<&'static str, String> =
        pairs.iter().map(|(key, value)| (key.as_str(), (*value).to_string())).collect();
    SystemTestConfig::from_lookup(|name| Ok(env.get(name).cloned()))
}

#[test]
fn unset_environment_yields_defaults() {
    assert_eq!(load(&[]).unwrap(), SystemTestConfig::default());
}

#[test]
fn timeout_rejects_invalid_values() {
    assert!(load(&[(SystemTestEnv::TimeoutSeconds, "0")]).is_err());
    assert!(load(&[(SystemTestEnv::TimeoutSeconds, "not-a-number")]).is_err());
    assert!(load(&[(SystemTestEnv::TimeoutSeconds, "   ")]).is_err());
}

#[test]
fn timeout_accepts_positive_values() {
    let config = load(&[(SystemTestEnv::TimeoutSeconds, "5")]).expect("config should load");
    assert_eq!(config.timeout, Some(Duration::from_secs(5)));
}

#[test]
fn rate_limit_flag_parses_bool_values() {
    assert!(load(&[(SystemTestEnv::LiveRateLimits, "1")]).unwrap().live_rate_limits);
    assert!(!load(&[(SystemTestEnv::LiveRateLimits, "false")]).unwrap().live_rate_limits);
    assert!(load(&[(SystemTestEnv::LiveRateLimits, "maybe")]).is_err());
}

#[test]
fn live_target_fields_are_read() {
    let config = load(&[
        (SystemTestEnv::LiveTarget, "https://shop.example.com"),
        (SystemTestEnv::LiveToken, "abc"),
        (SystemTestEnv::RunRoot, "target/live"),
    ])
    .unwrap();
    assert_eq!(config.live_target.as_deref(), Some("https://shop.example.com"));
    assert_eq!(config.live_token.as_deref(), Some("abc"));
    assert_eq!(config.run_root, Some(PathBuf::from("target/live")));
    assert_eq!(config.live_wrong_role_token, None);
}

#[test]
fn empty_values_fail_closed() {
    let err = load(&[(SystemTestEnv::RunRoot, "")]).unwrap_err();
    assert!(err.contains(SystemTestEnv::RunRoot.as_str()));
}

#[test]
fn lookup_errors_propagate() {
    let err = SystemTestConfig::from_lookup(|name| Err(format!("{name} must be valid UTF-8"))).unwrap_err();
    assert!(err.ends_with("must be valid UTF-8"));
}
