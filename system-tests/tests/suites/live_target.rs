// system-tests/tests/suites/live_target.rs
// ============================================================================
// Module: Live Target Tests
// Description: Runs the storefront suite against a deployed storefront.
// Purpose: Gate releases on the real API when a target is configured.
// Dependencies: system-tests, contract-gate-cli, contract-gate-config
// ============================================================================

//! ## Overview
//! Skipped unless `CONTRACT_GATE_SYSTEM_TEST_TARGET` is set. The rate-limit
//! lane stays off unless `CONTRACT_GATE_SYSTEM_TEST_RATE_LIMITS` enables it,
//! since bursts consume the target's real budgets.

use contract_gate_cli::RunOptions;
use contract_gate_cli::run_suite;
use contract_gate_cli::suite::http_transport;
use contract_gate_config::ContractGateConfig;
use system_tests::config::SystemTestConfig;

use crate::helpers::artifacts::TestArtifacts;

#[test]
fn live_storefront_meets_its_contracts() {
    let env = SystemTestConfig::load().expect("system-test environment");
    let Some(base_url) = env.live_target.clone() else {
        eprintln!("skipping live storefront run: target not configured");
        return;
    };

    let mut config = ContractGateConfig::default();
    config.target.base_url = base_url;
    config.auth.valid_token = env.live_token.clone();
    config.auth.wrong_role_token = env.live_wrong_role_token.clone();
    if let Some(timeout) = env.timeout {
        config.target.timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
    }
    config.validate().expect("live config is valid");

    let transport = http_transport(&config).expect("build http transport");
    let options = RunOptions {
        skip_rate_limit: !env.live_rate_limits,
        ..RunOptions::default()
    };
    let run = run_suite(&config, transport, &options).expect("suite runs");

    let artifacts = TestArtifacts::new("live_storefront_meets_its_contracts").expect("artifacts");
    artifacts.record_run(&run).expect("record run");
    assert!(run.report.all_passed(), "{}", run.summary.summary.render_text());
}
