// crates/contract-gate-cli/src/suite.rs
// ============================================================================
// Module: Suite Execution
// Description: Wires configuration, transport, and scenarios into one run.
// Purpose: Give the binary and integration tests a single entry point.
// Dependencies: contract-gate-config, contract-gate-core, contract-gate-http, time, tracing
// ============================================================================

//! ## Overview
//! [`load_config`] reads the file and applies environment overrides.
//! [`run_suite`] resolves credentials, builds the harness, and runs the
//! selected scenarios through [`SuiteRunner`]. The transport is a parameter
//! so tests can substitute a scripted or in-process server.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use contract_gate_config::ContractGateConfig;
use contract_gate_config::EnvOverrides;
use contract_gate_core::CancelToken;
use contract_gate_core::Harness;
use contract_gate_core::Report;
use contract_gate_core::SuiteRunner;
use contract_gate_core::Transport;
use contract_gate_http::DEFAULT_USER_AGENT;
use contract_gate_http::HttpTransport;
use contract_gate_http::HttpTransportConfig;
use time::OffsetDateTime;
use tracing::info;

use crate::artifacts::RunSummary;
use crate::catalog::Catalog;
use crate::error::CliResult;
use crate::login::resolve_credentials;
use crate::scenarios::select;
use crate::scenarios::storefront_suite;

// ============================================================================
// SECTION: Options
// ============================================================================

/// Per-invocation choices that are not part of the config file.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Scenario names to run; empty runs the whole suite.
    pub only: Vec<String>,
    /// Drops the exclusive rate-limit lane.
    pub skip_rate_limit: bool,
    /// Overrides `[runner].workers`.
    pub workers: Option<usize>,
}

/// Report plus run-level summary.
#[derive(Debug, Clone)]
pub struct SuiteRun {
    /// Every outcome in suite order.
    pub report: Report,
    /// Summary for artifacts and output.
    pub summary: RunSummary,
}

// ============================================================================
// SECTION: Setup
// ============================================================================

/// Loads configuration and applies `CONTRACT_GATE_*` overrides.
///
/// # Errors
///
/// Returns a config error when loading, an override, or validation fails.
pub fn load_config(path: Option<&Path>) -> CliResult<ContractGateConfig> {
    let mut config = ContractGateConfig::load(path)?;
    config.apply_env(&EnvOverrides::load()?)?;
    Ok(config)
}

/// Effective catalog: storefront defaults with configured overrides.
///
/// # Errors
///
/// Returns [`crate::CliError::UnknownEndpoint`] for an override naming no endpoint.
pub fn effective_catalog(config: &ContractGateConfig) -> CliResult<Catalog> {
    Catalog::storefront().with_overrides(&config.endpoints)
}

/// Builds the blocking HTTP transport described by `[target]`.
///
/// # Errors
///
/// Returns a transport error when the client cannot be built.
pub fn http_transport(config: &ContractGateConfig) -> CliResult<Arc<dyn Transport>> {
    let transport = HttpTransport::new(HttpTransportConfig {
        user_agent: config.target.user_agent.clone().unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
        max_response_bytes: config.target.max_response_bytes,
    })?;
    Ok(Arc::new(transport))
}

// ============================================================================
// SECTION: Run
// ============================================================================

/// Runs the selected storefront scenarios against `transport`.
///
/// # Errors
///
/// Returns an error when the catalog, scenario selection, or login fails.
/// Scenario failures are reported in the returned [`SuiteRun`].
pub fn run_suite(
    config: &ContractGateConfig,
    transport: Arc<dyn Transport>,
    options: &RunOptions,
) -> CliResult<SuiteRun> {
    let catalog = effective_catalog(config)?;
    let scenarios = select(storefront_suite(&catalog)?, &options.only, options.skip_rate_limit)?;
    let credentials = resolve_credentials(config, transport.as_ref())?;

    let cancel = config.deadline().map_or_else(CancelToken::new, CancelToken::with_deadline);
    let harness = Harness::new(transport, &config.target.base_url)
        .with_credentials(credentials)
        .with_timeout(config.request_timeout())
        .with_probe_config(config.probe_config())
        .with_cancel(cancel);
    let workers = options.workers.unwrap_or(config.runner.workers);

    info!(base_url = %harness.base_url(), scenarios = scenarios.len(), workers, "run started");
    let started_at = OffsetDateTime::now_utc();
    let clock = Instant::now();
    let mut report = Report::new();
    report.extend(SuiteRunner::new(&harness).with_workers(workers).run(&scenarios));
    let summary = RunSummary::from_report(harness.base_url(), started_at, clock.elapsed(), &report);
    info!(passed = summary.summary.passed, failed = summary.summary.failed, "run finished");
    Ok(SuiteRun {
        report,
        summary,
    })
}
