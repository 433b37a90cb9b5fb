// crates/contract-gate-cli/src/scenarios/throttling.rs
// ============================================================================
// Module: Rate Limit Scenarios
// Description: Burst probes against endpoints with declared budgets.
// Purpose: Prove each budget is enforced by request `budget + 1`.
// Dependencies: contract-gate-core, serde_json
// ============================================================================

//! ## Overview
//! These scenarios run in the exclusive rate-limit lane so their bursts do
//! not starve parallel scenarios. Each probe sends `budget + 1` requests and
//! stops at the first `429`. Anything other than `2xx` or `429` during the
//! burst is a failure.

use contract_gate_core::EndpointSpec;
use contract_gate_core::FnScenario;
use contract_gate_core::HarnessError;
use contract_gate_core::Lane;
use contract_gate_core::ProbeClass;
use contract_gate_core::run_scenario;
use serde_json::Value;

use super::ai::analysis_payload;
use super::names;
use crate::catalog::Catalog;
use crate::catalog::ids;
use crate::error::CliResult;

/// Burst against `GET /api/products` (30 per minute by default).
pub fn products_list_rate_limit(catalog: &Catalog) -> CliResult<FnScenario> {
    Ok(burst_scenario(names::PRODUCTS_LIST_RATE_LIMIT, catalog.endpoint(ids::PRODUCTS_LIST)?, None))
}

/// Burst against `POST /api/ai/analyze` (100 per minute by default).
pub fn ai_analyze_rate_limit(catalog: &Catalog) -> CliResult<FnScenario> {
    Ok(burst_scenario(
        names::AI_ANALYZE_RATE_LIMIT,
        catalog.endpoint(ids::AI_ANALYZE)?,
        Some(analysis_payload()),
    ))
}

/// Burst against `GET /api/admin/stats` (200 per minute by default).
pub fn admin_stats_rate_limit(catalog: &Catalog) -> CliResult<FnScenario> {
    Ok(burst_scenario(names::ADMIN_STATS_RATE_LIMIT, catalog.endpoint(ids::ADMIN_STATS)?, None))
}

/// Builds an exclusive-lane burst scenario for one endpoint.
fn burst_scenario(name: &str, endpoint: EndpointSpec, body: Option<Value>) -> FnScenario {
    FnScenario::new(name, move |ctx| {
        run_scenario(
            ctx,
            |_| {
                endpoint.rate_limit.ok_or_else(|| {
                    HarnessError::requirement(format!("{} rate limit", endpoint.id), "a declared budget", "none")
                })
            },
            |ctx, budget| {
                let base = ctx.endpoint_request(&endpoint, &[])?;
                let base = match &body {
                    Some(payload) => base.json(payload.clone()),
                    None => base,
                };
                let burst = usize::try_from(budget.exceeding_burst()).unwrap_or(usize::MAX);
                let report = ctx.prober().probe(&endpoint, |_| base.clone(), burst)?;
                Ok(report)
            },
            |ctx, budget, report| {
                ctx.checks().rate_limited(&report, *budget);
                let assertion = format!("{} burst", endpoint.id);
                ctx.checks().that(
                    &format!("{assertion} statuses"),
                    report.count(ProbeClass::UnexpectedError) == 0,
                    "only 2xx and 429",
                    report.status_runs(),
                );
                ctx.checks().that(
                    &format!("{assertion} successes"),
                    report.count(ProbeClass::Success) > 0,
                    "at least one 2xx before throttling",
                    report.status_runs(),
                );
                Ok(())
            },
            |_, _| Ok(()),
        )
    })
    .in_lane(Lane::rate_limit())
}
