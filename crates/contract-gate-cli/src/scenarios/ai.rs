// crates/contract-gate-cli/src/scenarios/ai.rs
// ============================================================================
// Module: AI Endpoint Scenarios
// Description: Text analysis and product classification contracts.
// Purpose: Check reply shapes and input validation of the AI endpoints.
// Dependencies: contract-gate-core, serde_json
// ============================================================================

//! ## Overview
//! Analysis must accept a valid text and reject each malformed payload with
//! `400` or `422`. Classification must return a non-empty category.

use contract_gate_core::FnScenario;
use contract_gate_core::StatusSet;
use contract_gate_core::run_scenario;
use serde_json::Value;
use serde_json::json;

use super::names;
use super::support::label;
use crate::catalog::Catalog;
use crate::catalog::ids;
use crate::error::CliResult;

/// Longest text the analysis endpoint is expected to accept.
pub const MAX_ANALYSIS_TEXT: usize = 10_000;

/// Valid analysis request body.
#[must_use]
pub fn analysis_payload() -> Value {
    json!({"text": "Analyze the sentiment and key topics of this example text for AI testing purposes."})
}

/// Valid classification request body.
#[must_use]
pub fn classification_payload() -> Value {
    json!({
        "product_name": "Wireless Bluetooth Headphones",
        "product_description": "Over-ear, noise-cancelling wireless headphones with 30 hours battery life.",
        "attributes": {"brand": "SoundX", "category": "Electronics", "color": "Black"},
    })
}

/// Malformed analysis bodies and a label for each.
fn invalid_analysis_payloads() -> Vec<(&'static str, Value)> {
    vec![
        ("empty text", json!({"text": ""})),
        ("oversized text", json!({"text": "a".repeat(MAX_ANALYSIS_TEXT + 1)})),
        ("numeric text", json!({"text": 12345})),
        ("missing text", json!({})),
        ("null text", json!({"text": null})),
    ]
}

/// Valid analysis plus the invalid-payload grid.
pub fn ai_analyze_contract(catalog: &Catalog) -> CliResult<FnScenario> {
    let analyze = catalog.endpoint(ids::AI_ANALYZE)?;
    Ok(FnScenario::new(names::AI_ANALYZE_CONTRACT, move |ctx| {
        run_scenario(
            ctx,
            |_| Ok(()),
            |ctx, ()| {
                let valid = ctx.send(&ctx.endpoint_request(&analyze, &[])?.json(analysis_payload()))?;
                let mut invalid = Vec::new();
                for (case, payload) in invalid_analysis_payloads() {
                    let response = ctx.send(&ctx.endpoint_request(&analyze, &[])?.json(payload))?;
                    invalid.push((case, response));
                }
                Ok((valid, invalid))
            },
            |ctx, (), (valid, invalid)| {
                ctx.checks().endpoint(&analyze, &valid);
                let rejected = StatusSet::of(&[400, 422]);
                for (case, response) in &invalid {
                    ctx.checks().status(&format!("{} {case}", label(&analyze)), response, &rejected);
                }
                Ok(())
            },
            |_, ()| Ok(()),
        )
    }))
}

/// One classification call checked against the endpoint contract.
pub fn ai_classify_contract(catalog: &Catalog) -> CliResult<FnScenario> {
    let classify = catalog.endpoint(ids::AI_CLASSIFY)?;
    Ok(FnScenario::new(names::AI_CLASSIFY_CONTRACT, move |ctx| {
        run_scenario(
            ctx,
            |_| Ok(()),
            |ctx, ()| ctx.send(&ctx.endpoint_request(&classify, &[])?.json(classification_payload())),
            |ctx, (), response| {
                ctx.checks().endpoint(&classify, &response);
                Ok(())
            },
            |_, ()| Ok(()),
        )
    }))
}
