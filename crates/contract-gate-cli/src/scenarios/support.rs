// crates/contract-gate-cli/src/scenarios/support.rs
// ============================================================================
// Module: Scenario Support
// Description: Fixture helpers shared by storefront scenarios.
// Purpose: Create and release products and enforce hard status requirements.
// Dependencies: contract-gate-core, serde_json
// ============================================================================

//! ## Overview
//! Product fixtures are created through `products.create` and released
//! through `products.delete`. Release treats `404` as already gone so a
//! scenario that deleted its own fixture does not fail in teardown.

use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use contract_gate_core::EndpointSpec;
use contract_gate_core::FixtureId;
use contract_gate_core::HarnessError;
use contract_gate_core::Response;
use contract_gate_core::ScenarioContext;
use contract_gate_core::runtime::validator::render_value;
use serde_json::Value;

/// Per-process counter that keeps generated names unique within one run.
static NAME_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Returns `prefix` followed by a suffix unique to this run.
pub fn unique_name(prefix: &str) -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_millis());
    let sequence = NAME_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{prefix} {millis}-{sequence}")
}

/// `METHOD /path` label for an endpoint.
pub fn label(endpoint: &EndpointSpec) -> String {
    format!("{} {}", endpoint.method, endpoint.path)
}

/// Fails the phase unless the response status is in the endpoint's success set.
pub fn require_success(endpoint: &EndpointSpec, response: &Response) -> Result<(), HarnessError> {
    if endpoint.success.contains(response.status) {
        return Ok(());
    }
    Err(HarnessError::requirement(
        format!("{} status", label(endpoint)),
        format!("status in {}", endpoint.success),
        format!("{} {}", response.status, response.body_text()),
    ))
}

/// A product created for one scenario.
#[derive(Debug, Clone)]
pub struct ProductFixture {
    /// Server-assigned id.
    pub id: FixtureId,
    /// Payload sent to the create call.
    pub submitted: Value,
}

impl ProductFixture {
    /// Numeric id, when the server uses integers.
    pub fn numeric_id(&self) -> Option<u64> {
        self.id.as_u64()
    }
}

/// Creates a product through `create` with a JSON payload.
pub fn create_product(
    ctx: &ScenarioContext<'_>,
    create: &EndpointSpec,
    payload: Value,
) -> Result<ProductFixture, HarnessError> {
    let request = ctx.endpoint_request(create, &[])?.json(payload.clone());
    let (response, created) = ctx.send_json(&request)?;
    require_success(create, &response)?;
    let id = created.get("id").and_then(FixtureId::from_json).ok_or_else(|| {
        HarnessError::requirement(
            "created product id",
            "integer or non-empty string id",
            created.get("id").map_or_else(|| "(absent)".to_string(), render_value),
        )
    })?;
    Ok(ProductFixture {
        id,
        submitted: payload,
    })
}

/// Creates several products, releasing the earlier ones if a later one fails.
pub fn create_products(
    ctx: &ScenarioContext<'_>,
    create: &EndpointSpec,
    delete: &EndpointSpec,
    payloads: Vec<Value>,
) -> Result<Vec<ProductFixture>, HarnessError> {
    let mut fixtures = Vec::with_capacity(payloads.len());
    for payload in payloads {
        match create_product(ctx, create, payload) {
            Ok(fixture) => fixtures.push(fixture),
            Err(err) => {
                for fixture in &fixtures {
                    let _ = release_product(ctx, delete, &fixture.id);
                }
                return Err(err);
            }
        }
    }
    Ok(fixtures)
}

/// Deletes a product. `404` counts as released.
pub fn release_product(
    ctx: &ScenarioContext<'_>,
    delete: &EndpointSpec,
    id: &FixtureId,
) -> Result<(), HarnessError> {
    let request = ctx.endpoint_request(delete, &[("id", id.as_str())])?;
    let response = ctx.send(&request)?;
    if response.status == 404 {
        return Ok(());
    }
    require_success(delete, &response)
}

/// Parses a response body as JSON, failing the phase otherwise.
pub fn json_body(endpoint: &EndpointSpec, response: &Response) -> Result<Value, HarnessError> {
    response.json().map_err(|err| HarnessError::Body {
        request: label(endpoint),
        reason: format!("status {} body is not JSON ({err})", response.status),
    })
}

/// Reads a price sent or returned either as a JSON number or a numeric string.
pub fn numeric_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

/// Returns true for JSON values the storefront uses to flag soft deletion.
pub fn is_truthy_flag(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(flag)) => *flag,
        Some(Value::Number(number)) => number.as_f64().is_some_and(|n| n != 0.0),
        Some(Value::String(text)) => !text.is_empty(),
        Some(_) => true,
    }
}
