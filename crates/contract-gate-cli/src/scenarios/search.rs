// crates/contract-gate-cli/src/scenarios/search.rs
// ============================================================================
// Module: Price Search Scenarios
// Description: Search round trip and best-offer selection.
// Purpose: Verify that created products become searchable and priced.
// Dependencies: contract-gate-core, serde_json
// ============================================================================

//! ## Overview
//! `price_search_round_trip` creates one product and finds it by name, by a
//! differently-cased description fragment, and by category. Each lookup must
//! carry offers with a positive lowest price. Hostile inputs
//! must be answered with `200` or `400`, never a server error.
//! `best_offer_lowest_price` creates three priced offers under one name and
//! expects the cheapest back.

use contract_gate_core::Checks;
use contract_gate_core::EndpointSpec;
use contract_gate_core::FnScenario;
use contract_gate_core::HarnessError;
use contract_gate_core::Response;
use contract_gate_core::ScenarioContext;
use contract_gate_core::StatusSet;
use contract_gate_core::run_scenario;
use serde_json::Value;
use serde_json::json;

use super::names;
use super::support::ProductFixture;
use super::support::create_product;
use super::support::create_products;
use super::support::json_body;
use super::support::label;
use super::support::release_product;
use super::support::unique_name;
use crate::catalog::Catalog;
use crate::catalog::ids;
use crate::catalog::result_items;
use crate::error::CliResult;

/// Description used for the searchable product.
const SEARCH_DESCRIPTION: &str = "A powerful gaming laptop with RTX 4070 and 32GB RAM";

/// Description fragment searched with different casing.
const DESCRIPTION_QUERY: &str = "POWERFUL gaming";

/// Minimum advertised per-minute budget when the search advertises one.
const MIN_ADVERTISED_LIMIT: u64 = 30;

/// Length of the oversized name query.
const OVERSIZED_QUERY_LEN: usize = 1024;

/// Prices of the three best-offer fixtures; the second is cheapest.
const OFFER_PRICES: [f64; 3] = [10.99, 5.49, 7.25];

/// Allowed difference between the expected and returned best price.
const PRICE_TOLERANCE: f64 = 0.01;

// ============================================================================
// SECTION: Search Round Trip
// ============================================================================

/// Product created for the search plus its searchable fields.
struct SearchFixture {
    /// Created product.
    product: ProductFixture,
    /// Unique name.
    name: String,
    /// Unique category.
    category: String,
}

/// Responses from the search exercise.
struct SearchObservation {
    /// Labelled lookups that must include the product.
    lookups: Vec<(&'static str, Response)>,
    /// Labelled hostile queries.
    hostile: Vec<(&'static str, Response)>,
}

/// Searches for a freshly created product three ways.
pub fn price_search_round_trip(catalog: &Catalog) -> CliResult<FnScenario> {
    let create = catalog.endpoint(ids::PRODUCTS_CREATE)?;
    let delete = catalog.endpoint(ids::PRODUCTS_DELETE)?;
    let search = catalog.endpoint(ids::PRICE_SEARCH)?;
    Ok(FnScenario::new(names::PRICE_SEARCH_ROUND_TRIP, move |ctx| {
        run_scenario(
            ctx,
            |ctx| {
                let name = unique_name("SuperGaming Laptop");
                let category = unique_name("Laptops");
                let payload = json!({
                    "name": name,
                    "description": SEARCH_DESCRIPTION,
                    "category": category,
                    "price": 1499.99,
                });
                Ok(SearchFixture {
                    product: create_product(ctx, &create, payload)?,
                    name,
                    category,
                })
            },
            |ctx, fixture| {
                let query = |ctx: &ScenarioContext<'_>, field: &str, value: &str| -> Result<Response, HarnessError> {
                    ctx.send(&ctx.endpoint_request(&search, &[])?.param(field, value))
                };
                let lookups = vec![
                    ("name", query(ctx, "name", &fixture.name)?),
                    ("description", query(ctx, "description", DESCRIPTION_QUERY)?),
                    ("category", query(ctx, "category", &fixture.category)?),
                ];
                let hostile = vec![
                    ("script name", query(ctx, "name", "<script>alert('x')</script>")?),
                    ("oversized name", query(ctx, "name", &"a".repeat(OVERSIZED_QUERY_LEN))?),
                ];
                Ok(SearchObservation {
                    lookups,
                    hostile,
                })
            },
            |ctx, fixture, observed| {
                let product_id = fixture.product.numeric_id();
                for (field, response) in &observed.lookups {
                    if !ctx.checks().endpoint(&search, response) {
                        continue;
                    }
                    let body = json_body(&search, response)?;
                    let items = result_items(&body).unwrap_or_default();
                    let matched = items.iter().find(|item| item.get("product_id").and_then(Value::as_u64) == product_id);
                    let included = ctx.checks().that(
                        &format!("price search by {field} includes product"),
                        matched.is_some(),
                        &format!("product_id {}", fixture.product.id),
                        format!("{} results", items.len()),
                    );
                    if included && let Some(item) = matched {
                        check_lowest_offer(ctx.checks(), field, item);
                    }
                    check_advertised_limit(ctx.checks(), response);
                }
                for (input, response) in &observed.hostile {
                    ctx.checks().status(
                        &format!("{} {input}", label(&search)),
                        response,
                        &StatusSet::of(&[200, 400]),
                    );
                }
                Ok(())
            },
            |ctx, fixture| release_product(ctx, &delete, &fixture.product.id),
        )
    }))
}

/// The matched item's offers must yield a positive lowest price.
fn check_lowest_offer(checks: &mut Checks, field: &str, item: &Value) {
    let lowest = item
        .get("offers")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|offer| offer.get("price").and_then(Value::as_f64))
        .reduce(f64::min);
    checks.that(
        &format!("price search by {field} lowest offer"),
        lowest.is_some_and(|price| price > 0.0),
        "min(offers.price) > 0",
        lowest.map_or_else(|| "(no priced offers)".to_string(), |price| price.to_string()),
    );
}

/// When `X-RateLimit-Limit` is advertised it must allow at least 30 per minute.
fn check_advertised_limit(checks: &mut Checks, response: &Response) {
    if let Some(raw) = response.header("x-ratelimit-limit") {
        let limit = raw.trim().parse::<u64>().ok();
        checks.that(
            "price search X-RateLimit-Limit",
            limit.is_some_and(|limit| limit >= MIN_ADVERTISED_LIMIT),
            &format!(">= {MIN_ADVERTISED_LIMIT}"),
            raw,
        );
    }
}

// ============================================================================
// SECTION: Best Offer
// ============================================================================

/// Three offers under one name; the best offer is the cheapest.
pub fn best_offer_lowest_price(catalog: &Catalog) -> CliResult<FnScenario> {
    let create = catalog.endpoint(ids::PRODUCTS_CREATE)?;
    let delete = catalog.endpoint(ids::PRODUCTS_DELETE)?;
    let best_offer = catalog.endpoint(ids::BEST_OFFER)?;
    Ok(FnScenario::new(names::BEST_OFFER_LOWEST_PRICE, move |ctx| {
        run_scenario(
            ctx,
            |ctx| {
                let name = unique_name("Test Product");
                let payloads = OFFER_PRICES
                    .iter()
                    .zip(["Store1", "Store2", "Store3"])
                    .map(|(price, store)| {
                        json!({
                            "name": name,
                            "description": format!("Offer from {store}"),
                            "price": price,
                            "category": "TestCategory",
                            "brand": "TestBrand",
                            "stores": [store],
                        })
                    })
                    .collect();
                let products = create_products(ctx, &create, &delete, payloads)?;
                Ok((name, products))
            },
            |ctx, (name, _)| ctx.send(&ctx.endpoint_request(&best_offer, &[])?.param("name", name.as_str())),
            |ctx, _, response| verify_best_offer(ctx, &best_offer, &response),
            |ctx, (_, products)| {
                let mut first_error = None;
                for product in &products {
                    if let Err(err) = release_product(ctx, &delete, &product.id)
                        && first_error.is_none()
                    {
                        first_error = Some(err);
                    }
                }
                first_error.map_or(Ok(()), Err)
            },
        )
    }))
}

/// Checks the best-offer reply and that it carries the lowest price.
fn verify_best_offer(
    ctx: &mut ScenarioContext<'_>,
    best_offer: &EndpointSpec,
    response: &Response,
) -> Result<(), HarnessError> {
    if !ctx.checks().endpoint(best_offer, response) {
        return Ok(());
    }
    let body = json_body(best_offer, response)?;
    let lowest = OFFER_PRICES.iter().copied().fold(f64::INFINITY, f64::min);
    let price = body.get("price").and_then(Value::as_f64);
    ctx.checks().that(
        "best offer price is the lowest",
        price.is_some_and(|price| (price - lowest).abs() < PRICE_TOLERANCE),
        &format!("{lowest}"),
        price.map_or_else(|| "(absent)".to_string(), |price| price.to_string()),
    );
    Ok(())
}
