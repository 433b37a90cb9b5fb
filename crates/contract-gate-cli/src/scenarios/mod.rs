// crates/contract-gate-cli/src/scenarios/mod.rs
// ============================================================================
// Module: Storefront Scenarios
// Description: The scenario suite run against a storefront deployment.
// Purpose: Assemble named scenarios from the endpoint catalog.
// Dependencies: contract-gate-core
// ============================================================================

//! ## Overview
//! Each scenario is built from catalog entries, so endpoint overrides from
//! configuration flow into every check. [`storefront_suite`] returns the
//! full suite in a stable order and [`select`] narrows it by name or lane.

// ============================================================================
// SECTION: Modules
// ============================================================================

mod access;
mod ai;
mod products;
mod search;
mod support;
mod throttling;

use contract_gate_core::Scenario;

use crate::catalog::Catalog;
use crate::error::CliError;
use crate::error::CliResult;

// ============================================================================
// SECTION: Names
// ============================================================================

/// Stable scenario names accepted by `--only`.
pub mod names {
    /// Search round trip by name, description, and category.
    pub const PRICE_SEARCH_ROUND_TRIP: &str = "price_search_round_trip";
    /// Cheapest of three offers is returned.
    pub const BEST_OFFER_LOWEST_PRICE: &str = "best_offer_lowest_price";
    /// Create, show, update, delete, and soft-delete check.
    pub const PRODUCT_CRUD_ROUND_TRIP: &str = "product_crud_round_trip";
    /// Multipart create with an image part.
    pub const PRODUCT_CREATE_MULTIPART: &str = "product_create_multipart";
    /// Product list contract.
    pub const PRODUCTS_LIST_SHAPE: &str = "products_list_shape";
    /// Two reads of one product agree.
    pub const IDEMPOTENT_PRODUCT_READ: &str = "idempotent_product_read";
    /// Auth matrix for the current user endpoint.
    pub const AUTH_USER_MATRIX: &str = "auth_user_matrix";
    /// Auth matrix for admin statistics.
    pub const ADMIN_STATS_MATRIX: &str = "admin_stats_matrix";
    /// Text analysis contract and input validation.
    pub const AI_ANALYZE_CONTRACT: &str = "ai_analyze_contract";
    /// Product classification contract.
    pub const AI_CLASSIFY_CONTRACT: &str = "ai_classify_contract";
    /// Product list burst.
    pub const PRODUCTS_LIST_RATE_LIMIT: &str = "products_list_rate_limit";
    /// Text analysis burst.
    pub const AI_ANALYZE_RATE_LIMIT: &str = "ai_analyze_rate_limit";
    /// Admin statistics burst.
    pub const ADMIN_STATS_RATE_LIMIT: &str = "admin_stats_rate_limit";
}

// ============================================================================
// SECTION: Suite Assembly
// ============================================================================

/// Builds every storefront scenario from `catalog`.
///
/// # Errors
///
/// Returns [`CliError::UnknownEndpoint`] when the catalog lacks an endpoint a
/// scenario needs.
pub fn storefront_suite(catalog: &Catalog) -> CliResult<Vec<Box<dyn Scenario>>> {
    Ok(vec![
        Box::new(search::price_search_round_trip(catalog)?),
        Box::new(search::best_offer_lowest_price(catalog)?),
        Box::new(products::product_crud_round_trip(catalog)?),
        Box::new(products::product_create_multipart(catalog)?),
        Box::new(products::products_list_shape(catalog)?),
        Box::new(products::idempotent_product_read(catalog)?),
        Box::new(access::auth_user_matrix(catalog)?),
        Box::new(access::admin_stats_matrix(catalog)?),
        Box::new(ai::ai_analyze_contract(catalog)?),
        Box::new(ai::ai_classify_contract(catalog)?),
        Box::new(throttling::products_list_rate_limit(catalog)?),
        Box::new(throttling::ai_analyze_rate_limit(catalog)?),
        Box::new(throttling::admin_stats_rate_limit(catalog)?),
    ])
}

/// Narrows a suite to the scenarios named in `only` (all when empty) and
/// drops exclusive-lane scenarios when `skip_rate_limit` is set.
///
/// # Errors
///
/// Returns [`CliError::UnknownScenario`] for a name that matches nothing.
pub fn select(
    scenarios: Vec<Box<dyn Scenario>>,
    only: &[String],
    skip_rate_limit: bool,
) -> CliResult<Vec<Box<dyn Scenario>>> {
    if let Some(unknown) =
        only.iter().find(|name| !scenarios.iter().any(|scenario| scenario.name().as_str() == name.as_str()))
    {
        return Err(CliError::UnknownScenario(unknown.clone()));
    }
    Ok(scenarios
        .into_iter()
        .filter(|scenario| only.is_empty() || only.iter().any(|name| scenario.name().as_str() == name.as_str()))
        .filter(|scenario| !(skip_rate_limit && scenario.lane().is_exclusive()))
        .collect())
}
