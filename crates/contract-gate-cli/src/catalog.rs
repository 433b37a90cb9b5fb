// crates/contract-gate-cli/src/catalog.rs
// ============================================================================
// Module: Storefront Endpoint Catalog
// Description: Endpoint contracts for the storefront API under test.
// Purpose: Declare status sets, shapes, budgets, and auth once per endpoint.
// Dependencies: contract-gate-config, contract-gate-core
// ============================================================================

//! ## Overview
//! The catalog is the single source of endpoint contracts for the storefront
//! suite. Scenarios look endpoints up by id; configuration may override the
//! rate budget, auth requirement, success set, or latency budget of any entry.
//!
//! Invariants:
//! - Ids are unique and catalog order is stable.
//! - An override naming an unknown id is rejected rather than ignored.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt::Write as _;

use contract_gate_config::EndpointOverride;
use contract_gate_core::AuthRequirement;
use contract_gate_core::EndpointSpec;
use contract_gate_core::FieldRule;
use contract_gate_core::HttpMethod;
use contract_gate_core::RateLimitBudget;
use contract_gate_core::SchemaContract;
use contract_gate_core::Shape;
use serde_json::Value;

use crate::error::CliError;
use crate::error::CliResult;

// ============================================================================
// SECTION: Endpoint Ids
// ============================================================================

/// Catalog identifiers.
pub mod ids {
    /// `GET /api/products`.
    pub const PRODUCTS_LIST: &str = "products.list";
    /// `POST /api/products`.
    pub const PRODUCTS_CREATE: &str = "products.create";
    /// `GET /api/products/{id}`.
    pub const PRODUCTS_SHOW: &str = "products.show";
    /// `PUT /api/products/{id}`.
    pub const PRODUCTS_UPDATE: &str = "products.update";
    /// `DELETE /api/products/{id}`.
    pub const PRODUCTS_DELETE: &str = "products.delete";
    /// `GET /api/price-search`.
    pub const PRICE_SEARCH: &str = "price_search.search";
    /// `GET /api/price-search/best-offer`.
    pub const BEST_OFFER: &str = "price_search.best_offer";
    /// `POST /api/login`.
    pub const LOGIN: &str = "auth.login";
    /// `GET /api/user`.
    pub const USER: &str = "auth.user";
    /// `POST /api/ai/analyze`.
    pub const AI_ANALYZE: &str = "ai.analyze";
    /// `POST /api/ai/classify-product`.
    pub const AI_CLASSIFY: &str = "ai.classify";
    /// `GET /api/admin/stats`.
    pub const ADMIN_STATS: &str = "admin.stats";
}

/// Latency budget for reads and searches.
pub const READ_LATENCY_BUDGET_MS: u64 = 200;

// ============================================================================
// SECTION: Catalog
// ============================================================================

/// Ordered set of endpoint contracts.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    /// Endpoints in declaration order.
    endpoints: Vec<EndpointSpec>,
}

impl Catalog {
    /// Builds the storefront catalog with its default contracts.
    #[must_use]
    pub fn storefront() -> Self {
        let endpoints = vec![
            EndpointSpec::new(ids::PRODUCTS_LIST, HttpMethod::Get, "/api/products")
                .with_contract(SchemaContract::new(result_list_shape(product_shape())))
                .with_rate_limit(RateLimitBudget::per_minute(30))
                .with_latency_budget(READ_LATENCY_BUDGET_MS),
            EndpointSpec::new(ids::PRODUCTS_CREATE, HttpMethod::Post, "/api/products")
                .with_success(&[200, 201])
                .with_contract(SchemaContract::new(product_shape())),
            EndpointSpec::new(ids::PRODUCTS_SHOW, HttpMethod::Get, "/api/products/{id}")
                .with_contract(SchemaContract::new(product_shape()))
                .with_latency_budget(READ_LATENCY_BUDGET_MS),
            EndpointSpec::new(ids::PRODUCTS_UPDATE, HttpMethod::Put, "/api/products/{id}")
                .with_success(&[200, 204])
                .with_auth(AuthRequirement::Bearer),
            EndpointSpec::new(ids::PRODUCTS_DELETE, HttpMethod::Delete, "/api/products/{id}")
                .with_success(&[200, 204])
                .with_auth(AuthRequirement::Bearer),
            EndpointSpec::new(ids::PRICE_SEARCH, HttpMethod::Get, "/api/price-search")
                .with_contract(SchemaContract::new(result_list_shape(search_result_shape())))
                .with_latency_budget(READ_LATENCY_BUDGET_MS),
            EndpointSpec::new(ids::BEST_OFFER, HttpMethod::Get, "/api/price-search/best-offer")
                .with_contract(SchemaContract::new(best_offer_shape()))
                .with_latency_budget(READ_LATENCY_BUDGET_MS),
            EndpointSpec::new(ids::LOGIN, HttpMethod::Post, "/api/login")
                .with_contract(SchemaContract::new(login_shape())),
            EndpointSpec::new(ids::USER, HttpMethod::Get, "/api/user")
                .with_auth(AuthRequirement::Bearer)
                .with_contract(SchemaContract::new(user_shape()))
                .with_latency_budget(READ_LATENCY_BUDGET_MS),
            EndpointSpec::new(ids::AI_ANALYZE, HttpMethod::Post, "/api/ai/analyze")
                .with_contract(SchemaContract::new(analysis_shape()))
                .with_rate_limit(RateLimitBudget::per_minute(100))
                .with_latency_budget(READ_LATENCY_BUDGET_MS),
            EndpointSpec::new(ids::AI_CLASSIFY, HttpMethod::Post, "/api/ai/classify-product")
                .with_contract(SchemaContract::new(classification_shape()))
                .with_rate_limit(RateLimitBudget::per_minute(100)),
            EndpointSpec::new(ids::ADMIN_STATS, HttpMethod::Get, "/api/admin/stats")
                .with_auth(AuthRequirement::Role("admin".to_string()))
                .with_contract(SchemaContract::new(admin_stats_shape()))
                .with_rate_limit(RateLimitBudget::per_minute(200)),
        ];
        Self {
            endpoints,
        }
    }

    /// Applies configuration overrides by endpoint id.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::UnknownEndpoint`] when an override names an id
    /// that is not in the catalog.
    pub fn with_overrides(mut self, overrides: &[EndpointOverride]) -> CliResult<Self> {
        for entry in overrides {
            let slot = self
                .endpoints
                .iter_mut()
                .find(|endpoint| endpoint.id.as_str() == entry.id)
                .ok_or_else(|| CliError::UnknownEndpoint(entry.id.clone()))?;
            *slot = entry.apply(slot.clone());
        }
        Ok(self)
    }

    /// Returns a copy of the endpoint with the given id.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::UnknownEndpoint`] when the id is not in the catalog.
    pub fn endpoint(&self, id: &str) -> CliResult<EndpointSpec> {
        self.endpoints
            .iter()
            .find(|endpoint| endpoint.id.as_str() == id)
            .cloned()
            .ok_or_else(|| CliError::UnknownEndpoint(id.to_string()))
    }

    /// Endpoints in declaration order.
    #[must_use]
    pub fn endpoints(&self) -> &[EndpointSpec] {
        &self.endpoints
    }

    /// Renders one aligned line per endpoint.
    #[must_use]
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        for endpoint in &self.endpoints {
            let route = format!("{} {}", endpoint.method, endpoint.path);
            let rate = endpoint.rate_limit.map_or_else(|| "-".to_string(), |budget| budget.to_string());
            let latency = endpoint
                .latency_budget_ms
                .map_or_else(|| "-".to_string(), |millis| format!("{millis}ms"));
            let _ = writeln!(
                out,
                "{:<24} {:<36} success={} auth={} rate={} latency={}",
                endpoint.id,
                route,
                endpoint.success,
                auth_label(&endpoint.auth),
                rate,
                latency
            );
        }
        out
    }
}

/// Short label for an auth requirement.
fn auth_label(auth: &AuthRequirement) -> String {
    match auth {
        AuthRequirement::None => "none".to_string(),
        AuthRequirement::Bearer => "bearer".to_string(),
        AuthRequirement::Role(role) => format!("role:{role}"),
    }
}

// ============================================================================
// SECTION: Shapes
// ============================================================================

/// Reference to a related record: `{id, name}`.
fn named_ref_shape() -> Shape {
    Shape::object(vec![
        FieldRule::required("id", Shape::integer_at_least(1.0)),
        FieldRule::required("name", Shape::non_empty_string()),
    ])
}

/// A related record given either as one object or as a non-empty list of them.
fn named_ref_or_list_shape() -> Shape {
    Shape::one_of(vec![named_ref_shape(), Shape::non_empty_list(named_ref_shape())])
}

/// A product as returned by list, show, and create.
#[must_use]
pub fn product_shape() -> Shape {
    Shape::object(vec![
        FieldRule::required("id", Shape::integer_at_least(1.0)),
        FieldRule::required("name", Shape::non_empty_string()),
        FieldRule::optional("description", Shape::nullable(Shape::string())),
        FieldRule::optional(
            "price",
            Shape::nullable(Shape::one_of(vec![Shape::number(), Shape::non_empty_string()])),
        ),
        FieldRule::optional("category", Shape::nullable(Shape::string())),
        FieldRule::optional("categories", Shape::list(named_ref_shape())),
        FieldRule::optional(
            "brand",
            Shape::nullable(Shape::one_of(vec![
                Shape::integer(),
                named_ref_shape(),
                Shape::non_empty_list(named_ref_shape()),
            ])),
        ),
        FieldRule::optional("brands", named_ref_or_list_shape()),
        FieldRule::optional("stores", Shape::list(Shape::one_of(vec![Shape::integer(), named_ref_shape()]))),
        FieldRule::optional("image_url", Shape::nullable(Shape::string())),
        FieldRule::optional("deleted_at", Shape::nullable(Shape::string())),
    ])
}

/// One offer inside a price-search result.
fn offer_shape() -> Shape {
    Shape::object(vec![
        FieldRule::required("store_id", Shape::integer_at_least(1.0)),
        FieldRule::required("price", Shape::positive_number()),
    ])
}

/// One price-search result.
#[must_use]
pub fn search_result_shape() -> Shape {
    Shape::object(vec![
        FieldRule::required("product_id", Shape::integer_at_least(1.0)),
        FieldRule::required("name", Shape::non_empty_string()),
        FieldRule::required("description", Shape::nullable(Shape::string())),
        FieldRule::required("category", Shape::nullable(Shape::string())),
        FieldRule::required("offers", Shape::non_empty_list(offer_shape())),
    ])
}

/// Pagination counters that may accompany a `data` envelope.
const PAGINATION_FIELDS: [&str; 4] = ["current_page", "last_page", "per_page", "total"];

/// A collection reply: a bare list, or the list nested under `data` or `results`.
#[must_use]
pub fn result_list_shape(items: Shape) -> Shape {
    let mut paged = vec![FieldRule::required("data", Shape::list(items.clone()))];
    paged.extend(PAGINATION_FIELDS.iter().map(|name| FieldRule::optional(*name, Shape::integer_at_least(0.0))));
    Shape::one_of(vec![
        Shape::list(items.clone()),
        Shape::object(paged),
        Shape::object(vec![FieldRule::required("results", Shape::list(items))]),
    ])
}

/// Items of a body matching [`result_list_shape`], whichever variant it uses.
#[must_use]
pub fn result_items(body: &Value) -> Option<&[Value]> {
    if let Value::Array(items) = body {
        return Some(items);
    }
    ["data", "results"]
        .iter()
        .find_map(|key| body.get(*key).and_then(Value::as_array))
        .map(Vec::as_slice)
}

/// The lowest offer for a product.
fn best_offer_shape() -> Shape {
    Shape::object(vec![
        FieldRule::required("price", Shape::positive_number()),
        FieldRule::required(
            "store",
            Shape::one_of(vec![
                Shape::non_empty_string(),
                Shape::object(vec![
                    FieldRule::optional("id", Shape::integer_at_least(1.0)),
                    FieldRule::required("name", Shape::non_empty_string()),
                ]),
            ]),
        ),
        FieldRule::optional("product_id", Shape::integer_at_least(1.0)),
    ])
}

/// Login reply carrying `token` or `access_token`.
fn login_shape() -> Shape {
    Shape::one_of(vec![
        Shape::object(vec![FieldRule::required("token", Shape::non_empty_string())]),
        Shape::object(vec![FieldRule::required("access_token", Shape::non_empty_string())]),
    ])
}

/// The authenticated user.
fn user_shape() -> Shape {
    Shape::object(vec![
        FieldRule::required("id", Shape::integer_at_least(1.0)),
        FieldRule::required("name", Shape::non_empty_string()),
        FieldRule::required("email", Shape::non_empty_string()),
        FieldRule::optional("roles", Shape::list(Shape::Any)),
        FieldRule::optional("created_at", Shape::nullable(Shape::string())),
        FieldRule::optional("updated_at", Shape::nullable(Shape::string())),
    ])
}

/// Sentiment and topics of analyzed text.
fn analysis_body_shape() -> Shape {
    Shape::object(vec![
        FieldRule::required("sentiment", Shape::non_empty_string()),
        FieldRule::required("topics", Shape::list(Shape::string())),
    ])
}

/// Analysis reply, either bare or wrapped in a `{success, data}` envelope.
fn analysis_shape() -> Shape {
    Shape::one_of(vec![
        analysis_body_shape(),
        Shape::object(vec![
            FieldRule::required("success", Shape::Bool),
            FieldRule::required("data", analysis_body_shape()),
            FieldRule::optional("message", Shape::nullable(Shape::string())),
        ]),
    ])
}

/// Category, confidence, and tags of a classified product.
fn classification_body_shape() -> Shape {
    Shape::object(vec![
        FieldRule::required("category", Shape::non_empty_string()),
        FieldRule::optional("confidence", Shape::number_between(0.0, 1.0)),
        FieldRule::optional("tags", Shape::list(Shape::string())),
    ])
}

/// Classification reply, bare or nested under `classification`.
fn classification_shape() -> Shape {
    Shape::one_of(vec![
        classification_body_shape(),
        Shape::object(vec![FieldRule::required("classification", classification_body_shape())]),
    ])
}

/// Admin dashboard counters.
fn admin_stats_shape() -> Shape {
    Shape::object(vec![
        FieldRule::required("status", Shape::non_empty_string()),
        FieldRule::required("total_users", Shape::integer_at_least(0.0)),
        FieldRule::optional("total_products", Shape::integer_at_least(0.0)),
        FieldRule::optional("uptime", Shape::Any),
        FieldRule::optional("server_time", Shape::nullable(Shape::string())),
    ])
}

// ============================================================================
// SECTION: Tests
// ============================================================================
