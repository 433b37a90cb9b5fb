// crates/contract-gate-cli/src/scenarios/products.rs
// ============================================================================
// Module: Product Scenarios
// Description: Listing, CRUD, multipart creation, and idempotent reads.
// Purpose: Exercise the product resource end to end with owned fixtures.
// Dependencies: contract-gate-core, serde_json
// ============================================================================

//! ## Overview
//! Every scenario here that creates a product deletes it in teardown. The
//! CRUD scenario deletes its own fixture during exercise, so its teardown
//! only acts when that delete did not go through.

use contract_gate_core::Checks;
use contract_gate_core::FilePart;
use contract_gate_core::FixtureId;
use contract_gate_core::FnScenario;
use contract_gate_core::Response;
use contract_gate_core::StatusSet;
use contract_gate_core::run_scenario;
use contract_gate_core::runtime::validator::render_value;
use serde_json::Value;
use serde_json::json;

use super::names;
use super::support::ProductFixture;
use super::support::create_product;
use super::support::json_body;
use super::support::is_truthy_flag;
use super::support::label;
use super::support::numeric_value;
use super::support::release_product;
use super::support::unique_name;
use crate::catalog::Catalog;
use crate::catalog::ids;
use crate::error::CliResult;
use crate::idempotence::first_difference;

/// A 1x1 transparent PNG.
const TINY_PNG: [u8; 67] = [
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44, 0x52,
    0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F, 0x15, 0xC4,
    0x89, 0x00, 0x00, 0x00, 0x0A, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00, 0x01, 0x00, 0x00,
    0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49, 0x45, 0x4E, 0x44, 0xAE,
    0x42, 0x60, 0x82,
];

/// Largest difference at which a fetched price still equals the submitted one.
const PRICE_TOLERANCE: f64 = 0.005;

/// Fields that may differ between two reads of the same product.
const READ_EXCLUSIONS: [&str; 2] = ["views", "last_viewed_at"];

// ============================================================================
// SECTION: Listing
// ============================================================================

/// `GET /api/products` returns a list of well-formed products in budget.
pub fn products_list_shape(catalog: &Catalog) -> CliResult<FnScenario> {
    let list = catalog.endpoint(ids::PRODUCTS_LIST)?;
    Ok(FnScenario::new(names::PRODUCTS_LIST_SHAPE, move |ctx| {
        run_scenario(
            ctx,
            |_| Ok(()),
            |ctx, ()| ctx.send(&ctx.endpoint_request(&list, &[])?),
            |ctx, (), response| {
                ctx.checks().endpoint(&list, &response);
                Ok(())
            },
            |_, ()| Ok(()),
        )
    }))
}

// ============================================================================
// SECTION: CRUD Round Trip
// ============================================================================

/// Product fixture plus whether exercise already deleted it.
struct CrudFixture {
    /// Created product.
    product: ProductFixture,
    /// Name sent in the update.
    updated_name: String,
    /// Set once the authenticated delete succeeded.
    deleted: bool,
}

/// Responses collected by the CRUD exercise.
struct CrudObservation {
    /// First read.
    show: Response,
    /// Authenticated update.
    update: Response,
    /// Delete without credentials.
    anonymous_delete: Response,
    /// Authenticated delete.
    delete: Response,
    /// Read after delete.
    after_delete: Response,
}

/// Create, read, update, soft-delete, then read again.
pub fn product_crud_round_trip(catalog: &Catalog) -> CliResult<FnScenario> {
    let create = catalog.endpoint(ids::PRODUCTS_CREATE)?;
    let show = catalog.endpoint(ids::PRODUCTS_SHOW)?;
    let update = catalog.endpoint(ids::PRODUCTS_UPDATE)?;
    let delete = catalog.endpoint(ids::PRODUCTS_DELETE)?;
    Ok(FnScenario::new(names::PRODUCT_CRUD_ROUND_TRIP, move |ctx| {
        run_scenario(
            ctx,
            |ctx| {
                let payload = json!({
                    "name": unique_name("Test Product"),
                    "description": "Test product description",
                    "price": 19.99,
                    "category": "TestCategory",
                });
                Ok(CrudFixture {
                    product: create_product(ctx, &create, payload)?,
                    updated_name: unique_name("Updated Test Product"),
                    deleted: false,
                })
            },
            |ctx, fixture| {
                let id = fixture.product.id.clone();
                let params = [("id", id.as_str())];
                let show_response = ctx.send(&ctx.endpoint_request(&show, &params)?)?;
                let update_request = ctx.endpoint_request(&update, &params)?.json(json!({
                    "name": fixture.updated_name,
                    "description": "Updated product description",
                    "price": 29.99,
                }));
                let update_response = ctx.send(&update_request)?;
                let anonymous = ctx.endpoint_request(&delete, &params)?.without_auth();
                let anonymous_delete = ctx.send(&anonymous)?;
                let delete_response = ctx.send(&ctx.endpoint_request(&delete, &params)?)?;
                fixture.deleted = delete.success.contains(delete_response.status);
                let after_delete = ctx.send(&ctx.endpoint_request(&show, &params)?)?;
                Ok(CrudObservation {
                    show: show_response,
                    update: update_response,
                    anonymous_delete,
                    delete: delete_response,
                    after_delete,
                })
            },
            |ctx, fixture, observed| {
                if ctx.checks().endpoint(&show, &observed.show) {
                    let body = json_body(&show, &observed.show)?;
                    check_matches_submitted(ctx.checks(), &fixture.product.submitted, &body);
                }
                if ctx.checks().status(&label(&update), &observed.update, &update.success)
                    && observed.update.status == 200
                    && let Ok(body) = observed.update.json()
                {
                    ctx.checks().equals(
                        "products.update name",
                        &Value::String(fixture.updated_name.clone()),
                        &body.get("name").cloned().unwrap_or(Value::Null),
                    );
                }
                ctx.checks().status(
                    &format!("{} without credentials", label(&delete)),
                    &observed.anonymous_delete,
                    &StatusSet::unauthorized(),
                );
                ctx.checks().status(&label(&delete), &observed.delete, &delete.success);
                check_soft_deleted(ctx.checks(), &observed.after_delete);
                Ok(())
            },
            |ctx, fixture| {
                if fixture.deleted {
                    return Ok(());
                }
                release_product(ctx, &delete, &fixture.product.id)
            },
        )
    }))
}

/// The first read returns the name, description, and price sent at creation.
fn check_matches_submitted(checks: &mut Checks, submitted: &Value, fetched: &Value) {
    for field in ["name", "description"] {
        checks.equals(
            &format!("products.show {field}"),
            submitted.get(field).unwrap_or(&Value::Null),
            fetched.get(field).unwrap_or(&Value::Null),
        );
    }
    let sent = submitted.get("price").and_then(numeric_value);
    let returned = fetched.get("price").and_then(numeric_value);
    checks.that(
        "products.show price",
        matches!((sent, returned), (Some(sent), Some(returned)) if (sent - returned).abs() < PRICE_TOLERANCE),
        &sent.map_or_else(|| "(unset)".to_string(), |price| price.to_string()),
        fetched.get("price").map_or_else(|| "(absent)".to_string(), render_value),
    );
}

/// A read after delete is `404`, or `200` with a soft-delete flag.
fn check_soft_deleted(checks: &mut Checks, response: &Response) {
    let assertion = "products.show after delete";
    match response.status {
        404 => {}
        200 => {
            let flagged = response
                .json()
                .is_ok_and(|body| is_truthy_flag(body.get("deleted_at")) || is_truthy_flag(body.get("is_deleted")));
            checks.that(assertion, flagged, "deleted_at or is_deleted set", response.body_text());
        }
        _ => {
            checks.that(assertion, false, "404, or 200 flagged deleted", response.status);
        }
    }
}

// ============================================================================
// SECTION: Multipart Creation
// ============================================================================

/// Creates a product with an image upload and checks the stored image reference.
pub fn product_create_multipart(catalog: &Catalog) -> CliResult<FnScenario> {
    let create = catalog.endpoint(ids::PRODUCTS_CREATE)?;
    let delete = catalog.endpoint(ids::PRODUCTS_DELETE)?;
    Ok(FnScenario::new(names::PRODUCT_CREATE_MULTIPART, move |ctx| {
        run_scenario(
            ctx,
            |_| Ok(None),
            |ctx, created: &mut Option<FixtureId>| {
                let request = ctx
                    .endpoint_request(&create, &[])?
                    .multipart_field("name", unique_name("Multipart Product"))
                    .multipart_field("description", "A test product created with an image upload")
                    .multipart_field("price", "49.99")
                    .file(FilePart::new("image", "test_image.png", "image/png", TINY_PNG.to_vec()));
                let response = ctx.send(&request)?;
                *created = response
                    .json()
                    .ok()
                    .and_then(|body| body.get("id").and_then(FixtureId::from_json));
                Ok(response)
            },
            |ctx, _, response| {
                if !ctx.checks().endpoint(&create, &response) {
                    return Ok(());
                }
                let body = json_body(&create, &response)?;
                let image = body
                    .get("image_url")
                    .or_else(|| body.get("image"))
                    .and_then(Value::as_str)
                    .unwrap_or_default();
                ctx.checks().that(
                    "products.create image reference",
                    !image.trim().is_empty(),
                    "non-empty image_url or image",
                    if image.is_empty() { "(absent)" } else { image },
                );
                Ok(())
            },
            |ctx, created| match created {
                Some(id) => release_product(ctx, &delete, &id),
                None => Ok(()),
            },
        )
    }))
}

// ============================================================================
// SECTION: Idempotent Read
// ============================================================================

/// Two reads of the same product agree apart from volatile fields.
pub fn idempotent_product_read(catalog: &Catalog) -> CliResult<FnScenario> {
    let create = catalog.endpoint(ids::PRODUCTS_CREATE)?;
    let show = catalog.endpoint(ids::PRODUCTS_SHOW)?;
    let delete = catalog.endpoint(ids::PRODUCTS_DELETE)?;
    Ok(FnScenario::new(names::IDEMPOTENT_PRODUCT_READ, move |ctx| {
        run_scenario(
            ctx,
            |ctx| {
                let payload = json!({
                    "name": unique_name("Idempotent Product"),
                    "description": "Read twice",
                    "price": 12.5,
                });
                create_product(ctx, &create, payload)
            },
            |ctx, fixture| {
                let request = ctx.endpoint_request(&show, &[("id", fixture.id.as_str())])?;
                let first = ctx.send(&request)?;
                let second = ctx.send(&request)?;
                Ok((first, second))
            },
            |ctx, _, (first, second)| {
                let first_ok = ctx.checks().endpoint(&show, &first);
                let second_ok = ctx.checks().endpoint(&show, &second);
                if first_ok && second_ok {
                    let a = json_body(&show, &first)?;
                    let b = json_body(&show, &second)?;
                    if let Some(diff) = first_difference(&a, &b, &READ_EXCLUSIONS) {
                        ctx.checks().that(
                            &format!("products.show repeated read {}", diff.path),
                            false,
                            &diff.first,
                            diff.second,
                        );
                    }
                }
                Ok(())
            },
            |ctx, fixture| release_product(ctx, &delete, &fixture.id),
        )
    }))
}
