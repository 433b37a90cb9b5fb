// crates/contract-gate-core/tests/validator.rs
// ============================================================================
// Module: Schema Validator Tests
// Description: Contract evaluation over storefront-shaped bodies.
// ============================================================================
//! ## Overview
//! Validates violation kinds, paths, ordering, and `one_of` resolution.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

use contract_gate_core::FieldRule;
use contract_gate_core::SchemaContract;
use contract_gate_core::Shape;
use contract_gate_core::ViolationKind;
use contract_gate_core::validate;
use contract_gate_core::validate_json;
use serde_json::json;

// ============================================================================
// SECTION: Fixtures
// ============================================================================

fn offer_shape() -> Shape {
    Shape::object(vec![
        FieldRule::required("store", Shape::non_empty_string()),
        FieldRule::required("price", Shape::positive_number()),
    ])
}

fn price_search_contract() -> SchemaContract {
    SchemaContract::new(Shape::list(Shape::object(vec![
        FieldRule::required("product_id", Shape::integer()),
        FieldRule::required("product_name", Shape::non_empty_string()),
        FieldRule::required("offers", Shape::non_empty_list(offer_shape())),
    ])))
}

fn brand_contract() -> SchemaContract {
    let brand = Shape::object(vec![FieldRule::required("name", Shape::non_empty_string())]);
    SchemaContract::new(Shape::object(vec![
        FieldRule::required("id", Shape::integer()),
        FieldRule::required("brand", Shape::one_of(vec![brand.clone(), Shape::non_empty_list(brand)])),
    ]))
}

// ============================================================================
// SECTION: Basic Checks
// ============================================================================

#[test]
fn conforming_body_has_no_violations() {
    let body = json!([
        {
            "product_id": 7,
            "product_name": "SuperGaming Laptop",
            "offers": [{"store": "Acme", "price": 1299.99}, {"store": "Bolt", "price": 1250}],
            "extra": {"ignored": true}
        }
    ]);
    let result = validate(&body, &price_search_contract());
    assert!(result.ok(), "{:?}", result.violations());
}

#[test]
fn missing_field_yields_one_violation_and_no_recursion() {
    let body = json!([{ "product_id": 7, "product_name": "Laptop" }]);
    let result = validate(&body, &price_search_contract());
    assert_eq!(result.violations().len(), 1);
    let violation = &result.violations()[0];
    assert_eq!(violation.path, "$[0].offers");
    assert_eq!(violation.kind, ViolationKind::MissingField);
    assert_eq!(violation.actual, "absent");
}

#[test]
fn nested_violation_paths_are_rooted() {
    let body = json!([
        {"product_id": 7, "product_name": "Laptop", "offers": [{"store": "Acme", "price": 0}]}
    ]);
    let result = validate(&body, &price_search_contract());
    assert_eq!(result.violations().len(), 1);
    let violation = &result.violations()[0];
    assert_eq!(violation.path, "$[0].offers[0].price");
    assert_eq!(violation.kind, ViolationKind::OutOfBounds);
    assert_eq!(violation.expected, "> 0");
    assert_eq!(violation.actual, "0");
}

#[test]
fn integers_and_floats_are_interchangeable_for_numbers() {
    let contract = SchemaContract::new(Shape::object(vec![FieldRule::required(
        "confidence",
        Shape::number_between(0.0, 1.0),
    )]));
    assert!(validate(&json!({"confidence": 1}), &contract).ok());
    assert!(validate(&json!({"confidence": 0.85}), &contract).ok());
    let result = validate(&json!({"confidence": 1.5}), &contract);
    assert_eq!(result.violations()[0].expected, "<= 1");
}

#[test]
fn integer_shape_rejects_fractional_values() {
    let contract = SchemaContract::new(Shape::object(vec![FieldRule::required("id", Shape::integer())]));
    let result = validate(&json!({"id": 1.5}), &contract);
    assert_eq!(result.violations()[0].kind, ViolationKind::TypeMismatch);
    assert_eq!(result.violations()[0].expected, "integer");
}

#[test]
fn integer_shape_requires_an_integer_literal() {
    let contract = SchemaContract::new(Shape::object(vec![FieldRule::required("id", Shape::integer())]));
    assert!(validate(&json!({"id": 5}), &contract).ok());
    let whole_float = validate(&json!({"id": 5.0}), &contract);
    assert_eq!(whole_float.violations().len(), 1);
    assert_eq!(whole_float.violations()[0].kind, ViolationKind::TypeMismatch);
}

#[test]
fn whitespace_string_violates_non_empty() {
    let contract = SchemaContract::new(Shape::object(vec![FieldRule::required(
        "store",
        Shape::non_empty_string(),
    )]));
    let result = validate(&json!({"store": "   "}), &contract);
    assert_eq!(result.violations()[0].kind, ViolationKind::EmptyString);
}

#[test]
fn violations_follow_contract_order() {
    let contract = SchemaContract::new(Shape::object(vec![
        FieldRule::required("a", Shape::string()),
        FieldRule::required("b", Shape::Bool),
        FieldRule::required("c", Shape::integer()),
    ]));
    let result = validate(&json!({"c": "x", "a": 1}), &contract);
    let paths: Vec<&str> = result.violations().iter().map(|v| v.path.as_str()).collect();
    assert_eq!(paths, vec!["$.a", "$.b", "$.c"]);
}

#[test]
fn optional_fields_are_checked_only_when_present() {
    let contract = SchemaContract::new(Shape::object(vec![FieldRule::optional(
        "deleted_at",
        Shape::nullable(Shape::string()),
    )]));
    assert!(validate(&json!({}), &contract).ok());
    assert!(validate(&json!({"deleted_at": null}), &contract).ok());
    assert!(!validate(&json!({"deleted_at": 5}), &contract).ok());
}

#[test]
fn too_few_items_is_reported() {
    let contract = SchemaContract::new(Shape::non_empty_list(Shape::Any));
    let result = validate(&json!([]), &contract);
    assert_eq!(result.violations()[0].kind, ViolationKind::TooFewItems);
    assert_eq!(result.violations()[0].actual, "0 items");
}

#[test]
fn odd_field_names_use_bracket_paths() {
    let contract = SchemaContract::new(Shape::object(vec![FieldRule::required(
        "x-rate limit",
        Shape::integer(),
    )]));
    let result = validate(&json!({}), &contract);
    assert_eq!(result.violations()[0].path, "$[\"x-rate limit\"]");
}

// ============================================================================
// SECTION: One Of
// ============================================================================

#[test]
fn one_of_accepts_either_declared_variant() {
    let contract = brand_contract();
    assert!(validate(&json!({"id": 1, "brand": {"name": "Acme"}}), &contract).ok());
    assert!(validate(&json!({"id": 1, "brand": [{"name": "Acme"}]}), &contract).ok());
}

#[test]
fn one_of_reports_kind_matching_variant_violations() {
    let result = validate(&json!({"id": 1, "brand": [{"name": ""}]}), &brand_contract());
    assert_eq!(result.violations().len(), 1);
    assert_eq!(result.violations()[0].path, "$.brand[0].name");
    assert_eq!(result.violations()[0].kind, ViolationKind::EmptyString);
}

#[test]
fn one_of_with_no_kind_match_reports_single_violation() {
    let result = validate(&json!({"id": 1, "brand": "Acme"}), &brand_contract());
    assert_eq!(result.violations().len(), 1);
    assert_eq!(result.violations()[0].kind, ViolationKind::NoVariantMatched);
    assert_eq!(result.violations()[0].actual, "\"Acme\"");
}

#[test]
fn one_of_prefers_variant_with_fewest_violations() {
    let wrapped = Shape::object(vec![
        FieldRule::required("success", Shape::Bool),
        FieldRule::required(
            "data",
            Shape::object(vec![FieldRule::required("sentiment", Shape::non_empty_string())]),
        ),
    ]);
    let bare = Shape::object(vec![
        FieldRule::required("sentiment", Shape::non_empty_string()),
        FieldRule::required("topics", Shape::list(Shape::string())),
    ]);
    let contract = SchemaContract::new(Shape::one_of(vec![wrapped, bare]));
    let result = validate(&json!({"sentiment": "positive"}), &contract);
    assert_eq!(result.violations().len(), 1);
    assert_eq!(result.violations()[0].path, "$.topics");
}

// ============================================================================
// SECTION: Raw Bodies
// ============================================================================

#[test]
fn non_json_body_is_a_root_type_mismatch() {
    let result = validate_json(b"<html>oops</html>", &price_search_contract());
    assert_eq!(result.violations().len(), 1);
    assert_eq!(result.violations()[0].path, "$");
    assert_eq!(result.violations()[0].kind, ViolationKind::TypeMismatch);
    assert_eq!(result.violations()[0].actual, "<html>oops</html>");
}

#[test]
fn long_actual_values_are_truncated() {
    let contract = SchemaContract::new(Shape::integer());
    let long = "x".repeat(500);
    let result = validate(&json!(long), &contract);
    let actual = &result.violations()[0].actual;
    assert_eq!(actual.chars().count(), 123);
    assert!(actual.ends_with("..."));
}

#[test]
fn contracts_deserialize_from_tagged_json() {
    let contract: SchemaContract = serde_json::from_value(json!({
        "type": "object",
        "fields": [
            {"name": "price", "shape": {"type": "number", "min": {"value": 0, "inclusive": false}}},
            {"name": "tags", "shape": {"type": "list", "items": {"type": "string"}}, "required": false}
        ]
    }))
    .unwrap();
    assert!(validate(&json!({"price": 3}), &contract).ok());
    assert!(!validate(&json!({"price": 0}), &contract).ok());
}
