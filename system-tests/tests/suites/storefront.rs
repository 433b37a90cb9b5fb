// system-tests/tests/suites/storefront.rs
// ============================================================================
// Module: Storefront Suite Tests
// Description: Runs the full storefront suite against the in-process stub.
// Purpose: Prove a conforming storefront passes and each contract break is caught.
// Dependencies: system-tests helpers, contract-gate-cli, contract-gate-core
// ============================================================================

//! ## Overview
//! Every test starts its own [`StubStorefront`], logs in through the real
//! HTTP transport, and runs the whole suite including the rate-limit lane.
//! Fault tests assert the exact set of failing scenarios so a break in one
//! contract never hides behind, or spills into, another.

use std::collections::BTreeSet;
use std::time::Duration;

use contract_gate_cli::RunOptions;
use contract_gate_cli::SuiteRun;
use contract_gate_cli::catalog::result_items;
use contract_gate_cli::run_suite;
use contract_gate_cli::scenarios::names;
use contract_gate_cli::suite::http_transport;
use contract_gate_config::ContractGateConfig;
use contract_gate_core::Failure;
use contract_gate_core::FailureKind;
use contract_gate_core::FilePart;
use contract_gate_core::HttpMethod;
use contract_gate_core::RequestSpec;
use serde_json::Value;

use crate::helpers::artifacts::TestArtifacts;
use crate::helpers::storefront_stub::ADMIN;
use crate::helpers::storefront_stub::CUSTOMER;
use crate::helpers::storefront_stub::Faults;
use crate::helpers::storefront_stub::StubStorefront;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn stub_config(base_url: &str, extra: &str) -> ContractGateConfig {
    let toml = format!(
        r#"
[target]
base_url = "{base_url}"

[auth.login]
path = "/api/login"
email = "{admin_email}"
password = "{admin_password}"

[auth.wrong_role_login]
path = "/api/login"
email = "{customer_email}"
password = "{customer_password}"

{extra}
"#,
        admin_email = ADMIN.email,
        admin_password = ADMIN.password,
        customer_email = CUSTOMER.email,
        customer_password = CUSTOMER.password,
    );
    ContractGateConfig::parse_str(&toml).expect("stub config parses")
}

fn run_against(faults: Faults, extra: &str) -> SuiteRun {
    let stub = StubStorefront::start(faults).expect("start stub storefront");
    let config = stub_config(stub.base_url(), extra);
    let transport = http_transport(&config).expect("build http transport");
    run_suite(&config, transport, &RunOptions::default()).expect("suite runs")
}

fn failed_names(run: &SuiteRun) -> BTreeSet<String> {
    run.summary.summary.failed_scenarios.iter().map(|failed| failed.name.to_string()).collect()
}

fn failures_of<'a>(run: &'a SuiteRun, name: &str) -> &'a [Failure] {
    run.summary
        .summary
        .failed_scenarios
        .iter()
        .find(|failed| failed.name.as_str() == name)
        .map(|failed| failed.failures.as_slice())
        .unwrap_or_default()
}

fn expect_failed(run: &SuiteRun, expected: &[&str]) {
    let expected: BTreeSet<String> = expected.iter().map(|name| (*name).to_string()).collect();
    assert_eq!(failed_names(run), expected, "{}", run.summary.summary.render_text());
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn conforming_storefront_passes_every_scenario() {
    let run = run_against(Faults::default(), "");

    let artifacts = TestArtifacts::new("conforming_storefront_passes_every_scenario").expect("artifacts");
    let written = artifacts.record_run(&run).expect("record run");
    assert_eq!(written.len(), 3);

    assert!(run.report.all_passed(), "{}", run.summary.summary.render_text());
    assert_eq!(run.summary.summary.total, 13);
    assert_eq!(run.summary.status, "passed");
}

#[test]
fn multipart_upload_lands_in_the_paginated_listing() {
    let stub = StubStorefront::start(Faults::default()).expect("start stub storefront");
    let config = stub_config(stub.base_url(), "");
    let transport = http_transport(&config).expect("build http transport");

    let upload = RequestSpec::new(HttpMethod::Post, format!("{}/api/products", stub.base_url()))
        .multipart_field("name", "Desk Lamp")
        .multipart_field("price", "24.50")
        .multipart_field("brand", "Lumen")
        .file(FilePart::new("image", "lamp.png", "image/png", vec![0x89, b'P', b'N', b'G']));
    let created = transport.send(&upload).expect("upload");
    assert_eq!(created.status, 201, "{}", created.body_text());
    let product = created.json().expect("created product");
    assert_eq!(product["name"], "Desk Lamp");
    assert_eq!(product["price"], 24.5);
    assert!(product["image_url"].as_str().is_some_and(|url| url.ends_with("/lamp.png")), "{product}");

    let listed = transport
        .send(&RequestSpec::new(HttpMethod::Get, format!("{}/api/products", stub.base_url())))
        .expect("list");
    let body = listed.json().expect("listing");
    let items = result_items(&body).expect("data envelope");
    assert_eq!(items.len(), 1);
    assert_eq!(body["total"], 1);
    assert_eq!(items[0]["brand"], serde_json::json!([{"id": 1, "name": "Lumen"}]));
    assert!(items.iter().all(Value::is_object));
}

#[test]
fn ignored_rate_limits_fail_only_the_burst_scenarios() {
    let run = run_against(
        Faults {
            ignore_rate_limits: true,
            ..Faults::default()
        },
        "",
    );

    let bursts = [names::PRODUCTS_LIST_RATE_LIMIT, names::AI_ANALYZE_RATE_LIMIT, names::ADMIN_STATS_RATE_LIMIT];
    expect_failed(&run, &bursts);
    for name in bursts {
        assert!(
            failures_of(&run, name).iter().any(|failure| failure.kind == FailureKind::RateLimitNotEnforced),
            "{name} should report an unenforced budget"
        );
    }
}

#[test]
fn auth_bypass_fails_both_access_matrices() {
    let run = run_against(
        Faults {
            bypass_auth: true,
            ..Faults::default()
        },
        "",
    );

    expect_failed(&run, &[names::AUTH_USER_MATRIX, names::ADMIN_STATS_MATRIX]);
    assert!(failures_of(&run, names::ADMIN_STATS_MATRIX).iter().any(|failure| failure.actual.contains("200")));
}

#[test]
fn forgotten_soft_delete_fails_the_crud_round_trip() {
    let run = run_against(
        Faults {
            forget_soft_delete: true,
            ..Faults::default()
        },
        "",
    );

    expect_failed(&run, &[names::PRODUCT_CRUD_ROUND_TRIP]);
    let failures = failures_of(&run, names::PRODUCT_CRUD_ROUND_TRIP);
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].assertion, "products.show after delete");
}

#[test]
fn wrong_best_offer_is_caught() {
    let run = run_against(
        Faults {
            wrong_best_offer: true,
            ..Faults::default()
        },
        "",
    );

    expect_failed(&run, &[names::BEST_OFFER_LOWEST_PRICE]);
    let failures = failures_of(&run, names::BEST_OFFER_LOWEST_PRICE);
    assert_eq!(failures[0].actual, "10.99");
}

#[test]
fn lenient_analysis_validation_fails_each_malformed_case() {
    let run = run_against(
        Faults {
            accept_invalid_analysis: true,
            ..Faults::default()
        },
        "",
    );

    expect_failed(&run, &[names::AI_ANALYZE_CONTRACT]);
    assert_eq!(failures_of(&run, names::AI_ANALYZE_CONTRACT).len(), 5);
}

#[test]
fn deadline_cancels_unfinished_scenarios() {
    let run = run_against(
        Faults {
            response_delay: Duration::from_millis(100),
            ..Faults::default()
        },
        "[runner]\nworkers = 1\ndeadline_ms = 300",
    );

    assert!(!run.report.all_passed());
    let cancelled = run
        .summary
        .summary
        .failed_scenarios
        .iter()
        .flat_map(|failed| &failed.failures)
        .filter(|failure| failure.kind == FailureKind::Cancelled)
        .count();
    assert!(cancelled > 0, "{}", run.summary.summary.render_text());
    assert_eq!(run.summary.summary.total, 13);
}
