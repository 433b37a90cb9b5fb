// system-tests/tests/suites/cli_end_to_end.rs
// ============================================================================
// Module: CLI End-to-End Tests
// Description: Drives the contract-gate binary against the stub storefront.
// Purpose: Pin exit codes, JSON output, and artifacts of real runs.
// Dependencies: system-tests helpers, serde_json, tempfile
// ============================================================================

use std::fs;
use std::path::Path;

use contract_gate_cli::scenarios::names;
use serde_json::Value;

use crate::helpers::cli::cli_binary;
use crate::helpers::cli::run_cli;
use crate::helpers::storefront_stub::ADMIN;
use crate::helpers::storefront_stub::Faults;
use crate::helpers::storefront_stub::StubStorefront;

fn write_config(dir: &Path, base_url: &str) -> String {
    let path = dir.join("contract-gate.toml");
    let body = format!(
        "[target]\nbase_url = \"{base_url}\"\n\n[auth]\nvalid_token = \"{token}\"\n",
        token = ADMIN.token
    );
    fs::write(&path, body).expect("write config");
    path.to_string_lossy().into_owned()
}

#[test]
fn json_run_passes_and_writes_artifacts() {
    let binary = cli_binary().expect("contract-gate binary");
    let stub = StubStorefront::start(Faults::default()).expect("start stub storefront");
    let dir = tempfile::tempdir().expect("tempdir");
    let config = write_config(dir.path(), stub.base_url());
    let out = dir.path().join("reports");
    let out_arg = out.to_string_lossy().into_owned();

    let output = run_cli(
        &binary,
        dir.path(),
        &[
            "run",
            "--config",
            &config,
            "--only",
            names::AUTH_USER_MATRIX,
            "--only",
            names::PRODUCT_CRUD_ROUND_TRIP,
            "--only",
            names::PRICE_SEARCH_ROUND_TRIP,
            "--format",
            "json",
            "--output-dir",
            &out_arg,
        ],
    )
    .expect("run cli");

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let document: Value = serde_json::from_slice(&output.stdout).expect("stdout is JSON");
    assert_eq!(document["run"]["status"], "passed");
    assert_eq!(document["run"]["base_url"], stub.base_url());
    assert_eq!(document["outcomes"].as_array().map(Vec::len), Some(3));
    for artifact in ["summary.json", "outcomes.json", "summary.md"] {
        assert!(out.join(artifact).is_file(), "{artifact} missing");
    }
    assert!(stub.request_count() > 0);
}

#[test]
fn broken_contract_exits_non_zero_with_reason() {
    let binary = cli_binary().expect("contract-gate binary");
    let stub = StubStorefront::start(Faults {
        wrong_best_offer: true,
        ..Faults::default()
    })
    .expect("start stub storefront");
    let dir = tempfile::tempdir().expect("tempdir");
    let config = write_config(dir.path(), stub.base_url());
    let out = dir.path().join("reports");
    let out_arg = out.to_string_lossy().into_owned();

    let output = run_cli(
        &binary,
        dir.path(),
        &["run", "--config", &config, "--only", names::BEST_OFFER_LOWEST_PRICE, "--output-dir", &out_arg],
    )
    .expect("run cli");

    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(&format!("FAIL {}", names::BEST_OFFER_LOWEST_PRICE)), "stdout: {stdout}");
    assert!(stdout.contains("best offer price is the lowest"), "stdout: {stdout}");
    let markdown = fs::read_to_string(out.join("summary.md")).expect("summary.md");
    assert!(markdown.contains("- Status: failed"));
}
