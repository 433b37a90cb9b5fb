// crates/contract-gate-cli/src/artifacts.rs
// ============================================================================
// Module: Run Artifacts
// Description: Summary and outcome files written after a suite run.
// Purpose: Leave a deterministic record of each run for CI and humans.
// Dependencies: contract-gate-core, serde, serde_jcs, time
// ============================================================================

//! ## Overview
//! A run directory holds three files:
//! - `summary.json`: the [`RunSummary`] in canonical JCS form.
//! - `outcomes.json`: every scenario outcome in canonical JCS form.
//! - `summary.md`: the same summary laid out for a reviewer.
//!
//! JCS keeps the JSON byte-stable, so two runs with the same outcomes diff
//! only in timing fields.

use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use contract_gate_core::Report;
use contract_gate_core::ScenarioOutcome;
use contract_gate_core::Summary;
use serde::Serialize;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::error::CliError;
use crate::error::CliResult;

// ============================================================================
// SECTION: File Names
// ============================================================================

/// Canonical JSON summary.
pub const SUMMARY_JSON: &str = "summary.json";
/// Canonical JSON outcomes.
pub const OUTCOMES_JSON: &str = "outcomes.json";
/// Markdown summary.
pub const SUMMARY_MD: &str = "summary.md";

// ============================================================================
// SECTION: Run Summary
// ============================================================================

/// Run-level facts plus the report summary.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// Target deployment.
    pub base_url: String,
    /// `passed` or `failed`.
    pub status: &'static str,
    /// RFC 3339 start time (UTC).
    pub started_at: String,
    /// Wall-clock duration of the whole suite.
    pub duration_ms: u64,
    /// Scenario counts and failures.
    pub summary: Summary,
}

impl RunSummary {
    /// Condenses `report` into a run summary.
    #[must_use]
    pub fn from_report(base_url: &str, started_at: OffsetDateTime, duration: Duration, report: &Report) -> Self {
        Self {
            base_url: base_url.to_string(),
            status: if report.all_passed() { "passed" } else { "failed" },
            started_at: started_at.format(&Rfc3339).unwrap_or_else(|_| started_at.unix_timestamp().to_string()),
            duration_ms: u64::try_from(duration.as_millis()).unwrap_or(u64::MAX),
            summary: report.summary(),
        }
    }
}

/// Stdout document for `--format json`.
#[derive(Debug, Serialize)]
pub struct RunDocument<'a> {
    /// Run summary.
    pub run: &'a RunSummary,
    /// Every outcome in suite order.
    pub outcomes: &'a [ScenarioOutcome],
}

// ============================================================================
// SECTION: Writers
// ============================================================================

/// Writes all run artifacts under `dir` and returns their paths.
///
/// # Errors
///
/// Returns [`CliError::Artifact`] when the directory or a file cannot be
/// written.
pub fn write_run(dir: &Path, run: &RunSummary, report: &Report) -> CliResult<Vec<PathBuf>> {
    fs::create_dir_all(dir).map_err(|err| artifact_error(dir, &err))?;
    let summary = write_json(dir, SUMMARY_JSON, run)?;
    let outcomes = write_json(dir, OUTCOMES_JSON, report.outcomes())?;
    let markdown = write_text(dir, SUMMARY_MD, &summary_markdown(run, &[SUMMARY_JSON, OUTCOMES_JSON]))?;
    Ok(vec![summary, outcomes, markdown])
}

/// Writes a JSON artifact using canonical JCS serialization.
fn write_json<T: Serialize + ?Sized>(dir: &Path, name: &str, value: &T) -> CliResult<PathBuf> {
    let path = dir.join(name);
    let bytes = serde_jcs::to_vec(value).map_err(|err| artifact_error(&path, &err))?;
    fs::write(&path, bytes).map_err(|err| artifact_error(&path, &err))?;
    Ok(path)
}

/// Writes a UTF-8 text artifact.
fn write_text(dir: &Path, name: &str, value: &str) -> CliResult<PathBuf> {
    let path = dir.join(name);
    fs::write(&path, value.as_bytes()).map_err(|err| artifact_error(&path, &err))?;
    Ok(path)
}

/// Wraps an I/O or serialization failure with its path.
fn artifact_error(path: &Path, err: &dyn std::error::Error) -> CliError {
    CliError::Artifact {
        path: path.to_path_buf(),
        reason: err.to_string(),
    }
}

/// Markdown rendering of a run summary.
#[must_use]
pub fn summary_markdown(run: &RunSummary, artifacts: &[&str]) -> String {
    let mut out = String::new();
    out.push_str("# Contract Gate Summary\n\n");
    out.push_str("## Status\n\n");
    out.push_str(&format!("- Target: {}\n", run.base_url));
    out.push_str(&format!("- Status: {}\n", run.status));
    out.push_str(&format!("- Started: {}\n", run.started_at));
    out.push_str(&format!("- Duration (ms): {}\n", run.duration_ms));
    out.push_str(&format!(
        "- Scenarios: {} total, {} passed, {} failed\n",
        run.summary.total, run.summary.passed, run.summary.failed
    ));
    out.push_str("\n## Notes\n\n");
    if run.summary.failed_scenarios.is_empty() {
        out.push_str("- None\n");
    } else {
        for scenario in &run.summary.failed_scenarios {
            for failure in &scenario.failures {
                out.push_str(&format!("- {}: {failure}\n", scenario.name));
            }
        }
    }
    out.push_str("\n## Artifacts\n\n");
    if artifacts.is_empty() {
        out.push_str("- None\n");
    } else {
        for artifact in artifacts {
            out.push_str(&format!("- {artifact}\n"));
        }
    }
    out
}
