// crates/contract-gate-core/src/core/outcome.rs
// ============================================================================
// Module: Contract Gate Scenario Outcomes
// Description: Failure records and finalized scenario outcomes.
// Purpose: Carry concrete expected-vs-actual evidence from scenarios to reports.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Every recorded [`Failure`] names the assertion plus the literal expected and
//! actual values, so a failed scenario can be reproduced from the report alone.
//! A [`ScenarioOutcome`] is built once by [`ScenarioOutcome::finalize`] and
//! exposes only read accessors afterward.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Serialize;
use serde::Serializer;

use crate::core::identifiers::ScenarioName;

// ============================================================================
// SECTION: Failure Kinds
// ============================================================================

/// Classification of a recorded failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Connection, DNS, or timeout failure.
    Transport,
    /// Response body violated its schema contract.
    Validation,
    /// Status outside the acceptable set.
    UnexpectedStatus,
    /// Burst probe never observed throttling.
    RateLimitNotEnforced,
    /// Latency exceeded its budget.
    Timing,
    /// Generic value assertion.
    Assertion,
    /// Setup phase failed.
    Setup,
    /// Teardown phase failed.
    Teardown,
    /// Scenario was cancelled before completion.
    Cancelled,
    /// A phase panicked.
    Panic,
}

impl FailureKind {
    /// Returns the stable wire label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Transport => "transport",
            Self::Validation => "validation",
            Self::UnexpectedStatus => "unexpected_status",
            Self::RateLimitNotEnforced => "rate_limit_not_enforced",
            Self::Timing => "timing",
            Self::Assertion => "assertion",
            Self::Setup => "setup",
            Self::Teardown => "teardown",
            Self::Cancelled => "cancelled",
            Self::Panic => "panic",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Failure
// ============================================================================

/// One failed expectation with its literal inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    /// Failure classification.
    pub kind: FailureKind,
    /// What was being checked (for example `GET /api/products status`).
    pub assertion: String,
    /// Expected value, rendered.
    pub expected: String,
    /// Observed value, rendered.
    pub actual: String,
}

impl Failure {
    /// Creates a failure record.
    #[must_use]
    pub fn new(
        kind: FailureKind,
        assertion: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            assertion: assertion.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: expected {}, got {}",
            self.kind, self.assertion, self.expected, self.actual
        )
    }
}

// ============================================================================
// SECTION: Lanes
// ============================================================================

/// Scheduling lane of a scenario.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Lane {
    /// May run concurrently with other parallel scenarios.
    #[default]
    Parallel,
    /// Runs alone, after the parallel lane, serialized by tag.
    Exclusive(String),
}

impl Lane {
    /// Exclusive lane for scenarios that drive server-side rate limits.
    #[must_use]
    pub fn rate_limit() -> Self {
        Self::Exclusive("rate-limit".to_string())
    }

    /// Returns true for exclusive lanes.
    #[must_use]
    pub const fn is_exclusive(&self) -> bool {
        matches!(self, Self::Exclusive(_))
    }
}

impl fmt::Display for Lane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parallel => f.write_str("parallel"),
            Self::Exclusive(tag) => write!(f, "exclusive:{tag}"),
        }
    }
}

impl Serialize for Lane {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

// ============================================================================
// SECTION: Scenario Outcome
// ============================================================================

/// Finalized result of one scenario run.
///
/// # Invariants
/// - `passed` is true exactly when `failures` is empty.
/// - Failures are kept in the order they were recorded; the first one decides
///   why the scenario failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScenarioOutcome {
    /// Scenario name.
    name: ScenarioName,
    /// Pass/fail verdict.
    passed: bool,
    /// Recorded failures in order.
    failures: Vec<Failure>,
    /// Wall-clock duration in milliseconds.
    elapsed_ms: u64,
    /// Lane the scenario ran in.
    lane: Lane,
}

impl ScenarioOutcome {
    /// Seals an outcome from the failures recorded during a run.
    #[must_use]
    pub fn finalize(name: ScenarioName, lane: Lane, failures: Vec<Failure>, elapsed_ms: u64) -> Self {
        Self {
            name,
            passed: failures.is_empty(),
            failures,
            elapsed_ms,
            lane,
        }
    }

    /// Outcome for a scenario that never started because the run was cancelled.
    #[must_use]
    pub fn not_started(name: ScenarioName, lane: Lane, reason: &str) -> Self {
        let failure = Failure::new(FailureKind::Cancelled, "scenario start", "scenario to run", reason);
        Self::finalize(name, lane, vec![failure], 0)
    }

    /// Scenario name.
    #[must_use]
    pub const fn name(&self) -> &ScenarioName {
        &self.name
    }

    /// Whether the scenario passed.
    #[must_use]
    pub const fn passed(&self) -> bool {
        self.passed
    }

    /// Recorded failures in order.
    #[must_use]
    pub fn failures(&self) -> &[Failure] {
        &self.failures
    }

    /// The failure that decided the verdict, if any.
    #[must_use]
    pub fn first_failure(&self) -> Option<&Failure> {
        self.failures.first()
    }

    /// Wall-clock duration in milliseconds.
    #[must_use]
    pub const fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    /// Lane the scenario ran in.
    #[must_use]
    pub const fn lane(&self) -> &Lane {
        &self.lane
    }
}
