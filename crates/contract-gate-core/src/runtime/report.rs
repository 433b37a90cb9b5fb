// crates/contract-gate-core/src/runtime/report.rs
// ============================================================================
// Module: Contract Gate Report Sink
// Description: Accumulates scenario outcomes into a terminal summary.
// Purpose: Provide the single externally consumed result of a run.
// Dependencies: crate::core, serde
// ============================================================================

//! ## Overview
//! A [`Report`] records every [`ScenarioOutcome`] without stopping at the
//! first failure. [`Report::summary`] condenses it into totals plus the
//! ordered failures of each failed scenario.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt::Write as _;

use serde::Serialize;

use crate::core::identifiers::ScenarioName;
use crate::core::outcome::Failure;
use crate::core::outcome::ScenarioOutcome;

// ============================================================================
// SECTION: Summary
// ============================================================================

/// One failed scenario in a summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedScenario {
    /// Scenario name.
    pub name: ScenarioName,
    /// Failures in recording order.
    pub failures: Vec<Failure>,
}

/// Terminal summary of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    /// Scenarios recorded.
    pub total: usize,
    /// Scenarios that passed.
    pub passed: usize,
    /// Scenarios that failed.
    pub failed: usize,
    /// Failed scenarios in recording order.
    pub failed_scenarios: Vec<FailedScenario>,
}

impl Summary {
    /// Renders the summary for a terminal.
    #[must_use]
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "{} scenarios: {} passed, {} failed",
            self.total, self.passed, self.failed
        );
        for scenario in &self.failed_scenarios {
            let _ = writeln!(out, "FAIL {}", scenario.name);
            for failure in &scenario.failures {
                let _ = writeln!(out, "  {failure}");
            }
        }
        out
    }
}

// ============================================================================
// SECTION: Report
// ============================================================================

/// Append-only collection of scenario outcomes.
#[derive(Debug, Clone, Default)]
pub struct Report {
    /// Outcomes in recording order.
    outcomes: Vec<ScenarioOutcome>,
}

impl Report {
    /// Creates an empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an outcome.
    pub fn record(&mut self, outcome: ScenarioOutcome) {
        self.outcomes.push(outcome);
    }

    /// Outcomes in recording order.
    #[must_use]
    pub fn outcomes(&self) -> &[ScenarioOutcome] {
        &self.outcomes
    }

    /// Returns true when every recorded scenario passed.
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.outcomes.iter().all(ScenarioOutcome::passed)
    }

    /// Condenses the report.
    #[must_use]
    pub fn summary(&self) -> Summary {
        let failed_scenarios: Vec<FailedScenario> = self
            .outcomes
            .iter()
            .filter(|outcome| !outcome.passed())
            .map(|outcome| FailedScenario {
                name: outcome.name().clone(),
                failures: outcome.failures().to_vec(),
            })
            .collect();
        Summary {
            total: self.outcomes.len(),
            passed: self.outcomes.len() - failed_scenarios.len(),
            failed: failed_scenarios.len(),
            failed_scenarios,
        }
    }
}

impl Extend<ScenarioOutcome> for Report {
    fn extend<I: IntoIterator<Item = ScenarioOutcome>>(&mut self, iter: I) {
        self.outcomes.extend(iter);
    }
}
