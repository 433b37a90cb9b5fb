// crates/contract-gate-core/src/runtime/scheduler.rs
// ============================================================================
// Module: Contract Gate Suite Scheduler
// Description: Lane-aware execution of a scenario suite.
// Purpose: Run independent scenarios concurrently and serialize exclusive ones.
// Dependencies: crate::{core, runtime}, tracing
// ============================================================================

//! ## Overview
//! [`SuiteRunner::run`] executes parallel-lane scenarios on a bounded pool of
//! scoped worker threads, then exclusive-lane scenarios one at a time. Server
//! rate-limit counters are shared state the harness cannot control, so
//! throttle probes never overlap with each other or with the parallel lane.
//!
//! Invariants:
//! - Outcomes are returned in submission order, whatever the completion order.
//! - Each scenario runs at most once; scenarios reached after cancellation are
//!   reported as `cancelled` without running.
//! - A panic escaping a scenario is recorded as that scenario's failure.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::panic::AssertUnwindSafe;
use std::panic::catch_unwind;
use std::sync::Mutex;
use std::sync::PoisonError;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::thread;

use tracing::info;

use crate::core::outcome::Failure;
use crate::core::outcome::FailureKind;
use crate::core::outcome::ScenarioOutcome;
use crate::runtime::orchestrator::Harness;
use crate::runtime::orchestrator::Scenario;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default number of parallel-lane workers.
pub const DEFAULT_WORKERS: usize = 4;

// ============================================================================
// SECTION: Suite Runner
// ============================================================================

/// Runs a suite against one harness.
pub struct SuiteRunner<'a> {
    /// Shared run environment.
    harness: &'a Harness,
    /// Parallel-lane worker count (at least one).
    workers: usize,
}

impl<'a> SuiteRunner<'a> {
    /// Creates a runner with [`DEFAULT_WORKERS`] workers.
    #[must_use]
    pub const fn new(harness: &'a Harness) -> Self {
        Self {
            harness,
            workers: DEFAULT_WORKERS,
        }
    }

    /// Sets the parallel-lane worker count. Zero is treated as one.
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Runs every scenario and returns outcomes in submission order.
    #[must_use]
    pub fn run(&self, scenarios: &[Box<dyn Scenario>]) -> Vec<ScenarioOutcome> {
        let (exclusive, parallel): (Vec<usize>, Vec<usize>) =
            (0 .. scenarios.len()).partition(|index| scenarios[*index].lane().is_exclusive());
        info!(
            parallel = parallel.len(),
            exclusive = exclusive.len(),
            workers = self.workers,
            "suite started"
        );

        let slots: Mutex<Vec<Option<ScenarioOutcome>>> = Mutex::new(vec![None; scenarios.len()]);
        let store = |index: usize, outcome: ScenarioOutcome| {
            let mut guard = slots.lock().unwrap_or_else(PoisonError::into_inner);
            guard[index] = Some(outcome);
        };

        let next = AtomicUsize::new(0);
        let pool = self.workers.min(parallel.len());
        thread::scope(|scope| {
            for _ in 0 .. pool {
                scope.spawn(|| {
                    loop {
                        let cursor = next.fetch_add(1, Ordering::SeqCst);
                        let Some(&index) = parallel.get(cursor) else {
                            break;
                        };
                        store(index, self.run_one(scenarios[index].as_ref()));
                    }
                });
            }
        });

        for index in exclusive {
            store(index, self.run_one(scenarios[index].as_ref()));
        }

        let outcomes: Vec<ScenarioOutcome> =
            slots.into_inner().unwrap_or_else(PoisonError::into_inner).into_iter().flatten().collect();
        let passed = outcomes.iter().filter(|outcome| outcome.passed()).count();
        info!(total = outcomes.len(), passed, "suite finished");
        outcomes
    }

    /// Runs one scenario, or reports it cancelled if the run is over.
    fn run_one(&self, scenario: &dyn Scenario) -> ScenarioOutcome {
        let name = scenario.name();
        let lane = scenario.lane();
        if let Some(reason) = self.harness.cancel().reason() {
            return ScenarioOutcome::not_started(name, lane, reason);
        }
        let mut ctx = self.harness.context(name.clone(), lane.clone());
        catch_unwind(AssertUnwindSafe(|| scenario.run(&mut ctx))).unwrap_or_else(|_| {
            let failure =
                Failure::new(FailureKind::Panic, "scenario body", "no panic", "scenario panicked");
            ScenarioOutcome::finalize(name, lane, vec![failure], 0)
        })
    }
}
