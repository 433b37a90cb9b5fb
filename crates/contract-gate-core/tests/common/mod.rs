// crates/contract-gate-core/tests/common/mod.rs
// ============================================================================
// Module: Contract Gate Core Test Support
// Description: Scripted and simulated transports for runtime tests.
// Purpose: Exercise runtime components without a network.
// Dependencies: contract-gate-core
// ============================================================================

//! ## Overview
//! [`ScriptedTransport`] replays queued responses and records every request.
//! [`BudgetTransport`] simulates a server enforcing a fixed request budget.

#![allow(
    dead_code,
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only helpers; each test binary uses a different subset."
)]

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use contract_gate_core::Harness;
use contract_gate_core::RequestSpec;
use contract_gate_core::Response;
use contract_gate_core::Transport;
use contract_gate_core::TransportError;

// ============================================================================
// SECTION: Scripted Transport
// ============================================================================

/// Replays queued results in order, then a fallback.
#[derive(Default)]
pub struct ScriptedTransport {
    /// Queued results.
    script: Mutex<VecDeque<Result<Response, TransportError>>>,
    /// Response used once the script is exhausted.
    fallback: Option<Response>,
    /// Every request received.
    sent: Mutex<Vec<RequestSpec>>,
}

impl ScriptedTransport {
    /// Creates an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the response used after the script runs out.
    pub fn with_fallback(mut self, response: Response) -> Self {
        self.fallback = Some(response);
        self
    }

    /// Queues a result.
    pub fn push(&self, result: Result<Response, TransportError>) -> &Self {
        self.script.lock().unwrap().push_back(result);
        self
    }

    /// Queues an empty response with `status`.
    pub fn push_status(&self, status: u16) -> &Self {
        self.push(Ok(Response::new(status)))
    }

    /// Requests received so far.
    pub fn sent(&self) -> Vec<RequestSpec> {
        self.sent.lock().unwrap().clone()
    }

    /// Number of requests received.
    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

impl Transport for ScriptedTransport {
    fn send(&self, request: &RequestSpec) -> Result<Response, TransportError> {
        self.sent.lock().unwrap().push(request.clone());
        if let Some(next) = self.script.lock().unwrap().pop_front() {
            return next;
        }
        self.fallback
            .clone()
            .ok_or_else(|| TransportError::Exchange("script exhausted".to_string()))
    }
}

// ============================================================================
// SECTION: Budget Transport
// ============================================================================

/// Returns 200 for the first `budget` requests and 429 afterward.
pub struct BudgetTransport {
    /// Requests allowed before throttling.
    budget: usize,
    /// Requests received.
    count: AtomicUsize,
}

impl BudgetTransport {
    /// Creates a server that allows `budget` requests.
    pub fn new(budget: usize) -> Self {
        Self {
            budget,
            count: AtomicUsize::new(0),
        }
    }

    /// Requests received so far.
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

impl Transport for BudgetTransport {
    fn send(&self, _request: &RequestSpec) -> Result<Response, TransportError> {
        let seen = self.count.fetch_add(1, Ordering::SeqCst);
        let remaining = self.budget.saturating_sub(seen + 1);
        if seen < self.budget {
            Ok(Response::new(200)
                .with_header("X-RateLimit-Limit", &self.budget.to_string())
                .with_header("X-RateLimit-Remaining", &remaining.to_string()))
        } else {
            Ok(Response::new(429).with_header("Retry-After", "60"))
        }
    }
}

// ============================================================================
// SECTION: Harness Helpers
// ============================================================================

/// Base URL used by test harnesses.
pub const BASE_URL: &str = "http://storefront.test";

/// Builds a harness over `transport` with default settings.
pub fn harness_with(transport: Arc<dyn Transport>) -> Harness {
    Harness::new(transport, BASE_URL)
}
