// crates/contract-gate-core/src/runtime/cancel.rs
// ============================================================================
// Module: Contract Gate Cancellation
// Description: Shared cancellation flag with an optional deadline.
// Purpose: Stop issuing requests once a run is aborted or out of time.
// Dependencies: std
// ============================================================================

//! ## Overview
//! A [`CancelToken`] is checked between requests. In-flight requests are not
//! interrupted; they finish or hit their own timeout. Sleeps performed through
//! the token wake in slices of [`CANCEL_POLL_INTERVAL`] so cancellation is
//! observed promptly.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::thread;
use std::time::Duration;
use std::time::Instant;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Longest uninterrupted sleep slice.
pub const CANCEL_POLL_INTERVAL: Duration = Duration::from_millis(25);

// ============================================================================
// SECTION: Cancel Token
// ============================================================================

/// Cloneable cancellation signal shared by a whole run.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    /// Explicit cancellation flag.
    flag: Arc<AtomicBool>,
    /// Instant after which the token reports cancelled.
    deadline: Option<Instant>,
}

impl CancelToken {
    /// Creates a token with no deadline.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a token that expires `budget` from now.
    #[must_use]
    pub fn with_deadline(budget: Duration) -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
            deadline: Instant::now().checked_add(budget),
        }
    }

    /// Signals cancellation to every clone.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Returns true once cancelled or past the deadline.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.reason().is_some()
    }

    /// Explains why the token is cancelled, if it is.
    #[must_use]
    pub fn reason(&self) -> Option<&'static str> {
        if self.flag.load(Ordering::SeqCst) {
            return Some("cancelled");
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some("deadline exceeded"),
            _ => None,
        }
    }

    /// Sleeps for `duration` unless cancelled first.
    ///
    /// Returns false when the sleep was cut short by cancellation.
    #[must_use]
    pub fn sleep(&self, duration: Duration) -> bool {
        let until = Instant::now() + duration;
        loop {
            if self.is_cancelled() {
                return false;
            }
            let now = Instant::now();
            if now >= until {
                return true;
            }
            thread::sleep((until - now).min(CANCEL_POLL_INTERVAL));
        }
    }
}
