// crates/contract-gate-core/src/runtime/prober.rs
// ============================================================================
// Module: Contract Gate Rate-Limit Prober
// Description: Bounded burst probing with throttle classification.
// Purpose: Measure whether and when an endpoint starts returning 429.
// Dependencies: crate::{core, interfaces}, thiserror, tracing
// ============================================================================

//! ## Overview
//! [`RateLimitProber::probe`] issues identical requests sequentially and stops
//! at the first `429`. It is a measurement tool: a burst that never throttles
//! is a normal [`ProbeReport`] with no throttle index, and the caller decides
//! whether that is a failure via [`ProbeReport::expect_enforced`].
//!
//! Invariants:
//! - At most [`MAX_PROBE_ATTEMPTS`] burst requests are ever issued.
//! - Results are append-only and indexed from zero in send order.
//! - The prober sleeps only for the configured spacing and optional
//!   confirmation delay; it never honors `Retry-After` on its own.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt::Write as _;
use std::time::Duration;

use thiserror::Error;
use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::core::endpoint::EndpointSpec;
use crate::core::endpoint::RateLimitBudget;
use crate::core::identifiers::EndpointId;
use crate::core::outcome::Failure;
use crate::core::outcome::FailureKind;
use crate::core::request::RequestSpec;
use crate::core::request::Response;
use crate::core::request::RetryAfter;
use crate::interfaces::Transport;
use crate::interfaces::TransportError;
use crate::runtime::cancel::CancelToken;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Hard upper bound on burst requests per probe.
pub const MAX_PROBE_ATTEMPTS: usize = 210;

/// Status that marks a throttled response.
pub const THROTTLED_STATUS: u16 = 429;

// ============================================================================
// SECTION: Probe Results
// ============================================================================

/// Classification of one probe response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProbeClass {
    /// 2xx response.
    Success,
    /// 429 response.
    Throttled,
    /// Any other status.
    UnexpectedError,
}

impl ProbeClass {
    /// Classifies a status code.
    #[must_use]
    pub const fn from_status(status: u16) -> Self {
        match status {
            200 ..= 299 => Self::Success,
            THROTTLED_STATUS => Self::Throttled,
            _ => Self::UnexpectedError,
        }
    }
}

/// One response observed during a probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResult {
    /// Zero-based send index.
    pub index: usize,
    /// Status code.
    pub status: u16,
    /// Classification of `status`.
    pub class: ProbeClass,
    /// Elapsed time in milliseconds.
    pub elapsed_ms: u64,
    /// `Retry-After` header, when present.
    pub retry_after: Option<RetryAfter>,
}

/// Rate-limit headers advertised by the server.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RateLimitHeaders {
    /// `X-RateLimit-Limit`.
    pub limit: Option<String>,
    /// `X-RateLimit-Remaining`.
    pub remaining: Option<String>,
}

/// Ordered record of a burst probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeReport {
    /// Endpoint that was probed.
    pub endpoint: EndpointId,
    /// Responses in send order.
    pub results: Vec<ProbeResult>,
    /// Index of the first throttled response.
    pub first_throttle_index: Option<usize>,
    /// Burst size requested by the caller.
    pub requested_burst: usize,
    /// Burst size after clamping.
    pub effective_burst: usize,
    /// Last rate-limit headers observed.
    pub rate_limit_headers: Option<RateLimitHeaders>,
    /// Whether a confirmation request was issued after the burst.
    pub confirmation_sent: bool,
}

impl ProbeReport {
    /// Creates an empty report.
    fn new(endpoint: EndpointId, requested_burst: usize, effective_burst: usize) -> Self {
        Self {
            endpoint,
            results: Vec::new(),
            first_throttle_index: None,
            requested_burst,
            effective_burst,
            rate_limit_headers: None,
            confirmation_sent: false,
        }
    }

    /// Observed statuses in send order.
    #[must_use]
    pub fn statuses(&self) -> Vec<u16> {
        self.results.iter().map(|result| result.status).collect()
    }

    /// Counts results in a class.
    #[must_use]
    pub fn count(&self, class: ProbeClass) -> usize {
        self.results.iter().filter(|result| result.class == class).count()
    }

    /// `Retry-After` of the throttled response, for callers that want to wait.
    #[must_use]
    pub fn retry_after(&self) -> Option<&RetryAfter> {
        self.first_throttle_index
            .and_then(|index| self.results.get(index))
            .and_then(|result| result.retry_after.as_ref())
    }

    /// Compact status histogram in send order, for example `200x30, 429x1`.
    #[must_use]
    pub fn status_runs(&self) -> String {
        let mut out = String::new();
        let mut iter = self.results.iter().map(|result| result.status).peekable();
        while let Some(status) = iter.next() {
            let mut run = 1usize;
            while iter.peek() == Some(&status) {
                iter.next();
                run += 1;
            }
            if !out.is_empty() {
                out.push_str(", ");
            }
            let _ = write!(out, "{status}x{run}");
        }
        if out.is_empty() { "no responses".to_string() } else { out }
    }

    /// Checks the report against a declared budget.
    ///
    /// Throttling by request `budget + 1` satisfies the budget, as does a
    /// throttled confirmation request. A burst with no `429`, or a first `429`
    /// later than the budget allows, yields a `rate_limit_not_enforced` failure.
    #[must_use]
    pub fn expect_enforced(&self, budget: RateLimitBudget) -> Option<Failure> {
        let allowed = usize::try_from(budget.requests).unwrap_or(usize::MAX);
        let assertion = format!("{} burst of {} requests", self.endpoint, self.effective_burst);
        let expected = format!("429 by request {} ({budget})", allowed.saturating_add(1));
        match self.first_throttle_index {
            None => Some(Failure::new(
                FailureKind::RateLimitNotEnforced,
                assertion,
                expected,
                format!("no 429 observed ({})", self.status_runs()),
            )),
            Some(index) => {
                let via_confirmation = self.confirmation_sent && index + 1 == self.results.len();
                if index <= allowed || via_confirmation {
                    None
                } else {
                    Some(Failure::new(
                        FailureKind::RateLimitNotEnforced,
                        assertion,
                        expected,
                        format!("first 429 at request {} ({})", index + 1, self.status_runs()),
                    ))
                }
            }
        }
    }

    /// Appends a response and records throttling and headers.
    fn push(&mut self, response: &Response) -> ProbeClass {
        let index = self.results.len();
        let class = ProbeClass::from_status(response.status);
        if class == ProbeClass::Throttled && self.first_throttle_index.is_none() {
            self.first_throttle_index = Some(index);
        }
        let limit = response.header("x-ratelimit-limit").map(str::to_string);
        let remaining = response.header("x-ratelimit-remaining").map(str::to_string);
        if limit.is_some() || remaining.is_some() {
            self.rate_limit_headers = Some(RateLimitHeaders {
                limit,
                remaining,
            });
        }
        self.results.push(ProbeResult {
            index,
            status: response.status,
            class,
            elapsed_ms: response.elapsed_ms(),
            retry_after: response.retry_after(),
        });
        class
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Probe aborts. Both variants carry the partial report gathered so far.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// A request could not be completed.
    #[error("probe of {} aborted after {} responses: {source}", .report.endpoint, .report.results.len())]
    Transport {
        /// Underlying transport failure.
        source: TransportError,
        /// Results gathered before the failure.
        report: ProbeReport,
    },
    /// The run was cancelled between requests.
    #[error("probe of {} cancelled after {} responses: {reason}", .report.endpoint, .report.results.len())]
    Cancelled {
        /// Cancellation reason.
        reason: String,
        /// Results gathered before cancellation.
        report: ProbeReport,
    },
}

impl ProbeError {
    /// Returns the partial report.
    #[must_use]
    pub const fn report(&self) -> &ProbeReport {
        match self {
            Self::Transport {
                report, ..
            }
            | Self::Cancelled {
                report, ..
            } => report,
        }
    }
}

// ============================================================================
// SECTION: Prober
// ============================================================================

/// Prober tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeConfig {
    /// Pause between burst requests.
    pub spacing: Duration,
    /// Configured attempt cap, itself capped by [`MAX_PROBE_ATTEMPTS`].
    pub max_attempts: usize,
    /// When set, one extra request follows an unthrottled burst after this delay.
    pub confirm_delay: Option<Duration>,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            spacing: Duration::ZERO,
            max_attempts: MAX_PROBE_ATTEMPTS,
            confirm_delay: None,
        }
    }
}

/// Fires bounded bursts through a [`Transport`].
pub struct RateLimitProber<'a> {
    /// Transport used for every request.
    transport: &'a dyn Transport,
    /// Cancellation checked before each request.
    cancel: CancelToken,
    /// Tuning.
    config: ProbeConfig,
}

impl<'a> RateLimitProber<'a> {
    /// Creates a prober with default tuning.
    #[must_use]
    pub fn new(transport: &'a dyn Transport, cancel: CancelToken) -> Self {
        Self {
            transport,
            cancel,
            config: ProbeConfig::default(),
        }
    }

    /// Replaces the tuning.
    #[must_use]
    pub const fn with_config(mut self, config: ProbeConfig) -> Self {
        self.config = config;
        self
    }

    /// Issues up to `burst_size` requests built by `request_factory`.
    ///
    /// # Errors
    ///
    /// Returns [`ProbeError`] with the partial report on transport failure or
    /// cancellation.
    pub fn probe<F>(
        &self,
        endpoint: &EndpointSpec,
        mut request_factory: F,
        burst_size: usize,
    ) -> Result<ProbeReport, ProbeError>
    where
        F: FnMut(usize) -> RequestSpec,
    {
        let cap = self.config.max_attempts.min(MAX_PROBE_ATTEMPTS);
        let effective = burst_size.min(cap);
        if effective < burst_size {
            warn!(endpoint = %endpoint.id, requested = burst_size, cap, "probe burst clamped");
        }
        let mut report = ProbeReport::new(endpoint.id.clone(), burst_size, effective);
        for index in 0 .. effective {
            if index > 0 && !self.config.spacing.is_zero() && !self.cancel.sleep(self.config.spacing) {
                return Err(self.cancelled(report));
            }
            if self.cancel.is_cancelled() {
                return Err(self.cancelled(report));
            }
            let class = match self.send_one(&mut report, &request_factory(index)) {
                Ok(class) => class,
                Err(source) => return Err(ProbeError::Transport {
                    source,
                    report,
                }),
            };
            if class == ProbeClass::Throttled {
                break;
            }
        }
        if report.first_throttle_index.is_none()
            && !report.results.is_empty()
            && let Some(delay) = self.config.confirm_delay
        {
            if !self.cancel.sleep(delay) {
                return Err(self.cancelled(report));
            }
            report.confirmation_sent = true;
            let index = report.results.len();
            if let Err(source) = self.send_one(&mut report, &request_factory(index)) {
                return Err(ProbeError::Transport {
                    source,
                    report,
                });
            }
        }
        info!(
            endpoint = %report.endpoint,
            sent = report.results.len(),
            first_throttle = report.first_throttle_index.map_or(-1, |index| i64::try_from(index).unwrap_or(i64::MAX)),
            "probe finished"
        );
        Ok(report)
    }

    /// Sends one request and records it.
    fn send_one(
        &self,
        report: &mut ProbeReport,
        request: &RequestSpec,
    ) -> Result<ProbeClass, TransportError> {
        match self.transport.send(request) {
            Ok(response) => {
                debug!(
                    endpoint = %report.endpoint,
                    index = report.results.len(),
                    status = response.status,
                    "probe response"
                );
                Ok(report.push(&response))
            }
            Err(source) => {
                warn!(endpoint = %report.endpoint, error = %source, "probe transport failure");
                Err(source)
            }
        }
    }

    /// Builds a cancellation error.
    fn cancelled(&self, report: ProbeReport) -> ProbeError {
        ProbeError::Cancelled {
            reason: self.cancel.reason().unwrap_or("cancelled").to_string(),
            report,
        }
    }
}
