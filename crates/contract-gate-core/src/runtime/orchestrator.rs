// crates/contract-gate-core/src/runtime/orchestrator.rs
// ============================================================================
// Module: Contract Gate Scenario Orchestrator
// Description: Setup/exercise/verify/teardown sequencing with soft checks.
// Purpose: Guarantee fixture release and turn every error into a recorded failure.
// Dependencies: crate::{core, interfaces, runtime}, thiserror, tracing
// ============================================================================

//! ## Overview
//! [`run_scenario`] drives the four phases of a [`Scenario`] against a
//! [`ScenarioContext`]. Phases return `Result<_, HarnessError>`; errors and
//! panics are converted into [`Failure`]s instead of propagating.
//!
//! Invariants:
//! - Phases run strictly setup, exercise, verify.
//! - Teardown runs on every exit path once setup has produced a fixture,
//!   including after panics and cancellation.
//! - Teardown requests bypass the cancellation gate.
//! - Failures keep their recording order; the first decides the verdict.
//! - A failed setup skips every later phase, since no fixture exists.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::any::Any;
use std::fmt::Display;
use std::panic::AssertUnwindSafe;
use std::panic::catch_unwind;
use std::sync::Arc;
use std::time::Duration;
use std::time::Instant;

use serde_json::Value;
use thiserror::Error;
use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::core::endpoint::EndpointSpec;
use crate::core::endpoint::HttpMethod;
use crate::core::endpoint::RateLimitBudget;
use crate::core::endpoint::StatusSet;
use crate::core::endpoint::TemplateError;
use crate::core::identifiers::ScenarioName;
use crate::core::outcome::Failure;
use crate::core::outcome::FailureKind;
use crate::core::outcome::Lane;
use crate::core::outcome::ScenarioOutcome;
use crate::core::request::DEFAULT_TIMEOUT;
use crate::core::request::RequestSpec;
use crate::core::request::Response;
use crate::core::request::duration_ms;
use crate::core::schema::SchemaContract;
use crate::core::schema::Shape;
use crate::interfaces::Transport;
use crate::interfaces::TransportError;
use crate::runtime::auth_matrix::AuthMatrixRunner;
use crate::runtime::auth_matrix::Credentials;
use crate::runtime::auth_matrix::VariantResult;
use crate::runtime::cancel::CancelToken;
use crate::runtime::prober::ProbeConfig;
use crate::runtime::prober::ProbeError;
use crate::runtime::prober::ProbeReport;
use crate::runtime::prober::RateLimitProber;
use crate::runtime::validator::render_value;
use crate::runtime::validator::validate_json;
use crate::runtime::validator::validate_shape;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors that abort the current scenario phase.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// A request produced no response.
    #[error("{request}: {source}")]
    Transport {
        /// Request line, for example `GET http://host/api/products`.
        request: String,
        /// Transport failure.
        source: TransportError,
    },
    /// The run was cancelled before the request was sent.
    #[error("not sent: {0}")]
    Cancelled(String),
    /// A path template could not be rendered.
    #[error(transparent)]
    Template(#[from] TemplateError),
    /// A response body could not be interpreted.
    #[error("{request}: {reason}")]
    Body {
        /// Request line.
        request: String,
        /// What was wrong with the body.
        reason: String,
    },
    /// A burst probe aborted.
    #[error(transparent)]
    Probe(#[from] ProbeError),
    /// A hard requirement failed and the phase cannot continue.
    #[error("{assertion}: expected {expected}, got {actual}")]
    Requirement {
        /// What was being checked.
        assertion: String,
        /// Expected value.
        expected: String,
        /// Observed value.
        actual: String,
    },
}

impl HarnessError {
    /// Builds a hard requirement failure.
    #[must_use]
    pub fn requirement(
        assertion: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Display,
    ) -> Self {
        Self::Requirement {
            assertion: assertion.into(),
            expected: expected.into(),
            actual: actual.to_string(),
        }
    }

    /// Converts the error into a failure recorded against `phase`.
    #[must_use]
    pub fn into_failure(self, phase: Phase) -> Failure {
        match (phase, self) {
            (phase, Self::Cancelled(reason)) => {
                Failure::new(FailureKind::Cancelled, phase.as_str(), "phase to complete", reason)
            }
            (Phase::Setup, err) => {
                Failure::new(FailureKind::Setup, "setup", "fixture created", err.to_string())
            }
            (Phase::Teardown, err) => {
                Failure::new(FailureKind::Teardown, "teardown", "fixture released", err.to_string())
            }
            (
                _,
                Self::Transport {
                    request,
                    source,
                },
            ) => Failure::new(FailureKind::Transport, request, "a response", source.to_string()),
            (
                _,
                Self::Body {
                    request,
                    reason,
                },
            ) => Failure::new(FailureKind::Validation, request, "JSON body", reason),
            (_, Self::Probe(ProbeError::Cancelled { reason, report })) => Failure::new(
                FailureKind::Cancelled,
                format!("{} burst probe", report.endpoint),
                "probe to complete",
                reason,
            ),
            (_, Self::Probe(ProbeError::Transport { source, report })) => Failure::new(
                FailureKind::Transport,
                format!("{} burst probe request {}", report.endpoint, report.results.len() + 1),
                "a response",
                source.to_string(),
            ),
            (
                _,
                Self::Requirement {
                    assertion,
                    expected,
                    actual,
                },
            ) => Failure::new(FailureKind::Assertion, assertion, expected, actual),
            (phase, err @ Self::Template(_)) => {
                Failure::new(FailureKind::Assertion, phase.as_str(), "renderable path", err.to_string())
            }
        }
    }
}

/// Scenario phase, used to label failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Fixture creation.
    Setup,
    /// Call under test.
    Exercise,
    /// Assertions on the observation.
    Verify,
    /// Fixture release.
    Teardown,
}

impl Phase {
    /// Lower-case phase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Setup => "setup",
            Self::Exercise => "exercise",
            Self::Verify => "verify",
            Self::Teardown => "teardown",
        }
    }
}

// ============================================================================
// SECTION: Soft Checks
// ============================================================================

/// Soft assertion recorder. Checks record failures and return whether they passed.
#[derive(Debug, Clone, Default)]
pub struct Checks {
    /// Failures in recording order.
    failures: Vec<Failure>,
}

impl Checks {
    /// Records a failure.
    pub fn record(&mut self, failure: Failure) {
        debug!(kind = %failure.kind, assertion = %failure.assertion, "check failed");
        self.failures.push(failure);
    }

    /// Checks that the response status is in `expected`.
    pub fn status(&mut self, assertion: &str, response: &Response, expected: &StatusSet) -> bool {
        if expected.contains(response.status) {
            return true;
        }
        self.record(Failure::new(
            FailureKind::UnexpectedStatus,
            format!("{assertion} status"),
            format!("status in {expected}"),
            format!("{} {}", response.status, render_body(response)),
        ));
        false
    }

    /// Checks the response body against a contract, one failure per violation.
    pub fn schema(&mut self, assertion: &str, response: &Response, contract: &SchemaContract) -> bool {
        let result = validate_json(&response.body_raw, contract);
        let ok = result.ok();
        for violation in result.into_violations() {
            self.record(Failure::new(
                FailureKind::Validation,
                format!("{assertion} {} ({})", violation.path, violation.kind),
                violation.expected,
                violation.actual,
            ));
        }
        ok
    }

    /// Checks a JSON value against a bare shape.
    pub fn shape(&mut self, assertion: &str, value: &Value, shape: &Shape) -> bool {
        let result = validate_shape(value, shape);
        let ok = result.ok();
        for violation in result.into_violations() {
            self.record(Failure::new(
                FailureKind::Validation,
                format!("{assertion} {} ({})", violation.path, violation.kind),
                violation.expected,
                violation.actual,
            ));
        }
        ok
    }

    /// Checks that the response arrived within `budget`. No budget always passes.
    pub fn latency(&mut self, assertion: &str, response: &Response, budget: Option<Duration>) -> bool {
        let Some(budget) = budget else {
            return true;
        };
        if response.elapsed <= budget {
            return true;
        }
        self.record(Failure::new(
            FailureKind::Timing,
            format!("{assertion} latency"),
            format!("<= {} ms", duration_ms(budget)),
            format!("{} ms", response.elapsed_ms()),
        ));
        false
    }

    /// Checks status, schema (when 2xx and a contract exists), and latency for an endpoint.
    pub fn endpoint(&mut self, endpoint: &EndpointSpec, response: &Response) -> bool {
        let label = format!("{} {}", endpoint.method, endpoint.path);
        let mut ok = self.status(&label, response, &endpoint.success);
        if ok && let Some(contract) = &endpoint.contract {
            ok &= self.schema(&label, response, contract);
        }
        ok &= self.latency(&label, response, endpoint.latency_budget());
        ok
    }

    /// Checks equality of two displayable values.
    pub fn equals<T>(&mut self, assertion: &str, expected: &T, actual: &T) -> bool
    where
        T: PartialEq + Display + ?Sized,
    {
        if expected == actual {
            return true;
        }
        self.record(Failure::new(
            FailureKind::Assertion,
            assertion,
            expected.to_string(),
            actual.to_string(),
        ));
        false
    }

    /// Checks an arbitrary condition.
    pub fn that(&mut self, assertion: &str, condition: bool, expected: &str, actual: impl Display) -> bool {
        if condition {
            return true;
        }
        self.record(Failure::new(FailureKind::Assertion, assertion, expected, actual.to_string()));
        false
    }

    /// Checks that a probe observed throttling within `budget`.
    pub fn rate_limited(&mut self, report: &ProbeReport, budget: RateLimitBudget) -> bool {
        match report.expect_enforced(budget) {
            None => true,
            Some(failure) => {
                self.record(failure);
                false
            }
        }
    }

    /// Records every failed auth matrix cell.
    pub fn auth_matrix(&mut self, endpoint: &EndpointSpec, results: &[VariantResult]) -> bool {
        let mut ok = true;
        for failure in results.iter().filter_map(|result| result.to_failure(endpoint)) {
            self.record(failure);
            ok = false;
        }
        ok
    }

    /// Failures in recording order.
    #[must_use]
    pub fn failures(&self) -> &[Failure] {
        &self.failures
    }

    /// Returns true when nothing failed.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Renders a response body for failure messages.
fn render_body(response: &Response) -> String {
    if response.body_raw.is_empty() {
        return "(empty body)".to_string();
    }
    response.json().map_or_else(|_| render_value(&Value::String(response.body_text())), |value| render_value(&value))
}

// ============================================================================
// SECTION: Harness
// ============================================================================

/// Shared run environment. One harness serves every scenario of a run.
#[derive(Clone)]
pub struct Harness {
    /// Transport for every request.
    transport: Arc<dyn Transport>,
    /// Base URL of the system under test, without a trailing slash.
    base_url: String,
    /// Bearer tokens.
    credentials: Credentials,
    /// Default request timeout.
    timeout: Duration,
    /// Burst prober tuning.
    probe: ProbeConfig,
    /// Run-wide cancellation.
    cancel: CancelToken,
}

impl Harness {
    /// Creates a harness with default timeout, probe tuning, and no credentials.
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>, base_url: &str) -> Self {
        Self {
            transport,
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials: Credentials::default(),
            timeout: DEFAULT_TIMEOUT,
            probe: ProbeConfig::default(),
            cancel: CancelToken::new(),
        }
    }

    /// Sets the credentials.
    #[must_use]
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }

    /// Sets the default request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the prober tuning.
    #[must_use]
    pub const fn with_probe_config(mut self, probe: ProbeConfig) -> Self {
        self.probe = probe;
        self
    }

    /// Sets the run-wide cancellation token.
    #[must_use]
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Run-wide cancellation token.
    #[must_use]
    pub const fn cancel(&self) -> &CancelToken {
        &self.cancel
    }

    /// Base URL without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Creates a fresh context for one scenario run.
    #[must_use]
    pub fn context(&self, name: ScenarioName, lane: Lane) -> ScenarioContext<'_> {
        ScenarioContext {
            harness: self,
            name,
            lane,
            checks: Checks::default(),
            started: Instant::now(),
            teardown: false,
        }
    }
}

// ============================================================================
// SECTION: Scenario Context
// ============================================================================

/// Per-scenario view of the harness plus its failure recorder.
pub struct ScenarioContext<'a> {
    /// Shared environment.
    harness: &'a Harness,
    /// Scenario name.
    name: ScenarioName,
    /// Lane the scenario runs in.
    lane: Lane,
    /// Soft assertion recorder.
    checks: Checks,
    /// Start instant for elapsed time.
    started: Instant,
    /// Set while teardown runs; requests then bypass cancellation.
    teardown: bool,
}

impl ScenarioContext<'_> {
    /// Scenario name.
    #[must_use]
    pub const fn name(&self) -> &ScenarioName {
        &self.name
    }

    /// Soft assertion recorder.
    pub const fn checks(&mut self) -> &mut Checks {
        &mut self.checks
    }

    /// Configured credentials.
    #[must_use]
    pub const fn credentials(&self) -> &Credentials {
        &self.harness.credentials
    }

    /// Absolute URL for a path.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.harness.base_url)
    }

    /// Request for a literal path using the default timeout.
    #[must_use]
    pub fn request(&self, method: HttpMethod, path: &str) -> RequestSpec {
        RequestSpec::new(method, self.url(path)).timeout(self.harness.timeout)
    }

    /// Request for an endpoint, rendering its path template from `params`.
    ///
    /// When the endpoint is protected and a valid token is configured, the
    /// token is attached.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Template`] when the path cannot be rendered.
    pub fn endpoint_request(
        &self,
        endpoint: &EndpointSpec,
        params: &[(&str, &str)],
    ) -> Result<RequestSpec, HarnessError> {
        let path = endpoint.path.render(params)?;
        let request = self.request(endpoint.method, &path);
        match (&self.harness.credentials.valid_token, endpoint.auth.is_protected()) {
            (Some(token), true) => Ok(request.bearer(token)),
            _ => Ok(request),
        }
    }

    /// Sends a request unless the run is cancelled.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Cancelled`] when cancelled outside teardown and
    /// [`HarnessError::Transport`] when no response arrives.
    pub fn send(&self, request: &RequestSpec) -> Result<Response, HarnessError> {
        if !self.teardown
            && let Some(reason) = self.harness.cancel.reason()
        {
            return Err(HarnessError::Cancelled(reason.to_string()));
        }
        let line = format!("{} {}", request.method, request.url);
        match self.harness.transport.send(request) {
            Ok(response) => {
                debug!(
                    scenario = %self.name,
                    request = %line,
                    status = response.status,
                    elapsed_ms = response.elapsed_ms(),
                    "response"
                );
                Ok(response)
            }
            Err(source) => {
                warn!(scenario = %self.name, request = %line, error = %source, "transport failure");
                Err(HarnessError::Transport {
                    request: line,
                    source,
                })
            }
        }
    }

    /// Sends a request and parses its body as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Body`] when the body is not JSON, plus any
    /// error from [`ScenarioContext::send`].
    pub fn send_json(&self, request: &RequestSpec) -> Result<(Response, Value), HarnessError> {
        let response = self.send(request)?;
        let value = response.json().map_err(|err| HarnessError::Body {
            request: format!("{} {}", request.method, request.url),
            reason: format!("status {} body is not JSON ({err})", response.status),
        })?;
        Ok((response, value))
    }

    /// Burst prober bound to this run's transport, cancellation, and tuning.
    #[must_use]
    pub fn prober(&self) -> RateLimitProber<'_> {
        RateLimitProber::new(self.harness.transport.as_ref(), self.harness.cancel.clone())
            .with_config(self.harness.probe)
    }

    /// Auth matrix runner bound to this run's transport and credentials.
    #[must_use]
    pub fn auth_runner(&self) -> AuthMatrixRunner<'_> {
        AuthMatrixRunner::new(
            self.harness.transport.as_ref(),
            &self.harness.credentials,
            self.harness.cancel.clone(),
        )
    }

    /// Seals the recorded failures into an outcome.
    fn finish(&mut self) -> ScenarioOutcome {
        let failures = std::mem::take(&mut self.checks.failures);
        let outcome = ScenarioOutcome::finalize(
            self.name.clone(),
            self.lane.clone(),
            failures,
            duration_ms(self.started.elapsed()),
        );
        info!(
            scenario = %outcome.name(),
            passed = outcome.passed(),
            failures = outcome.failures().len(),
            elapsed_ms = outcome.elapsed_ms(),
            "scenario finished"
        );
        outcome
    }
}

// ============================================================================
// SECTION: Scenario Trait
// ============================================================================

/// A runnable scenario.
pub trait Scenario: Send + Sync {
    /// Scenario name.
    fn name(&self) -> ScenarioName;

    /// Scheduling lane.
    fn lane(&self) -> Lane {
        Lane::Parallel
    }

    /// Runs the scenario, typically through [`run_scenario`].
    fn run(&self, ctx: &mut ScenarioContext<'_>) -> ScenarioOutcome;
}

/// Boxed scenario body.
type ScenarioBody = Box<dyn Fn(&mut ScenarioContext<'_>) -> ScenarioOutcome + Send + Sync>;

/// Scenario built from a closure.
pub struct FnScenario {
    /// Scenario name.
    name: ScenarioName,
    /// Scheduling lane.
    lane: Lane,
    /// Scenario body.
    body: ScenarioBody,
}

impl FnScenario {
    /// Creates a parallel-lane scenario.
    pub fn new<F>(name: &str, body: F) -> Self
    where
        F: Fn(&mut ScenarioContext<'_>) -> ScenarioOutcome + Send + Sync + 'static,
    {
        Self {
            name: ScenarioName::new(name),
            lane: Lane::Parallel,
            body: Box::new(body),
        }
    }

    /// Moves the scenario into another lane.
    #[must_use]
    pub fn in_lane(mut self, lane: Lane) -> Self {
        self.lane = lane;
        self
    }
}

impl Scenario for FnScenario {
    fn name(&self) -> ScenarioName {
        self.name.clone()
    }

    fn lane(&self) -> Lane {
        self.lane.clone()
    }

    fn run(&self, ctx: &mut ScenarioContext<'_>) -> ScenarioOutcome {
        (self.body)(ctx)
    }
}

// ============================================================================
// SECTION: Phase Runner
// ============================================================================

/// Runs setup, exercise, verify, then teardown, and seals the outcome.
///
/// `setup` produces the fixture. `exercise` borrows it and returns an
/// observation that `verify` consumes. `teardown` takes ownership of the
/// fixture and runs whenever setup succeeded.
pub fn run_scenario<F, O, S, E, V, T>(
    ctx: &mut ScenarioContext<'_>,
    setup: S,
    exercise: E,
    verify: V,
    teardown: T,
) -> ScenarioOutcome
where
    S: FnOnce(&mut ScenarioContext<'_>) -> Result<F, HarnessError>,
    E: FnOnce(&mut ScenarioContext<'_>, &mut F) -> Result<O, HarnessError>,
    V: FnOnce(&mut ScenarioContext<'_>, &F, O) -> Result<(), HarnessError>,
    T: FnOnce(&mut ScenarioContext<'_>, F) -> Result<(), HarnessError>,
{
    info!(scenario = %ctx.name, lane = %ctx.lane, "scenario started");
    if let Some(reason) = ctx.harness.cancel.reason() {
        ctx.checks.record(Failure::new(FailureKind::Cancelled, "scenario start", "scenario to run", reason));
        return ctx.finish();
    }

    let mut fixture = match guarded(ctx, Phase::Setup, setup) {
        Some(fixture) => fixture,
        None => return ctx.finish(),
    };

    if let Some(observation) = guarded(ctx, Phase::Exercise, |ctx| exercise(ctx, &mut fixture)) {
        let _ = guarded(ctx, Phase::Verify, |ctx| verify(ctx, &fixture, observation));
    }

    ctx.teardown = true;
    if guarded(ctx, Phase::Teardown, |ctx| teardown(ctx, fixture)).is_none() {
        warn!(scenario = %ctx.name, "teardown failed; fixture may leak");
    }
    ctx.teardown = false;
    ctx.finish()
}

/// Runs one phase, recording its error or panic. Returns `None` on failure.
fn guarded<R, P>(ctx: &mut ScenarioContext<'_>, phase: Phase, body: P) -> Option<R>
where
    P: FnOnce(&mut ScenarioContext<'_>) -> Result<R, HarnessError>,
{
    match catch_unwind(AssertUnwindSafe(|| body(ctx))) {
        Ok(Ok(value)) => Some(value),
        Ok(Err(err)) => {
            ctx.checks.record(err.into_failure(phase));
            None
        }
        Err(payload) => {
            ctx.checks.record(Failure::new(
                FailureKind::Panic,
                format!("{} panicked", phase.as_str()),
                "no panic",
                panic_message(payload.as_ref()),
            ));
            None
        }
    }
}

/// Extracts a readable message from a panic payload.
fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|message| (*message).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_string())
}
