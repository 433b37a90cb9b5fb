// crates/contract-gate-core/src/runtime/auth_matrix.rs
// ============================================================================
// Module: Contract Gate Auth-State Matrix
// Description: Runs one request under several credential variants.
// Purpose: Check that each authentication state yields its expected status.
// Dependencies: crate::{core, interfaces}, tracing
// ============================================================================

//! ## Overview
//! An [`AuthMatrix`] lists [`VariantCase`]s, each pairing an [`AuthVariant`]
//! with the statuses it must produce. [`AuthMatrixRunner::run`] sends the
//! caller's request once per case, rewriting only the `Authorization` header.
//!
//! Invariants:
//! - Cases are independent: no retries, no shared state, no ordering
//!   dependency. A failure in one cell never stops the others.
//! - A case whose credential is not configured fails with
//!   [`Observation::MissingCredential`] rather than being skipped.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Serialize;
use tracing::debug;
use tracing::warn;

use crate::core::endpoint::AuthRequirement;
use crate::core::endpoint::EndpointSpec;
use crate::core::endpoint::StatusSet;
use crate::core::outcome::Failure;
use crate::core::outcome::FailureKind;
use crate::core::request::RequestSpec;
use crate::interfaces::Transport;
use crate::runtime::cancel::CancelToken;

// ============================================================================
// SECTION: Variants
// ============================================================================

/// Credential configuration applied to one matrix cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthVariant {
    /// No `Authorization` header.
    NoAuth,
    /// A syntactically valid but unknown bearer token.
    InvalidAuth,
    /// A valid token for a user lacking the required role.
    ValidAuthWrongRole,
    /// A valid token with the required role.
    ValidAuthCorrectRole,
}

impl AuthVariant {
    /// Stable variant name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NoAuth => "no_auth",
            Self::InvalidAuth => "invalid_auth",
            Self::ValidAuthWrongRole => "valid_auth_wrong_role",
            Self::ValidAuthCorrectRole => "valid_auth_correct_role",
        }
    }
}

impl fmt::Display for AuthVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bearer tokens available to the matrix.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Token with the role the endpoint requires.
    pub valid_token: Option<String>,
    /// Valid token whose user lacks the required role.
    pub wrong_role_token: Option<String>,
    /// Token the server must reject.
    pub invalid_token: String,
}

/// Token used for the invalid-auth cell when none is configured.
pub const DEFAULT_INVALID_TOKEN: &str = "contract-gate-invalid-token";

impl Default for Credentials {
    fn default() -> Self {
        Self {
            valid_token: None,
            wrong_role_token: None,
            invalid_token: DEFAULT_INVALID_TOKEN.to_string(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("valid_token", &self.valid_token.as_ref().map(|_| "<redacted>"))
            .field("wrong_role_token", &self.wrong_role_token.as_ref().map(|_| "<redacted>"))
            .field("invalid_token", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    /// Token to apply for `variant`. `Ok(None)` means send without a header.
    fn token_for(&self, variant: AuthVariant) -> Result<Option<&str>, ()> {
        match variant {
            AuthVariant::NoAuth => Ok(None),
            AuthVariant::InvalidAuth => Ok(Some(self.invalid_token.as_str())),
            AuthVariant::ValidAuthWrongRole => self.wrong_role_token.as_deref().map(Some).ok_or(()),
            AuthVariant::ValidAuthCorrectRole => self.valid_token.as_deref().map(Some).ok_or(()),
        }
    }
}

// ============================================================================
// SECTION: Matrix
// ============================================================================

/// One cell of the matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantCase {
    /// Credential variant.
    pub variant: AuthVariant,
    /// Acceptable statuses.
    pub expected: StatusSet,
}

/// Ordered set of matrix cells.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AuthMatrix {
    /// Cells in run order.
    cases: Vec<VariantCase>,
}

impl AuthMatrix {
    /// Builds the default cells for an endpoint.
    ///
    /// Unauthenticated and invalid cells expect `{401, 403}`. Role-restricted
    /// endpoints add a wrong-role cell expecting `{401, 403}`. The correct-role
    /// cell expects the endpoint's success set.
    #[must_use]
    pub fn standard(endpoint: &EndpointSpec) -> Self {
        let mut matrix = Self::default()
            .with_case(AuthVariant::NoAuth, StatusSet::unauthorized())
            .with_case(AuthVariant::InvalidAuth, StatusSet::unauthorized());
        if matches!(endpoint.auth, AuthRequirement::Role(_)) {
            matrix = matrix.with_case(AuthVariant::ValidAuthWrongRole, StatusSet::unauthorized());
        }
        matrix.with_case(AuthVariant::ValidAuthCorrectRole, endpoint.success.clone())
    }

    /// Adds a cell, replacing any existing cell for the same variant.
    #[must_use]
    pub fn with_case(mut self, variant: AuthVariant, expected: StatusSet) -> Self {
        if let Some(existing) = self.cases.iter_mut().find(|case| case.variant == variant) {
            existing.expected = expected;
        } else {
            self.cases.push(VariantCase {
                variant,
                expected,
            });
        }
        self
    }

    /// Cells in run order.
    #[must_use]
    pub fn cases(&self) -> &[VariantCase] {
        &self.cases
    }
}

// ============================================================================
// SECTION: Results
// ============================================================================

/// What a matrix cell observed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "observation", content = "value", rename_all = "snake_case")]
pub enum Observation {
    /// A response with this status.
    Status(u16),
    /// No response; the transport error text.
    Transport(String),
    /// The variant's credential was not configured.
    MissingCredential,
    /// The run was cancelled before this cell was sent.
    Cancelled(String),
}

impl fmt::Display for Observation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status(status) => write!(f, "{status}"),
            Self::Transport(error) => write!(f, "transport error: {error}"),
            Self::MissingCredential => f.write_str("missing_credential"),
            Self::Cancelled(reason) => write!(f, "not sent: {reason}"),
        }
    }
}

/// Outcome of one matrix cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariantResult {
    /// Credential variant.
    pub variant_name: AuthVariant,
    /// Acceptable statuses.
    pub expected_set: StatusSet,
    /// What was observed.
    pub observation: Observation,
    /// Whether the observation satisfied `expected_set`.
    pub passed: bool,
}

impl VariantResult {
    /// Observed status, when a response arrived.
    #[must_use]
    pub const fn actual_status(&self) -> Option<u16> {
        match self.observation {
            Observation::Status(status) => Some(status),
            _ => None,
        }
    }

    /// Converts a failed cell into a report failure.
    #[must_use]
    pub fn to_failure(&self, endpoint: &EndpointSpec) -> Option<Failure> {
        if self.passed {
            return None;
        }
        let kind = match self.observation {
            Observation::Status(_) => FailureKind::UnexpectedStatus,
            Observation::Transport(_) => FailureKind::Transport,
            Observation::MissingCredential => FailureKind::Setup,
            Observation::Cancelled(_) => FailureKind::Cancelled,
        };
        Some(Failure::new(
            kind,
            format!("{} {} as {}", endpoint.method, endpoint.path, self.variant_name),
            format!("status in {}", self.expected_set),
            self.observation.to_string(),
        ))
    }
}

// ============================================================================
// SECTION: Runner
// ============================================================================

/// Sends one request per matrix cell.
pub struct AuthMatrixRunner<'a> {
    /// Transport used for every cell.
    transport: &'a dyn Transport,
    /// Tokens for the variants.
    credentials: &'a Credentials,
    /// Cancellation checked before each cell.
    cancel: CancelToken,
}

impl<'a> AuthMatrixRunner<'a> {
    /// Creates a runner.
    #[must_use]
    pub const fn new(
        transport: &'a dyn Transport,
        credentials: &'a Credentials,
        cancel: CancelToken,
    ) -> Self {
        Self {
            transport,
            credentials,
            cancel,
        }
    }

    /// Runs every cell of `matrix` against the request built by `request_factory`.
    #[must_use]
    pub fn run<F>(
        &self,
        endpoint: &EndpointSpec,
        matrix: &AuthMatrix,
        request_factory: F,
    ) -> Vec<VariantResult>
    where
        F: Fn() -> RequestSpec,
    {
        matrix
            .cases()
            .iter()
            .map(|case| {
                let observation = self.observe(case.variant, &request_factory);
                let passed = matches!(observation, Observation::Status(status) if case.expected.contains(status));
                debug!(
                    endpoint = %endpoint.id,
                    variant = %case.variant,
                    observed = %observation,
                    passed,
                    "auth matrix cell"
                );
                VariantResult {
                    variant_name: case.variant,
                    expected_set: case.expected.clone(),
                    observation,
                    passed,
                }
            })
            .collect()
    }

    /// Sends one cell and returns what it observed.
    fn observe<F>(&self, variant: AuthVariant, request_factory: &F) -> Observation
    where
        F: Fn() -> RequestSpec,
    {
        if let Some(reason) = self.cancel.reason() {
            return Observation::Cancelled(reason.to_string());
        }
        let Ok(token) = self.credentials.token_for(variant) else {
            warn!(variant = %variant, "auth matrix credential not configured");
            return Observation::MissingCredential;
        };
        let request = request_factory().without_auth();
        let request = match token {
            Some(token) => request.bearer(token),
            None => request,
        };
        match self.transport.send(&request) {
            Ok(response) => Observation::Status(response.status),
            Err(err) => Observation::Transport(err.to_string()),
        }
    }
}
