// crates/contract-gate-core/src/core/endpoint.rs
// ============================================================================
// Module: Contract Gate Endpoint Specs
// Description: Declarative descriptions of endpoints under test.
// Purpose: Capture method, path, status, schema, rate, and auth expectations.
// Dependencies: crate::core::{identifiers, schema}, serde
// ============================================================================

//! ## Overview
//! An [`EndpointSpec`] is the immutable contract for one endpoint of the system
//! under test. Specs are loaded once (catalog defaults plus config overrides)
//! and shared read-only by every scenario.
//!
//! Rate-limit budgets are per endpoint. There is intentionally no global
//! default budget: an endpoint without a budget is simply not probed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::fmt;
use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::identifiers::EndpointId;
use crate::core::schema::SchemaContract;

// ============================================================================
// SECTION: HTTP Method
// ============================================================================

/// HTTP methods understood by the harness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `PATCH`
    Patch,
    /// `DELETE`
    Delete,
    /// `HEAD`
    Head,
}

impl HttpMethod {
    /// Returns the canonical method token.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
            Self::Head => "HEAD",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Path Template
// ============================================================================

/// Errors raised while rendering a [`PathTemplate`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    /// A placeholder had no matching parameter.
    #[error("path template {template} has no value for {{{name}}}")]
    MissingParam {
        /// Template text.
        template: String,
        /// Placeholder name.
        name: String,
    },
    /// A `{` was not closed.
    #[error("path template {0} has an unterminated placeholder")]
    Unterminated(String),
}

/// Path template such as `/api/products/{id}`.
///
/// # Invariants
/// - Placeholders are `{name}` with no nesting.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PathTemplate(String);

impl PathTemplate {
    /// Creates a new path template.
    #[must_use]
    pub fn new(template: impl Into<String>) -> Self {
        Self(template.into())
    }

    /// Returns the raw template text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Renders the template, substituting each `{name}` from `params`.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError`] when a placeholder is unknown or unterminated.
    pub fn render(&self, params: &[(&str, &str)]) -> Result<String, TemplateError> {
        let mut out = String::with_capacity(self.0.len());
        let mut rest = self.0.as_str();
        while let Some(open) = rest.find('{') {
            out.push_str(&rest[.. open]);
            let after = &rest[open + 1 ..];
            let close = after.find('}').ok_or_else(|| TemplateError::Unterminated(self.0.clone()))?;
            let name = &after[.. close];
            let value = params
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| *value)
                .ok_or_else(|| TemplateError::MissingParam {
                    template: self.0.clone(),
                    name: name.to_string(),
                })?;
            out.push_str(value);
            rest = &after[close + 1 ..];
        }
        out.push_str(rest);
        Ok(out)
    }
}

impl fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ============================================================================
// SECTION: Status Set
// ============================================================================

/// Ordered set of acceptable HTTP status codes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusSet(BTreeSet<u16>);

impl StatusSet {
    /// Builds a status set from the given codes.
    #[must_use]
    pub fn of(codes: &[u16]) -> Self {
        Self(codes.iter().copied().collect())
    }

    /// The conventional rejection set for unauthenticated callers.
    #[must_use]
    pub fn unauthorized() -> Self {
        Self::of(&[401, 403])
    }

    /// Returns true when `status` is acceptable.
    #[must_use]
    pub fn contains(&self, status: u16) -> bool {
        self.0.contains(&status)
    }

    /// Returns true when the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates the codes in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = u16> + '_ {
        self.0.iter().copied()
    }
}

impl fmt::Display for StatusSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (index, code) in self.0.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{code}")?;
        }
        f.write_str("}")
    }
}

// ============================================================================
// SECTION: Rate Limit Budget
// ============================================================================

/// Request budget enforced by the server for one endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RateLimitBudget {
    /// Requests allowed per window.
    pub requests: u32,
    /// Window length in milliseconds.
    pub window_ms: u64,
}

impl RateLimitBudget {
    /// Budget of `requests` per minute.
    #[must_use]
    pub const fn per_minute(requests: u32) -> Self {
        Self {
            requests,
            window_ms: 60_000,
        }
    }

    /// Returns the window as a [`Duration`].
    #[must_use]
    pub const fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms)
    }

    /// Smallest burst that must observe throttling if the budget is enforced.
    #[must_use]
    pub const fn exceeding_burst(&self) -> u32 {
        self.requests.saturating_add(1)
    }
}

impl fmt::Display for RateLimitBudget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}ms", self.requests, self.window_ms)
    }
}

// ============================================================================
// SECTION: Auth Requirement
// ============================================================================

/// Authentication required by an endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(tag = "mode", content = "role", rename_all = "snake_case")]
pub enum AuthRequirement {
    /// Public endpoint.
    #[default]
    None,
    /// Any valid bearer token.
    Bearer,
    /// A valid bearer token carrying the named role.
    Role(String),
}

impl AuthRequirement {
    /// Returns true when a bearer token is needed.
    #[must_use]
    pub const fn is_protected(&self) -> bool {
        !matches!(self, Self::None)
    }

    /// Returns true when a specific role is needed.
    #[must_use]
    pub const fn is_role_restricted(&self) -> bool {
        matches!(self, Self::Role(_))
    }
}

// ============================================================================
// SECTION: Endpoint Spec
// ============================================================================

/// Immutable contract for one endpoint under test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointSpec {
    /// Catalog identifier.
    pub id: EndpointId,
    /// HTTP method.
    pub method: HttpMethod,
    /// Path template relative to the target base URL.
    pub path: PathTemplate,
    /// Acceptable success statuses.
    pub success: StatusSet,
    /// Response schema contract, when the body is checked.
    #[serde(default)]
    pub contract: Option<SchemaContract>,
    /// Server-side request budget, when one is enforced.
    #[serde(default)]
    pub rate_limit: Option<RateLimitBudget>,
    /// Authentication requirement.
    #[serde(default)]
    pub auth: AuthRequirement,
    /// Latency threshold in milliseconds.
    #[serde(default)]
    pub latency_budget_ms: Option<u64>,
}

impl EndpointSpec {
    /// Creates a public endpoint spec expecting `200`.
    #[must_use]
    pub fn new(id: impl Into<EndpointId>, method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            method,
            path: PathTemplate::new(path),
            success: StatusSet::of(&[200]),
            contract: None,
            rate_limit: None,
            auth: AuthRequirement::None,
            latency_budget_ms: None,
        }
    }

    /// Replaces the success status set.
    #[must_use]
    pub fn with_success(mut self, codes: &[u16]) -> Self {
        self.success = StatusSet::of(codes);
        self
    }

    /// Attaches a response schema contract.
    #[must_use]
    pub fn with_contract(mut self, contract: SchemaContract) -> Self {
        self.contract = Some(contract);
        self
    }

    /// Attaches a rate-limit budget.
    #[must_use]
    pub const fn with_rate_limit(mut self, budget: RateLimitBudget) -> Self {
        self.rate_limit = Some(budget);
        self
    }

    /// Sets the authentication requirement.
    #[must_use]
    pub fn with_auth(mut self, auth: AuthRequirement) -> Self {
        self.auth = auth;
        self
    }

    /// Sets the latency budget.
    #[must_use]
    pub const fn with_latency_budget(mut self, millis: u64) -> Self {
        self.latency_budget_ms = Some(millis);
        self
    }

    /// Returns the latency budget as a [`Duration`].
    #[must_use]
    pub fn latency_budget(&self) -> Option<Duration> {
        self.latency_budget_ms.map(Duration::from_millis)
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
