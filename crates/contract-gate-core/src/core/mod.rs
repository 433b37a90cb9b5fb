// crates/contract-gate-core/src/core/mod.rs
// ============================================================================
// Module: Contract Gate Core Model
// Description: Endpoint, request, schema, and outcome types.
// Purpose: Define the data model shared by every runtime component.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Core types are plain data: endpoint contracts, request/response captures,
//! schema shapes, and scenario outcomes. Nothing here performs I/O.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod endpoint;
pub mod identifiers;
pub mod outcome;
pub mod request;
pub mod schema;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use endpoint::AuthRequirement;
pub use endpoint::EndpointSpec;
pub use endpoint::HttpMethod;
pub use endpoint::PathTemplate;
pub use endpoint::RateLimitBudget;
pub use endpoint::StatusSet;
pub use endpoint::TemplateError;
pub use identifiers::EndpointId;
pub use identifiers::FixtureId;
pub use identifiers::ScenarioName;
pub use outcome::Failure;
pub use outcome::FailureKind;
pub use outcome::Lane;
pub use outcome::ScenarioOutcome;
pub use request::AUTHORIZATION;
pub use request::DEFAULT_TIMEOUT;
pub use request::FilePart;
pub use request::RequestBody;
pub use request::RequestSpec;
pub use request::Response;
pub use request::RetryAfter;
pub use request::duration_ms;
pub use schema::Bound;
pub use schema::FieldRule;
pub use schema::SchemaContract;
pub use schema::Shape;
