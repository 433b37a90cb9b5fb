// crates/contract-gate-core/src/runtime/mod.rs
// ============================================================================
// Module: Contract Gate Runtime
// Description: Validation, probing, auth matrices, orchestration, and reporting.
// Purpose: Turn endpoint contracts into executed, recorded checks.
// Dependencies: crate::{core, interfaces}, tracing
// ============================================================================

//! ## Overview
//! Runtime components consume the core model and issue requests only through
//! [`crate::interfaces::Transport`]. Data-shape problems surface as values;
//! only missing responses and cancellation surface as errors.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod auth_matrix;
pub mod cancel;
pub mod orchestrator;
pub mod prober;
pub mod report;
pub mod scheduler;
pub mod validator;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use auth_matrix::AuthMatrix;
pub use auth_matrix::AuthMatrixRunner;
pub use auth_matrix::AuthVariant;
pub use auth_matrix::Credentials;
pub use auth_matrix::DEFAULT_INVALID_TOKEN;
pub use auth_matrix::Observation;
pub use auth_matrix::VariantCase;
pub use auth_matrix::VariantResult;
pub use cancel::CancelToken;
pub use orchestrator::Checks;
pub use orchestrator::FnScenario;
pub use orchestrator::Harness;
pub use orchestrator::HarnessError;
pub use orchestrator::Phase;
pub use orchestrator::Scenario;
pub use orchestrator::ScenarioContext;
pub use orchestrator::run_scenario;
pub use prober::MAX_PROBE_ATTEMPTS;
pub use prober::ProbeClass;
pub use prober::ProbeConfig;
pub use prober::ProbeError;
pub use prober::ProbeReport;
pub use prober::ProbeResult;
pub use prober::RateLimitProber;
pub use report::Report;
pub use report::Summary;
pub use scheduler::DEFAULT_WORKERS;
pub use scheduler::SuiteRunner;
pub use validator::ValidationResult;
pub use validator::Violation;
pub use validator::ViolationKind;
pub use validator::validate;
pub use validator::validate_json;
