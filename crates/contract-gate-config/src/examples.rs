// crates/contract-gate-config/src/examples.rs
// ============================================================================
// Module: Config Examples
// Description: Canonical example configuration payload.
// Purpose: Deterministic starter file for `contract-gate init`.
// Dependencies: std
// ============================================================================

//! ## Overview
//! The example parses and validates under [`crate::ContractGateConfig`]; a
//! unit test keeps the two in sync.

/// Returns a canonical example `contract-gate.toml`.
#[must_use]
pub fn config_toml_example() -> String {
    String::from(
        r#"[target]
base_url = "http://localhost:8000"
timeout_ms = 30000
max_response_bytes = 4194304

[auth]
# valid_token = "..."
# wrong_role_token = "..."
invalid_token = "contract-gate-invalid-token"

[auth.login]
path = "/api/login"
email = "admin@example.com"
password = "change-me"

[runner]
workers = 4
# deadline_ms = 600000
probe_spacing_ms = 0
max_probe_attempts = 210
# confirm_delay_ms = 1000

[report]
output_dir = "contract-gate-report"

[[endpoints]]
id = "products.list"
rate_limit = { requests = 30, window_ms = 60000 }
latency_budget_ms = 200

[[endpoints]]
id = "products.delete"
auth = { mode = "bearer" }
success = [200, 204]

[[endpoints]]
id = "admin.stats"
auth = { mode = "role", role = "admin" }
"#,
    )
}
