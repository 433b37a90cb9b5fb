// crates/contract-gate-cli/src/scenarios/access.rs
// ============================================================================
// Module: Access Control Scenarios
// Description: Auth-state matrices for the user and admin endpoints.
// Purpose: Prove protected endpoints reject missing, invalid, and wrong-role tokens.
// Dependencies: contract-gate-core
// ============================================================================

//! ## Overview
//! Each scenario runs the standard matrix for its endpoint and, when a valid
//! token is configured, checks the body of an authorized call against the
//! endpoint contract.

use contract_gate_core::AuthMatrix;
use contract_gate_core::EndpointSpec;
use contract_gate_core::FnScenario;
use contract_gate_core::run_scenario;

use super::names;
use crate::catalog::Catalog;
use crate::catalog::ids;
use crate::error::CliResult;

/// `GET /api/user` across the auth matrix.
pub fn auth_user_matrix(catalog: &Catalog) -> CliResult<FnScenario> {
    Ok(matrix_scenario(names::AUTH_USER_MATRIX, catalog.endpoint(ids::USER)?))
}

/// `GET /api/admin/stats` across the auth matrix, including the wrong-role cell.
pub fn admin_stats_matrix(catalog: &Catalog) -> CliResult<FnScenario> {
    Ok(matrix_scenario(names::ADMIN_STATS_MATRIX, catalog.endpoint(ids::ADMIN_STATS)?))
}

/// Builds a matrix scenario for one endpoint.
fn matrix_scenario(name: &str, endpoint: EndpointSpec) -> FnScenario {
    let matrix = AuthMatrix::standard(&endpoint);
    FnScenario::new(name, move |ctx| {
        run_scenario(
            ctx,
            |_| Ok(()),
            |ctx, ()| {
                let base = ctx.endpoint_request(&endpoint, &[])?;
                let results = ctx.auth_runner().run(&endpoint, &matrix, || base.clone());
                let authorized = if ctx.credentials().valid_token.is_some() {
                    Some(ctx.send(&base)?)
                } else {
                    None
                };
                Ok((results, authorized))
            },
            |ctx, (), (results, authorized)| {
                ctx.checks().auth_matrix(&endpoint, &results);
                if let Some(response) = authorized {
                    ctx.checks().endpoint(&endpoint, &response);
                }
                Ok(())
            },
            |_, ()| Ok(()),
        )
    })
}
