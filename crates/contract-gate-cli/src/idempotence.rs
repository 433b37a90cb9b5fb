// crates/contract-gate-cli/src/idempotence.rs
// ============================================================================
// Module: Idempotent Read Comparison
// Description: Structural comparison of repeated reads, ignoring volatile fields.
// Purpose: Decide whether two GET bodies describe the same resource state.
// Dependencies: serde_json, contract-gate-core
// ============================================================================

//! ## Overview
//! Two reads of the same resource must agree on every field except server
//! bookkeeping. Timestamps such as `updated_at` are skipped at any depth,
//! along with any extra field names the caller excludes.

use std::collections::BTreeSet;

use contract_gate_core::runtime::validator::render_value;
use serde_json::Value;

/// Fields that may legitimately change between two reads.
pub const VOLATILE_FIELDS: [&str; 3] = ["updated_at", "created_at", "server_time"];

/// First point where two reads disagree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Difference {
    /// `$`-rooted path of the mismatch.
    pub path: String,
    /// Rendered value from the first read.
    pub first: String,
    /// Rendered value from the second read.
    pub second: String,
}

/// Compares two reads, skipping volatile fields and `excluded` names.
///
/// Returns `None` when the bodies agree.
#[must_use]
pub fn first_difference(first: &Value, second: &Value, excluded: &[&str]) -> Option<Difference> {
    let mut ignored: BTreeSet<&str> = VOLATILE_FIELDS.into_iter().collect();
    ignored.extend(excluded.iter().copied());
    compare("$".to_string(), first, second, &ignored)
}

/// Walks both values in lockstep.
fn compare(path: String, first: &Value, second: &Value, ignored: &BTreeSet<&str>) -> Option<Difference> {
    match (first, second) {
        (Value::Object(left), Value::Object(right)) => {
            let keys: BTreeSet<&String> = left.keys().chain(right.keys()).collect();
            keys.into_iter().filter(|key| !ignored.contains(key.as_str())).find_map(|key| {
                let child = format!("{path}.{key}");
                match (left.get(key), right.get(key)) {
                    (Some(a), Some(b)) => compare(child, a, b, ignored),
                    (a, b) => Some(Difference {
                        path: child,
                        first: a.map_or_else(|| "(absent)".to_string(), render_value),
                        second: b.map_or_else(|| "(absent)".to_string(), render_value),
                    }),
                }
            })
        }
        (Value::Array(left), Value::Array(right)) if left.len() == right.len() => left
            .iter()
            .zip(right)
            .enumerate()
            .find_map(|(index, (a, b))| compare(format!("{path}[{index}]"), a, b, ignored)),
        (a, b) if a == b => None,
        (a, b) => Some(Difference {
            path,
            first: render_value(a),
            second: render_value(b),
        }),
    }
}
