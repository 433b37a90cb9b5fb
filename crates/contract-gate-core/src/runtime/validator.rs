// crates/contract-gate-core/src/runtime/validator.rs
// ============================================================================
// Module: Contract Gate Schema Validator
// Description: Pure evaluation of JSON values against schema contracts.
// Purpose: Report every contract violation without raising errors.
// Dependencies: crate::core::schema, serde, serde_json
// ============================================================================

//! ## Overview
//! [`validate`] walks a JSON value alongside its [`SchemaContract`] and
//! collects [`Violation`]s. Validation never fails: data-shape problems are
//! returned as values.
//!
//! Invariants:
//! - Violation order is deterministic: object fields follow contract order and
//!   list items follow index order.
//! - A missing required field yields exactly one violation and is not recursed.
//! - Unknown extra keys are accepted.
//! - Integers and floats are interchangeable for number shapes.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::core::schema::Bound;
use crate::core::schema::FieldRule;
use crate::core::schema::SchemaContract;
use crate::core::schema::Shape;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum rendered length of an actual value inside a violation.
pub const MAX_RENDERED_VALUE_CHARS: usize = 120;

// ============================================================================
// SECTION: Violations
// ============================================================================

/// Classification of a schema violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// Required field absent.
    MissingField,
    /// JSON kind does not match the shape.
    TypeMismatch,
    /// String was empty where a non-empty string was required.
    EmptyString,
    /// Number outside its declared bounds.
    OutOfBounds,
    /// List shorter than its declared minimum.
    TooFewItems,
    /// No `one_of` variant accepts the value's kind.
    NoVariantMatched,
}

impl ViolationKind {
    /// Returns the stable wire label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MissingField => "missing_field",
            Self::TypeMismatch => "type_mismatch",
            Self::EmptyString => "empty_string",
            Self::OutOfBounds => "out_of_bounds",
            Self::TooFewItems => "too_few_items",
            Self::NoVariantMatched => "no_variant_matched",
        }
    }
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One contract violation at a `$`-rooted path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// Location such as `$.offers[0].price`.
    pub path: String,
    /// Violation class.
    pub kind: ViolationKind,
    /// Expected shape or bound, rendered.
    pub expected: String,
    /// Observed value, rendered and truncated.
    pub actual: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: expected {}, got {}", self.path, self.kind, self.expected, self.actual)
    }
}

/// Result of validating one value.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ValidationResult {
    /// Violations in deterministic order.
    violations: Vec<Violation>,
}

impl ValidationResult {
    /// Returns true when no violations were found.
    #[must_use]
    pub fn ok(&self) -> bool {
        self.violations.is_empty()
    }

    /// Violations in deterministic order.
    #[must_use]
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Consumes the result, returning its violations.
    #[must_use]
    pub fn into_violations(self) -> Vec<Violation> {
        self.violations
    }
}

// ============================================================================
// SECTION: Entry Points
// ============================================================================

/// Validates a JSON value against a contract.
#[must_use]
pub fn validate(body: &Value, contract: &SchemaContract) -> ValidationResult {
    validate_shape(body, contract.root())
}

/// Validates a JSON value against a bare shape.
#[must_use]
pub fn validate_shape(body: &Value, shape: &Shape) -> ValidationResult {
    let mut violations = Vec::new();
    check(body, shape, "$", &mut violations);
    ValidationResult {
        violations,
    }
}

/// Validates a raw body. Bodies that are not JSON produce one `type_mismatch` at `$`.
#[must_use]
pub fn validate_json(body: &[u8], contract: &SchemaContract) -> ValidationResult {
    match serde_json::from_slice::<Value>(body) {
        Ok(value) => validate(&value, contract),
        Err(_) => ValidationResult {
            violations: vec![Violation {
                path: "$".to_string(),
                kind: ViolationKind::TypeMismatch,
                expected: format!("JSON {}", contract.root()),
                actual: render_text(&String::from_utf8_lossy(body)),
            }],
        },
    }
}

// ============================================================================
// SECTION: Evaluation
// ============================================================================

/// Recursively checks `value` against `shape`, appending violations.
fn check(value: &Value, shape: &Shape, path: &str, out: &mut Vec<Violation>) {
    match shape {
        Shape::Any => {}
        Shape::Null | Shape::Bool => {
            if !shape.accepts_kind(value) {
                out.push(mismatch(path, shape, value));
            }
        }
        Shape::String {
            non_empty,
        } => match value {
            Value::String(text) => {
                if *non_empty && text.trim().is_empty() {
                    out.push(violation(path, ViolationKind::EmptyString, "non-empty string", value));
                }
            }
            _ => out.push(mismatch(path, shape, value)),
        },
        Shape::Number {
            min,
            max,
        } => match value.as_f64() {
            Some(number) => check_bounds(number, *min, *max, path, value, out),
            None => out.push(mismatch(path, shape, value)),
        },
        Shape::Integer {
            min,
            max,
        } => {
            if !(value.is_i64() || value.is_u64()) {
                out.push(mismatch(path, shape, value));
                return;
            }
            if let Some(number) = value.as_f64() {
                check_bounds(number, *min, *max, path, value, out);
            }
        }
        Shape::List {
            items,
            min_items,
        } => {
            let Value::Array(elements) = value else {
                out.push(mismatch(path, shape, value));
                return;
            };
            if elements.len() < *min_items {
                out.push(Violation {
                    path: path.to_string(),
                    kind: ViolationKind::TooFewItems,
                    expected: format!("at least {min_items} items"),
                    actual: format!("{} items", elements.len()),
                });
            }
            for (index, element) in elements.iter().enumerate() {
                check(element, items, &format!("{path}[{index}]"), out);
            }
        }
        Shape::Object {
            fields,
        } => {
            let Value::Object(map) = value else {
                out.push(mismatch(path, shape, value));
                return;
            };
            for rule in fields {
                check_field(map.get(&rule.name), rule, path, out);
            }
        }
        Shape::Nullable {
            inner,
        } => {
            if !value.is_null() {
                check(value, inner, path, out);
            }
        }
        Shape::OneOf {
            variants,
        } => check_one_of(value, shape, variants, path, out),
    }
}

/// Checks one field of an object.
fn check_field(
    value: Option<&Value>,
    rule: &FieldRule,
    parent: &str,
    out: &mut Vec<Violation>,
) {
    let path = field_path(parent, &rule.name);
    match value {
        Some(value) => check(value, &rule.shape, &path, out),
        None if rule.required => out.push(Violation {
            path,
            kind: ViolationKind::MissingField,
            expected: rule.shape.to_string(),
            actual: "absent".to_string(),
        }),
        None => {}
    }
}

/// Resolves a `one_of` node.
///
/// Only variants compatible with the value's JSON kind are considered. The
/// first clean variant accepts the value; otherwise the variant with the
/// fewest violations is reported, earliest first on ties.
fn check_one_of(
    value: &Value,
    shape: &Shape,
    variants: &[Shape],
    path: &str,
    out: &mut Vec<Violation>,
) {
    let mut best: Option<Vec<Violation>> = None;
    for variant in variants.iter().filter(|variant| variant.accepts_kind(value)) {
        let mut candidate = Vec::new();
        check(value, variant, path, &mut candidate);
        if candidate.is_empty() {
            return;
        }
        if best.as_ref().is_none_or(|current| candidate.len() < current.len()) {
            best = Some(candidate);
        }
    }
    match best {
        Some(violations) => out.extend(violations),
        None => out.push(violation(path, ViolationKind::NoVariantMatched, &shape.to_string(), value)),
    }
}

/// Checks numeric bounds, reporting at most one violation.
fn check_bounds(
    number: f64,
    min: Option<Bound>,
    max: Option<Bound>,
    path: &str,
    value: &Value,
    out: &mut Vec<Violation>,
) {
    if let Some(bound) = min
        && !bound.admits_as_min(number)
    {
        let op = if bound.inclusive { ">=" } else { ">" };
        out.push(violation(path, ViolationKind::OutOfBounds, &format!("{op} {}", bound.value), value));
        return;
    }
    if let Some(bound) = max
        && !bound.admits_as_max(number)
    {
        let op = if bound.inclusive { "<=" } else { "<" };
        out.push(violation(path, ViolationKind::OutOfBounds, &format!("{op} {}", bound.value), value));
    }
}

// ============================================================================
// SECTION: Rendering
// ============================================================================

/// Builds a violation with a rendered actual value.
fn violation(path: &str, kind: ViolationKind, expected: &str, value: &Value) -> Violation {
    Violation {
        path: path.to_string(),
        kind,
        expected: expected.to_string(),
        actual: render_value(value),
    }
}

/// Builds a type mismatch against `shape`.
fn mismatch(path: &str, shape: &Shape, value: &Value) -> Violation {
    violation(path, ViolationKind::TypeMismatch, &shape.to_string(), value)
}

/// Appends a field segment, using bracket notation for non-identifier names.
fn field_path(parent: &str, name: &str) -> String {
    let simple = !name.is_empty() && name.chars().all(|ch| ch.is_ascii_alphanumeric() || ch == '_');
    if simple {
        format!("{parent}.{name}")
    } else {
        format!("{parent}[{}]", Value::String(name.to_string()))
    }
}

/// Renders a JSON value compactly, truncated to [`MAX_RENDERED_VALUE_CHARS`].
#[must_use]
pub fn render_value(value: &Value) -> String {
    render_text(&value.to_string())
}

/// Truncates text to [`MAX_RENDERED_VALUE_CHARS`] characters.
fn render_text(text: &str) -> String {
    if text.chars().count() <= MAX_RENDERED_VALUE_CHARS {
        return text.to_string();
    }
    let mut out: String = text.chars().take(MAX_RENDERED_VALUE_CHARS).collect();
    out.push_str("...");
    out
}
