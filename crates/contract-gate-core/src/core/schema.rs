// crates/contract-gate-core/src/core/schema.rs
// ============================================================================
// Module: Contract Gate Schema Contracts
// Description: Declarative response shapes with tagged variants.
// Purpose: Describe expected JSON bodies without embedding checking logic.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! A [`SchemaContract`] is a tree of [`Shape`] nodes. Objects list their
//! [`FieldRule`]s in order; lists carry an item shape; numbers carry optional
//! bounds. Polymorphic fields (an object or a list of one, a payload nested
//! under `data` or returned bare) are expressed with [`Shape::OneOf`] so the
//! validator stays declarative.
//!
//! Contracts are plain data. Evaluating them performs no I/O.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

// ============================================================================
// SECTION: Bounds
// ============================================================================

/// Numeric bound applied to number and integer shapes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bound {
    /// Bound value.
    pub value: f64,
    /// Whether the bound itself is accepted.
    #[serde(default = "default_inclusive")]
    pub inclusive: bool,
}

/// Serde default for [`Bound::inclusive`].
const fn default_inclusive() -> bool {
    true
}

impl Bound {
    /// Inclusive bound.
    #[must_use]
    pub const fn inclusive(value: f64) -> Self {
        Self {
            value,
            inclusive: true,
        }
    }

    /// Exclusive bound.
    #[must_use]
    pub const fn exclusive(value: f64) -> Self {
        Self {
            value,
            inclusive: false,
        }
    }

    /// Returns true when `candidate` satisfies this bound as a minimum.
    #[must_use]
    pub fn admits_as_min(&self, candidate: f64) -> bool {
        if self.inclusive { candidate >= self.value } else { candidate > self.value }
    }

    /// Returns true when `candidate` satisfies this bound as a maximum.
    #[must_use]
    pub fn admits_as_max(&self, candidate: f64) -> bool {
        if self.inclusive { candidate <= self.value } else { candidate < self.value }
    }
}

// ============================================================================
// SECTION: Shapes
// ============================================================================

/// One node of a schema contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Shape {
    /// Any JSON value.
    Any,
    /// JSON `null`.
    Null,
    /// JSON boolean.
    Bool,
    /// JSON string.
    String {
        /// Rejects empty or whitespace-only strings.
        #[serde(default)]
        non_empty: bool,
    },
    /// JSON number; integers and floats are interchangeable.
    Number {
        /// Lower bound.
        #[serde(default)]
        min: Option<Bound>,
        /// Upper bound.
        #[serde(default)]
        max: Option<Bound>,
    },
    /// JSON integer literal; `5.0` is a float and does not match.
    Integer {
        /// Lower bound.
        #[serde(default)]
        min: Option<Bound>,
        /// Upper bound.
        #[serde(default)]
        max: Option<Bound>,
    },
    /// JSON array whose items all match `items`.
    List {
        /// Item shape.
        items: Box<Self>,
        /// Minimum item count.
        #[serde(default)]
        min_items: usize,
    },
    /// JSON object with the given field rules. Extra keys are allowed.
    Object {
        /// Field rules in evaluation order.
        fields: Vec<FieldRule>,
    },
    /// `null` or the inner shape.
    Nullable {
        /// Shape accepted when the value is not null.
        inner: Box<Self>,
    },
    /// Accepts the value when any variant matches.
    OneOf {
        /// Declared variants, in preference order.
        variants: Vec<Self>,
    },
}

impl Shape {
    /// Any string.
    #[must_use]
    pub const fn string() -> Self {
        Self::String {
            non_empty: false,
        }
    }

    /// A string that is not empty after trimming.
    #[must_use]
    pub const fn non_empty_string() -> Self {
        Self::String {
            non_empty: true,
        }
    }

    /// Any number.
    #[must_use]
    pub const fn number() -> Self {
        Self::Number {
            min: None,
            max: None,
        }
    }

    /// A number strictly greater than zero.
    #[must_use]
    pub const fn positive_number() -> Self {
        Self::Number {
            min: Some(Bound::exclusive(0.0)),
            max: None,
        }
    }

    /// A number within `[min, max]`.
    #[must_use]
    pub const fn number_between(min: f64, max: f64) -> Self {
        Self::Number {
            min: Some(Bound::inclusive(min)),
            max: Some(Bound::inclusive(max)),
        }
    }

    /// Any integer.
    #[must_use]
    pub const fn integer() -> Self {
        Self::Integer {
            min: None,
            max: None,
        }
    }

    /// An integer greater than or equal to `min`.
    #[must_use]
    pub const fn integer_at_least(min: f64) -> Self {
        Self::Integer {
            min: Some(Bound::inclusive(min)),
            max: None,
        }
    }

    /// A list of `items`.
    #[must_use]
    pub fn list(items: Self) -> Self {
        Self::List {
            items: Box::new(items),
            min_items: 0,
        }
    }

    /// A list of `items` with at least one element.
    #[must_use]
    pub fn non_empty_list(items: Self) -> Self {
        Self::List {
            items: Box::new(items),
            min_items: 1,
        }
    }

    /// An object with the given field rules.
    #[must_use]
    pub const fn object(fields: Vec<FieldRule>) -> Self {
        Self::Object {
            fields,
        }
    }

    /// `null` or `inner`.
    #[must_use]
    pub fn nullable(inner: Self) -> Self {
        Self::Nullable {
            inner: Box::new(inner),
        }
    }

    /// Any of the given variants.
    #[must_use]
    pub const fn one_of(variants: Vec<Self>) -> Self {
        Self::OneOf {
            variants,
        }
    }

    /// Returns true when the JSON kind of `value` is one this shape can accept.
    ///
    /// Kind compatibility ignores bounds and nested structure.
    #[must_use]
    pub fn accepts_kind(&self, value: &Value) -> bool {
        match self {
            Self::Any => true,
            Self::Null => value.is_null(),
            Self::Bool => value.is_boolean(),
            Self::String {
                ..
            } => value.is_string(),
            Self::Number {
                ..
            }
            | Self::Integer {
                ..
            } => value.is_number(),
            Self::List {
                ..
            } => value.is_array(),
            Self::Object {
                ..
            } => value.is_object(),
            Self::Nullable {
                inner,
            } => value.is_null() || inner.accepts_kind(value),
            Self::OneOf {
                variants,
            } => variants.iter().any(|variant| variant.accepts_kind(value)),
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("any"),
            Self::Null => f.write_str("null"),
            Self::Bool => f.write_str("bool"),
            Self::String {
                non_empty,
            } => f.write_str(if *non_empty { "non-empty string" } else { "string" }),
            Self::Number {
                ..
            } => f.write_str("number"),
            Self::Integer {
                ..
            } => f.write_str("integer"),
            Self::List {
                items, ..
            } => write!(f, "list of {items}"),
            Self::Object {
                ..
            } => f.write_str("object"),
            Self::Nullable {
                inner,
            } => write!(f, "null or {inner}"),
            Self::OneOf {
                variants,
            } => {
                f.write_str("one of [")?;
                for (index, variant) in variants.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{variant}")?;
                }
                f.write_str("]")
            }
        }
    }
}

// ============================================================================
// SECTION: Field Rules
// ============================================================================

/// Rule for one named field of an object shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldRule {
    /// Field name.
    pub name: String,
    /// Expected shape.
    pub shape: Shape,
    /// Whether absence is a violation.
    #[serde(default = "default_required")]
    pub required: bool,
}

/// Serde default for [`FieldRule::required`].
const fn default_required() -> bool {
    true
}

impl FieldRule {
    /// Required field.
    #[must_use]
    pub fn required(name: impl Into<String>, shape: Shape) -> Self {
        Self {
            name: name.into(),
            shape,
            required: true,
        }
    }

    /// Optional field; checked only when present.
    #[must_use]
    pub fn optional(name: impl Into<String>, shape: Shape) -> Self {
        Self {
            name: name.into(),
            shape,
            required: false,
        }
    }
}

// ============================================================================
// SECTION: Schema Contract
// ============================================================================

/// Root of a response schema contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemaContract {
    /// Root shape.
    root: Shape,
}

impl SchemaContract {
    /// Wraps a root shape.
    #[must_use]
    pub const fn new(root: Shape) -> Self {
        Self {
            root,
        }
    }

    /// Returns the root shape.
    #[must_use]
    pub const fn root(&self) -> &Shape {
        &self.root
    }
}

impl From<Shape> for SchemaContract {
    fn from(root: Shape) -> Self {
        Self::new(root)
    }
}
