//! Dynamic row values
//!
//! Rows are positionally-interpreted sequences of scalar values. Values carry
//! no schema tag and nothing is enforced at write time; consumers interpret
//! them by column position.
//!
//! Values serialize untagged, so a row round-trips through the store as a
//! bare JSON array, e.g. `[123,"bob","bob@x"]`. The serializer preserves the
//! integer/float distinction, but other producers of the same store format
//! may widen integers to floats; anything comparing values numerically must
//! accept both (see [`Value::as_int`]).

use serde::{Deserialize, Serialize};
use std::fmt;

/// A dynamically-typed scalar value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// NULL value
    Null,
    /// Boolean value
    Boolean(bool),
    /// Integer value
    Integer(i64),
    /// Float value
    Float(f64),
    /// String value
    String(String),
}

/// A row of data: one value per column, in table column order
pub type Row = Vec<Value>;

impl Value {
    /// Check if the value is NULL
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Coerce to an integer.
    ///
    /// Accepts a native integer, or a float with no fractional part within
    /// `i64` range -- the shape an integer takes after a serializer that
    /// widens numbers. Everything else is `None`.
    pub fn as_int(&self) -> Option<i64> {
        match *self {
            Value::Integer(i) => Some(i),
            Value::Float(f)
                if f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 =>
            {
                Some(f as i64)
            }
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Boolean(v) => write!(f, "{}", if *v { "TRUE" } else { "FALSE" }),
            Value::Integer(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::String(v) => write!(f, "{}", v),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}
