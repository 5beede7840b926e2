//! Attribute value representation
//!
//! This module defines the [`Value`] enum held by every record attribute, and
//! the [`SortKey`] a value is reduced to before comparison.
//!
//! # Value Types
//!
//! - [`Value::Number`]: any JSON number, stored as `f64`
//! - [`Value::Text`]: a string (dates, city names, ...)
//! - [`Value::Flag`]: a boolean
//! - [`Value::Null`]: an explicit JSON `null`
//! - [`Value::Other`]: arrays and objects, kept verbatim
//!
//! Only numbers and text can become sort keys. A `NaN` number is rejected
//! because it has no place in a total order.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Attribute values as they arrive from a record source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Number(f64),
    Text(String),
    Flag(bool),
    Null,
    Other(serde_json::Value),
}

impl Value {
    /// Get the numeric value, returns None if not a Number
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Get the text value, returns None if not Text
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Reduce to a comparable key, or None if this value cannot be ordered
    pub fn sort_key(&self) -> Option<SortKey> {
        match self {
            Value::Number(n) if !n.is_nan() => Some(SortKey::Number(*n)),
            Value::Text(s) => Some(SortKey::Text(s.clone())),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{}", n),
            Value::Text(s) => write!(f, "{}", s),
            Value::Flag(b) => write!(f, "{}", b),
            Value::Null => write!(f, "null"),
            Value::Other(v) => write!(f, "{}", v),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Flag(b)
    }
}

/// A value that can take part in a comparison sort
#[derive(Debug, Clone, PartialEq)]
pub enum SortKey {
    Number(f64),
    Text(String),
}

impl SortKey {
    /// Whether both keys are of the same kind and can be ordered together
    pub fn same_kind(&self, other: &SortKey) -> bool {
        matches!(
            (self, other),
            (SortKey::Number(_), SortKey::Number(_)) | (SortKey::Text(_), SortKey::Text(_))
        )
    }

    /// Ascending comparison.
    ///
    /// Keys of different kinds never meet once input has been validated; they
    /// order numbers first so the method stays total.
    pub fn compare(&self, other: &SortKey) -> Ordering {
        match (self, other) {
            (SortKey::Number(a), SortKey::Number(b)) => {
                a.partial_cmp(b).unwrap_or(Ordering::Equal)
            }
            (SortKey::Text(a), SortKey::Text(b)) => a.cmp(b),
            (SortKey::Number(_), SortKey::Text(_)) => Ordering::Less,
            (SortKey::Text(_), SortKey::Number(_)) => Ordering::Greater,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            SortKey::Number(n) => Some(*n),
            SortKey::Text(_) => None,
        }
    }
}
