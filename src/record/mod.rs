//! Records and keyed comparison
//!
//! This module provides the data the generator sorts and the rule it sorts by:
//! - [`value`]: attribute values and the [`SortKey`] they reduce to
//! - [`Record`]: an opaque bag of named attributes
//! - [`Keyed`]: the seam through which any element type exposes a key
//! - [`KeyedComparator`]: validates keys up front and compares them in the
//!   requested direction
//!
//! # Direction
//!
//! Descending order is not a reversed ascending sort. The comparator flips the
//! comparison itself, so every intermediate state reflects a genuine
//! descending trajectory.

pub mod value;

use crate::errors::{KeyFault, TraceError};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub use value::{SortKey, Value};

/// A weather record (or any other item) with named attributes
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    attributes: FxHashMap<String, Value>,
}

impl Record {
    pub fn new() -> Self {
        Record {
            attributes: FxHashMap::default(),
        }
    }

    /// Builder-style insert
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: &str, value: impl Into<Value>) -> Option<Value> {
        self.attributes.insert(name.to_string(), value.into())
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    pub fn attributes(&self) -> &FxHashMap<String, Value> {
        &self.attributes
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, Value)> for Record {
    fn from_iter<I: IntoIterator<Item = (S, Value)>>(iter: I) -> Self {
        Record {
            attributes: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// Anything the generator can sort by a named key
pub trait Keyed {
    /// Resolve `key` on this element
    fn sort_key(&self, key: &str) -> Result<SortKey, KeyFault>;
}

impl Keyed for Record {
    fn sort_key(&self, key: &str) -> Result<SortKey, KeyFault> {
        self.get(key)
            .ok_or(KeyFault::Missing)?
            .sort_key()
            .ok_or(KeyFault::NotComparable)
    }
}

/// Bare numbers are their own key; the key name is ignored.
impl Keyed for f64 {
    fn sort_key(&self, _key: &str) -> Result<SortKey, KeyFault> {
        if self.is_nan() {
            Err(KeyFault::NotComparable)
        } else {
            Ok(SortKey::Number(*self))
        }
    }
}

impl<T: Keyed + ?Sized> Keyed for &T {
    fn sort_key(&self, key: &str) -> Result<SortKey, KeyFault> {
        (**self).sort_key(key)
    }
}

/// Requested direction of a sort
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Ascending => "asc",
            SortOrder::Descending => "desc",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for an unrecognised order or algorithm name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseChoiceError {
    pub kind: &'static str,
    pub input: String,
}

impl fmt::Display for ParseChoiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown {} '{}'", self.kind, self.input)
    }
}

impl std::error::Error for ParseChoiceError {}

impl FromStr for SortOrder {
    type Err = ParseChoiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortOrder::Ascending),
            "desc" | "descending" => Ok(SortOrder::Descending),
            _ => Err(ParseChoiceError {
                kind: "sort order",
                input: s.to_string(),
            }),
        }
    }
}

/// Compares elements on one named key in one direction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyedComparator {
    key: String,
    order: SortOrder,
}

impl KeyedComparator {
    pub fn new(key: &str, order: SortOrder) -> Self {
        KeyedComparator {
            key: key.to_string(),
            order,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn order(&self) -> SortOrder {
        self.order
    }

    /// Resolve the key on every element.
    ///
    /// All keys must be present, non-NaN, and of the same kind as the first
    /// element's key. The first offending index is reported.
    pub fn extract<T: Keyed>(&self, input: &[T]) -> Result<Vec<SortKey>, TraceError> {
        let mut keys: Vec<SortKey> = Vec::with_capacity(input.len());
        for (index, item) in input.iter().enumerate() {
            let key = item.sort_key(&self.key).map_err(|reason| TraceError::InvalidKey {
                key: self.key.clone(),
                index,
                reason,
            })?;
            if let Some(first) = keys.first() {
                if !first.same_kind(&key) {
                    return Err(TraceError::not_comparable(&self.key, index));
                }
            }
            keys.push(key);
        }
        Ok(keys)
    }

    /// Strict: `a` belongs before `b` and they are not equal
    pub fn precedes(&self, a: &SortKey, b: &SortKey) -> bool {
        match self.order {
            SortOrder::Ascending => a.compare(b).is_lt(),
            SortOrder::Descending => a.compare(b).is_gt(),
        }
    }

    /// Non-strict: `a` belongs before `b` or ties with it
    pub fn precedes_or_ties(&self, a: &SortKey, b: &SortKey) -> bool {
        !self.precedes(b, a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(v: f64) -> Record {
        Record::new().with("v", v)
    }

    #[test]
    fn record_round_trips_through_json_objects() {
        let records: Vec<Record> =
            serde_json::from_str(r#"[{"City": "Chennai", "Temperature": 34.1}]"#).unwrap();
        assert_eq!(records[0].get("City"), Some(&Value::from("Chennai")));
        assert_eq!(records[0].get("Temperature"), Some(&Value::Number(34.1)));
    }

    #[test]
    fn extract_reports_first_missing_key() {
        let input = vec![reading(1.0), Record::new().with("w", 2.0), Record::new()];
        let err = KeyedComparator::new("v", SortOrder::Ascending)
            .extract(&input)
            .unwrap_err();
        assert_eq!(err, TraceError::missing_key("v", 1));
    }

    #[test]
    fn extract_rejects_mixed_kinds_and_nan() {
        let cmp = KeyedComparator::new("v", SortOrder::Ascending);

        let mixed = vec![reading(1.0), Record::new().with("v", "high")];
        assert_eq!(
            cmp.extract(&mixed).unwrap_err(),
            TraceError::not_comparable("v", 1)
        );

        let nan = vec![reading(f64::NAN)];
        assert_eq!(
            cmp.extract(&nan).unwrap_err(),
            TraceError::not_comparable("v", 0)
        );
    }

    #[test]
    fn descending_flips_comparison() {
        let (lo, hi) = (SortKey::Number(1.0), SortKey::Number(2.0));
        let asc = KeyedComparator::new("v", SortOrder::Ascending);
        let desc = KeyedComparator::new("v", SortOrder::Descending);

        assert!(asc.precedes(&lo, &hi));
        assert!(!asc.precedes(&hi, &lo));
        assert!(desc.precedes(&hi, &lo));
        assert!(!desc.precedes(&lo, &lo));
        assert!(desc.precedes_or_ties(&lo, &lo));
        assert!(!desc.precedes_or_ties(&lo, &hi));
    }

    #[test]
    fn order_parses_short_and_long_names() {
        assert_eq!("desc".parse::<SortOrder>(), Ok(SortOrder::Descending));
        assert_eq!("Ascending".parse::<SortOrder>(), Ok(SortOrder::Ascending));
        assert!("sideways".parse::<SortOrder>().is_err());
    }
}
