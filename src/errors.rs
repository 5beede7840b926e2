//! Error types for trace generation and record loading
//!
//! [`TraceError`] is the only checked failure of generation: it is raised before
//! any sorting starts, so a failed call never yields a partial trace.
//! [`FetchError`] belongs to the record-source boundary and never reaches the
//! generator.
//!
//! Playback has no error type. Every controller operation is total and invalid
//! calls are no-ops.

use std::fmt;

/// Why a key could not be used on a particular record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyFault {
    /// The record has no attribute with that name
    Missing,
    /// The attribute exists but cannot be ordered against the other values
    /// (NaN, a non-scalar value, or a number mixed with text)
    NotComparable,
}

/// Errors raised by trace generation and the helpers built on it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceError {
    /// The requested key is missing or not comparable on an input element
    InvalidKey {
        key: String,
        index: usize,
        reason: KeyFault,
    },
}

impl TraceError {
    pub fn missing_key(key: &str, index: usize) -> Self {
        TraceError::InvalidKey {
            key: key.to_string(),
            index,
            reason: KeyFault::Missing,
        }
    }

    pub fn not_comparable(key: &str, index: usize) -> Self {
        TraceError::InvalidKey {
            key: key.to_string(),
            index,
            reason: KeyFault::NotComparable,
        }
    }

    /// Input position of the first offending record
    pub fn index(&self) -> usize {
        match self {
            TraceError::InvalidKey { index, .. } => *index,
        }
    }
}

impl fmt::Display for TraceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraceError::InvalidKey {
                key,
                index,
                reason: KeyFault::Missing,
            } => {
                write!(f, "Invalid key '{}': record {} has no such attribute", key, index)
            }
            TraceError::InvalidKey {
                key,
                index,
                reason: KeyFault::NotComparable,
            } => {
                write!(
                    f,
                    "Invalid key '{}': value on record {} is not comparable",
                    key, index
                )
            }
        }
    }
}

impl std::error::Error for TraceError {}

/// Errors raised by a [`crate::source::RecordSource`]
#[derive(Debug)]
pub enum FetchError {
    /// The backing file could not be read
    Io { path: String, source: std::io::Error },

    /// The payload was not a JSON array of objects
    Parse { path: String, message: String },

    /// The selection matched nothing the source knows about
    NotFound { selection: String },

    /// The records could not be ranked for the selection
    InvalidSelection { selection: String, source: TraceError },
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Io { path, source } => {
                write!(f, "Failed to read '{}': {}", path, source)
            }
            FetchError::Parse { path, message } => {
                write!(f, "Failed to parse records in '{}': {}", path, message)
            }
            FetchError::NotFound { selection } => {
                write!(f, "No records found for {}", selection)
            }
            FetchError::InvalidSelection { selection, source } => {
                write!(f, "Cannot select {}: {}", selection, source)
            }
        }
    }
}

impl std::error::Error for FetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FetchError::Io { source, .. } => Some(source),
            FetchError::InvalidSelection { source, .. } => Some(source),
            FetchError::Parse { .. } | FetchError::NotFound { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_key_messages_name_the_record() {
        let missing = TraceError::missing_key("Humidity", 3);
        assert_eq!(
            missing.to_string(),
            "Invalid key 'Humidity': record 3 has no such attribute"
        );
        assert_eq!(missing.index(), 3);

        let nan = TraceError::not_comparable("Temperature", 0);
        assert!(nan.to_string().contains("not comparable"));
    }
}
