//! Sort traces
//!
//! A [`Trace`] is the full history of a comparison sort: the untouched input
//! followed by one [`Snapshot`] of the whole working array per merge (or per
//! partition). It is created fresh on every [`generate`] call and never
//! mutated afterwards.
//!
//! - [`generator`]: the merge and quick sort passes that record snapshots
//!
//! # Invariants
//!
//! - A trace always holds at least one snapshot
//! - `trace[0]` is the input order
//! - Every snapshot is a permutation of the input
//! - The last snapshot is the input sorted by key in the requested order

pub mod generator;

pub use generator::{generate, sort, Algorithm};

/// The full container state at one instant during sorting
pub type Snapshot<T> = Vec<T>;

/// An ordered, non-empty sequence of snapshots
#[derive(Debug, Clone, PartialEq)]
pub struct Trace<T> {
    snapshots: Vec<Snapshot<T>>,
}

impl<T> Trace<T> {
    /// Wrap an already recorded sequence of snapshots.
    ///
    /// Returns None for an empty sequence. The snapshots are taken as given;
    /// hosts that build traces by hand are responsible for their contents.
    pub fn from_snapshots(snapshots: Vec<Snapshot<T>>) -> Option<Self> {
        if snapshots.is_empty() {
            None
        } else {
            Some(Trace { snapshots })
        }
    }

    pub(crate) fn from_recorded(snapshots: Vec<Snapshot<T>>) -> Self {
        debug_assert!(!snapshots.is_empty());
        Trace { snapshots }
    }

    /// Get a snapshot by step index
    pub fn get(&self, step: usize) -> Option<&[T]> {
        self.snapshots.get(step).map(Vec::as_slice)
    }

    /// The input order
    pub fn first(&self) -> &[T] {
        &self.snapshots[0]
    }

    /// The sorted order
    pub fn last(&self) -> &[T] {
        &self.snapshots[self.last_step()]
    }

    /// Index of the final snapshot
    pub fn last_step(&self) -> usize {
        self.snapshots.len() - 1
    }

    /// Number of snapshots, including the initial one
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Snapshots recorded after the initial state
    pub fn progress_steps(&self) -> usize {
        self.snapshots.len() - 1
    }

    pub fn snapshots(&self) -> &[Snapshot<T>] {
        &self.snapshots
    }

    pub fn iter(&self) -> impl Iterator<Item = &[T]> {
        self.snapshots.iter().map(Vec::as_slice)
    }

    /// Consume the trace, keeping only the sorted order
    pub fn into_final(mut self) -> Vec<T> {
        self.snapshots.pop().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_snapshot_list_is_not_a_trace() {
        assert!(Trace::<f64>::from_snapshots(Vec::new()).is_none());
    }

    #[test]
    fn accessors_address_first_and_last() {
        let trace = Trace::from_snapshots(vec![
            vec![3.0, 1.0, 2.0],
            vec![1.0, 3.0, 2.0],
            vec![1.0, 2.0, 3.0],
        ])
        .unwrap();
        assert_eq!(trace.len(), 3);
        assert_eq!(trace.last_step(), 2);
        assert_eq!(trace.progress_steps(), 2);
        assert_eq!(trace.first(), &[3.0, 1.0, 2.0]);
        assert_eq!(trace.get(1), Some(&[1.0, 3.0, 2.0][..]));
        assert_eq!(trace.get(3), None);
        assert_eq!(trace.into_final(), vec![1.0, 2.0, 3.0]);
    }
}
