//! Trace generation
//!
//! Both algorithms sort a permutation of input positions rather than the
//! elements themselves. Keys are resolved once, before any work starts, so a
//! bad key fails the whole call and no partial trace escapes.
//!
//! # Snapshot Granularity
//!
//! - Merge: one snapshot after every merge of two runs
//! - Quick: one snapshot after every partition, once the pivot is placed
//!
//! # Tie-breaks
//!
//! Merge takes from the left run only while the left key strictly precedes
//! the right key, so on equal keys the right run goes first. Quick uses Lomuto
//! partitioning with the last element as pivot; elements that tie with the
//! pivot land in the left partition.

use super::{Snapshot, Trace};
use crate::errors::TraceError;
use crate::record::{Keyed, KeyedComparator, ParseChoiceError, SortKey, SortOrder};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Sort algorithm used to produce a trace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    #[default]
    Merge,
    Quick,
}

impl Algorithm {
    pub const ALL: [Algorithm; 2] = [Algorithm::Merge, Algorithm::Quick];

    pub fn as_str(self) -> &'static str {
        match self {
            Algorithm::Merge => "merge",
            Algorithm::Quick => "quick",
        }
    }

    pub fn time_complexity(self) -> &'static str {
        match self {
            Algorithm::Merge => "O(n log n)",
            Algorithm::Quick => "O(n log n) average, O(n^2) worst case",
        }
    }

    pub fn space_complexity(self) -> &'static str {
        match self {
            Algorithm::Merge => "O(n)",
            Algorithm::Quick => "O(log n)",
        }
    }

    fn pass<T: Clone>(self) -> fn(&mut Pass<'_, T>) {
        match self {
            Algorithm::Merge => merge_pass::<T>,
            Algorithm::Quick => quick_pass::<T>,
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = ParseChoiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "merge" | "mergesort" => Ok(Algorithm::Merge),
            "quick" | "quicksort" => Ok(Algorithm::Quick),
            _ => Err(ParseChoiceError {
                kind: "algorithm",
                input: s.to_string(),
            }),
        }
    }
}

/// Working state of one sort run
struct Pass<'a, T> {
    input: &'a [T],
    keys: &'a [SortKey],
    comparator: &'a KeyedComparator,
    /// `order[i]` is the input position currently held at slot `i`
    order: Vec<usize>,
    /// None when only the final order is wanted
    snapshots: Option<Vec<Snapshot<T>>>,
}

impl<'a, T: Clone> Pass<'a, T> {
    fn new(
        input: &'a [T],
        keys: &'a [SortKey],
        comparator: &'a KeyedComparator,
        recording: bool,
    ) -> Self {
        let mut pass = Pass {
            input,
            keys,
            comparator,
            order: (0..input.len()).collect(),
            snapshots: recording.then(Vec::new),
        };
        pass.record();
        pass
    }

    fn key_at(&self, slot: usize) -> &SortKey {
        &self.keys[self.order[slot]]
    }

    fn record(&mut self) {
        if let Some(snapshots) = self.snapshots.as_mut() {
            snapshots.push(self.order.iter().map(|&i| self.input[i].clone()).collect());
        }
    }
}

fn merge_pass<T: Clone>(pass: &mut Pass<'_, T>) {
    let len = pass.order.len();
    if len > 1 {
        merge_sort(pass, 0, len - 1);
    }
}

fn merge_sort<T: Clone>(pass: &mut Pass<'_, T>, lo: usize, hi: usize) {
    if lo >= hi {
        return;
    }
    let mid = lo + (hi - lo) / 2;
    merge_sort(pass, lo, mid);
    merge_sort(pass, mid + 1, hi);
    merge(pass, lo, mid, hi);
}

/// Merge the sorted runs `[lo, mid]` and `[mid + 1, hi]`
fn merge<T: Clone>(pass: &mut Pass<'_, T>, lo: usize, mid: usize, hi: usize) {
    let mut merged = Vec::with_capacity(hi - lo + 1);
    let (mut i, mut j) = (lo, mid + 1);

    while i <= mid && j <= hi {
        // Strict: equal keys come from the right run
        if pass.comparator.precedes(pass.key_at(i), pass.key_at(j)) {
            merged.push(pass.order[i]);
            i += 1;
        } else {
            merged.push(pass.order[j]);
            j += 1;
        }
    }
    merged.extend_from_slice(&pass.order[i..=mid]);
    merged.extend_from_slice(&pass.order[j..=hi]);

    pass.order[lo..=hi].copy_from_slice(&merged);
    pass.record();
}

fn quick_pass<T: Clone>(pass: &mut Pass<'_, T>) {
    let len = pass.order.len();
    if len > 1 {
        quick_sort(pass, 0, len - 1);
    }
}

fn quick_sort<T: Clone>(pass: &mut Pass<'_, T>, lo: usize, hi: usize) {
    if lo >= hi {
        return;
    }
    let pivot = partition(pass, lo, hi);
    if pivot > lo {
        quick_sort(pass, lo, pivot - 1);
    }
    quick_sort(pass, pivot + 1, hi);
}

/// Lomuto partition around `order[hi]`; returns the pivot's final slot
fn partition<T: Clone>(pass: &mut Pass<'_, T>, lo: usize, hi: usize) -> usize {
    let pivot = pass.order[hi];
    let mut store = lo;

    for j in lo..hi {
        if pass
            .comparator
            .precedes_or_ties(pass.key_at(j), &pass.keys[pivot])
        {
            pass.order.swap(store, j);
            store += 1;
        }
    }
    pass.order.swap(store, hi);
    pass.record();
    store
}

/// Generate the trace of sorting `input` by `key`.
///
/// `input` is only read; the trace holds clones. Inputs of length 0 or 1 give a
/// single-snapshot trace. Identical arguments always give identical traces.
pub fn generate<T: Keyed + Clone>(
    input: &[T],
    key: &str,
    algorithm: Algorithm,
    order: SortOrder,
) -> Result<Trace<T>, TraceError> {
    let comparator = KeyedComparator::new(key, order);
    let keys = comparator.extract(input)?;

    let mut pass = Pass::new(input, &keys, &comparator, true);
    (algorithm.pass())(&mut pass);

    let snapshots = pass.snapshots.unwrap_or_default();
    debug!(
        %algorithm,
        %order,
        key,
        elements = input.len(),
        snapshots = snapshots.len(),
        "generated sort trace"
    );
    Ok(Trace::from_recorded(snapshots))
}

/// Input positions in sorted order, without recording snapshots
pub(crate) fn sorted_positions<T: Keyed + Clone>(
    input: &[T],
    key: &str,
    algorithm: Algorithm,
    order: SortOrder,
) -> Result<Vec<usize>, TraceError> {
    let comparator = KeyedComparator::new(key, order);
    let keys = comparator.extract(input)?;

    let mut pass = Pass::new(input, &keys, &comparator, false);
    (algorithm.pass())(&mut pass);
    Ok(pass.order)
}

/// Sort `input` by `key`; the same order a trace's last snapshot holds
pub fn sort<T: Keyed + Clone>(
    input: &[T],
    key: &str,
    algorithm: Algorithm,
    order: SortOrder,
) -> Result<Vec<T>, TraceError> {
    let positions = sorted_positions(input, key, algorithm, order)?;
    Ok(positions.into_iter().map(|i| input[i].clone()).collect())
}
