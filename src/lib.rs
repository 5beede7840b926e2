//! # Introduction
//!
//! sortreel turns a list of weather records into the step-by-step history of
//! a comparison sort, and plays that history back on a timer. Every step is a
//! full snapshot of the array, so a viewer can redraw it directly.
//!
//! ## Pipeline
//!
//! ```text
//! RecordSource → Records → TraceGenerator → Trace → PlaybackController → subscribers
//!                                ↑
//!                         PerformanceMeter
//! ```
//!
//! 1. [`source`]: where records come from ([`source::JsonFileSource`]).
//! 2. [`record`]: records, keys, and the [`record::KeyedComparator`].
//! 3. [`trace`]: deterministic merge sort and quicksort traces.
//! 4. [`meter`]: wall-clock timing of one generation call.
//! 5. [`playback`]: the timed, cancellable replay state machine.
//! 6. [`analysis`]: top-N selection and key statistics.
//!
//! ## Determinism
//!
//! Identical `(input, key, algorithm, order)` always give an identical trace.
//! Merge sort takes equal keys from the right run first; quicksort uses the
//! last element as pivot and puts ties on its left.

pub mod analysis;
pub mod config;
pub mod errors;
pub mod logging;
pub mod meter;
pub mod playback;
pub mod record;
pub mod source;
pub mod trace;

pub use errors::{FetchError, KeyFault, TraceError};
pub use meter::{measure, measure_generate, Measured};
pub use playback::{PlaybackController, PlaybackState, Status};
pub use record::{Keyed, KeyedComparator, Record, SortOrder, Value};
pub use trace::{generate, sort, Algorithm, Snapshot, Trace};
