//! Generation timing
//!
//! [`measure`] wraps exactly one generator call and reports how long that call
//! took. The clock starts immediately before the call and stops immediately
//! after it, so argument setup and result handling are excluded. The trace is
//! passed through untouched. A failed call propagates its error and reports no
//! duration.

use crate::errors::TraceError;
use crate::record::{Keyed, SortOrder};
use crate::trace::{generate, Algorithm, Trace};
use std::time::{Duration, Instant};
use tracing::debug;

/// A trace together with the time it took to generate
#[derive(Debug, Clone, PartialEq)]
pub struct Measured<T> {
    pub trace: Trace<T>,
    pub duration_nanos: u64,
}

impl<T> Measured<T> {
    pub fn duration(&self) -> Duration {
        Duration::from_nanos(self.duration_nanos)
    }

    /// Elapsed milliseconds with sub-millisecond precision
    pub fn millis(&self) -> f64 {
        self.duration_nanos as f64 / 1_000_000.0
    }
}

/// Time one call of `gen_fn`
pub fn measure<T, F>(
    gen_fn: F,
    input: &[T],
    key: &str,
    algorithm: Algorithm,
    order: SortOrder,
) -> Result<Measured<T>, TraceError>
where
    F: FnOnce(&[T], &str, Algorithm, SortOrder) -> Result<Trace<T>, TraceError>,
{
    let started = Instant::now();
    let outcome = gen_fn(input, key, algorithm, order);
    let elapsed = started.elapsed();

    let trace = outcome?;
    let duration_nanos = u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX);
    debug!(%algorithm, duration_nanos, "measured trace generation");

    Ok(Measured {
        trace,
        duration_nanos,
    })
}

/// [`measure`] applied to the standard generator
pub fn measure_generate<T: Keyed + Clone>(
    input: &[T],
    key: &str,
    algorithm: Algorithm,
    order: SortOrder,
) -> Result<Measured<T>, TraceError> {
    measure(generate::<T>, input, key, algorithm, order)
}
