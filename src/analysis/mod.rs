//! Record analysis built on the sort core
//!
//! - [`top_n`]: the first `n` records in sorted order
//! - [`retain_top`]: the same records, but left in their input order
//! - [`summarize`]: min, max, mean, median and trend of a numeric key

use crate::errors::TraceError;
use crate::record::{Keyed, KeyedComparator, SortOrder};
use crate::trace::generator::sorted_positions;
use crate::trace::{sort, Algorithm};

/// The first `n` records after sorting by `key`
pub fn top_n<T: Keyed + Clone>(
    input: &[T],
    key: &str,
    algorithm: Algorithm,
    order: SortOrder,
    n: usize,
) -> Result<Vec<T>, TraceError> {
    let mut sorted = sort(input, key, algorithm, order)?;
    sorted.truncate(n);
    Ok(sorted)
}

/// The records [`top_n`] would pick, kept in their original relative order
pub fn retain_top<T: Keyed + Clone>(
    input: &[T],
    key: &str,
    algorithm: Algorithm,
    order: SortOrder,
    n: usize,
) -> Result<Vec<T>, TraceError> {
    let mut picked = sorted_positions(input, key, algorithm, order)?;
    picked.truncate(n);
    picked.sort_unstable();
    Ok(picked.into_iter().map(|i| input[i].clone()).collect())
}

/// Direction of a key over input position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    RisingRapidly,
    RisingSlowly,
    Stable,
    FallingSlowly,
    FallingRapidly,
}

impl Trend {
    pub fn from_slope(slope: f64) -> Self {
        if slope > 0.5 {
            Trend::RisingRapidly
        } else if slope > 0.1 {
            Trend::RisingSlowly
        } else if slope < -0.5 {
            Trend::FallingRapidly
        } else if slope < -0.1 {
            Trend::FallingSlowly
        } else {
            Trend::Stable
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Trend::RisingRapidly => "rising rapidly",
            Trend::RisingSlowly => "rising slowly",
            Trend::Stable => "stable",
            Trend::FallingSlowly => "falling slowly",
            Trend::FallingRapidly => "falling rapidly",
        }
    }
}

/// Summary statistics of a numeric key
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyStats {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    /// Least-squares slope of value against input position
    pub slope: f64,
    pub trend: Trend,
}

/// Statistics of `key` over `input`; None for empty input.
///
/// Text keys fail with `InvalidKey` since they have no mean.
pub fn summarize<T: Keyed>(input: &[T], key: &str) -> Result<Option<KeyStats>, TraceError> {
    let keys = KeyedComparator::new(key, SortOrder::Ascending).extract(input)?;
    let mut values = Vec::with_capacity(keys.len());
    for (index, k) in keys.iter().enumerate() {
        values.push(
            k.as_number()
                .ok_or_else(|| TraceError::not_comparable(key, index))?,
        );
    }
    if values.is_empty() {
        return Ok(None);
    }

    let count = values.len();
    let n = count as f64;
    let sum: f64 = values.iter().sum();
    let mean = sum / n;

    let sorted = sort(&values, key, Algorithm::Merge, SortOrder::Ascending)?;
    let min = sorted[0];
    let max = sorted[count - 1];
    let middle = count / 2;
    let median = if count % 2 == 0 {
        (sorted[middle - 1] + sorted[middle]) / 2.0
    } else {
        sorted[middle]
    };

    let slope = least_squares_slope(&values);
    Ok(Some(KeyStats {
        count,
        min,
        max,
        mean,
        median,
        slope,
        trend: Trend::from_slope(slope),
    }))
}

fn least_squares_slope(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    let (mut sum_x, mut sum_y, mut sum_xy, mut sum_xx) = (0.0_f64, 0.0_f64, 0.0_f64, 0.0_f64);
    for (i, &y) in values.iter().enumerate() {
        let x = i as f64;
        sum_x += x;
        sum_y += y;
        sum_xy += x * y;
        sum_xx += x * x;
    }
    let denominator = n * sum_xx - sum_x * sum_x;
    if denominator == 0.0 {
        0.0
    } else {
        (n * sum_xy - sum_x * sum_y) / denominator
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Record;

    fn day(date: &str, temperature: f64) -> Record {
        Record::new()
            .with("Date", date)
            .with("Temperature", temperature)
    }

    fn week() -> Vec<Record> {
        vec![
            day("06-01", 31.0),
            day("06-02", 35.5),
            day("06-03", 29.0),
            day("06-04", 33.0),
            day("06-05", 36.0),
        ]
    }

    fn dates(records: &[Record]) -> Vec<&str> {
        records
            .iter()
            .filter_map(|r| r.get("Date").and_then(|v| v.as_text()))
            .collect()
    }

    #[test]
    fn top_n_sorts_then_truncates() {
        let hottest =
            top_n(&week(), "Temperature", Algorithm::Quick, SortOrder::Descending, 2).unwrap();
        assert_eq!(dates(&hottest), vec!["06-05", "06-02"]);

        let all =
            top_n(&week(), "Temperature", Algorithm::Merge, SortOrder::Ascending, 50).unwrap();
        assert_eq!(all.len(), 5);
    }

    #[test]
    fn retain_top_keeps_input_order() {
        let hottest =
            retain_top(&week(), "Temperature", Algorithm::Merge, SortOrder::Descending, 3).unwrap();
        assert_eq!(dates(&hottest), vec!["06-02", "06-04", "06-05"]);
    }

    #[test]
    fn summary_of_a_week() {
        let stats = summarize(&week(), "Temperature").unwrap().unwrap();
        assert_eq!(stats.count, 5);
        assert_eq!(stats.min, 29.0);
        assert_eq!(stats.max, 36.0);
        assert_eq!(stats.median, 33.0);
        assert!((stats.mean - 32.9).abs() < 1e-9);
        // slope = (5 * 336.5 - 10 * 164.5) / (5 * 30 - 100) = 0.75
        assert!((stats.slope - 0.75).abs() < 1e-9);
        assert_eq!(stats.trend, Trend::RisingRapidly);
    }

    #[test]
    fn even_count_median_averages_middle_pair() {
        let stats = summarize(&[4.0, 1.0, 3.0, 2.0], "v").unwrap().unwrap();
        assert_eq!(stats.median, 2.5);
    }

    #[test]
    fn single_value_is_stable() {
        let stats = summarize(&[7.0], "v").unwrap().unwrap();
        assert_eq!(stats.slope, 0.0);
        assert_eq!(stats.trend, Trend::Stable);
    }

    #[test]
    fn empty_and_text_inputs() {
        assert_eq!(summarize::<f64>(&[], "v").unwrap(), None);
        let err = summarize(&week(), "Date").unwrap_err();
        assert_eq!(err, TraceError::not_comparable("Date", 0));
    }

    #[test]
    fn trend_thresholds() {
        assert_eq!(Trend::from_slope(0.2), Trend::RisingSlowly);
        assert_eq!(Trend::from_slope(0.1), Trend::Stable);
        assert_eq!(Trend::from_slope(-0.3), Trend::FallingSlowly);
        assert_eq!(Trend::from_slope(-0.51), Trend::FallingRapidly);
        assert_eq!(Trend::FallingRapidly.label(), "falling rapidly");
    }
}
