// Integration tests for trace generation and timing

use proptest::prelude::*;
use sortreel::{
    generate, measure_generate, Algorithm, KeyFault, Record, SortOrder, TraceError, Value,
};

fn reading(id: &str, v: f64) -> Record {
    Record::new().with("id", id).with("v", v)
}

fn values(snapshot: &[Record]) -> Vec<f64> {
    snapshot
        .iter()
        .map(|r| r.get("v").and_then(Value::as_number).expect("numeric v"))
        .collect()
}

fn ids(snapshot: &[Record]) -> Vec<&str> {
    snapshot
        .iter()
        .map(|r| r.get("id").and_then(Value::as_text).expect("text id"))
        .collect()
}

fn duplicates() -> Vec<Record> {
    vec![
        reading("a", 5.0),
        reading("b", 3.0),
        reading("c", 5.0),
        reading("d", 1.0),
    ]
}

#[test]
fn test_merge_with_duplicate_keys() {
    let trace = generate(&duplicates(), "v", Algorithm::Merge, SortOrder::Ascending)
        .expect("generation failed");

    assert_eq!(values(trace.first()), vec![5.0, 3.0, 5.0, 1.0]);
    assert_eq!(values(trace.last()), vec![1.0, 3.0, 5.0, 5.0]);
    // Right run wins ties, so the two fives swap their original order
    assert_eq!(ids(trace.last()), vec!["d", "b", "c", "a"]);
    // Three merges for four elements, plus the initial state
    assert_eq!(trace.len(), 4);
}

#[test]
fn test_quick_ties_go_left_of_pivot() {
    let input = vec![
        reading("a", 2.0),
        reading("b", 1.0),
        reading("c", 2.0),
    ];
    let trace = generate(&input, "v", Algorithm::Quick, SortOrder::Ascending)
        .expect("generation failed");

    // Pivot c: a ties and moves left of it, b is smaller
    assert_eq!(ids(trace.get(1).unwrap()), vec!["a", "b", "c"]);
    assert_eq!(ids(trace.last()), vec!["b", "a", "c"]);
    assert_eq!(trace.len(), 3);
}

#[test]
fn test_descending_merge_right_run_still_wins_ties() {
    let trace = generate(&duplicates(), "v", Algorithm::Merge, SortOrder::Descending)
        .expect("generation failed");

    assert_eq!(ids(trace.get(1).unwrap()), vec!["a", "b", "c", "d"]);
    assert_eq!(ids(trace.get(2).unwrap()), vec!["a", "b", "c", "d"]);
    // Final merge of [a, b] and [c, d]: a and c tie, c comes first
    assert_eq!(values(trace.last()), vec![5.0, 5.0, 3.0, 1.0]);
    assert_eq!(ids(trace.last()), vec!["c", "a", "b", "d"]);
    assert_eq!(trace.len(), 4);
}

#[test]
fn test_descending_quick_ties_go_left_of_pivot() {
    let input = vec![
        reading("b", 1.0),
        reading("a", 2.0),
        reading("c", 2.0),
    ];
    let trace = generate(&input, "v", Algorithm::Quick, SortOrder::Descending)
        .expect("generation failed");

    // Pivot c: a ties and moves left of it, b is smaller and ends right
    assert_eq!(ids(trace.get(1).unwrap()), vec!["a", "c", "b"]);
    assert_eq!(ids(trace.last()), vec!["a", "c", "b"]);
    assert_eq!(trace.len(), 2);
}

#[test]
fn test_empty_input() {
    for algorithm in Algorithm::ALL {
        let trace = generate::<Record>(&[], "v", algorithm, SortOrder::Ascending).unwrap();
        assert_eq!(trace.len(), 1);
        assert!(trace.first().is_empty());
    }
}

#[test]
fn test_single_element() {
    let input = vec![reading("only", 42.0)];
    for algorithm in Algorithm::ALL {
        let trace = generate(&input, "v", algorithm, SortOrder::Descending).unwrap();
        assert_eq!(trace.len(), 1);
        assert_eq!(trace.first(), input.as_slice());
    }
}

#[test]
fn test_invalid_key_fails_whole_call() {
    let mut input = duplicates();
    input.push(Record::new().with("id", "e"));

    let err = generate(&input, "v", Algorithm::Merge, SortOrder::Ascending).unwrap_err();
    assert_eq!(
        err,
        TraceError::InvalidKey {
            key: "v".to_string(),
            index: 4,
            reason: KeyFault::Missing,
        }
    );

    let err = measure_generate(&input, "v", Algorithm::Quick, SortOrder::Ascending).unwrap_err();
    assert_eq!(err.index(), 4);
}

#[test]
fn test_text_keys_sort_lexicographically() {
    let input = vec![
        Record::new().with("Date", "2024-03-02"),
        Record::new().with("Date", "2024-01-15"),
        Record::new().with("Date", "2024-02-29"),
    ];
    let trace = generate(&input, "Date", Algorithm::Quick, SortOrder::Ascending).unwrap();
    let dates: Vec<&str> = trace
        .last()
        .iter()
        .filter_map(|r| r.get("Date").and_then(Value::as_text))
        .collect();
    assert_eq!(dates, vec!["2024-01-15", "2024-02-29", "2024-03-02"]);
}

#[test]
fn test_input_is_not_modified() {
    let input = duplicates();
    let before = input.clone();
    let _ = generate(&input, "v", Algorithm::Quick, SortOrder::Descending).unwrap();
    assert_eq!(input, before);
}

#[test]
fn test_measure_reports_duration_with_trace() {
    let input: Vec<f64> = (0..200).rev().map(f64::from).collect();
    let measured = measure_generate(&input, "v", Algorithm::Merge, SortOrder::Ascending).unwrap();
    assert_eq!(measured.trace.len(), 200);
    assert_eq!(measured.trace.last()[0], 0.0);
    assert_eq!(
        measured.duration().as_nanos(),
        u128::from(measured.duration_nanos)
    );
}

fn is_sorted(keys: &[f64], order: SortOrder) -> bool {
    keys.windows(2).all(|w| match order {
        SortOrder::Ascending => w[0] <= w[1],
        SortOrder::Descending => w[0] >= w[1],
    })
}

fn same_multiset(a: &[f64], b: &[f64]) -> bool {
    let mut a = a.to_vec();
    let mut b = b.to_vec();
    a.sort_by(f64::total_cmp);
    b.sort_by(f64::total_cmp);
    a == b
}

fn algorithms() -> impl Strategy<Value = Algorithm> {
    prop_oneof![Just(Algorithm::Merge), Just(Algorithm::Quick)]
}

fn orders() -> impl Strategy<Value = SortOrder> {
    prop_oneof![Just(SortOrder::Ascending), Just(SortOrder::Descending)]
}

proptest! {
    #[test]
    fn every_snapshot_is_a_permutation(
        input in prop::collection::vec(-50i32..50, 0..40),
        algorithm in algorithms(),
        order in orders(),
    ) {
        let input: Vec<f64> = input.into_iter().map(f64::from).collect();
        let trace = generate(&input, "v", algorithm, order).unwrap();

        prop_assert_eq!(trace.first(), input.as_slice());
        for snapshot in trace.iter() {
            prop_assert_eq!(snapshot.len(), input.len());
            prop_assert!(same_multiset(snapshot, &input));
        }
        prop_assert!(is_sorted(trace.last(), order));
    }

    #[test]
    fn generation_is_deterministic(
        input in prop::collection::vec(-20i32..20, 0..30),
        algorithm in algorithms(),
        order in orders(),
    ) {
        let input: Vec<f64> = input.into_iter().map(f64::from).collect();
        let first = generate(&input, "v", algorithm, order).unwrap();
        let second = generate(&input, "v", algorithm, order).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn trace_length_bounds(input in prop::collection::vec(-100i32..100, 1..64)) {
        let input: Vec<f64> = input.into_iter().map(f64::from).collect();
        let n = input.len();

        // A merge tree over n leaves has n - 1 internal nodes
        let merge = generate(&input, "v", Algorithm::Merge, SortOrder::Ascending).unwrap();
        prop_assert_eq!(merge.progress_steps(), n - 1);

        let quick = generate(&input, "v", Algorithm::Quick, SortOrder::Ascending).unwrap();
        prop_assert!(quick.progress_steps() <= n - 1);
    }

    #[test]
    fn descending_final_is_reverse_sorted(input in prop::collection::vec(-100i32..100, 0..40)) {
        let input: Vec<f64> = input.into_iter().map(f64::from).collect();
        let mut expected = input.clone();
        expected.sort_by(|a, b| b.total_cmp(a));

        for algorithm in Algorithm::ALL {
            let trace = generate(&input, "v", algorithm, SortOrder::Descending).unwrap();
            prop_assert_eq!(trace.last(), expected.as_slice());
        }
    }
}
