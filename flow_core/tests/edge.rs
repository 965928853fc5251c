use flow_core::{EdgeDetector, PulseEvent, RawSample, detect_edges};
use rstest::rstest;

fn samples(levels: &[u8]) -> Vec<RawSample> {
    levels
        .iter()
        .enumerate()
        .map(|(i, &l)| RawSample::new(i as i64 * 10, l == 1))
        .collect()
}

#[rstest]
#[case(&[0, 1, 0, 1, 1, 0, 1], 3)]
#[case(&[1, 1, 1], 0)]
#[case(&[0, 0, 0], 0)]
#[case(&[1, 0, 1], 1)]
#[case(&[0, 1], 1)]
#[case(&[1], 0)]
#[case(&[], 0)]
fn counts_rising_edges(#[case] levels: &[u8], #[case] expected: u64) {
    let scan = detect_edges(samples(levels), false);
    assert_eq!(scan.rising_edges, expected);
    assert_eq!(scan.events.len() as u64, expected);
    assert!(scan.events.iter().all(PulseEvent::is_pulse));
}

#[test]
fn emits_rising_rows_unchanged_in_order() {
    let scan = detect_edges(samples(&[0, 1, 0, 1, 1, 0, 1]), false);
    assert_eq!(
        scan.events,
        vec![
            PulseEvent::pulse(10),
            PulseEvent::pulse(30),
            PulseEvent::pulse(60)
        ]
    );
}

#[test]
fn keep_all_rows_flattens_non_edges_and_skips_warm_up() {
    let scan = detect_edges(samples(&[0, 1, 0, 1, 1, 0, 1]), true);
    assert_eq!(scan.rising_edges, 3);
    assert_eq!(
        scan.events,
        vec![
            PulseEvent::pulse(10),
            PulseEvent::flattened(20),
            PulseEvent::pulse(30),
            PulseEvent::flattened(40),
            PulseEvent::flattened(50),
            PulseEvent::pulse(60),
        ]
    );
}

#[rstest]
#[case(false)]
#[case(true)]
fn first_row_is_only_a_warm_up(#[case] keep_all: bool) {
    // A high first row is not a rising edge and is never emitted.
    let scan = detect_edges(samples(&[1]), keep_all);
    assert!(scan.events.is_empty());
    assert_eq!(scan.rising_edges, 0);
}

#[test]
fn edge_count_does_not_depend_on_keep_all_rows() {
    let levels = [1, 0, 0, 1, 0, 1, 1, 1, 0, 1, 0];
    let sparse = detect_edges(samples(&levels), false);
    let dense = detect_edges(samples(&levels), true);
    assert_eq!(sparse.rising_edges, dense.rising_edges);
    assert_eq!(dense.events.len(), levels.len() - 1);
}

#[test]
fn rerun_on_own_output_adds_no_edges() {
    let first = detect_edges(samples(&[0, 1, 0, 1, 1, 0, 1, 0, 1]), false);
    let again = detect_edges(first.events.iter().copied().map(RawSample::from), false);
    assert!(again.rising_edges <= first.rising_edges);
    assert!(again.events.iter().all(|e| first.events.contains(e)));
}

#[test]
fn incremental_detector_matches_batch() {
    let input = samples(&[0, 0, 1, 1, 0, 1]);
    let mut det = EdgeDetector::new(false);
    let emitted: Vec<_> = input.iter().filter_map(|&s| det.advance(s)).collect();
    let batch = detect_edges(input, false);
    assert_eq!(emitted, batch.events);
    assert_eq!(det.rising_edges(), batch.rising_edges);
}
