use approx::assert_relative_eq;
use flow_core::error::FlowError;
use flow_core::{OrderingPolicy, PulseEvent, ReduceCfg, ReducedPoint, Reducer, reduce};

const CAL: f64 = 0.000847;

fn pulses(ts: &[i64]) -> Vec<PulseEvent> {
    ts.iter().copied().map(PulseEvent::pulse).collect()
}

fn assert_point(p: &ReducedPoint, time_ms: i64, rate: f64, total: f64) {
    assert_eq!(p.time_ms, time_ms, "time of {p:?}");
    assert_relative_eq!(p.rate, rate, max_relative = 1e-12);
    assert_relative_eq!(p.total, total, max_relative = 1e-12);
}

#[test]
fn empty_input_gives_empty_series() {
    let out = reduce(Vec::new(), &ReduceCfg::new(CAL)).unwrap();
    assert!(out.is_empty());
}

#[test]
fn short_gaps_give_rates_and_a_closing_point() {
    let out = reduce(pulses(&[500_000, 5_000_000]), &ReduceCfg::new(CAL)).unwrap();
    assert_eq!(out.len(), 4);
    assert_eq!(out[0], ReducedPoint::ORIGIN);
    assert_point(&out[1], 0, 2000.0 * CAL, CAL);
    assert_point(&out[2], 5, (1000.0 / 4.5) * CAL, 2.0 * CAL);
    // floor((5_000_000 + 1000) / 1e6)
    assert_point(&out[3], 5, 0.0, 2.0 * CAL);
}

#[test]
fn long_gap_emits_zero_bracket_pair() {
    let out = reduce(
        pulses(&[1_000_000_000, 3_000_000_000]),
        &ReduceCfg::new(CAL),
    )
    .unwrap();
    // delta of exactly the threshold still yields a rate
    assert_eq!(out.len(), 4);
    assert_eq!(out[0], ReducedPoint::ORIGIN);
    assert_point(&out[1], 1000, 1.0 * CAL, CAL);
    assert_point(&out[2], 1001, 0.0, 2.0 * CAL);
    assert_point(&out[3], 2999, 0.0, 2.0 * CAL);
}

#[test]
fn series_ending_on_a_gap_needs_no_closing_point() {
    let out = reduce(pulses(&[2_000_000_000]), &ReduceCfg::new(CAL)).unwrap();
    assert_eq!(out.len(), 3);
    assert_point(&out[1], 1, 0.0, CAL);
    assert_point(&out[2], 1999, 0.0, CAL);
    assert!(out.last().unwrap().is_zero_rate());
}

#[test]
fn pulse_at_time_zero_skips_origin() {
    let out = reduce(pulses(&[0, 500_000]), &ReduceCfg::new(CAL)).unwrap();
    assert_eq!(out.len(), 3);
    assert_point(&out[0], 0, 0.0, CAL);
    assert_point(&out[1], 0, 2000.0 * CAL, 2.0 * CAL);
    assert_point(&out[2], 0, 0.0, 2.0 * CAL);
}

#[test]
fn flattened_rows_are_not_counted() {
    let events = vec![
        PulseEvent::flattened(100),
        PulseEvent::pulse(500_000),
        PulseEvent::flattened(600_000),
    ];
    let out = reduce(events, &ReduceCfg::new(CAL)).unwrap();
    let plain = reduce(pulses(&[500_000]), &ReduceCfg::new(CAL)).unwrap();
    assert_eq!(out, plain);
    assert_point(out.last().unwrap(), 0, 0.0, CAL);
}

#[test]
fn backwards_time_is_rejected_when_configured() {
    let cfg = ReduceCfg {
        ordering: OrderingPolicy::Reject,
        ..ReduceCfg::new(CAL)
    };
    let err = reduce(pulses(&[2_000_000, 1_000_000]), &cfg).expect_err("backwards");
    assert_eq!(
        err.downcast_ref::<FlowError>(),
        Some(&FlowError::DataOrdering {
            previous: 2_000_000,
            current: 1_000_000
        })
    );
}

#[test]
fn backwards_time_is_clamped_by_default() {
    let out = reduce(pulses(&[2_000_000, 1_000_000]), &ReduceCfg::new(CAL)).unwrap();
    assert_eq!(out.len(), 4);
    assert_point(&out[1], 2, 500.0 * CAL, CAL);
    // counted, but the clock and the rate stay where they were
    assert_point(&out[2], 2, 500.0 * CAL, 2.0 * CAL);
    assert_point(&out[3], 2, 0.0, 2.0 * CAL);
}

#[test]
fn coincident_pulses_are_counted_under_reject() {
    let cfg = ReduceCfg {
        ordering: OrderingPolicy::Reject,
        ..ReduceCfg::new(CAL)
    };
    let out = reduce(pulses(&[3_000_000, 3_000_000]), &cfg).unwrap();
    assert_relative_eq!(out.last().unwrap().total, 2.0 * CAL, max_relative = 1e-12);
}

#[test]
fn time_divisor_and_closing_offset_are_configurable() {
    let cfg = ReduceCfg {
        time_divisor: 1_000,
        closing_offset: 250_000,
        ..ReduceCfg::new(1.0)
    };
    // microsecond timestamps: 500 ms after start
    let out = reduce(pulses(&[500_000]), &cfg).unwrap();
    assert_eq!(out.len(), 3);
    assert_point(&out[1], 500, 2.0, 1.0);
    assert_point(&out[2], 750, 0.0, 1.0);
}

#[test]
fn advance_reports_emissions_per_event() {
    let mut r = Reducer::new(ReduceCfg::new(CAL));
    assert_eq!(r.advance(PulseEvent::pulse(1_000_000)).unwrap().len(), 2);
    assert_eq!(r.advance(PulseEvent::pulse(2_000_000)).unwrap().len(), 1);
    let gap = r.advance(PulseEvent::pulse(5_000_000_000)).unwrap();
    assert_eq!(gap.len(), 2);
    assert!(gap.as_slice().iter().all(ReducedPoint::is_zero_rate));
    assert!(r.advance(PulseEvent::flattened(5_000_000_001)).unwrap().is_empty());
    assert_eq!(r.pulses(), 3);
    assert!(r.finish().is_none());
}

#[test]
fn totals_step_by_cal_factor() {
    let mut r = Reducer::new(ReduceCfg::new(CAL));
    for (i, t) in [10_000_000, 20_000_000, 2_500_000_000, 2_600_000_000]
        .into_iter()
        .enumerate()
    {
        let emitted = r.advance(PulseEvent::pulse(t)).unwrap();
        let expected = (i + 1) as f64 * CAL;
        for p in emitted.as_slice().iter().filter(|p| **p != ReducedPoint::ORIGIN) {
            assert_relative_eq!(p.total, expected, max_relative = 1e-12);
        }
    }
}
