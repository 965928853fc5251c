use flow_config::{OnError, Ordering, load_path, load_toml};
use rstest::rstest;
use std::fs;
use tempfile::tempdir;

const MINIMAL: &str = r#"
[reduce]
cal_factor = 0.000847
"#;

#[test]
fn minimal_config_uses_defaults() {
    let cfg = load_toml(MINIMAL).expect("parse TOML");
    cfg.validate().expect("minimal config should pass");
    assert_eq!(cfg.input.time_divisor, 1_000_000);
    assert!(!cfg.edges.keep_all_rows);
    assert!((cfg.reduce.zero_threshold_ms - 1000.0).abs() < 1e-12);
    assert_eq!(cfg.reduce.closing_offset, 1000);
    assert_eq!(cfg.reduce.ordering, Ordering::Clamp);
    assert_eq!(cfg.decimate.keep_every_nth, 100);
    assert_eq!(cfg.channels.group, "Water");
    assert_eq!(cfg.channels.rate, "Rate");
    assert_eq!(cfg.channels.total, "Total");
    assert_eq!(cfg.channels.unit, "L");
    assert!(cfg.channels.use_prefix_scaling);
    assert_eq!(cfg.upload.on_error, OnError::Abort);
}

#[test]
fn missing_cal_factor_is_a_parse_error() {
    let toml = r#"
[reduce]
zero_threshold_ms = 500
"#;
    let err = load_toml(toml).expect_err("cal_factor is required");
    assert!(err.to_string().contains("cal_factor"));
}

#[test]
fn missing_reduce_section_is_a_parse_error() {
    let toml = r#"
[decimate]
keep_every_nth = 10
"#;
    assert!(load_toml(toml).is_err());
}

#[test]
fn full_config_round_trips_values() {
    let toml = r#"
[input]
time_divisor = 1000

[edges]
keep_all_rows = true

[reduce]
cal_factor = 0.5
zero_threshold_ms = 250
closing_offset = 0
ordering = "reject"

[decimate]
keep_every_nth = 7

[channels]
group = " Flow "
rate = "FlowRate"
total = "Volume"
unit = "mL"
use_prefix_scaling = false
rate_multiplier = 1.0
time_format = "elapsed"

[upload]
on_error = "continue"

[logging]
level = "debug"
rotation = "daily"
"#;
    let cfg = load_toml(toml).expect("parse TOML");
    cfg.validate().expect("valid config");
    assert_eq!(cfg.input.time_divisor, 1000);
    assert!(cfg.edges.keep_all_rows);
    assert_eq!(cfg.reduce.ordering, Ordering::Reject);
    assert_eq!(cfg.decimate.keep_every_nth, 7);
    // surrounding whitespace is trimmed
    assert_eq!(cfg.channels.group, "Flow");
    assert!(!cfg.channels.use_prefix_scaling);
    assert_eq!(cfg.upload.on_error, OnError::Continue);
}

#[rstest]
#[case("[reduce]\ncal_factor = 0.0\n", "cal_factor")]
#[case("[reduce]\ncal_factor = -1.0\n", "cal_factor")]
#[case("[reduce]\ncal_factor = nan\n", "cal_factor")]
#[case("[reduce]\ncal_factor = 1.0\nzero_threshold_ms = -1\n", "zero_threshold_ms")]
#[case("[reduce]\ncal_factor = 1.0\nclosing_offset = -5\n", "closing_offset")]
#[case("[input]\ntime_divisor = 0\n[reduce]\ncal_factor = 1.0\n", "time_divisor")]
#[case("[reduce]\ncal_factor = 1.0\n[decimate]\nkeep_every_nth = 0\n", "keep_every_nth")]
#[case("[reduce]\ncal_factor = 1.0\n[channels]\nrate = \"Flow Rate\"\n", "channels.rate")]
#[case("[reduce]\ncal_factor = 1.0\n[channels]\ngroup = \"\"\n", "channels.group")]
#[case("[reduce]\ncal_factor = 1.0\n[channels]\nrate = \"X\"\ntotal = \"X\"\n", "must differ")]
#[case("[reduce]\ncal_factor = 1.0\n[channels]\nrate_multiplier = 0.0\n", "rate_multiplier")]
#[case("[reduce]\ncal_factor = 1.0\n[logging]\nrotation = \"weekly\"\n", "rotation")]
fn validate_rejects(#[case] toml: &str, #[case] needle: &str) {
    let cfg = load_toml(toml).expect("parse TOML");
    let err = cfg.validate().expect_err("should be rejected");
    assert!(
        err.to_string().contains(needle),
        "error {err} should mention {needle}"
    );
}

#[test]
fn unknown_ordering_is_a_parse_error() {
    let toml = "[reduce]\ncal_factor = 1.0\nordering = \"sort\"\n";
    assert!(load_toml(toml).is_err());
}

#[test]
fn load_path_reads_and_validates() {
    let dir = tempdir().unwrap();
    let good = dir.path().join("good.toml");
    fs::write(&good, MINIMAL).unwrap();
    load_path(&good).expect("valid file");

    let bad = dir.path().join("bad.toml");
    fs::write(&bad, "[reduce]\ncal_factor = 0\n").unwrap();
    let err = load_path(&bad).expect_err("invalid factor");
    assert!(err.to_string().contains("cal_factor"));

    let missing = dir.path().join("missing.toml");
    let err = load_path(&missing).expect_err("missing file");
    assert!(err.to_string().contains("read config"));
}
