use loadstat_config::{load_file, load_toml};
use rstest::rstest;

#[test]
fn empty_file_yields_engine_defaults() {
    let cfg = load_toml("").expect("parse TOML");
    cfg.validate().expect("defaults are valid");
    assert!(!cfg.stat.enabled);
    assert!(cfg.stat.primary);
    assert_eq!(cfg.stat.delay_ms, 100);
    assert_eq!(cfg.stat.scale_up, 60);
    assert_eq!(cfg.stat.scale_down, 30);
    assert_eq!(cfg.stat.warn, 90);
    assert_eq!(cfg.alert.streak, 5);
    assert_eq!(cfg.alert.burst, 5);
    assert_eq!(cfg.alert.interval_ms, 3000);
}

#[test]
fn partial_sections_keep_remaining_defaults() {
    let toml = r#"
[stat]
enabled = true
scale_up = 75

[sim]
arrival_per_sec = 200
"#;
    let cfg = load_toml(toml).expect("parse TOML");
    cfg.validate().expect("valid config should pass");
    assert!(cfg.stat.enabled);
    assert_eq!(cfg.stat.scale_up, 75);
    assert_eq!(cfg.stat.scale_down, 30);
    assert_eq!(cfg.sim.arrival_per_sec, 200);
    assert_eq!(cfg.sim.service_ms, 10);
}

#[rstest]
#[case("[stat]\ndelay_ms = 1001", "stat.delay_ms must be in [0, 1000]")]
#[case("[stat]\nscale_up = 150", "stat.scale_up must be in [0, 100]")]
#[case("[stat]\nscale_down = 101", "stat.scale_down must be in [0, 100]")]
#[case("[stat]\nwarn = 200", "stat.warn must be in [0, 100]")]
#[case("[alert]\nstreak = 0", "alert.streak must be >= 1")]
#[case("[alert]\nburst = 0", "alert.burst must be >= 1")]
#[case("[alert]\ninterval_ms = 0", "alert.interval_ms must be >= 1")]
#[case("[logging]\nrotation = \"weekly\"", "logging.rotation must be one of")]
#[case("[sim]\nduration_ms = 0", "sim.duration_ms must be >= 1")]
#[case("[sim]\nservice_ms = 0", "sim.service_ms must be >= 1")]
fn rejects_out_of_range(#[case] toml: &str, #[case] needle: &str) {
    let cfg = load_toml(toml).expect("parse TOML");
    let err = cfg.validate().expect_err("should be rejected");
    assert!(
        format!("{err}").contains(needle),
        "expected {needle:?} in {err}"
    );
}

#[test]
fn inverted_thresholds_are_legal() {
    let cfg = load_toml("[stat]\nscale_up = 20\nscale_down = 80").expect("parse TOML");
    cfg.validate().expect("inverted band is a legal misconfiguration");
}

#[test]
fn boundary_values_are_accepted() {
    let toml = r#"
[stat]
delay_ms = 0
scale_up = 100
scale_down = 0
warn = 0
"#;
    let cfg = load_toml(toml).expect("parse TOML");
    cfg.validate().expect("range endpoints are inclusive");
    let cfg = load_toml("[stat]\ndelay_ms = 1000").expect("parse TOML");
    cfg.validate().expect("1000 ms is the upper bound");
}

#[rstest]
#[case::stat_key("[stat]\nscale_upp = 50")]
#[case::logging_key("[logging]\nlevle = \"debug\"")]
#[case::misspelled_section("[stats]\nscale_up = 50")]
#[case::top_level_key("delay_ms = 50")]
fn unknown_keys_are_parse_errors(#[case] toml: &str) {
    assert!(load_toml(toml).is_err(), "{toml:?} should be rejected");
}

#[test]
fn load_file_reports_path_and_validates() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("loadstat.toml");
    std::fs::write(&path, "[stat]\nwarn = 101\n").unwrap();
    let err = load_file(&path).expect_err("out-of-range warn");
    assert!(format!("{err}").contains("stat.warn"));

    let missing = dir.path().join("missing.toml");
    let err = load_file(&missing).expect_err("missing file");
    assert!(format!("{err}").contains("read config"));
}
