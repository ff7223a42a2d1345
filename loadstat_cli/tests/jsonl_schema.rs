use assert_cmd::prelude::*;
use rstest::rstest;
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use tempfile::tempdir;

fn write_valid_config(dir: &tempfile::TempDir) -> PathBuf {
    let toml = r#"
[stat]
delay_ms = 20

[sim]
duration_ms = 300
# 250 arrivals/s at 8 ms each keeps the queue saturated
arrival_per_sec = 250
service_ms = 8
seed = 11
"#;
    let path = dir.path().join("cfg.toml");
    fs::write(&path, toml).unwrap();
    path
}

fn run_json(extra: &[&str]) -> Vec<serde_json::Value> {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);

    let mut cmd = Command::cargo_bin("loadstat").unwrap();
    cmd.arg("--json")
        .arg("--log-level")
        .arg("error")
        .arg("--config")
        .arg(&cfg)
        .args(extra);

    let out = cmd.assert().success().get_output().stdout.clone();
    let stdout = String::from_utf8_lossy(&out);
    stdout
        .lines()
        .map(|l| serde_json::from_str(l).unwrap_or_else(|e| panic!("bad JSON line {l:?}: {e}")))
        .collect()
}

/// Validate the JSONL schema of per-tick records and the trailing summary.
#[rstest]
fn jsonl_run_schema() {
    let lines = run_json(&["run"]);
    let (summary, ticks) = lines.split_last().expect("at least a summary line");

    assert!(!ticks.is_empty(), "expected tick records");
    for v in ticks {
        assert!(v.get("t_ms").and_then(|x| x.as_u64()).is_some());
        // Either number or null
        match v.get("load") {
            Some(serde_json::Value::Number(n)) => assert!(n.as_u64().is_some()),
            Some(serde_json::Value::Null) => {}
            other => panic!("unexpected load: {other:?}"),
        }
        let signal = v.get("signal").and_then(|x| x.as_str()).unwrap();
        assert!(matches!(signal, "normal" | "scale_up" | "scale_down"));
        let freq = v.get("freq_request").and_then(|x| x.as_u64()).unwrap();
        assert!(freq <= 2);
        for key in ["idle_streak", "waiting", "background"] {
            assert!(v.get(key).and_then(|x| x.as_u64()).is_some(), "{key}");
        }
        for key in ["busy", "congested", "alerted"] {
            assert!(v.get(key).and_then(|x| x.as_bool()).is_some(), "{key}");
        }
        let next = v.get("next").and_then(|x| x.as_str()).unwrap();
        assert!(matches!(next, "reschedule" | "dormant_idle" | "dormant_disabled"));
    }

    assert!(
        ticks.iter().any(|v| v["signal"] == "scale_up"),
        "saturated workload should request a scale-up"
    );
    // Drained run ends with the loop quiescing on idle.
    let last_tick = ticks.last().unwrap();
    assert_eq!(last_tick["next"], "dormant_idle");
    assert_eq!(last_tick["idle_streak"], 3);
    assert_eq!(last_tick["signal"], "scale_down");

    let s = summary.get("summary").expect("summary object");
    let arrivals = s["arrivals"].as_u64().unwrap();
    assert!(arrivals > 0);
    assert_eq!(s["completions"].as_u64(), Some(arrivals));
    assert_eq!(s["interrupted"], false);
    assert_eq!(s["ticks"].as_u64(), Some(ticks.len() as u64));
    // Shutdown forces a scale-down.
    assert_eq!(s["final_signal"], "scale_down");
}

#[rstest]
fn jsonl_params_schema() {
    let lines = run_json(&["params", "--set", "debug=1"]);
    assert_eq!(lines.len(), 9);
    for v in &lines {
        assert!(v["name"].is_string());
        assert!(v["value"].is_u64());
        assert!(v["writable"].is_boolean());
        assert!(v["max"].is_u64());
    }
    let debug = lines.iter().find(|v| v["name"] == "debug").unwrap();
    assert_eq!(debug["value"], 1);
    let load = lines.iter().find(|v| v["name"] == "load").unwrap();
    assert_eq!(load["writable"], false);
}

#[rstest]
fn jsonl_error_schema() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);

    let out = Command::cargo_bin("loadstat")
        .unwrap()
        .arg("--json")
        .arg("--log-level")
        .arg("off")
        .arg("--config")
        .arg(&cfg)
        .args(["params", "--set", "delay_ms=5000"])
        .assert()
        .code(3)
        .get_output()
        .stderr
        .clone();
    let stderr = String::from_utf8_lossy(&out);
    let line = stderr
        .lines()
        .find(|l| l.contains("\"reason\""))
        .unwrap_or_else(|| panic!("no error JSON in stderr: {stderr}"));
    let v: serde_json::Value = serde_json::from_str(line).unwrap();
    assert_eq!(v["reason"], "OutOfRange");
    assert_eq!(v["details"]["param"], "delay_ms");
    assert_eq!(v["details"]["value"], 5000);
    assert!(v["message"].as_str().unwrap().contains("out of range"));
}
