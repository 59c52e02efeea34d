use assert_cmd::prelude::*;
use rstest::rstest;
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use tempfile::tempdir;

fn write_valid_config(dir: &tempfile::TempDir) -> PathBuf {
    let toml = r#"
[pins]
scale_dt = 5
scale_sck = 6
material = 17
diameter = 27
roll_weight = 22
advance_button = 23
unit_button = 24

[roll]
tare_1kg_g = 240.0
tare_2kg_g = 250.0

[buttons]
press_ms = 20
release_ms = 20

[runner]
poll_ms = 10
"#;
    let path = dir.path().join("cfg.toml");
    fs::write(&path, toml).unwrap();
    path
}

fn json_line(stdout: &[u8], key: &str) -> serde_json::Value {
    let stdout = String::from_utf8_lossy(stdout);
    let line = stdout
        .lines()
        .find(|l| l.contains(key))
        .unwrap_or_else(|| panic!("no JSON line with {key}; stdout was: {stdout}"));
    serde_json::from_str(line).expect("valid JSON")
}

/// Final snapshot of a scripted print with a unit toggle.
#[rstest]
fn run_snapshot_schema() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);

    let mut cmd = Command::cargo_bin("spool").unwrap();
    cmd.arg("--json")
        .arg("--log-level")
        .arg("error")
        .arg("--config")
        .arg(&cfg)
        .args(["run", "--iterations", "50", "--draw-g", "0.5"])
        .args(["--press-at", "3,10,20", "--toggle-at", "35"])
        .args(["--spike-every", "7", "--spike-g", "90"]);

    let out = cmd.assert().success().get_output().stdout.clone();
    let v = json_line(&out, "\"status\"");

    assert_eq!(v["status"], "Printing");
    assert_eq!(v["unit"], "cm");
    assert_eq!(v["iterations"], 50);
    for key in [
        "initial_g",
        "remaining_g",
        "remaining_percent",
        "remaining_m",
        "consumed_g",
        "consumed_cm",
    ] {
        assert!(v[key].as_f64().is_some(), "{key} should be a number");
    }
    // Spikes are filtered while printing, so consumption only grows
    assert!(v["consumed_g"].as_f64().unwrap() > 0.0);
    let bottom = v["bottom"].as_str().unwrap();
    assert!(bottom.starts_with("Run ") && bottom.ends_with(" cm"), "{bottom}");
}

#[rstest]
fn profile_json_reports_constants() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);

    let mut cmd = Command::cargo_bin("spool").unwrap();
    cmd.arg("--json")
        .arg("--config")
        .arg(&cfg)
        .args(["profile", "--diameter", "1"]);

    let out = cmd.assert().success().get_output().stdout.clone();
    let v = json_line(&out, "\"summary\"");
    assert_eq!(v["summary"], "PLA 3.00 mm 1Kg");
    assert_eq!(v["cm_per_gram"], 11.0);
    assert_eq!(v["nominal_g"], 1000.0);
    assert_eq!(v["tare_g"], 240.0);
}

#[rstest]
fn errors_are_structured_in_json_mode() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);

    let mut cmd = Command::cargo_bin("spool").unwrap();
    cmd.arg("--json")
        .arg("--config")
        .arg(&cfg)
        .args(["profile", "--roll-weight", "7"]);

    let out = cmd.assert().code(2).get_output().stderr.clone();
    let v = json_line(&out, "\"reason\"");
    assert_eq!(v["reason"], "Config");
    assert_eq!(v["exit_code"], 2);
    assert!(v["message"].as_str().unwrap().contains("roll_weight"));
}
