use assert_cmd::prelude::*;
use predicates::prelude::*;
use rstest::rstest;
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use tempfile::tempdir;

// Minimal valid TOML config for sim mode; fast loop so scripted runs stay short
fn write_valid_config(dir: &tempfile::TempDir) -> PathBuf {
    let toml = r#"
[pins]
# pins are unused in sim backend but must be present
scale_dt = 5
scale_sck = 6
material = 17
diameter = 27
roll_weight = 22
advance_button = 23
unit_button = 24

[buttons]
press_ms = 20
release_ms = 20

[runner]
poll_ms = 10

[selectors]
material = 0
diameter = 0
roll_weight = 0
"#;
    let path = dir.path().join("cfg.toml");
    fs::write(&path, toml).unwrap();
    path
}

#[rstest]
#[case(&["--help"], 0, "Usage:", "stdout")]
#[case(&["run", "--iterations", "3"], 0, "PLA 1.75 mm 1Kg | Idle", "stdout")]
#[case(&["profile", "--material", "1", "--diameter", "1", "--roll-weight", "1"], 0, "ABS 3.00 mm 2Kg", "stdout")]
#[case(&["profile", "--material", "2"], 2, "What happened", "stderr")]
#[case(&["self-check"], 0, "ok: PLA 1.75 mm 1Kg", "stdout")]
#[case(&["bogus"], 2, "unrecognized subcommand", "stderr")]
fn cli_table_cases(
    #[case] args: &[&str],
    #[case] exit_code: i32,
    #[case] needle: &str,
    #[case] stream: &str,
) {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);

    let mut cmd = Command::cargo_bin("spool").unwrap();
    // Always include a valid config to avoid relying on default path
    cmd.arg("--config").arg(&cfg).arg("--log-level").arg("error");
    for a in args {
        cmd.arg(a);
    }

    let assert = cmd.assert().code(exit_code);
    match stream {
        "stdout" => {
            assert.stdout(predicate::str::contains(needle));
        }
        "stderr" => {
            assert.stderr(predicate::str::contains(needle));
        }
        other => panic!("unknown stream: {other}"),
    }
}

#[rstest]
fn scripted_presses_reach_printing() {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);

    let mut cmd = Command::cargo_bin("spool").unwrap();
    cmd.arg("--config")
        .arg(&cfg)
        .arg("--log-level")
        .arg("error")
        .args(["run", "--iterations", "40", "--press-at", "3,10,20"])
        .args(["--draw-g", "0.5"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("status: Printing"))
        .stdout(predicate::str::contains("| Run "));
}

// With poll 10 ms and press/release 20 ms a press needs three low polls
// before it and three high polls; early or crowded presses start later.
#[rstest]
#[case("0", "10", "status: Ready")]
#[case("1", "10", "status: Ready")]
#[case("3,6", "15", "status: Load")]
#[case("0,1,2", "25", "status: Printing")]
fn early_or_crowded_presses_still_register(
    #[case] press_at: &str,
    #[case] iterations: &str,
    #[case] expected: &str,
) {
    let dir = tempdir().unwrap();
    let cfg = write_valid_config(&dir);

    let mut cmd = Command::cargo_bin("spool").unwrap();
    cmd.arg("--config")
        .arg(&cfg)
        .arg("--log-level")
        .arg("error")
        .args(["run", "--iterations", iterations, "--press-at", press_at]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(expected));
}

#[rstest]
fn missing_config_file_is_a_config_error() {
    let dir = tempdir().unwrap();
    let mut cmd = Command::cargo_bin("spool").unwrap();
    cmd.arg("--config")
        .arg(dir.path().join("nope.toml"))
        .arg("self-check");
    cmd.assert()
        .code(2)
        .stderr(predicate::str::contains("Configuration is invalid"));
}

#[rstest]
fn duplicate_pins_are_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("dup.toml");
    fs::write(
        &path,
        r#"
[pins]
scale_dt = 5
scale_sck = 5
material = 17
diameter = 27
roll_weight = 22
advance_button = 23
unit_button = 24
"#,
    )
    .unwrap();

    let mut cmd = Command::cargo_bin("spool").unwrap();
    cmd.arg("--config").arg(&path).arg("self-check");
    cmd.assert()
        .code(2)
        .stderr(predicate::str::contains("share GPIO 5"));
}
