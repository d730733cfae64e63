use std::fs;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::tempdir;

fn valid_history_json() -> &'static str {
    r#"
[
  { "time": "07:30:00", "videoLink": "https://www.youtube.com/watch?v=abc123" },
  { "time": "21:15:45", "videoLink": "" }
]
"#
}

#[test]
fn inspect_log_lists_persisted_entries() {
    let dir = tempdir().expect("tempdir");
    let history = dir.path().join("alarm_log.json");
    fs::write(&history, valid_history_json()).expect("write json");

    let mut cmd = cargo_bin_cmd!("wakelink");
    cmd.arg("--inspect-log")
        .arg("--history")
        .arg(history)
        .assert()
        .success()
        .stdout(predicate::str::contains("Alarm log entries: 2"))
        .stdout(predicate::str::contains(
            "07:30:00  https://www.youtube.com/watch?v=abc123",
        ))
        .stdout(predicate::str::contains("21:15:45  -"));
}

// Malformed history resets to an empty log instead of failing startup.
#[test]
fn inspect_log_reports_reset_on_malformed_history() {
    let dir = tempdir().expect("tempdir");
    let history = dir.path().join("alarm_log.json");
    fs::write(&history, "{ not-valid-json ").expect("write invalid json");

    let mut cmd = cargo_bin_cmd!("wakelink");
    cmd.arg("--inspect-log")
        .arg("--history")
        .arg(history)
        .env("RUST_LOG", "warn")
        .assert()
        .success()
        .stdout(predicate::str::contains("Alarm log entries: 0"))
        .stderr(predicate::str::contains("malformed"));
}

#[test]
fn inspect_log_with_missing_file_is_empty() {
    let dir = tempdir().expect("tempdir");
    let history = dir.path().join("alarm_log.json");

    let mut cmd = cargo_bin_cmd!("wakelink");
    cmd.arg("--inspect-log")
        .arg("--history")
        .arg(history)
        .assert()
        .success()
        .stdout(predicate::str::contains("Alarm log entries: 0"));
}
