//! Integration tests for the `recur` CLI binary.
//!
//! These tests use `assert_cmd` and `predicates` to exercise the expand, validate,
//! and usage subcommands through the actual binary, including stdin piping,
//! file I/O, configuration, and error reporting.

// `Command::cargo_bin` was deprecated in assert_cmd 2.1.2 in favor of
// `cargo::cargo_bin_cmd!`. Allow it until we migrate.
#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;

/// Helper: path to the series.json fixture.
fn series_json_path() -> &'static str {
    concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/series.json")
}

/// Helper: path to the invalid_series.json fixture.
fn invalid_series_json_path() -> &'static str {
    concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/invalid_series.json")
}

/// Helper: the binary with the user's config directory and log filter masked out.
fn recur() -> Command {
    let mut cmd = Command::cargo_bin("recur").unwrap();
    cmd.env("XDG_CONFIG_HOME", concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures"))
        .env_remove("RUST_LOG");
    cmd
}

// ─────────────────────────────────────────────────────────────────────────────
// Expand subcommand
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn expand_rule_from_flags() {
    recur()
        .args([
            "expand",
            "--rrule",
            "FREQ=MONTHLY;BYDAY=1FR;COUNT=3",
            "--dtstart",
            "20260101T090000",
            "--duration",
            "60",
        ])
        .assert()
        .success()
        .stdout(
            "2026-01-02T09:00:00 2026-01-02T10:00:00\n\
             2026-02-06T09:00:00 2026-02-06T10:00:00\n\
             2026-03-06T09:00:00 2026-03-06T10:00:00\n",
        );
}

#[test]
fn expand_applies_exdates_and_rdates() {
    recur()
        .args([
            "expand",
            "--rrule",
            "FREQ=WEEKLY;COUNT=4;BYDAY=TU",
            "--dtstart",
            "2026-03-03T10:00:00",
            "--duration",
            "45",
            "--exdate",
            "2026-03-17T10:00:00",
            "--rdate",
            "20260319T150000",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("2026-03-19T15:00:00 2026-03-19T15:45:00"))
        .stdout(predicate::str::contains("2026-03-17").not());
}

#[test]
fn expand_series_file_matches_flags() {
    let from_file = recur()
        .args(["expand", "-i", series_json_path()])
        .output()
        .unwrap();
    let from_flags = recur()
        .args([
            "expand",
            "--uid",
            "standup",
            "--rrule",
            "FREQ=WEEKLY;COUNT=4;BYDAY=TU",
            "--dtstart",
            "20260303T100000",
            "--duration",
            "45",
            "--exdate",
            "20260317T100000",
            "--rdate",
            "20260319T150000",
        ])
        .output()
        .unwrap();

    assert!(from_file.status.success());
    assert_eq!(from_file.stdout, from_flags.stdout);
}

#[test]
fn expand_series_from_stdin() {
    let input = std::fs::read_to_string(series_json_path()).expect("series.json fixture must exist");

    recur()
        .arg("expand")
        .write_stdin(input)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("2026-03-03T10:00:00 2026-03-03T10:45:00\n"));
}

#[test]
fn expand_json_output() {
    let output = recur()
        .args(["expand", "-i", series_json_path(), "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let items = json.as_array().unwrap();
    let starts: Vec<&str> = items.iter().map(|o| o["start"].as_str().unwrap()).collect();
    assert_eq!(
        starts,
        [
            "2026-03-03T10:00:00",
            "2026-03-10T10:00:00",
            "2026-03-19T15:00:00",
            "2026-03-24T10:00:00",
        ]
    );
    assert!(items.iter().all(|o| o["uid"] == "standup"));
    assert_eq!(items[0]["start_ms"], 1772532000000i64);
}

#[test]
fn expand_limit_truncates() {
    recur()
        .args(["expand", "--rrule", "FREQ=DAILY", "--dtstart", "20260101T080000", "--limit", "2"])
        .assert()
        .success()
        .stdout(
            "2026-01-01T08:00:00 2026-01-01T08:30:00\n\
             2026-01-02T08:00:00 2026-01-02T08:30:00\n",
        );
}

#[test]
fn expand_single_event_without_rule() {
    recur()
        .args(["expand", "--dtstart", "20260101T080000", "--dtend", "20260101T093000"])
        .assert()
        .success()
        .stdout("2026-01-01T08:00:00 2026-01-01T09:30:00\n");
}

#[test]
fn expand_writes_output_file() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("occurrences.txt");

    recur()
        .args(["expand", "-i", series_json_path(), "-o", out.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let written = std::fs::read_to_string(&out).unwrap();
    assert_eq!(written.lines().count(), 4);
}

#[test]
fn expand_rejects_malformed_rule() {
    recur()
        .args(["expand", "--rrule", "INTERVAL=2", "--dtstart", "20260101"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid --rrule"))
        .stderr(predicate::str::contains("missing FREQ"));
}

#[test]
fn expand_rejects_bad_date() {
    recur()
        .args(["expand", "--rrule", "FREQ=DAILY", "--dtstart", "yesterday"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid --dtstart"));
}

#[test]
fn expand_rejects_invalid_json() {
    recur()
        .arg("expand")
        .write_stdin("{not json")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse series JSON"));
}

#[test]
fn expand_without_series_fails() {
    recur()
        .arg("expand")
        .write_stdin("")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No series given"));
}

#[test]
fn expand_missing_file() {
    recur()
        .args(["expand", "-i", "/nonexistent/series.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read file"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Validate subcommand
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn validate_prints_normalised_rule() {
    recur()
        .args(["validate", "--rrule", "rrule:freq=monthly;byday=1fr;count=3", "--dtstart", "20260101"])
        .assert()
        .success()
        .stdout("RRULE:FREQ=MONTHLY;COUNT=3;BYDAY=1FR\n");
}

#[test]
fn validate_single_event() {
    recur()
        .args(["validate", "--dtstart", "20260101T080000", "--duration", "15"])
        .assert()
        .success()
        .stdout("single event\n");
}

#[test]
fn validate_rejects_unsupported_combination() {
    recur()
        .args(["validate", "--rrule", "FREQ=WEEKLY;BYWEEKNO=20", "--dtstart", "20260101"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("BYWEEKNO requires YEARLY freq"));
}

#[test]
fn validate_rejects_invalid_series_file() {
    recur()
        .args(["validate", "-i", invalid_series_json_path()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid series"))
        .stderr(predicate::str::contains("BYMONTHDAY cannot be used with DAILY or WEEKLY freq"));
}

#[test]
fn expand_refuses_invalid_series_file() {
    recur()
        .args(["expand", "-i", invalid_series_json_path()])
        .assert()
        .failure()
        .stdout(predicate::str::is_empty());
}

// ─────────────────────────────────────────────────────────────────────────────
// Usage subcommand
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn usage_weekly_buckets() {
    // 2026-03-02 is a Monday.
    recur()
        .args([
            "usage",
            "--rrule",
            "FREQ=DAILY;COUNT=10",
            "--dtstart",
            "20260302T090000",
            "--duration",
            "90",
            "--bucket",
            "weekly",
        ])
        .assert()
        .success()
        .stdout("2026-03-02T00:00:00 630\n2026-03-09T00:00:00 270\n");
}

#[test]
fn usage_first_day_of_week_from_env() {
    recur()
        .env("RECUR_FIRST_DAY_OF_WEEK", "Sun")
        .args([
            "usage",
            "--rrule",
            "FREQ=DAILY;COUNT=10",
            "--dtstart",
            "20260302T090000",
            "--duration",
            "90",
            "--bucket",
            "weekly",
        ])
        .assert()
        .success()
        .stdout("2026-03-01T00:00:00 540\n2026-03-08T00:00:00 360\n");
}

#[test]
fn usage_monthly_json() {
    let output = recur()
        .env("RECUR_PRETTY_JSON", "false")
        .args(["usage", "-i", series_json_path(), "--bucket", "monthly", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let text = String::from_utf8(output.stdout).unwrap();
    assert_eq!(text.lines().count(), 1);
    let json: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(json, serde_json::json!([{ "start": "2026-03-01T00:00:00", "minutes": 180 }]));
}

#[test]
fn usage_daily_is_default_bucket() {
    recur()
        .args(["usage", "--rrule", "FREQ=DAILY;COUNT=2", "--dtstart", "20260101T233000", "--duration", "60"])
        .assert()
        .success()
        .stdout(
            "2026-01-01T00:00:00 30\n\
             2026-01-02T00:00:00 60\n\
             2026-01-03T00:00:00 30\n",
        );
}

// ─────────────────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn config_file_sets_default_duration() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("recur.toml");
    std::fs::write(&config, "default_duration_minutes = 120\n").unwrap();

    recur()
        .args(["--config", config.to_str().unwrap()])
        .args(["expand", "--dtstart", "20260101T080000"])
        .assert()
        .success()
        .stdout("2026-01-01T08:00:00 2026-01-01T10:00:00\n");
}

#[test]
fn malformed_config_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("recur.toml");
    std::fs::write(&config, "default_duration_minutes = \"soon\"\n").unwrap();

    recur()
        .args(["--config", config.to_str().unwrap(), "expand", "--dtstart", "20260101"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load configuration"));
}

#[test]
fn verbose_logs_to_stderr_only() {
    recur()
        .args(["-v", "expand", "--rrule", "FREQ=DAILY;COUNT=1", "--dtstart", "20260101T080000"])
        .assert()
        .success()
        .stdout("2026-01-01T08:00:00 2026-01-01T08:30:00\n")
        .stderr(predicate::str::contains("DEBUG"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Help / version
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn help_flag() {
    recur()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("expand"))
        .stdout(predicate::str::contains("validate"))
        .stdout(predicate::str::contains("usage"));
}

#[test]
fn version_flag() {
    recur()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("recur"));
}
