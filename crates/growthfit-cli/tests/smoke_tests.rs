//! Smoke tests for the growthfit CLI
//!
//! These tests verify basic CLI functionality works correctly.

#![allow(deprecated)] // Allow deprecated Command::cargo_bin until assert_cmd is updated
#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Get a command for the growthfit binary
fn growthfit() -> Command {
    Command::cargo_bin("growthfit").expect("growthfit binary should exist")
}

fn write_file(dir: &TempDir, name: &str, content: &str) -> String {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path.to_string_lossy().into_owned()
}

const EXPONENTIAL_CSV: &str = "size,time
0,0
1,2
2,12
3,15
4,31
5,74
6,151
7,318
8,637
9,1329
10,2646
15,5490
";

const LINEARITHMIC_JSON: &str = r#"{
  "sizes": [0, 1, 3, 6, 7, 9, 12, 15, 18, 21, 24, 27, 30, 31, 33, 36, 39, 42, 45, 48, 51, 54, 57, 60, 63],
  "times": [1, 0, 43, 41, 144, 86, 111, 178, 210, 278, 285, 610, 374, 403, 531, 547, 689, 637, 644, 1368, 829, 861, 844, 916, 1006]
}"#;

// ============================================================================
// Basic CLI Tests
// ============================================================================

#[test]
fn test_version_flag() {
    growthfit()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("0.4.0"));
}

#[test]
fn test_help_flag() {
    growthfit()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("classify"))
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_no_args_shows_help() {
    growthfit().assert().failure(); // Requires a subcommand
}

#[test]
fn test_run_subcommand_help() {
    growthfit()
        .args(["run", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--target-ms"))
        .stdout(predicate::str::contains("--point-only"));
}

// ============================================================================
// Classify Tests
// ============================================================================

#[test]
fn test_classify_csv() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "exp.csv", EXPONENTIAL_CSV);
    growthfit()
        .args(["classify", &path])
        .assert()
        .success()
        .stdout(predicate::str::diff("2^n\n"));
}

#[test]
fn test_classify_json_input() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "nlogn.json", LINEARITHMIC_JSON);
    growthfit()
        .args(["classify", &path])
        .assert()
        .success()
        .stdout(predicate::str::contains("n*log(n)"));
}

#[test]
fn test_classify_json_output() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "exp.csv", EXPONENTIAL_CSV);
    growthfit()
        .args(["classify", &path, "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"label\": \"2^n\""))
        .stdout(predicate::str::contains("\"fits\""));
}

#[test]
fn test_classify_show_fits() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "exp.csv", EXPONENTIAL_CSV);
    growthfit()
        .args(["classify", &path, "--show-fits"])
        .assert()
        .success()
        .stdout(predicate::str::contains("polynomial"))
        .stdout(predicate::str::contains("exponential"));
}

#[test]
fn test_classify_too_few_points() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "short.csv", "1,1\n2,2\n3,3\n");
    growthfit()
        .args(["classify", &path])
        .assert()
        .success()
        .stdout(predicate::str::diff("\n"));
}

#[test]
fn test_classify_missing_file() {
    growthfit()
        .args(["classify", "/nonexistent/times.csv"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn test_classify_malformed_file() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "bad.csv", "size,time\n1,1\n2,two\n");
    growthfit()
        .args(["classify", &path])
        .assert()
        .failure()
        .stderr(predicate::str::contains("line 3"));
}

// ============================================================================
// Config Tests
// ============================================================================

#[test]
fn test_config_defaults() {
    growthfit()
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("target_time_ms: 1000"))
        .stdout(predicate::str::contains("point_count: 100"));
}

#[test]
fn test_config_from_file() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "analysis.yaml", "target_time_ms: 250\n");
    growthfit()
        .args(["config", "--config", &path])
        .assert()
        .success()
        .stdout(predicate::str::contains("target_time_ms: 250"));
}

#[test]
fn test_config_invalid_file() {
    let dir = TempDir::new().unwrap();
    let path = write_file(&dir, "analysis.yaml", "tolerance: 3.0\n");
    growthfit()
        .args(["config", "--config", &path])
        .assert()
        .failure();
}

// ============================================================================
// Run Tests
// ============================================================================

#[test]
fn test_run_requires_command() {
    growthfit().arg("run").assert().failure();
}

#[test]
fn test_run_rejects_bad_range() {
    growthfit()
        .args(["run", "--min", "100", "--max", "10", "--", "true"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid configuration"));
}

#[cfg(unix)]
#[test]
fn test_run_point_only() {
    growthfit()
        .args([
            "-q",
            "run",
            "--point-only",
            "--max",
            "12",
            "--points",
            "12",
            "--format",
            "json",
            "--",
            "true",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"limit\": 12"))
        .stdout(predicate::str::contains("\"calibrated\": false"));
}

#[cfg(unix)]
#[test]
fn test_run_failing_command() {
    growthfit()
        .args(["-q", "run", "--point-only", "--max", "5", "--", "false"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Sampling failed"));
}

#[cfg(unix)]
#[test]
fn test_run_verbose_reports_absent_trials() {
    // Sizes above 3 exit non-zero, so calibration records absent trials
    growthfit()
        .args([
            "-v",
            "--color",
            "never",
            "run",
            "--max",
            "1000",
            "--points",
            "4",
            "--",
            "sh",
            "-c",
            "test {n} -le 3",
        ])
        .assert()
        .success()
        .stderr(predicate::str::contains("trials timed out or failed"));
}

#[test]
fn test_classify_rejects_nan_time() {
    let dir = TempDir::new().unwrap();
    let mut csv: String = (1..=20).map(|n| format!("{n},{n}\n")).collect();
    csv.push_str("21,NaN\n");
    let path = write_file(&dir, "nan.csv", &csv);
    growthfit()
        .args(["classify", &path])
        .assert()
        .failure()
        .stderr(predicate::str::contains("line 21"));
}
