//! Integration tests for multiping CLI functionality

#![allow(clippy::unwrap_used)]

use assert_cmd::Command;
use multiping::socket::utils::is_root;
use predicates::prelude::*;
use serde_json::Value;

fn multiping() -> Command {
    Command::cargo_bin("multiping").expect("Failed to find multiping binary")
}

#[test]
fn test_help_output() {
    multiping()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Ping many hosts at once"))
        .stdout(predicate::str::contains("--timeout-ms"))
        .stdout(predicate::str::contains("--batch-size"))
        .stdout(predicate::str::contains("--json"));
}

#[test]
fn test_version_output() {
    let output = multiping().arg("--version").output().unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("multiping "));
    if cfg!(debug_assertions) {
        assert!(stdout.contains("-UNRELEASED"));
    }
}

#[test]
fn test_hosts_are_required() {
    multiping().assert().failure();
}

#[test]
fn test_invalid_batch_size() {
    multiping()
        .args(["--batch-size", "0", "127.0.0.1"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Error: batch-size must be at least 1"));
}

#[test]
fn test_invalid_timeout() {
    multiping()
        .args(["--timeout-ms", "0", "127.0.0.1"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("timeout-ms must be greater than 0"));
}

#[test]
fn test_invalid_count() {
    multiping()
        .args(["-c", "0", "127.0.0.1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("count must be at least 1"));
}

#[test]
fn test_permission_error_without_root() {
    if is_root() {
        eprintln!("Skipping permission error test - running as root");
        return;
    }

    let output = multiping().args(["127.0.0.1"]).output().unwrap();
    if output.status.success() {
        // CAP_NET_RAW granted to the test binary
        return;
    }
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Error: Insufficient permissions"), "stderr: {stderr}");
    assert!(stderr.contains("Suggestion:"));
}

#[test]
fn test_localhost_text_output() {
    if !is_root() {
        eprintln!("Skipping localhost ping - requires root");
        return;
    }

    multiping()
        .args(["--timeout-ms", "500", "127.0.0.1", "an-invalid-test-url.invalid"])
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"127\.0\.0\.1 = \d+\.\d{3} ms").unwrap())
        .stdout(predicate::str::contains("an-invalid-test-url.invalid = unreachable"));
}

#[test]
fn test_json_output_format() {
    if !is_root() {
        eprintln!("Skipping JSON output test - requires root");
        return;
    }

    let output = multiping()
        .args(["--json", "--timeout-ms", "500", "127.0.0.1", "an-invalid-test-url.invalid"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: Value = serde_json::from_slice(&output.stdout).expect("Output should be valid JSON");
    assert!(json["version"].is_string());
    assert_eq!(json["timeout_ms"], 500);
    let hosts = json["hosts"].as_array().unwrap();
    assert_eq!(hosts.len(), 2);
    assert_eq!(hosts[0]["host"], "127.0.0.1");
    assert_eq!(hosts[0]["reachable"], true);
    assert!(hosts[0]["rtt_ms"].is_number());
    assert_eq!(hosts[1]["reachable"], false);
    assert!(hosts[1]["rtt_ms"].is_null());
}

#[test]
fn test_verbose_count_output() {
    if !is_root() {
        eprintln!("Skipping verbose ping test - requires root");
        return;
    }

    multiping()
        .args(["-c", "2", "--timeout-ms", "500", "127.0.0.1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ping 127.0.0.1... get ping in").count(2))
        .stdout(predicate::str::contains("milliseconds."));
}
