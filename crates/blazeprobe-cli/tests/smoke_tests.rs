//! Smoke tests for the blazeprobe binary

#![allow(deprecated)] // Command::cargo_bin
#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn blazeprobe() -> Command {
    let mut cmd = Command::cargo_bin("blazeprobe").expect("blazeprobe binary should exist");
    cmd.env_remove("BLAZEPROBE_BASE_URL")
        .env_remove("BLAZEPROBE_WEBDRIVER_URL")
        .env_remove("BLAZEPROBE_HEADLESS")
        .env_remove("BLAZEPROBE_CONFIG")
        .env_remove("RUST_LOG");
    cmd
}

// ============================================================================
// Basic CLI Tests
// ============================================================================

#[test]
fn test_version_flag() {
    blazeprobe()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_help_lists_subcommands() {
    blazeprobe()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_no_args_fails() {
    blazeprobe().assert().failure();
}

// ============================================================================
// list / config
// ============================================================================

#[test]
fn test_list_journeys() {
    blazeprobe()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("login_valid"))
        .stdout(predicate::str::contains("user_journey"));
}

#[test]
fn test_list_json() {
    let output = blazeprobe().args(["list", "--json"]).output().unwrap();
    assert!(output.status.success());
    let entries: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(entries.as_array().unwrap().len(), 20);
}

#[test]
fn test_config_shows_overrides() {
    blazeprobe()
        .args(["config", "--base-url", "https://staging.example.com", "--browser", "firefox"])
        .assert()
        .success()
        .stdout(predicate::str::contains("https://staging.example.com"))
        .stdout(predicate::str::contains("firefox"));
}

#[test]
fn test_config_rejects_bad_url() {
    blazeprobe()
        .args(["config", "--base-url", "not-a-url"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("base_url"));
}

// ============================================================================
// run
// ============================================================================

#[test]
fn test_run_unknown_journey() {
    blazeprobe()
        .args(["run", "--mock", "-j", "no_such_journey"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no_such_journey"));
}

#[test]
fn test_run_mock_writes_reports() {
    let dir = TempDir::new().unwrap();
    blazeprobe()
        .args(["run", "--mock", "-q", "-j", "login_modal", "-j", "about_us_modal", "--output"])
        .arg(dir.path())
        .assert()
        .success();

    let junit = fs::read_to_string(dir.path().join("junit.xml")).unwrap();
    assert!(junit.contains("login_modal"));
    assert!(junit.contains("about_us_modal"));
    assert!(dir.path().join("report.html").exists());
    assert!(dir.path().join("report.json").exists());
}

#[cfg(not(feature = "webdriver"))]
#[test]
fn test_run_without_browser_support() {
    blazeprobe()
        .args(["run", "-j", "login_modal"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--mock"));
}
