//! End-to-end tests for the gobe binary

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn gobe() -> Command {
    Command::cargo_bin("gobe").unwrap()
}

fn write_settings(dir: &TempDir, name: &str, content: &str) -> String {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path.to_string_lossy().into_owned()
}

#[test]
fn test_help_lists_commands() {
    gobe()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("check"))
        .stdout(predicate::str::contains("config"))
        .stdout(predicate::str::contains("code"));
}

#[test]
fn test_config_masks_secrets() {
    let dir = TempDir::new().unwrap();
    let path = write_settings(
        &dir,
        "settings.yaml",
        "sql:\n  driver: postgres\n  db_host: localhost\n  db_name: app\n  db_username: app\n  db_password: hunter2\n",
    );

    gobe()
        .args(["config", "--config", &path])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"db_password\": \"********\""))
        .stdout(predicate::str::contains("hunter2").not());
}

#[test]
fn test_config_reads_toml() {
    let dir = TempDir::new().unwrap();
    let path = write_settings(
        &dir,
        "settings.toml",
        "[redis]\nhost = \"cache.internal\"\nport = \"6380\"\n",
    );

    gobe()
        .args(["config", "--config", &path])
        .assert()
        .success()
        .stdout(predicate::str::contains("cache.internal"))
        .stdout(predicate::str::contains("6380"));
}

#[test]
fn test_config_missing_file_fails() {
    gobe()
        .args(["config", "--config", "/nonexistent/settings.yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Settings file not found"));
}

#[test]
fn test_check_reports_unreachable_redis() {
    let dir = TempDir::new().unwrap();
    let path = write_settings(&dir, "settings.json", r#"{"redis": {"port": 1}}"#);

    gobe()
        .args(["check", "--config", &path])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unreachable: redis"));
}

#[test]
fn test_check_requires_a_backend() {
    let dir = TempDir::new().unwrap();
    let path = write_settings(&dir, "settings.json", "{}");

    gobe()
        .args(["check", "--config", &path])
        .assert()
        .failure()
        .stderr(predicate::str::contains("configures no backends"));
}

#[test]
fn test_code_has_requested_digits() {
    let output = gobe().args(["code", "--digits", "4"]).output().unwrap();
    assert!(output.status.success());
    let code = String::from_utf8(output.stdout).unwrap();
    let code = code.trim();
    assert_eq!(code.len(), 4, "{code}");
    assert!(code.chars().all(|c| c.is_ascii_digit()));
    assert!(!code.starts_with('0'));
}

#[test]
fn test_code_string_allows_any_digits() {
    let output = gobe()
        .args(["code", "--digits", "8", "--string"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let code = String::from_utf8(output.stdout).unwrap();
    assert_eq!(code.trim().len(), 8);
}
