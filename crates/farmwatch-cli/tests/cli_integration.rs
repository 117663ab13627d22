//! CLI Integration Tests
//!
//! These tests run the `farmwatch` binary. None of them needs a backend:
//! they cover argument handling, local validation and the config file.
//! Each test points the config directory at its own temporary home.

use std::path::Path;
use std::process::{Command, Output};

/// Run farmwatch with an isolated config directory.
fn run_farmwatch(home: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_farmwatch"))
        .args(args)
        .env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env_remove("FARMWATCH_URL")
        .env_remove("FARMWATCH_DEVICE")
        .env_remove("FARMWATCH_STYLE")
        .env("NO_COLOR", "1")
        .output()
        .expect("Failed to run farmwatch binary")
}

#[test]
fn test_help_command() {
    let home = tempfile::tempdir().unwrap();
    let output = run_farmwatch(home.path(), &["--help"]);

    assert!(output.status.success(), "Help should succeed");
    let stdout = String::from_utf8_lossy(&output.stdout);
    for command in ["devices", "dashboard", "interval", "relay", "history", "config"] {
        assert!(stdout.contains(command), "Help should list {command}");
    }
}

#[test]
fn test_version_command() {
    let home = tempfile::tempdir().unwrap();
    let output = run_farmwatch(home.path(), &["--version"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("farmwatch"));
}

#[test]
fn test_invalid_interval_rejected_without_backend() {
    let home = tempfile::tempdir().unwrap();
    // Nothing listens on the discard port; validation must fail first.
    let output = run_farmwatch(
        home.path(),
        &["--url", "http://127.0.0.1:9", "interval", "sensor-001", "120"],
    );

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Invalid interval: 120 seconds"), "stderr: {stderr}");
    assert!(stderr.contains("900 (15 min)"));
}

#[test]
fn test_relay_rejects_unknown_action() {
    let home = tempfile::tempdir().unwrap();
    let output = run_farmwatch(home.path(), &["relay", "pump-1", "toggle"]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_history_requires_device() {
    let home = tempfile::tempdir().unwrap();
    let output = run_farmwatch(home.path(), &["history"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("No device specified"), "stderr: {stderr}");
}

#[test]
fn test_config_set_show_unset() {
    let home = tempfile::tempdir().unwrap();

    let output = run_farmwatch(home.path(), &["config", "set", "url", "http://farm.local:3000"]);
    assert!(output.status.success());
    let output = run_farmwatch(home.path(), &["config", "set", "axis", "hour-1"]);
    assert!(output.status.success());

    let output = run_farmwatch(home.path(), &["config", "show"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("base_url = \"http://farm.local:3000\""));
    assert!(stdout.contains("axis = \"hour-1\""));

    let output = run_farmwatch(home.path(), &["config", "unset", "axis"]);
    assert!(output.status.success());
    let output = run_farmwatch(home.path(), &["config", "show"]);
    assert!(!String::from_utf8_lossy(&output.stdout).contains("axis"));
}

#[test]
fn test_config_set_rejects_bad_value() {
    let home = tempfile::tempdir().unwrap();
    let output = run_farmwatch(home.path(), &["config", "set", "refresh-secs", "soon"]);
    assert!(!output.status.success());
}

#[test]
fn test_config_init_twice_fails() {
    let home = tempfile::tempdir().unwrap();
    assert!(run_farmwatch(home.path(), &["config", "init"]).status.success());
    assert!(!run_farmwatch(home.path(), &["config", "init"]).status.success());
}

#[test]
fn test_completions() {
    let home = tempfile::tempdir().unwrap();
    let output = run_farmwatch(home.path(), &["completions", "bash"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("farmwatch"));
}
