//! End-to-end tests of the taskdeck binary.
//!
//! None of these reach the real API: they stop at validation or
//! configuration, or point `api_url` at a closed local port.

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;
use tempfile::NamedTempFile;

const ENV_VARS: [&str; 6] = [
    "TASKDECK_API_KEY",
    "TASKDECK_API_TOKEN",
    "TASKDECK_BOARD",
    "TASKDECK_API_URL",
    "TASKDECK_INBOX_LIST",
    "TASKDECK_COLOR",
];

/// The binary with no credentials anywhere
fn taskdeck() -> Command {
    let mut cmd = Command::cargo_bin("taskdeck").unwrap();
    cmd.env("TASKDECK_CONFIG", "/nonexistent/taskdeck/config.yaml")
        .env("NO_COLOR", "1");
    for var in ENV_VARS {
        cmd.env_remove(var);
    }
    cmd
}

fn config_file(yaml: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(yaml.as_bytes()).unwrap();
    file
}

#[test]
fn test_help_lists_commands() {
    let mut cmd = Command::cargo_bin("taskdeck").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("review"))
        .stdout(predicate::str::contains("grep"));
}

#[test]
fn test_grep_invalid_regex_fails_before_config() {
    taskdeck()
        .args(["grep", "(unclosed"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("regex"));
}

#[test]
fn test_grep_without_pattern() {
    taskdeck()
        .arg("grep")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("pattern"));
}

#[test]
fn test_conflicting_filters_fail_before_config() {
    taskdeck()
        .args(["show", "cards", "--no-tags", "-t", "Food"])
        .assert()
        .code(2);
    taskdeck()
        .args(["review", "--has-due", "--no-due"])
        .assert()
        .code(2);
}

#[test]
fn test_missing_credentials_exit_code() {
    taskdeck()
        .args(["show", "cards"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("api_key"));
}

#[test]
fn test_missing_token_from_file() {
    let file = config_file("api_key: abc123\nboard: Home\n");
    taskdeck()
        .env("TASKDECK_CONFIG", file.path())
        .args(["batch", "tag"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("api_token"));
}

#[test]
fn test_unknown_status_is_usage_error() {
    taskdeck()
        .args(["show", "cards", "-s", "gone"])
        .assert()
        .code(2);
}

#[test]
fn test_config_masks_secrets() {
    let file = config_file(
        "api_key: 0123456789abcdef\napi_token: fedcba9876543210fedcba\nboard: Home\n",
    );
    taskdeck()
        .env("TASKDECK_CONFIG", file.path())
        .env("TASKDECK_BOARD", "Work")
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("board: Work"))
        .stdout(predicate::str::contains("cdef"))
        .stdout(predicate::str::contains("0123456789").not())
        .stdout(predicate::str::contains("fedcba9876543210").not());
}

#[test]
fn test_unreachable_api_is_network_error() {
    let file = config_file(
        "api_key: abc\napi_token: def\nboard: Home\napi_url: http://127.0.0.1:9/1\n",
    );
    taskdeck()
        .env("TASKDECK_CONFIG", file.path())
        .args(["show", "lists"])
        .assert()
        .code(6);
}
