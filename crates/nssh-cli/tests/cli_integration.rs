//! CLI integration tests
//!
//! Tests the nssh CLI using assert_cmd.

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn nssh() -> Command {
    let mut cmd = Command::cargo_bin("nssh")
        .expect("Failed to locate nssh binary - ensure it's built before running tests");
    cmd.env_remove("NSSH_API").env_remove("RUST_LOG");
    cmd
}

/// nssh with its profile directory pointed at `dir`
fn nssh_in(dir: &Path) -> Command {
    let mut cmd = nssh();
    cmd.env("SORACOM_PROFILE_DIR", dir);
    cmd
}

fn profile_dir(name: &str, content: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join(format!("{}.json", name)), content).unwrap();
    dir
}

#[test]
fn test_cli_help() {
    nssh()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("nssh"))
        .stdout(predicate::str::contains("SSH into cellular devices by name"))
        .stdout(predicate::str::contains("interactive"))
        .stdout(predicate::str::contains("Only log errors"));
}

#[test]
fn test_cli_connect_help() {
    nssh()
        .args(["connect", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--identity"))
        .stdout(predicate::str::contains("--port"))
        .stdout(predicate::str::contains("--duration"));
}

#[test]
fn test_cli_interactive_help() {
    nssh()
        .args(["interactive", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--login"));
}

#[test]
fn test_cli_version() {
    nssh()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(" ("))
        .stdout(predicate::str::ends_with(")\n"));
}

#[test]
fn test_cli_version_alias_needs_no_profile() {
    let empty = TempDir::new().unwrap();
    nssh_in(empty.path()).arg("v").assert().success();
}

#[test]
fn test_cli_connect_requires_target() {
    nssh()
        .arg("connect")
        .assert()
        .failure()
        .stderr(predicate::str::contains("<TARGET>"));
}

#[test]
fn test_cli_unknown_command() {
    nssh().arg("teleport").assert().failure();
}

#[test]
fn test_cli_invalid_api_variant() {
    nssh()
        .args(["--api", "carrier-pigeon", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid API variant"));
}

#[test]
fn test_cli_missing_profile() {
    let empty = TempDir::new().unwrap();
    nssh_in(empty.path())
        .arg("list")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Profile not found"))
        .stderr(predicate::str::contains("nssh.json"));
}

#[test]
fn test_cli_profile_name_selects_file() {
    let dir = profile_dir("nssh", r#"{"authKeyId": "keyId-x", "authKey": "secret-x"}"#);
    nssh_in(dir.path())
        .args(["--profile-name", "staging", "l"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("staging.json"));
}

#[test]
fn test_cli_invalid_coverage_override() {
    let dir = profile_dir(
        "nssh",
        r#"{"authKeyId": "keyId-x", "authKey": "secret-x", "coverageType": "jp"}"#,
    );
    nssh_in(dir.path())
        .args(["--coverage-type", "eu", "list"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid coverage type: eu"));
}

#[test]
fn test_cli_profile_missing_auth_key() {
    let dir = profile_dir("nssh", r#"{"authKeyId": "keyId-x", "coverageType": "g"}"#);
    nssh_in(dir.path())
        .arg("list")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Missing required field 'authKey'"));
}

#[test]
fn test_cli_profile_not_json() {
    let dir = profile_dir("nssh", "authKeyId = keyId-x");
    nssh_in(dir.path())
        .args(["c", "pi@gateway"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Failed to parse profile"));
}
