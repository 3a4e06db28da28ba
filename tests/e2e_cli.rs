//! CLI end-to-end tests
//!
//! Tests for the duckflix command-line interface that do not need mkvtoolnix.

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::process::Command;
use tempfile::tempdir;

/// Get a command for the duckflix binary
#[allow(deprecated)]
fn duckflix_cmd() -> Command {
    Command::cargo_bin("duckflix").unwrap()
}

#[test]
fn test_cli_no_args_shows_usage() {
    duckflix_cmd()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_cli_help_flag() {
    duckflix_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("MEDIA_ROOT"))
        .stdout(predicate::str::contains("--allow-ip"))
        .stdout(predicate::str::contains("--listen-port"));
}

#[test]
fn test_cli_version_flag() {
    duckflix_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("duckflix"));
}

#[test]
fn test_cli_rejects_invalid_allow_ip() {
    duckflix_cmd()
        .args(["--allow-ip", "not-an-address", "/movies"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not-an-address"));
}

#[test]
fn test_cli_rejects_unknown_index_format() {
    duckflix_cmd()
        .args(["--index-format", "xml", "/movies"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("identifiers"));
}

#[test]
fn test_cli_missing_media_root() {
    let dir = tempdir().unwrap();
    duckflix_cmd()
        .arg(dir.path().join("nowhere"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a directory"));
}

#[test]
fn test_cli_rejects_port_zero() {
    let dir = tempdir().unwrap();
    duckflix_cmd()
        .args(["--listen-port", "0"])
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("port cannot be 0"));
}

#[test]
fn test_cli_rejects_bad_config_file() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("duckflix.toml");
    fs::write(&config_path, "[server\nport = ").unwrap();

    duckflix_cmd()
        .arg("--config")
        .arg(&config_path)
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse config file"));
}

#[test]
fn test_cli_missing_config_file() {
    let dir = tempdir().unwrap();
    duckflix_cmd()
        .arg("--config")
        .arg(dir.path().join("absent.toml"))
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read config file"));
}

#[test]
fn test_cli_check_tools_uses_configured_paths() {
    let dir = tempdir().unwrap();
    let exe = std::env::current_exe().unwrap().display().to_string();
    let config_path = dir.path().join("duckflix.toml");
    fs::write(
        &config_path,
        format!("[tools]\nmkvmerge_path = {exe:?}\nmkvextract_path = {exe:?}\n"),
    )
    .unwrap();

    duckflix_cmd()
        .arg("--config")
        .arg(&config_path)
        .arg("--check-tools")
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("✓ mkvmerge - {exe}")))
        .stdout(predicate::str::contains("All required tools are available!"));
}
