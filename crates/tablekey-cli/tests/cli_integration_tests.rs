//! CLI Integration Tests
//!
//! Tests for `tablekey` CLI commands using `assert_cmd`.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const STRUCTURE: &str = r#"
name = "tariffs"

[[columns]]
name = "code"
datatype = "String"

[[columns]]
name = "validFrom"
datatype = "Integer"

[[columns]]
name = "validTo"
datatype = "Integer"

[[unique_keys]]
name = "validity"
items = [
    { type = "column", column = "code" },
    { type = "range", name = "period", kind = "two_column", from = "validFrom", to = "validTo" },
]
"#;

/// Get the CLI binary command
#[allow(deprecated)]
fn tablekey_cmd(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("tablekey").unwrap();
    cmd.current_dir(dir.path())
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .env_remove("TABLEKEY_CONFIG");
    cmd
}

fn write_files(dir: &TempDir, csv: &str) -> (PathBuf, PathBuf) {
    let structure = dir.path().join("tariffs.toml");
    let contents = dir.path().join("tariffs.csv");
    fs::write(&structure, STRUCTURE).unwrap();
    fs::write(&contents, csv).unwrap();
    (structure, contents)
}

// =============================================================================
// Help & Version Tests
// =============================================================================

#[test]
fn test_help_displays_usage() {
    let dir = TempDir::new().unwrap();
    tablekey_cmd(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("tablekey CLI"))
        .stdout(predicate::str::contains("Usage:"));
}

#[test]
fn test_invalid_command_shows_error() {
    let dir = TempDir::new().unwrap();
    tablekey_cmd(&dir)
        .arg("invalid_command_xyz")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

// =============================================================================
// Check Command Tests
// =============================================================================

#[test]
fn test_check_clean_table_succeeds() {
    let dir = TempDir::new().unwrap();
    let (structure, contents) = write_files(&dir, "code,validFrom,validTo\nA,1,10\nA,11,20\nB,1,10\n");

    tablekey_cmd(&dir)
        .arg("check")
        .arg("--structure")
        .arg(&structure)
        .arg("--contents")
        .arg(&contents)
        .assert()
        .success()
        .stdout(predicate::str::contains("No unique key violations."));
}

#[test]
fn test_check_overlap_fails_with_report() {
    let dir = TempDir::new().unwrap();
    let (structure, contents) = write_files(&dir, "code,validFrom,validTo\nA,1,10\nA,5,15\nA,20,30\n");

    tablekey_cmd(&dir)
        .arg("check")
        .arg("--structure")
        .arg(&structure)
        .arg("--contents")
        .arg(&contents)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("UKV-001"))
        .stdout(predicate::str::contains("2 error(s)"));
}

#[test]
fn test_check_json_output() {
    let dir = TempDir::new().unwrap();
    let (structure, contents) = write_files(&dir, "code,validFrom,validTo\nA,1,10\nA,5,15\n");

    let output = tablekey_cmd(&dir)
        .arg("check")
        .arg("--structure")
        .arg(&structure)
        .arg("--contents")
        .arg(&contents)
        .arg("--format")
        .arg("json")
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["rows"], 2);
    assert_eq!(report["range_check"], "performed");
    assert_eq!(report["messages"].as_array().map(Vec::len), Some(2));
    assert_eq!(report["messages"][0]["code"], "UKV-001");
    assert_eq!(report["messages"][1]["row_index"], 1);
}

#[test]
fn test_check_respects_range_threshold_from_config() {
    let dir = TempDir::new().unwrap();
    let (structure, contents) = write_files(&dir, "code,validFrom,validTo\nA,1,10\nA,5,15\n");
    fs::write(
        dir.path().join("tablekey.toml"),
        "[validation]\nautomatic_range_threshold = 1\n",
    )
    .unwrap();

    tablekey_cmd(&dir)
        .arg("check")
        .arg("--structure")
        .arg(&structure)
        .arg("--contents")
        .arg(&contents)
        .assert()
        .success()
        .stdout(predicate::str::contains("--explicit"));

    tablekey_cmd(&dir)
        .arg("check")
        .arg("--structure")
        .arg(&structure)
        .arg("--contents")
        .arg(&contents)
        .arg("--explicit")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("UKV-001"));
}

#[test]
fn test_check_invalid_config_fails() {
    let dir = TempDir::new().unwrap();
    let (structure, contents) = write_files(&dir, "code,validFrom,validTo\n");
    fs::write(
        dir.path().join("tablekey.toml"),
        "[validation]\nviolation_cap = 0\n",
    )
    .unwrap();

    tablekey_cmd(&dir)
        .arg("check")
        .arg("--structure")
        .arg(&structure)
        .arg("--contents")
        .arg(&contents)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid configuration"));
}

#[test]
fn test_check_missing_contents_file() {
    let dir = TempDir::new().unwrap();
    let (structure, _) = write_files(&dir, "");

    tablekey_cmd(&dir)
        .arg("check")
        .arg("--structure")
        .arg(&structure)
        .arg("--contents")
        .arg(dir.path().join("missing.csv"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to open CSV file"));
}

// =============================================================================
// Keys Command Tests
// =============================================================================

#[test]
fn test_keys_lists_items() {
    let dir = TempDir::new().unwrap();
    let (structure, _) = write_files(&dir, "");

    tablekey_cmd(&dir)
        .arg("keys")
        .arg("--structure")
        .arg(&structure)
        .assert()
        .success()
        .stdout(predicate::str::contains("validity"))
        .stdout(predicate::str::contains("two-column range"))
        .stdout(predicate::str::contains("Two-column range items: 1"));
}

#[test]
fn test_keys_rejects_invalid_structure() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.toml");
    fs::write(&path, "[[unique_keys]]\nname = \"empty\"\nitems = []\n").unwrap();

    tablekey_cmd(&dir)
        .arg("keys")
        .arg("--structure")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("TABLEKEY-006"));
}
