//! Command-line exit codes and console output

use serde_json::json;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;

fn command(dir: &Path, args: &[&str]) -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_cimp"));
    command
        .args(args)
        .arg("--config")
        .arg(dir.join("absent.toml"))
        .arg("--database")
        .arg(dir.join("documents.db"))
        .env_remove("CIMP_CONFIG")
        .env_remove("CIMP_DATABASE")
        .env_remove("CIMP_CATALOG")
        .env_remove("CIMP_LOG_LEVEL")
        .env_remove("RUST_LOG");
    command
}

fn cimp(dir: &Path, args: &[&str]) -> Output {
    command(dir, args).output().unwrap()
}

/// Run with `--stdin`, feeding `input`
fn cimp_stdin(dir: &Path, input: &str) -> Output {
    let mut child = command(dir, &["--stdin"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(input.as_bytes())
        .unwrap();
    child.wait_with_output().unwrap()
}

fn write_record(dir: &Path, name: &str, contents: &str) -> String {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path.display().to_string()
}

#[test]
fn test_import_file_succeeds() {
    let dir = TempDir::new().unwrap();
    let record = json!({
        "name": "Urgath",
        "type": "character",
        "system": {},
        "items": [{"name": "Bronze Sword", "type": "weapon", "system": {}}]
    });
    let path = write_record(dir.path(), "urgath.json", &record.to_string());

    let output = cimp(dir.path(), &[&path]);

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Imported character Urgath."));
}

#[test]
fn test_no_file_is_cancel() {
    let dir = TempDir::new().unwrap();
    let output = cimp(dir.path(), &[]);
    assert_eq!(output.status.code(), Some(0));
    assert!(output.stdout.is_empty());
}

#[test]
fn test_invalid_json_exits_one() {
    let dir = TempDir::new().unwrap();
    let path = write_record(dir.path(), "broken.json", "not json");

    let output = cimp(dir.path(), &[&path]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("The selected file does not contain valid JSON."));
}

#[test]
fn test_unknown_log_level_exits_two() {
    let dir = TempDir::new().unwrap();
    let output = cimp(dir.path(), &["--log-level", "loud"]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_missing_catalog_exits_two() {
    let dir = TempDir::new().unwrap();
    let catalog = dir.path().join("missing-lang.json");
    let output = cimp(dir.path(), &["--catalog", catalog.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_missing_config_warns_and_uses_defaults() {
    let dir = TempDir::new().unwrap();
    let output = cimp(dir.path(), &[]);

    assert_eq!(output.status.code(), Some(0));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("absent.toml not found"), "stderr: {}", stderr);
}

#[test]
fn test_record_from_stdin_succeeds() {
    let dir = TempDir::new().unwrap();
    let record = json!({
        "name": "Urgath",
        "type": "character",
        "system": {},
        "items": []
    });

    let output = cimp_stdin(dir.path(), &record.to_string());

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Imported character Urgath."));
}

#[test]
fn test_blank_stdin_is_cancel() {
    let dir = TempDir::new().unwrap();
    let output = cimp_stdin(dir.path(), "  \n");
    assert_eq!(output.status.code(), Some(0));
    assert!(output.stdout.is_empty());
}

#[test]
fn test_partial_import_exits_one() {
    let dir = TempDir::new().unwrap();
    let record = json!({
        "name": "Urgath",
        "type": "character",
        "system": {},
        "items": [{"name": "Rope", "type": "loot"}, 7]
    });
    let path = write_record(dir.path(), "urgath.json", &record.to_string());

    let output = cimp(dir.path(), &[&path]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("was created without its items"));
    assert!(
        stderr.contains("Character Urgath was created, but its items could not be imported.")
    );
}
