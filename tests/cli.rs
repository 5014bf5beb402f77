// tests/cli.rs

//! Exit status and output of the `debwrap` binary.

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const RULES: &str = "map_run_deps:\n  libz.so.1: zlib\n";

fn write_inputs(dir: &Path, manifest: &str) {
    fs::write(dir.join("manifest.yaml"), manifest).unwrap();
    fs::write(dir.join("rules.yaml"), RULES).unwrap();
    fs::create_dir_all(dir.join("src")).unwrap();
}

fn gen_args(dir: &TempDir) -> Vec<String> {
    let path = |name: &str| dir.path().join(name).to_string_lossy().into_owned();
    vec![
        "gen".to_string(),
        "--manifest".to_string(),
        path("manifest.yaml"),
        "--rules".to_string(),
        path("rules.yaml"),
        "--deb-src".to_string(),
        path("src"),
        "--workspace".to_string(),
        path("ws"),
    ]
}

#[test]
fn test_missing_artifact_exits_with_status_two() {
    let dir = tempfile::tempdir().unwrap();
    write_inputs(
        dir.path(),
        r#"
packages:
  - name: ok
    kind: data
    version: "1.0"
  - name: ghost
    kind: lib
    debs: ["ghost_*.deb"]
  - name: later
    kind: data
"#,
    );

    cargo_bin_cmd!("debwrap")
        .args(gen_args(&dir))
        .assert()
        .code(2)
        .stdout(predicate::str::contains("[OK] Generated recipe for ok ->"))
        .stderr(predicate::str::contains("[ERROR]"))
        .stderr(predicate::str::contains("Missing .deb for package ghost"));

    assert!(dir.path().join("ws/ok/recipes/meta.yaml").is_file());
    assert!(!dir.path().join("ws/later").exists());
}

#[test]
fn test_successful_run_exits_zero() {
    let dir = tempfile::tempdir().unwrap();
    write_inputs(
        dir.path(),
        "packages:\n  - name: tzdata\n    kind: data\n    version: \"2024a\"\n",
    );

    cargo_bin_cmd!("debwrap")
        .args(gen_args(&dir))
        .arg("--no-dso-scan")
        .assert()
        .success()
        .stdout(predicate::str::contains("[OK] Generated recipe for tzdata ->"));

    let meta = fs::read_to_string(dir.path().join("ws/tzdata/recipes/meta.yaml")).unwrap();
    assert!(meta.contains("2024a"));
}

#[test]
fn test_invalid_manifest_exits_with_status_one() {
    let dir = tempfile::tempdir().unwrap();
    write_inputs(dir.path(), "packages:\n  - kind: lib\n");

    cargo_bin_cmd!("debwrap")
        .args(gen_args(&dir))
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Configuration error"));

    assert!(!dir.path().join("ws").exists());
}

#[test]
fn test_missing_rules_flag_is_usage_error() {
    let dir = tempfile::tempdir().unwrap();
    write_inputs(dir.path(), "packages: []\n");
    let manifest = dir.path().join("manifest.yaml");

    cargo_bin_cmd!("debwrap")
        .args(["gen", "--manifest"])
        .arg(&manifest)
        .assert()
        .failure()
        .stderr(predicate::str::contains("--rules"));
}
