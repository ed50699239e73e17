//! End-to-end tests for `chunkgen chunks`, `plan` and `generate`.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const CYCLIC_PROJECT: &str = r#"
[options]
extension = "json"
output_dir = "out"

[[module]]
id = "A"
dependencies = ["B"]

[[module]]
id = "B"
dependencies = ["C"]

[[module]]
id = "C"
dependencies = ["B"]
"#;

fn chunkgen_cmd(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("chunkgen"));
    cmd.current_dir(dir);
    cmd.env("CHUNKGEN_LOG", "error");
    cmd.env("XDG_CONFIG_HOME", dir.join(".config"));
    cmd.env("HOME", dir);
    cmd.env_remove("FORMAT");
    cmd
}

fn project(content: &str) -> TempDir {
    let dir = TempDir::new().expect("tempdir");
    fs::write(dir.path().join("chunkgen.toml"), content).expect("write project");
    dir
}

fn run_json(dir: &Path, args: &[&str]) -> Value {
    let output = chunkgen_cmd(dir)
        .args(args)
        .args(["--format", "json"])
        .output()
        .expect("chunkgen should not crash");
    assert!(
        output.status.success(),
        "{args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("valid JSON")
}

#[test]
fn chunks_lists_cycle_before_dependent() {
    let dir = project(CYCLIC_PROJECT);
    let json = run_json(dir.path(), &["chunks"]);

    let labels: Vec<&str> = json["chunks"]
        .as_array()
        .expect("chunks array")
        .iter()
        .map(|c| c["label"].as_str().expect("label"))
        .collect();
    assert_eq!(labels, vec!["B+C", "A"]);
    assert_eq!(json["chunks"][0]["cyclic"], true);
    assert_eq!(json["modules"], 3);
    assert_eq!(json["diagnostics"].as_array().map(Vec::len), Some(1));
}

#[test]
fn plan_without_representative_name_fails_with_code() {
    let dir = project(CYCLIC_PROJECT);
    chunkgen_cmd(dir.path())
        .args(["plan", "--format", "json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("E1002"));
}

#[test]
fn plan_uses_name_from_command_line() {
    let dir = project(CYCLIC_PROJECT);
    let json = run_json(dir.path(), &["plan", "--name", "B=core"]);

    let descriptors = json["descriptors"].as_array().expect("descriptors");
    assert_eq!(descriptors.len(), 2);
    assert_eq!(descriptors[0]["name"], "core");
    assert_eq!(descriptors[1]["name"], "A");
    assert_eq!(descriptors[1]["depends_on"][0]["name"], "core");
    assert!(
        descriptors[0]["target_path"]
            .as_str()
            .expect("path")
            .ends_with("core.json")
    );
    assert!(!dir.path().join("out").exists(), "plan must not write");
}

#[test]
fn generate_writes_manifests_in_order() {
    let dir = project(CYCLIC_PROJECT);
    let json = run_json(dir.path(), &["generate", "--name", "C=core"]);

    assert_eq!(json["ok"], true);
    let written = json["written"].as_array().expect("written");
    assert_eq!(written.len(), 2);
    assert!(written[0].as_str().expect("path").ends_with("core.json"));
    assert!(written[1].as_str().expect("path").ends_with("A.json"));

    let manifest: Value = serde_json::from_str(
        &fs::read_to_string(dir.path().join("out/A.json")).expect("read A.json"),
    )
    .expect("manifest JSON");
    assert_eq!(manifest["artifact"], "A");
    assert_eq!(manifest["depends_on"][0], "core");
    assert_eq!(manifest["graph_hash"], json["graph_hash"]);
}

#[test]
fn generate_backs_up_existing_targets() {
    let dir = project(
        r#"
[options]
extension = "json"
backup_existing = true

[[module]]
id = "lib"
"#,
    );
    fs::write(dir.path().join("lib.json"), "old").expect("seed target");

    let json = run_json(
        dir.path(),
        &["generate", "--backup-stamp", "20260101-000000"],
    );

    assert_eq!(json["backups"].as_array().map(Vec::len), Some(1));
    let backup = dir.path().join("lib.json.20260101-000000.bak");
    assert_eq!(fs::read_to_string(backup).expect("read backup"), "old");
    assert_ne!(
        fs::read_to_string(dir.path().join("lib.json")).expect("read target"),
        "old"
    );
}

#[test]
fn single_mode_writes_one_combined_artifact() {
    let dir = project(CYCLIC_PROJECT);
    let json = run_json(dir.path(), &["generate", "--single", "--project-name", "all"]);

    assert_eq!(json["written"].as_array().map(Vec::len), Some(1));
    let manifest: Value = serde_json::from_str(
        &fs::read_to_string(dir.path().join("out/all.json")).expect("read all.json"),
    )
    .expect("manifest JSON");
    assert_eq!(manifest["kind"], "combined");
    assert_eq!(manifest["chunks"].as_array().map(Vec::len), Some(2));
}

#[test]
fn missing_project_file_is_reported() {
    let dir = TempDir::new().expect("tempdir");
    chunkgen_cmd(dir.path())
        .args(["chunks", "--format", "text"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("E1001"))
        .stderr(predicate::str::contains("chunkgen.toml"));
}

#[test]
fn text_output_is_line_oriented() {
    let dir = project(CYCLIC_PROJECT);
    chunkgen_cmd(dir.path())
        .args(["chunks", "--format", "text"])
        .assert()
        .success()
        .stdout(predicate::str::contains("0  B+C"))
        .stdout(predicate::str::contains("1  A  B+C"));
}
