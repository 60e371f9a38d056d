use std::fs;
use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use predicates::str::contains;
use tempfile::TempDir;

const SNAPSHOT: &str = r#"units:
  - name: Game.Core
    source_files:
      - Assets/Core/Core.cs
  - name: Game
    source_files:
      - Assets/Game/Player.cs
    defines: [DEBUG]
    unit_references: [Game.Core, Vendor]
  - name: Vendor
    source_files:
      - Packages/Vendor/V.cs
    provenance: registry
  - name: Empty
"#;

fn manifestor_cmd() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("manifestor"));
    cmd.env("RUST_LOG", "warn");
    cmd
}

fn write_snapshot(dir: &Path, contents: &str) -> std::path::PathBuf {
    let path = dir.join("graph.yaml");
    fs::write(&path, contents).expect("write snapshot");
    path
}

fn sync(root: &Path, snapshot: &Path) -> assert_cmd::assert::Assert {
    manifestor_cmd()
        .arg("sync")
        .arg("--snapshot")
        .arg(snapshot)
        .arg("--root")
        .arg(root)
        .args(["--name", "Game"])
        .assert()
}

#[test]
fn sync_writes_manifests_then_reports_unchanged() {
    let root = TempDir::new().expect("root");
    let inputs = TempDir::new().expect("inputs");
    let snapshot = write_snapshot(inputs.path(), SNAPSHOT);

    sync(root.path(), &snapshot)
        .success()
        .stdout(contains("4 written, 0 unchanged"));
    assert!(root.path().join("Game.Core.csproj").exists());
    assert!(root.path().join("Game.csproj").exists());
    assert!(!root.path().join("Vendor.csproj").exists());
    assert!(!root.path().join("Empty.csproj").exists());
    assert!(root.path().join("Game.sln").exists());
    assert!(root.path().join(".vscode").join("settings.json").exists());

    sync(root.path(), &snapshot)
        .success()
        .stdout(contains("0 written, 4 unchanged"));
}

#[test]
fn dry_run_sync_writes_nothing() {
    let root = TempDir::new().expect("root");
    let inputs = TempDir::new().expect("inputs");
    let snapshot = write_snapshot(inputs.path(), SNAPSHOT);

    manifestor_cmd()
        .arg("sync")
        .arg("--snapshot")
        .arg(&snapshot)
        .arg("--root")
        .arg(root.path())
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(contains("[dry-run]"))
        .stdout(contains("Game.csproj"));
    assert_eq!(fs::read_dir(root.path()).expect("read root").count(), 0);
}

#[test]
fn failing_unit_makes_sync_exit_non_zero() {
    let root = TempDir::new().expect("root");
    let inputs = TempDir::new().expect("inputs");
    let snapshot = write_snapshot(
        inputs.path(),
        "units:\n  - name: Ok\n    source_files: [a.cs]\n  - name: Broken\n    source_files: [\"Assets/Scripts/\"]\n",
    );

    sync(root.path(), &snapshot)
        .failure()
        .stderr(contains("Broken"))
        .stderr(contains("1 unit(s) failed"));
    assert!(root.path().join("Ok.csproj").exists());
}

#[test]
fn blocked_companion_settings_fail_the_command_after_writing_projects() {
    let root = TempDir::new().expect("root");
    let inputs = TempDir::new().expect("inputs");
    let snapshot = write_snapshot(inputs.path(), SNAPSHOT);
    fs::write(root.path().join(".vscode"), "plain file").expect("block companion dir");

    sync(root.path(), &snapshot)
        .failure()
        .stdout(contains("3 written, 0 unchanged"))
        .stderr(contains("settings.json"))
        .stderr(contains("1 file(s) could not be written"));
    assert!(root.path().join("Game.csproj").exists());
    assert!(root.path().join("Game.sln").exists());
}

#[test]
fn unknown_dependency_is_rejected() {
    let root = TempDir::new().expect("root");
    let inputs = TempDir::new().expect("inputs");
    let snapshot = write_snapshot(
        inputs.path(),
        "units:\n  - name: A\n    source_files: [a.cs]\n    unit_references: [Ghost]\n",
    );

    sync(root.path(), &snapshot)
        .failure()
        .stderr(contains("Ghost"));
}

#[test]
fn diff_is_empty_after_sync_and_shows_local_edits() {
    let root = TempDir::new().expect("root");
    let inputs = TempDir::new().expect("inputs");
    let snapshot = write_snapshot(inputs.path(), SNAPSHOT);
    sync(root.path(), &snapshot).success();

    let diff = |root: &Path| {
        manifestor_cmd()
            .arg("diff")
            .arg("--snapshot")
            .arg(&snapshot)
            .arg("--root")
            .arg(root)
            .args(["--name", "Game"])
            .assert()
    };

    diff(root.path())
        .success()
        .stdout(contains("No differences for 'Game'."));

    let target = root.path().join("Game.csproj");
    let edited = fs::read_to_string(&target).expect("read").replace("DEBUG", "RELEASE");
    fs::write(&target, edited).expect("write");

    diff(root.path())
        .success()
        .stdout(contains("--- a/Game.csproj"))
        .stdout(contains("+    <DefineConstants>DEBUG</DefineConstants>"));
}

#[test]
fn list_json_reports_exclusions_and_identifiers() {
    let root = TempDir::new().expect("root");
    let inputs = TempDir::new().expect("inputs");
    let snapshot = write_snapshot(inputs.path(), SNAPSHOT);

    let output = manifestor_cmd()
        .arg("list")
        .arg("--snapshot")
        .arg(&snapshot)
        .arg("--root")
        .arg(root.path())
        .args(["--name", "Game", "--json"])
        .output()
        .expect("run list");
    assert!(output.status.success());

    let rows: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    let rows = rows.as_array().expect("array");
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0]["name"], "Game.Core");
    assert!(rows[0]["excluded"].is_null());
    assert_eq!(rows[2]["provenance"], "registry");
    assert_eq!(rows[2]["excluded"], "registry units disabled");
    assert_eq!(rows[3]["excluded"], "no source files");
    assert_eq!(rows[0]["identifier"].as_str().map(str::len), Some(36));
}

#[test]
fn id_prints_stable_identifier() {
    manifestor_cmd()
        .args(["id", "Game", "Core"])
        .assert()
        .success()
        .stdout(predicate::eq("AFF15422-A859-EC9A-D56E-AA2764E7772B\n"));

    manifestor_cmd()
        .args(["id", "Ws", "Core", "--braced"])
        .assert()
        .success()
        .stdout(predicate::eq("{15DA9A0A-D05F-A90D-0286-5BD165B215D4}\n"));
}
