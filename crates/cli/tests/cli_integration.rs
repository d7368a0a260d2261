//! CLI integration tests for the kubedrill binary.
//!
//! Uses `assert_cmd` to spawn the binary and verify exit codes, stdout,
//! and stderr. Fixtures are written to a TempDir per test.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const DEFINITIONS: &str = "\
id: deploy-basic
kind: manifest
criteria:
  - id: main
    manifest: |
      apiVersion: apps/v1
      kind: Deployment
      metadata:
        name: web
      spec:
        replicas: 3
        template:
          spec:
            containers:
              - name: app
                image: nginx:1.25
hints:
  - path: spec.replicas
    text: \"How many copies should the Deployment run? Set {path}.\"
---
id: delete-pod
kind: command
criteria:
  - id: main
    command: kubectl delete pod nginx
    rules:
      - path: flags.grace-period
        require: optional
";

const PASSING_MANIFEST: &str = "\
apiVersion: apps/v1
kind: Deployment
metadata:
  name: web
spec:
  replicas: 3
  template:
    spec:
      containers:
        - name: app
          image: nginx:1.25
";

fn kubedrill() -> Command {
    Command::cargo_bin("kubedrill").expect("kubedrill binary")
}

fn write_fixture(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).expect("write fixture");
    path
}

// ──────────────────────────────────────────────
// Help and version
// ──────────────────────────────────────────────

#[test]
fn help_exits_0_with_description() {
    kubedrill()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("kubedrill exercise grading toolchain"));
}

#[test]
fn version_exits_0() {
    kubedrill().arg("--version").assert().success();
}

// ──────────────────────────────────────────────
// grade
// ──────────────────────────────────────────────

#[test]
fn grade_passing_manifest_exits_0() {
    let dir = TempDir::new().unwrap();
    let defs = write_fixture(&dir, "exercises.yaml", DEFINITIONS);
    let submission = write_fixture(&dir, "submission.yaml", PASSING_MANIFEST);

    kubedrill()
        .args(["grade", "--definitions"])
        .arg(&defs)
        .args(["--exercise", "deploy-basic"])
        .arg(&submission)
        .assert()
        .success()
        .stdout(predicate::str::contains("verdict: pass"));
}

#[test]
fn grade_failing_manifest_exits_1_with_feedback() {
    let dir = TempDir::new().unwrap();
    let defs = write_fixture(&dir, "exercises.yaml", DEFINITIONS);
    let submission = write_fixture(
        &dir,
        "submission.yaml",
        &PASSING_MANIFEST.replace("  replicas: 3\n", ""),
    );

    kubedrill()
        .args(["grade", "--definitions"])
        .arg(&defs)
        .args(["--exercise", "deploy-basic"])
        .arg(&submission)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("verdict: fail"))
        .stdout(predicate::str::contains("spec.replicas"));
}

#[test]
fn grade_json_output_matches_wire_shape() {
    let dir = TempDir::new().unwrap();
    let defs = write_fixture(&dir, "exercises.yaml", DEFINITIONS);
    let submission = write_fixture(&dir, "cmd.txt", "kubectl delete po nginx --grace-period=0\n");

    let assert = kubedrill()
        .args(["grade", "--output", "json", "--definitions"])
        .arg(&defs)
        .args(["--exercise", "delete-pod"])
        .arg(&submission)
        .assert()
        .success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let json: serde_json::Value = serde_json::from_str(&stdout).expect("valid JSON output");
    assert_eq!(json["verdict"], "pass");
    assert!(json["score"].as_f64().is_some());
    assert!(json["feedback"].is_array());
}

#[test]
fn grade_unknown_exercise_exits_2() {
    let dir = TempDir::new().unwrap();
    let defs = write_fixture(&dir, "exercises.yaml", DEFINITIONS);
    let submission = write_fixture(&dir, "submission.yaml", PASSING_MANIFEST);

    kubedrill()
        .args(["grade", "--definitions"])
        .arg(&defs)
        .args(["--exercise", "no-such-exercise"])
        .arg(&submission)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unknown exercise"));
}

// ──────────────────────────────────────────────
// normalize
// ──────────────────────────────────────────────

#[test]
fn normalize_prints_defaulted_fields() {
    let dir = TempDir::new().unwrap();
    let manifest = write_fixture(
        &dir,
        "pod.yaml",
        "apiVersion: v1\nkind: Pod\nmetadata:\n  name: web\nspec:\n  containers:\n    - name: app\n      image: nginx:1.25\n",
    );

    kubedrill()
        .arg("normalize")
        .arg(&manifest)
        .assert()
        .success()
        .stdout(predicate::str::contains("imagePullPolicy: IfNotPresent"))
        .stdout(predicate::str::contains("restartPolicy: Always"));
}

#[test]
fn normalize_reports_type_violations_and_exits_1() {
    let dir = TempDir::new().unwrap();
    let manifest = write_fixture(
        &dir,
        "pod.yaml",
        "apiVersion: v1\nkind: Pod\nmetadata:\n  name: web\n  labels:\n    version: 1.0\nspec:\n  containers:\n    - name: app\n      image: nginx:1.25\n",
    );

    kubedrill()
        .arg("normalize")
        .arg(&manifest)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("type violation at metadata.labels.version"));
}

// ──────────────────────────────────────────────
// parse-command
// ──────────────────────────────────────────────

#[test]
fn parse_command_resolves_aliases() {
    kubedrill()
        .args(["parse-command", "kubectl delete po web -n dev"])
        .assert()
        .success()
        .stdout(predicate::str::contains("resource: pods"))
        .stdout(predicate::str::contains("flag:     namespace=dev"));
}

#[test]
fn parse_command_rejects_pipes() {
    kubedrill()
        .args(["parse-command", "kubectl get pods | grep web"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("unsupported syntax"));
}

// ──────────────────────────────────────────────
// check
// ──────────────────────────────────────────────

#[test]
fn check_valid_definitions_exits_0() {
    let dir = TempDir::new().unwrap();
    let defs = write_fixture(&dir, "exercises.yaml", DEFINITIONS);

    kubedrill()
        .arg("check")
        .arg(&defs)
        .assert()
        .success()
        .stdout(predicate::str::contains("2 exercise(s) valid"));
}

#[test]
fn check_invalid_definitions_exits_1() {
    let dir = TempDir::new().unwrap();
    let defs = write_fixture(&dir, "exercises.yaml", "id: broken\nkind: manifest\n");

    kubedrill()
        .arg("check")
        .arg(&defs)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("no acceptance criteria"));
}
