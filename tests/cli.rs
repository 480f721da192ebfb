//! CLI smoke tests.

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn help_lists_the_build_subcommand() {
    Command::cargo_bin("mason")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("build"));
}

#[test]
fn build_without_a_tool_is_a_configuration_error() {
    let dir = tempfile::tempdir().unwrap();
    Command::cargo_bin("mason")
        .unwrap()
        .current_dir(dir.path())
        .arg("build")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no build tool configured"));
}

#[test]
fn build_runs_the_configured_tool() {
    let dir = tempfile::tempdir().unwrap();
    // `true` ignores the generated tool arguments and exits cleanly.
    Command::cargo_bin("mason")
        .unwrap()
        .current_dir(dir.path())
        .args(["build", "--tool", "true", "--target", "smoke"])
        .assert()
        .success();
}

#[test]
fn tool_failure_propagates_the_exit_status() {
    let dir = tempfile::tempdir().unwrap();
    Command::cargo_bin("mason")
        .unwrap()
        .current_dir(dir.path())
        .args(["build", "--tool", "false"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed with"));
}

#[test]
fn tool_path_can_come_from_mason_toml() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("mason.toml"), "tool = \"true\"\n").unwrap();
    Command::cargo_bin("mason")
        .unwrap()
        .current_dir(dir.path())
        .arg("build")
        .assert()
        .success();
}
