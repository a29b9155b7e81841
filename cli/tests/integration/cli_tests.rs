//! Integration tests for the CLI surface: help, version, argument parsing.

#![allow(clippy::expect_used)]

use assert_cmd::Command;
use predicates::prelude::*;

fn cloud_apply() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("cloud-apply"));
    cmd.env("NO_COLOR", "1");
    cmd
}

#[test]
fn test_cli_no_args_shows_help_and_exits_two() {
    cloud_apply().assert().code(2).stderr(predicate::str::contains(
        "Apply infrastructure changes through a remote run service",
    ));
}

#[test]
fn test_cli_help_flag_lists_commands() {
    cloud_apply()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("apply"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_cli_version_flag_shows_version() {
    cloud_apply()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_apply_help_lists_flags() {
    cloud_apply()
        .args(["apply", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--plan-file"))
        .stdout(predicate::str::contains("--destroy"))
        .stdout(predicate::str::contains("--auto-approve"))
        .stdout(predicate::str::contains("--exclude"));
}

#[test]
fn test_unknown_command_fails() {
    cloud_apply()
        .arg("plan-everything")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unrecognized subcommand"));
}
