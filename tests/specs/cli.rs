// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `dsyncd` command line specs

use assert_cmd::Command;

fn dsyncd() -> Command {
    let mut cmd = Command::cargo_bin("dsyncd").unwrap();
    cmd.env_clear().env("RUST_LOG", "off");
    cmd
}

fn stdout(cmd: &mut Command) -> String {
    String::from_utf8(cmd.assert().success().get_output().stdout.clone()).unwrap()
}

#[test]
fn help_lists_subcommands() {
    let out = stdout(dsyncd().arg("--help"));
    for sub in ["run", "delta-sync", "file-sync", "cleanup-jobs"] {
        assert!(out.contains(sub), "missing {sub} in:\n{out}");
    }
}

#[test]
fn cleanup_help_mentions_operation() {
    let out = stdout(dsyncd().args(["cleanup-jobs", "--help"]));
    assert!(out.contains("--operation"), "{out}");
}

#[test]
fn missing_required_setting_fails_before_connecting() {
    let output = dsyncd().arg("delta-sync").assert().failure().get_output().stderr.clone();
    let stderr = String::from_utf8(output).unwrap();
    assert!(stderr.contains("SERVICE_NAME"), "{stderr}");
}

#[test]
fn one_shot_delta_sync_leaves_busy_jobs_alone() {
    let out = stdout(dsyncd().args(["delta-sync", "--help"]));
    assert!(out.contains("Busy jobs are left alone"), "{out}");
}
