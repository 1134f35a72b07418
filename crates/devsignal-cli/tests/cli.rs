// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

use std::path::Path;

use assert_cmd::Command;
use predicates::str::{contains, diff};
use tempfile::TempDir;

fn cmd() -> Command {
    Command::cargo_bin("devsignal").unwrap()
}

/// Config that keeps the root check away from the build host's own `su`.
fn write_config(dir: &Path, su_paths: &[&str]) -> std::path::PathBuf {
    let path = dir.join("devsignal.json");
    let config = serde_json::json!({
        "su_paths": su_paths,
        "su_lookup_enabled": false,
    });
    std::fs::write(&path, config.to_string()).unwrap();
    path
}

#[test]
fn list_shows_every_check() {
    cmd()
        .arg("list")
        .assert()
        .success()
        .stdout(contains("getSecurityInfo"))
        .stdout(contains("isDeviceCompromised"))
        .stdout(contains("getDangerousPermissions"));
}

#[test]
fn security_info_on_desktop_reports_defaults() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path(), &[]);
    cmd()
        .arg("--config")
        .arg(&config)
        .args(["run", "getSecurityInfo"])
        .assert()
        .success()
        .stdout(contains(r#""securityPatchLevel":"Unknown""#))
        .stdout(contains(r#""isDeviceCompromised":false"#))
        .stdout(contains(r#""dangerousPermissions":[]"#));
}

#[test]
fn su_binary_on_configured_path_flags_device() {
    let dir = TempDir::new().unwrap();
    let su = dir.path().join("su");
    std::fs::write(&su, b"").unwrap();
    let su = su.to_string_lossy().into_owned();
    let config = write_config(dir.path(), &[su.as_str()]);
    cmd()
        .arg("--config")
        .arg(&config)
        .args(["run", "isDeviceCompromised"])
        .assert()
        .success()
        .stdout(diff("1\n"));
}

#[test]
fn clean_host_reports_zero() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path(), &[]);
    cmd()
        .arg("--config")
        .arg(&config)
        .args(["run", "isDeviceCompromised"])
        .assert()
        .success()
        .stdout(diff("0\n"));
}

#[test]
fn pretty_output_spans_lines() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path(), &[]);
    cmd()
        .args(["--pretty", "run", "getSecurityInfo", "--config"])
        .arg(&config)
        .assert()
        .success()
        .stdout(contains("\n  \"osVersion\""));
}

#[test]
fn unknown_check_fails() {
    cmd()
        .args(["run", "bogus"])
        .assert()
        .failure()
        .stderr(contains("not a known security check"));
}

#[test]
fn invalid_config_fails() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.json");
    std::fs::write(&path, r#"{ "su_lookup_timeout_ms": 0 }"#).unwrap();
    cmd()
        .arg("--config")
        .arg(&path)
        .args(["run", "isDeviceCompromised"])
        .assert()
        .failure();
}
