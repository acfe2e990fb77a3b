//! Integration tests for the crcup CLI surface.

#![allow(clippy::expect_used)]

use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;

fn crcup() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("crcup"));
    cmd.env("NO_COLOR", "1");
    cmd.env_remove("CRCUP_CONFIG");
    cmd.env_remove("RUST_LOG");
    cmd
}

/// Write `content` to a config file inside a fresh temp dir.
fn config_file(content: &str) -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("config.yaml");
    std::fs::write(&path, content).expect("write config");
    (dir, path)
}

const PROXY_CONFIG: &str = "\
proxy:
  http_proxy: http://proxy.example.com:3128
  https_proxy: https://proxy.example.com:3129
  no_proxy: [example.com, .svc]
";

// --- Help and version tests ---

#[test]
fn test_cli_no_args_shows_help_and_exits_two() {
    crcup().assert().code(2).stderr(predicate::str::contains(
        "Bring up a single-node OpenShift cluster",
    ));
}

#[test]
fn test_cli_help_lists_commands() {
    crcup()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("start"))
        .stdout(predicate::str::contains("wait-ssh"))
        .stdout(predicate::str::contains("render-proxy"));
}

#[test]
fn test_cli_version_flag_shows_version() {
    crcup()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("crcup"));
}

#[test]
fn test_version_command_shows_version() {
    crcup()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("crcup 0.1.0"));
}

#[test]
fn test_no_color_env_accepts_conventional_values() {
    for value in ["1", "true", "0", ""] {
        crcup()
            .env("NO_COLOR", value)
            .arg("version")
            .assert()
            .success()
            .stderr(predicate::str::contains("invalid value").not());
    }
}

#[test]
fn test_version_command_json_outputs_valid_json() {
    let output = crcup()
        .args(["version", "--json"])
        .output()
        .expect("run");
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(value["version"], "0.1.0");
}

#[test]
fn test_unknown_command_fails() {
    crcup().arg("bogus").assert().code(2);
}

// --- render-proxy ---

#[test]
fn test_render_proxy_prints_drop_in_and_patch() {
    let (_dir, path) = config_file(PROXY_CONFIG);
    crcup()
        .arg("render-proxy")
        .arg("--config")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "# /etc/systemd/system/crio.service.d/10-default-env.conf",
        ))
        .stdout(predicate::str::contains("[Service]"))
        .stdout(predicate::str::contains(
            "Environment=NO_PROXY=.cluster.local,.svc,10.128.0.0/14,172.30.0.0/16,example.com\n",
        ))
        .stdout(predicate::str::contains(
            r#""httpsProxy":"https://proxy.example.com:3129""#,
        ));
}

#[test]
fn test_render_proxy_json_output() {
    let (_dir, path) = config_file(PROXY_CONFIG);
    let output = crcup()
        .args(["render-proxy", "--json"])
        .env("CRCUP_CONFIG", &path)
        .output()
        .expect("run");
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(
        value["drop_in_paths"][1],
        "/etc/systemd/system/kubelet.service.d/10-default-env.conf"
    );
    assert_eq!(value["cluster_patch"]["spec"]["noProxy"], "example.com,.svc");
}

#[test]
fn test_render_proxy_without_proxy_fails() {
    let dir = tempfile::tempdir().expect("tempdir");
    crcup()
        .arg("render-proxy")
        .arg("--config")
        .arg(dir.path().join("missing.yaml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("no proxy configured"));
}

// --- config errors ---

#[test]
fn test_invalid_config_is_reported() {
    let (_dir, path) = config_file("ssh:\n  port: 0\n");
    crcup()
        .arg("certs")
        .arg("--config")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("ssh.port must be between 1 and 65535"));
}

#[test]
fn test_config_error_json_object() {
    let (_dir, path) = config_file("ssh: [1, 2]\n");
    let output = crcup()
        .args(["disk", "--json", "--config"])
        .arg(&path)
        .output()
        .expect("run");
    assert!(!output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(value["error"], true);
    assert_eq!(value["code"], "COMMAND_FAILED");
    assert!(
        value["message"]
            .as_str()
            .expect("message")
            .contains("cannot parse")
    );
}

#[test]
fn test_wait_ssh_rejects_zero_attempts() {
    let dir = tempfile::tempdir().expect("tempdir");
    crcup()
        .args(["wait-ssh", "--attempts", "0", "--config"])
        .arg(dir.path().join("missing.yaml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("max_attempts must be at least 1"));
}
