//! Binary-level checks that need no drive access

use std::path::Path;
use std::process::{Command, Output};

fn run_gdc(args: &[&str], config_dir: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_gdc"))
        .args(args)
        .env("GDC_CONFIG_DIR", config_dir)
        .env_remove("GDC_ACCESS_TOKEN")
        .env_remove("GD_CONNECT_TOKEN")
        .env_remove("GD_CONNECT_CREDENTIALS")
        .output()
        .expect("Failed to execute gdc command")
}

#[test]
fn test_pwd_defaults_to_root() {
    let config_dir = tempfile::tempdir().unwrap();
    let output = run_gdc(&["pwd"], config_dir.path());
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "/");
}

#[test]
fn test_pwd_reads_state_file() {
    let config_dir = tempfile::tempdir().unwrap();
    std::fs::write(
        config_dir.path().join("state.json"),
        r#"{"cwd_path": "/Projects"}"#,
    )
    .unwrap();

    let output = run_gdc(&["pwd", "--json"], config_dir.path());
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["cwd"], "/Projects");
}

#[test]
fn test_corrupt_state_resets_to_root() {
    let config_dir = tempfile::tempdir().unwrap();
    std::fs::write(config_dir.path().join("state.json"), "garbage").unwrap();

    let output = run_gdc(&["pwd"], config_dir.path());
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "/");
}

#[test]
fn test_missing_token_is_auth_error() {
    let config_dir = tempfile::tempdir().unwrap();
    let output = run_gdc(&["ls"], config_dir.path());
    assert_eq!(output.status.code(), Some(4));
    assert!(String::from_utf8_lossy(&output.stderr).contains("token"));
}

#[test]
fn test_invalid_config_is_usage_error() {
    let config_dir = tempfile::tempdir().unwrap();
    std::fs::write(
        config_dir.path().join("config.toml"),
        "schema_version = 1\n[defaults]\nlist_limit = 0\n",
    )
    .unwrap();

    let output = run_gdc(&["pwd"], config_dir.path());
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_completions_need_no_config() {
    let config_dir = tempfile::tempdir().unwrap();
    std::fs::write(config_dir.path().join("config.toml"), "not toml at all [").unwrap();

    let output = run_gdc(&["completions", "bash"], config_dir.path());
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("gdc"));
}
