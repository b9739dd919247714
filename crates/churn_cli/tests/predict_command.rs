//! One-shot `predict` as seen from the shell

use churn_core::USER_NOTICE;
use std::net::TcpListener;
use std::path::PathBuf;
use std::process::{Command, Output};

fn churn_cli_path() -> PathBuf {
    std::env::var_os("CARGO_BIN_EXE_churn-cli")
        .map(PathBuf::from)
        .expect("cargo must provide CARGO_BIN_EXE_churn-cli for integration tests")
}

/// Base URL on a loopback port nothing listens on
fn refused_api_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

fn run_churn_cli(args: &[&str]) -> Output {
    let workdir = tempfile::tempdir().unwrap();
    Command::new(churn_cli_path())
        .args(args)
        .current_dir(workdir.path())
        .env("RUST_LOG", "off")
        .env_remove("CHURN_API_URL")
        .env_remove("CHURN_CONFIG")
        .env_remove("CHURN_TIMEOUT_SECONDS")
        .env_remove("CHURN_HISTORY_LIMIT")
        .output()
        .unwrap()
}

#[test]
fn test_failed_predict_prints_only_the_notice() {
    let api_url = refused_api_url();
    let output = run_churn_cli(&["--api-url", &api_url, "predict", "--example"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(stderr.trim(), format!("Error: {USER_NOTICE}"));
    assert!(!stderr.contains("refused"));
    assert!(!stderr.contains(&api_url));
}

#[test]
fn test_encode_needs_no_service() {
    let output = run_churn_cli(&["encode", "--example", "--json"]);

    assert!(output.status.success());
    let body: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(body["features"].as_array().map(Vec::len), Some(19));
    assert_eq!(body["features"][17], 70.35);
}
