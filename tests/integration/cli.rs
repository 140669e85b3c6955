//! Runs the contentcal binary for the commands that need no provider.

use serde_json::Value;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn contentcal(home: &Path, args: &[&str]) -> Output {
    let bin = env!("CARGO_BIN_EXE_contentcal");
    Command::new(bin)
        .env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join("config"))
        .env("XDG_STATE_HOME", home.join("state"))
        .env_remove("CONTENTCAL_LOG")
        .env_remove("OPENAI_API_KEY")
        .args(args)
        .output()
        .unwrap()
}

#[test]
fn test_dates_json_output() {
    let temp = TempDir::new().unwrap();
    let ws = temp.path().to_string_lossy().to_string();
    let output = contentcal(
        temp.path(),
        &[
            "--workspace", &ws, "--quiet", "dates", "--start", "2024-01-01", "--end",
            "2024-01-14", "--days", "tue,thu", "--format", "json",
        ],
    );

    assert!(
        output.status.success(),
        "stderr={}",
        String::from_utf8_lossy(&output.stderr)
    );
    let value: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["count"], 4);
    assert_eq!(value["dates"][0], "2024-01-02");
    assert_eq!(value["distributionPattern"], serde_json::json!(["Tuesday", "Thursday"]));
}

#[test]
fn test_plan_reads_workspace_chunking() {
    let temp = TempDir::new().unwrap();
    let config_dir = temp.path().join("config");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(
        config_dir.join("config.toml"),
        "[chunking]\ninitial_size = 10\nmin_size = 5\nmax_size = 12\ngrowth_step = 1\n",
    )
    .unwrap();
    let ws = temp.path().to_string_lossy().to_string();

    let output = contentcal(
        temp.path(),
        &[
            "--workspace", &ws, "--quiet", "plan", "--start", "2024-01-01", "--end",
            "2024-01-31", "--frequency", "7", "--format", "json",
        ],
    );

    assert!(output.status.success());
    let value: Value = serde_json::from_slice(&output.stdout).unwrap();
    let requested: Vec<u64> = value["batches"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["requested"].as_u64().unwrap())
        .collect();
    assert_eq!(requested, vec![10, 11, 12]);
}

#[test]
fn test_invalid_range_exits_with_client_error() {
    let temp = TempDir::new().unwrap();
    let ws = temp.path().to_string_lossy().to_string();
    let output = contentcal(
        temp.path(),
        &["--workspace", &ws, "--quiet", "dates", "--start", "2024-02-01", "--end", "2024-01-01"],
    );

    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Invalid date range"));
}

#[test]
fn test_generate_without_api_key_fails_cleanly() {
    let temp = TempDir::new().unwrap();
    let ws = temp.path().to_string_lossy().to_string();
    let output = contentcal(
        temp.path(),
        &[
            "--workspace", &ws, "--quiet", "generate", "--start", "2024-01-01", "--end",
            "2024-01-07", "--platforms", "instagram", "--description", "Bakery",
        ],
    );

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("OPENAI_API_KEY"));
}

#[test]
fn test_verbose_logs_go_to_stderr_not_stdout() {
    let temp = TempDir::new().unwrap();
    let ws = temp.path().to_string_lossy().to_string();
    let output = contentcal(
        temp.path(),
        &[
            "--workspace", &ws, "--verbose", "dates", "--start", "2024-01-01", "--end",
            "2024-01-01", "--format", "json",
        ],
    );

    assert!(output.status.success());
    assert!(serde_json::from_slice::<Value>(&output.stdout).is_ok());
    assert!(String::from_utf8_lossy(&output.stderr).contains("contentcal starting"));
}
