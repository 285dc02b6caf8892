//! CLI end-to-end tests.
//!
//! Each test runs the built binary against its own data directory.

use std::path::Path;
use std::process::Command;

use tempfile::TempDir;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(data_dir: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_somaflow"))
        .args(args)
        .env("SOMAFLOW_DATA_DIR", data_dir)
        .env_remove("SOMAFLOW_LOG")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn json(stdout: &str) -> serde_json::Value {
    serde_json::from_str(stdout).unwrap_or_else(|e| panic!("invalid JSON ({e}): {stdout}"))
}

#[test]
fn test_techniques_lists_all_three() {
    let dir = TempDir::new().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["techniques"]);
    assert_eq!(code, 0);

    let list = json(&stdout);
    let names: Vec<_> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, ["Resonant", "4-7-8", "Box Breathing"]);
    assert_eq!(list[0]["phases"], serde_json::json!(["Inhale", "Exhale"]));
    assert_eq!(list[1]["cycle_secs"], 19);
}

#[test]
fn test_settings_defaults() {
    let dir = TempDir::new().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["settings", "list"]);
    assert_eq!(code, 0);

    let settings = json(&stdout);
    assert_eq!(settings["technique"], "Resonant");
    assert_eq!(settings["duration_minutes"], 5);
    assert_eq!(settings["sound_enabled"], true);
    assert_eq!(settings["vibration_enabled"], true);
    assert_eq!(settings["dark_mode_enabled"], false);
}

#[test]
fn test_settings_set_persists_across_runs() {
    let dir = TempDir::new().unwrap();

    let (_, _, code) = run_cli(dir.path(), &["settings", "set", "technique", "box"]);
    assert_eq!(code, 0);
    let (_, _, code) = run_cli(dir.path(), &["settings", "set", "duration", "10min"]);
    assert_eq!(code, 0);
    let (_, _, code) = run_cli(dir.path(), &["settings", "set", "sound", "off"]);
    assert_eq!(code, 0);

    let (stdout, _, _) = run_cli(dir.path(), &["settings", "get", "technique"]);
    assert_eq!(stdout.trim(), "Box Breathing");
    let (stdout, _, _) = run_cli(dir.path(), &["settings", "get", "duration"]);
    assert_eq!(stdout.trim(), "10");
    let (stdout, _, _) = run_cli(dir.path(), &["settings", "get", "sound"]);
    assert_eq!(stdout.trim(), "false");

    let (stdout, _, code) = run_cli(dir.path(), &["home"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("10 minute Box Breathing technique"));

    let (_, _, code) = run_cli(dir.path(), &["settings", "reset"]);
    assert_eq!(code, 0);
    let (stdout, _, _) = run_cli(dir.path(), &["settings", "get", "technique"]);
    assert_eq!(stdout.trim(), "Resonant");
}

#[test]
fn test_settings_reject_bad_input() {
    let dir = TempDir::new().unwrap();

    let (_, _, code) = run_cli(dir.path(), &["settings", "get", "volume"]);
    assert_ne!(code, 0);

    let (_, stderr, code) = run_cli(dir.path(), &["settings", "set", "technique", "wim hof"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("error:"));

    let (_, _, code) = run_cli(dir.path(), &["settings", "set", "duration", "0"]);
    assert_eq!(code, 1);
}

#[test]
fn test_history_starts_empty() {
    let dir = TempDir::new().unwrap();

    let (stdout, _, code) = run_cli(dir.path(), &["history", "list"]);
    assert_eq!(code, 0);
    assert_eq!(json(&stdout), serde_json::json!([]));

    let (stdout, _, code) = run_cli(dir.path(), &["history", "total"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "0");

    let (_, _, code) = run_cli(dir.path(), &["history", "clear"]);
    assert_eq!(code, 0);
}

#[test]
fn test_summary_and_progress_json() {
    let dir = TempDir::new().unwrap();

    let (stdout, _, code) = run_cli(dir.path(), &["summary"]);
    assert_eq!(code, 0);
    let summary = json(&stdout);
    assert_eq!(summary["last_session"], serde_json::Value::Null);
    assert_eq!(summary["total_sessions"], 0);
    assert_eq!(summary["sessions_this_week"], 0);

    let (stdout, _, code) = run_cli(dir.path(), &["progress"]);
    assert_eq!(code, 0);
    let progress = json(&stdout);
    assert_eq!(progress["week"].as_array().unwrap().len(), 7);
    assert_eq!(progress["week"][0]["day"], "Sunday");
    assert_eq!(progress["recent"], serde_json::json!([]));
}

#[test]
fn test_config_get_set() {
    let dir = TempDir::new().unwrap();

    let (stdout, _, code) = run_cli(dir.path(), &["config", "get", "haptics.style"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "pattern");
    assert!(dir.path().join("config.toml").exists());

    let (_, _, code) = run_cli(dir.path(), &["config", "set", "display.refresh_ms", "250"]);
    assert_eq!(code, 0);
    let (stdout, _, _) = run_cli(dir.path(), &["config", "get", "display.refresh_ms"]);
    assert_eq!(stdout.trim(), "250");

    let (_, _, code) = run_cli(dir.path(), &["config", "set", "haptics.style", "buzz"]);
    assert_eq!(code, 1);
    let (_, _, code) = run_cli(dir.path(), &["config", "get", "audio.volume"]);
    assert_eq!(code, 1);
}
