use serde_json::Value;
use std::process::{Command, Output};
use tempfile::TempDir;

fn pagehash(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_pagehash"))
        .args(args)
        .output()
        .expect("failed to launch pagehash")
}

fn stdout_json(output: &Output) -> Value {
    assert!(
        output.status.success(),
        "pagehash failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8(output.stdout.clone()).expect("stdout is not utf-8");
    serde_json::from_str(&stdout).unwrap_or_else(|e| panic!("stdout is not JSON ({}): {:?}", e, stdout))
}

#[test]
fn test_run_json_is_parseable() {
    let output = pagehash(&["-f", "json", "run", "--counts", "100,200", "--alphas", "0.75", "--seed", "1"]);
    let value = stdout_json(&output);

    assert_eq!(value["extensible"]["space"].as_array().map(Vec::len), Some(2));
    assert_eq!(value["linear"]["0.75"]["effort"].as_array().map(Vec::len), Some(2));
}

#[test]
fn test_run_json_with_output_file_is_parseable() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("results.json");
    let path_str = path.to_str().unwrap();

    let output = pagehash(&[
        "-f", "json", "run", "--counts", "100", "--alphas", "0.6,0.9", "--seed", "7", "--output", path_str,
    ]);
    let printed = stdout_json(&output);

    let saved: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(printed, saved);
}

#[test]
fn test_inspect_linear_json_is_parseable() {
    let output = pagehash(&["-f", "json", "inspect", "linear", "-n", "500", "--seed", "3"]);
    let value = stdout_json(&output);

    assert_eq!(value["structure"], "linear");
    assert_eq!(value["records"], 500);
    assert!(value["load_factor"].is_f64());
    assert!(value["avg_io_per_insert"].is_f64());
}

#[test]
fn test_inspect_extendible_json_is_parseable() {
    let output = pagehash(&["-f", "json", "inspect", "extendible", "-n", "500", "--seed", "3"]);
    let value = stdout_json(&output);

    assert_eq!(value["structure"], "extensible");
    assert!(value["global_depth"].as_u64().is_some());
    assert!(value["avg_io_per_insert"].is_f64());
}

#[test]
fn test_pretty_mode_still_reports_status() {
    let output = pagehash(&["inspect", "linear", "-n", "50", "--seed", "3"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Structure verified"));
}
