use std::process::Command;

fn temp_path(label: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!(
        "crisis-cli-{label}-{}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos()
    ))
}

#[test]
fn cli_list_strategies_writes_output() {
    let exe = env!("CARGO_BIN_EXE_crisis-tester");
    let output_path = temp_path("list");
    let status = Command::new(exe)
        .args(["--list-strategies", "--output"])
        .arg(&output_path)
        .status()
        .expect("run cli");
    assert!(status.success());
    let content = std::fs::read_to_string(output_path).expect("read output");
    assert!(content.contains("Available strategies"));
    assert!(content.contains("cautious"));
}

#[test]
fn cli_runs_json_report_for_run_code() {
    let exe = env!("CARGO_BIN_EXE_crisis-tester");
    let output_path = temp_path("run");
    let output = Command::new(exe)
        .args([
            "--report",
            "json",
            "--strategies",
            "balanced,random",
            "--iterations",
            "2",
            "--seeds",
            "CR-BEACON42,7",
            "--output",
        ])
        .arg(&output_path)
        .output()
        .expect("run cli");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Crisis Automated Tester"));

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(output_path).expect("read output"))
            .expect("valid json");
    let results = json["results"].as_array().expect("results array");
    assert_eq!(results.len(), 4);
    assert!(results.iter().all(|r| r["passed"] == true));
    assert!(results.iter().any(|r| r["run_code"] == "CR-BEACON42"));
}

#[test]
fn cli_rejects_unknown_seed_token() {
    let exe = env!("CARGO_BIN_EXE_crisis-tester");
    let output = Command::new(exe)
        .args(["--seeds", "banana", "--report", "json"])
        .output()
        .expect("run cli");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Unrecognized seed token: banana"));
}
