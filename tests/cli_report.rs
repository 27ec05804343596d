// Drives the compiled binary in headless `--report` mode; no TTY needed.

use assert_cmd::Command;
use serde_json::Value;
use tempfile::TempDir;

fn quill(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("quill").unwrap();
    // keep config and log files out of the real home directory
    cmd.env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join("config"))
        .env("XDG_DATA_HOME", home.path().join("data"));
    cmd
}

#[test]
fn report_prints_json_for_text_file() {
    let home = tempfile::tempdir().unwrap();
    let essay = home.path().join("essay.txt");
    std::fs::write(&essay, "hello world foo\n\nbar").unwrap();

    let output = quill(&home)
        .args(["--capacity", "10", "--min-lines", "2", "--max-lines", "3"])
        .args(["--hard-limit", "4", "--report"])
        .arg(&essay)
        .ok()
        .unwrap();

    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["totalLines"], 4);
    assert_eq!(report["totalWords"], 4);
    assert_eq!(report["perLine"][1]["lineNumber"], 2);
    assert_eq!(report["perLine"][1]["wordCount"], 2);
    assert_eq!(report["perLine"][1]["charCount"], 9);
    assert_eq!(report["perLine"][2]["charCount"], 0);
    assert_eq!(report["status"]["kind"], "aboveRecommended");
    assert_eq!(report["status"]["excess"], 1);
}

#[test]
fn report_for_empty_file_is_below_minimum() {
    let home = tempfile::tempdir().unwrap();
    let essay = home.path().join("empty.txt");
    std::fs::write(&essay, "").unwrap();

    let output = quill(&home).arg("--report").arg(&essay).ok().unwrap();

    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["totalLines"], 0);
    assert_eq!(report["perLine"], Value::Array(vec![]));
    assert_eq!(report["status"]["kind"], "belowMinimum");
    assert_eq!(report["status"]["missing"], 25);
}

#[test]
fn missing_report_file_fails() {
    let home = tempfile::tempdir().unwrap();
    quill(&home)
        .arg("--report")
        .arg(home.path().join("nope.txt"))
        .assert()
        .failure();
}

#[test]
fn invalid_thresholds_are_refused() {
    let home = tempfile::tempdir().unwrap();
    let output = quill(&home)
        .args(["--min-lines", "10", "--max-lines", "5"])
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error"));
}

#[test]
fn interactive_mode_needs_a_tty() {
    let home = tempfile::tempdir().unwrap();
    let output = quill(&home).output().unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("stdin must be a tty"));
}
