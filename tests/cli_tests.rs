//! End-to-end tests of the `highlighter` binary

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn highlighter(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("highlighter").unwrap();
    cmd.current_dir(dir.path())
        .env_remove("RUST_LOG")
        .env_remove("HIGHLIGHT_LOG_FORMAT")
        .env_remove("HIGHLIGHT_OUTPUT_DIR")
        .env_remove("OPENAI_API_KEY");
    cmd
}

#[test]
fn test_help_lists_commands() {
    let dir = TempDir::new().unwrap();
    highlighter(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("select"))
        .stdout(predicate::str::contains("extract"))
        .stdout(predicate::str::contains("inspect"));
}

#[test]
fn test_list_skips_temp_files() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("clips");
    std::fs::create_dir_all(&out).unwrap();
    std::fs::write(out.join("output_0.mp4"), b"clip").unwrap();
    std::fs::write(out.join(".segment_1.part.mp4"), b"partial").unwrap();

    highlighter(&dir)
        .args(["list", "--output-dir", "clips"])
        .assert()
        .success()
        .stdout(predicate::str::contains("output_0.mp4"))
        .stdout(predicate::str::contains(".segment_").not());
}

#[test]
fn test_list_missing_directory_fails() {
    let dir = TempDir::new().unwrap();
    highlighter(&dir)
        .args(["list", "--output-dir", "nowhere"])
        .assert()
        .failure();
}

#[test]
fn test_select_empty_transcript_prints_empty_plan() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("empty.json"), "[]").unwrap();

    highlighter(&dir)
        .args(["select", "--transcript", "empty.json", "--category", "News"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"segments\": []"))
        .stdout(predicate::str::contains("\"category\": \"News\""));
}

#[test]
fn test_select_missing_transcript_fails() {
    let dir = TempDir::new().unwrap();
    highlighter(&dir)
        .args(["select", "--transcript", "missing.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Highlight selection failed"));
}

#[test]
fn test_invalid_config_file_fails() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("highlight.toml"), "[selection]\nunknown = 1\n").unwrap();

    highlighter(&dir)
        .args(["list", "--output-dir", "."])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load configuration"));
}
