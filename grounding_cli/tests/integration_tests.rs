//! Integration tests for the grounded binary.
//!
//! These tests verify end-to-end behavior including:
//! - Catalog listing with today's completion marks
//! - Running guided and interactive sessions from stdin
//! - Completion journaling and CSV rollup

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Helper to create a test data directory
fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Empty config so tests never pick up the user's own file
fn empty_config(dir: &Path) -> PathBuf {
    let path = dir.join("config.toml");
    fs::write(&path, "").expect("Failed to write config");
    path
}

/// CLI command pointed at an isolated data dir and config
fn cli(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("grounded"));
    cmd.arg("--data-dir")
        .arg(dir.join("data"))
        .arg("--config")
        .arg(empty_config(dir));
    cmd
}

fn wal_lines(dir: &Path) -> Vec<String> {
    let content =
        fs::read_to_string(dir.join("data/wal/completions.wal")).expect("Failed to read WAL");
    content
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(str::to_string)
        .collect()
}

#[test]
fn test_cli_help() {
    Command::new(assert_cmd::cargo::cargo_bin!("grounded"))
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Guided grounding and breathing exercises",
        ));
}

#[test]
fn test_list_is_default_command() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("senses_54321"))
        .stdout(predicate::str::contains("box_breathing"));
}

#[test]
fn test_auto_complete_records_completion() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .args(["start", "body_scan", "--auto-complete"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Exercise complete: Body Scan"));

    let lines = wal_lines(temp_dir.path());
    assert_eq!(lines.len(), 1);
    let record: serde_json::Value = serde_json::from_str(&lines[0]).unwrap();
    assert_eq!(record["exercise_id"], "body_scan");
}

#[test]
fn test_list_marks_completed_exercise() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .args(["start", "box_breathing", "--auto-complete"])
        .assert()
        .success();

    let output = cli(temp_dir.path()).arg("list").output().unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);
    let line = stdout
        .lines()
        .find(|l| l.contains("box_breathing"))
        .expect("box_breathing listed");
    assert!(line.contains('✓'), "expected completion mark in {:?}", line);

    let other = stdout
        .lines()
        .find(|l| l.contains("body_scan"))
        .expect("body_scan listed");
    assert!(!other.contains('✓'));
}

#[test]
fn test_unknown_exercise_fails() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .args(["start", "cold_plunge"])
        .assert()
        .failure();
}

#[test]
fn test_guided_session_from_stdin() {
    let temp_dir = setup_test_dir();

    // physiological_sigh has three steps; go back once, then finish
    cli(temp_dir.path())
        .args(["start", "physiological_sigh"])
        .write_stdin("\n\np\n\n\n\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Step 3/3"))
        .stdout(predicate::str::contains("Exercise complete"));

    assert_eq!(wal_lines(temp_dir.path()).len(), 1);
}

#[test]
fn test_quit_does_not_record() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .args(["start", "body_scan"])
        .write_stdin("\n\nq\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("without finishing"));

    assert!(!temp_dir.path().join("data/wal/completions.wal").exists());
}

#[test]
fn test_eof_exits_without_recording() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .args(["start", "muscle_relaxation"])
        .write_stdin("\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("without finishing"));

    assert!(!temp_dir.path().join("data/wal/completions.wal").exists());
}

#[test]
fn test_interactive_session_ignores_out_of_order_taps() {
    let temp_dir = setup_test_dir();

    // A stray "3" on the first group is ignored, then every item is ticked
    // in order (5+4+3+2+1 = 15 taps) and the finish screen is confirmed.
    let mut script = String::from("3\n");
    script.push_str(&"\n".repeat(15));
    script.push_str("d\n");

    cli(temp_dir.path())
        .args(["start", "senses_54321"])
        .write_stdin(script)
        .assert()
        .success()
        .stdout(predicate::str::contains("Taste (5/5)"))
        .stdout(predicate::str::contains("Exercise complete"));
}

#[test]
fn test_repeat_then_finish_records_once() {
    let temp_dir = setup_test_dir();

    // Three steps, repeat from the finish screen, three steps again, finish
    cli(temp_dir.path())
        .args(["start", "physiological_sigh"])
        .write_stdin("\n\n\nr\n\n\n\n\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Exercise complete"));

    assert_eq!(wal_lines(temp_dir.path()).len(), 1);
}

#[test]
fn test_status_reports_today() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("nothing yet"));

    cli(temp_dir.path())
        .args(["start", "name_the_feeling", "--auto-complete"])
        .assert()
        .success();

    cli(temp_dir.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("✓ Name the Feeling"));
}

#[test]
fn test_rollup_creates_csv() {
    let temp_dir = setup_test_dir();

    for id in ["body_scan", "box_breathing", "senses_54321"] {
        cli(temp_dir.path())
            .args(["start", id, "--auto-complete"])
            .assert()
            .success();
    }

    cli(temp_dir.path())
        .args(["rollup", "--cleanup"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Rolled up 3 completions"));

    let csv_content = fs::read_to_string(temp_dir.path().join("data/completions.csv")).unwrap();
    assert!(csv_content.lines().next().unwrap().contains("exercise_id"));
    assert_eq!(csv_content.lines().count(), 4);
    assert!(!temp_dir
        .path()
        .join("data/wal/completions.wal.processed")
        .exists());

    // Rolled-up completions still count for today
    cli(temp_dir.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("✓ Body Scan"));
}

#[test]
fn test_rollup_without_wal() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .arg("rollup")
        .assert()
        .success()
        .stdout(predicate::str::contains("nothing to roll up"));
}

#[test]
fn test_custom_exercise_from_config() {
    let temp_dir = setup_test_dir();
    let config_path = temp_dir.path().join("custom.toml");
    fs::write(
        &config_path,
        r#"
[[exercises.custom]]
id = "toolbox_pause"
name = "Toolbox Pause"
category = "mindfulness"
mode = "guided"
steps = ["Put the tools down", "Three slow breaths"]
"#,
    )
    .unwrap();

    Command::new(assert_cmd::cargo::cargo_bin!("grounded"))
        .arg("--data-dir")
        .arg(temp_dir.path().join("data"))
        .arg("--config")
        .arg(&config_path)
        .args(["start", "toolbox_pause", "--auto-complete"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Put the tools down"))
        .stdout(predicate::str::contains("Exercise complete: Toolbox Pause"));
}

#[test]
fn test_invalid_custom_exercise_fails_fast() {
    let temp_dir = setup_test_dir();
    let config_path = temp_dir.path().join("bad.toml");
    fs::write(
        &config_path,
        r#"
[[exercises.custom]]
id = "broken"
name = "Broken"
category = "grounding"
mode = "interactive"
prompt_groups = [{ label = "See", prompt = "Nothing", required_count = 0 }]
"#,
    )
    .unwrap();

    Command::new(assert_cmd::cargo::cargo_bin!("grounded"))
        .arg("--data-dir")
        .arg(temp_dir.path().join("data"))
        .arg("--config")
        .arg(&config_path)
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("broken"));
}

#[test]
fn test_invalid_custom_exercises_all_reported() {
    let temp_dir = setup_test_dir();
    let config_path = temp_dir.path().join("bad.toml");
    fs::write(
        &config_path,
        r#"
[[exercises.custom]]
id = "no_steps"
name = "No Steps"
category = "mindfulness"
mode = "guided"
steps = []

[[exercises.custom]]
id = "box_breathing"
name = "Shadowed"
category = "breathing"
mode = "timed"
steps = ["in"]
step_seconds = 4
"#,
    )
    .unwrap();

    Command::new(assert_cmd::cargo::cargo_bin!("grounded"))
        .arg("--data-dir")
        .arg(temp_dir.path().join("data"))
        .arg("--config")
        .arg(&config_path)
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Catalog validation errors"))
        .stderr(predicate::str::contains("no_steps"))
        .stderr(predicate::str::contains("'box_breathing' appears more than once"));
}

#[test]
fn test_status_lists_completions_of_removed_exercises() {
    let temp_dir = setup_test_dir();
    let config_path = temp_dir.path().join("custom.toml");
    fs::write(
        &config_path,
        r#"
[[exercises.custom]]
id = "toolbox_pause"
name = "Toolbox Pause"
category = "mindfulness"
mode = "guided"
steps = ["Put the tools down"]
"#,
    )
    .unwrap();

    Command::new(assert_cmd::cargo::cargo_bin!("grounded"))
        .arg("--data-dir")
        .arg(temp_dir.path().join("data"))
        .arg("--config")
        .arg(&config_path)
        .args(["start", "toolbox_pause", "--auto-complete"])
        .assert()
        .success();

    // The exercise is gone from the (empty) config but its completion stays
    cli(temp_dir.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("✓ toolbox_pause"))
        .stdout(predicate::str::contains("nothing yet").not());
}

#[test]
fn test_verbose_logs_to_stderr() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .args(["--verbose", "list"])
        .env_remove("RUST_LOG")
        .assert()
        .success()
        .stderr(predicate::str::contains("Using data directory"));
}
