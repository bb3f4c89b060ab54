//! Integration tests for the planner binary.
//!
//! These tests verify end-to-end behavior including:
//! - Routine editing and persistence
//! - Schedule projection and muscle distribution output
//! - Workout execution and history logging
//! - CSV export and recovery from corrupt files

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Helper to create a test data directory seeded with a workout library
fn setup_test_dir() -> TempDir {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let workouts = serde_json::json!([
        {
            "id": "push",
            "name": "Push Day",
            "kind": "push",
            "exercises": [
                {
                    "id": "bench",
                    "name": "Bench Press",
                    "sets": 2,
                    "target": { "type": "reps", "reps": 8 },
                    "weight": 60.0,
                    "rest_seconds": 90,
                    "attribution": { "categories": ["Chest"], "weights": [100.0] }
                },
                {
                    "id": "dip",
                    "name": "Dip",
                    "sets": 1,
                    "target": { "type": "reps", "reps": 10 },
                    "attribution": { "categories": ["Triceps"], "weights": [100.0] }
                }
            ]
        },
        {
            "id": "pull",
            "name": "Pull Day",
            "kind": "pull",
            "exercises": [
                {
                    "id": "row",
                    "name": "Chest-Supported Machine Row",
                    "sets": 3,
                    "target": { "type": "reps", "reps": 10 }
                }
            ]
        },
        {
            "id": "legs",
            "name": "Leg Day",
            "kind": "legs",
            "exercises": [
                {
                    "id": "press",
                    "name": "Leg Press",
                    "sets": 2,
                    "target": { "type": "reps", "reps": 12 }
                }
            ]
        }
    ]);
    fs::write(
        temp_dir.path().join("workouts.json"),
        serde_json::to_string_pretty(&workouts).unwrap(),
    )
    .expect("Failed to write workouts");
    temp_dir
}

/// Helper to get the path to the CLI binary
fn cli() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("planner"))
}

/// Run a subcommand against `data_dir` and return its stdout
fn run(data_dir: &Path, args: &[&str]) -> String {
    let output = cli()
        .args(args)
        .arg("--data-dir")
        .arg(data_dir)
        .output()
        .expect("Failed to run planner");
    assert!(
        output.status.success(),
        "planner {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).unwrap()
}

#[test]
fn test_cli_help() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Workout rotation planner"));
}

#[test]
fn test_show_empty_routine() {
    let temp_dir = setup_test_dir();

    cli()
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Routine is empty"));
}

#[test]
fn test_add_and_rest_persist() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    run(data_dir, &["add", "push"]);
    run(data_dir, &["add", "leg day"]);
    run(data_dir, &["rest"]);

    assert!(data_dir.join("routines/default.json").exists());

    let shown = run(data_dir, &["show"]);
    assert!(shown.contains("Push Day"));
    assert!(shown.contains("Leg Day"));
    assert!(shown.contains("Rest"));
    assert!(shown.contains("2 workout days, 1 rest days, 4 cycles (12 days)"));
}

#[test]
fn test_add_is_idempotent() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    run(data_dir, &["add", "push"]);
    let again = run(data_dir, &["add", "push"]);
    assert!(again.contains("already in the routine"));

    let shown = run(data_dir, &["show"]);
    assert_eq!(shown.matches("Push Day").count(), 1);
}

#[test]
fn test_add_unknown_workout_fails() {
    let temp_dir = setup_test_dir();

    cli()
        .args(["add", "yoga"])
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown workout"));
}

#[test]
fn test_move_splices_item() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    run(data_dir, &["add", "push"]);
    run(data_dir, &["add", "legs"]);
    run(data_dir, &["rest"]);

    let moved = run(data_dir, &["move", "0", "2"]);

    // [Push, Legs, Rest] becomes [Legs, Rest, Push]
    let legs = moved.find("Leg Day").unwrap();
    let rest = moved.find("Rest").unwrap();
    let push = moved.find("Push Day").unwrap();
    assert!(legs < rest && rest < push);
}

#[test]
fn test_move_out_of_range_fails() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    run(data_dir, &["add", "push"]);

    cli()
        .args(["move", "0", "5"])
        .arg("--data-dir")
        .arg(data_dir)
        .assert()
        .failure();
}

#[test]
fn test_duplicate_and_remove() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    run(data_dir, &["add", "push"]);
    run(data_dir, &["duplicate", "0"]);

    let shown = run(data_dir, &["show"]);
    assert_eq!(shown.matches("Push Day").count(), 2);

    let removed = run(data_dir, &["remove", "push"]);
    assert!(removed.contains("Removed 2 slot(s) of push"));
    assert!(run(data_dir, &["show"]).contains("Routine is empty"));
}

#[test]
fn test_schedule_with_dates() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    run(data_dir, &["add", "push"]);
    run(data_dir, &["add", "legs"]);
    run(data_dir, &["rest"]);
    run(data_dir, &["cycles", "2"]);

    let schedule = run(data_dir, &["schedule", "--start", "2026-10-19"]);

    assert!(schedule.contains("Mon 2026-10-19  cycle 1  day  1  Push Day"));
    assert!(schedule.contains("Thu 2026-10-22  cycle 2  day  1  Push Day"));
    assert!(schedule.contains("Sat 2026-10-24  cycle 2  day  3  Rest"));
    assert!(schedule.contains("Ends 2026-10-24"));
    assert_eq!(schedule.matches("cycle ").count(), 6);
}

#[test]
fn test_schedule_keeps_dangling_label() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    run(data_dir, &["add", "pull"]);
    fs::write(data_dir.join("workouts.json"), "[]").unwrap();

    let schedule = run(data_dir, &["schedule", "--start", "2026-10-19"]);
    assert!(schedule.contains("Pull Day"));
}

#[test]
fn test_distribution_for_workout() {
    let temp_dir = setup_test_dir();

    let output = run(temp_dir.path(), &["distribution", "--workout", "push"]);

    assert!(output.contains("Push Day"));
    assert!(output.contains("Chest"));
    assert!(output.contains("Triceps"));
    assert!(output.contains("50%"));
}

#[test]
fn test_distribution_for_routine_uses_catalog() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    run(data_dir, &["add", "push"]);
    run(data_dir, &["add", "legs"]);

    let output = run(data_dir, &["distribution"]);

    // Chest, Triceps and Legs a third each; the leftover point goes to Chest
    assert!(output.contains("Chest         34%"));
    assert!(output.contains("Triceps       33%"));
    assert!(output.contains("Legs          33%"));
}

#[test]
fn test_run_auto_complete_logs_history() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    cli()
        .args(["run", "push", "--auto-complete"])
        .arg("--data-dir")
        .arg(data_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Workout logged! 100%"));

    let history = fs::read_to_string(data_dir.join("history.jsonl")).unwrap();
    assert_eq!(history.lines().count(), 1);
    assert!(history.contains("\"workout_id\":\"push\""));
}

#[test]
fn test_run_interactive_quit_early() {
    let temp_dir = setup_test_dir();

    // Finish one set, log 6 reps at 55 on the next, go back, then quit
    cli()
        .args(["run", "push"])
        .arg("--data-dir")
        .arg(temp_dir.path())
        .write_stdin("\n6 55\nb\nq\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("67% of sets completed"));
}

#[test]
fn test_run_unrecognised_input_reprompts() {
    let temp_dir = setup_test_dir();

    // The typo and the bad weight are asked again; one set is done before quitting
    cli()
        .args(["run", "legs"])
        .arg("--data-dir")
        .arg(temp_dir.path())
        .write_stdin("oops\n12 heavy\n\nq\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("try again"))
        .stdout(predicate::str::contains("50% of sets completed"));
}

#[test]
fn test_run_stdin_closed_stops_workout() {
    let temp_dir = setup_test_dir();

    cli()
        .args(["run", "legs"])
        .arg("--data-dir")
        .arg(temp_dir.path())
        .write_stdin("")
        .assert()
        .success()
        .stdout(predicate::str::contains("0% of sets completed"));
}

#[test]
fn test_export_after_run() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    run(data_dir, &["run", "push", "--auto-complete"]);

    let first = run(data_dir, &["export"]);
    assert!(first.contains("Exported 3 sets from 1 workouts"));

    // A second export replaces the file instead of duplicating rows
    run(data_dir, &["export"]);

    let csv = fs::read_to_string(data_dir.join("sets.csv")).unwrap();
    assert_eq!(csv.lines().count(), 4);
    assert_eq!(csv.matches("workout_log_id").count(), 1);
    assert!(csv.contains("Bench Press"));
}

#[test]
fn test_export_without_history() {
    let temp_dir = setup_test_dir();

    cli()
        .arg("export")
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("nothing to export"));
}

#[test]
fn test_template_list_and_apply() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    let list = run(data_dir, &["template"]);
    assert!(list.contains("Push/Pull/Legs"));
    assert!(list.contains("Arnold Split"));

    let applied = run(data_dir, &["template", "push/pull/legs"]);
    assert!(applied.contains("Applied template Push/Pull/Legs"));
    assert!(applied.contains("3 workout days, 1 rest days, 4 cycles (16 days)"));
}

#[test]
fn test_stats_report() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    run(data_dir, &["add", "push"]);
    run(data_dir, &["rest"]);
    run(data_dir, &["run", "push", "--auto-complete"]);

    let stats = run(data_dir, &["stats"]);
    assert!(stats.contains("2 days per cycle (1 workout, 1 rest)"));
    assert!(stats.contains("Completed (7 days):  1"));
    assert!(stats.contains("Consistency:         20%"));
    assert!(stats.contains("Last 7 days:"));
    assert!(stats.contains("Push Day"));
}

#[test]
fn test_separate_users() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path();

    run(data_dir, &["add", "push", "--user", "alice"]);

    assert!(run(data_dir, &["show", "--user", "alice"]).contains("Push Day"));
    assert!(run(data_dir, &["show", "--user", "bob"]).contains("Routine is empty"));
}

#[test]
fn test_invalid_user_rejected() {
    let temp_dir = setup_test_dir();

    cli()
        .args(["show", "--user", "../escape"])
        .arg("--data-dir")
        .arg(temp_dir.path())
        .assert()
        .failure();
}
