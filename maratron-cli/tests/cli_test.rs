use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::{tempdir, TempDir};

const PLAN_JSON: &str = r#"{
    "id": "spring-marathon",
    "name": "Spring Marathon",
    "weeks": 2,
    "startDate": "2024-03-04",
    "endDate": "2024-03-18",
    "schedule": [
        {
            "weekNumber": 1,
            "runs": [
                { "type": "tempo", "mileage": 5, "targetPace": "7:30", "day": "Tuesday" },
                { "type": "long", "mileage": 10, "day": "Sunday" }
            ]
        },
        {
            "week": 2,
            "workouts": [
                { "workoutType": "easy", "distance": 4 },
                { "workoutType": "long", "distance": 12 }
            ]
        }
    ]
}"#;

/// Command isolated from the real home directory
fn maratron(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("maratron").unwrap();
    cmd.env("MARATRON_DB_PATH", dir.join("db"))
        .env("MARATRON_CONFIG", dir.join("config.toml"))
        .env_remove("MARATRON_MONTHLY_GOAL_MILES")
        .env_remove("MARATRON_DEFAULT_UNIT")
        .env_remove("MARATRON_MIN_ZONE_GAP_SECS")
        .env_remove("RUST_LOG");
    cmd
}

fn workspace_with_plan() -> TempDir {
    let dir = tempdir().unwrap();
    let plan_file = dir.path().join("plan.json");
    fs::write(&plan_file, PLAN_JSON).unwrap();

    maratron(dir.path())
        .args(["plan", "import"])
        .arg(&plan_file)
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported plan spring-marathon"))
        .stdout(predicate::str::contains("Dated 4 runs"));
    dir
}

#[test]
fn test_help_command() {
    let mut cmd = Command::cargo_bin("maratron").unwrap();
    cmd.arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Training plan scheduling"))
        .stdout(predicate::str::contains("paces"))
        .stdout(predicate::str::contains("plan"));
}

#[test]
fn test_version_command() {
    let mut cmd = Command::cargo_bin("maratron").unwrap();
    cmd.arg("--version");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("0.1.0"));
}

#[test]
fn test_completions_command() {
    let mut cmd = Command::cargo_bin("maratron").unwrap();
    cmd.arg("completions").arg("bash");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("_maratron"));
}

#[test]
fn test_paces_table() {
    let dir = tempdir().unwrap();
    maratron(dir.path())
        .args(["paces", "--vdot", "50", "--distance", "marathon", "--unit", "mi"])
        .assert()
        .success()
        .stdout(predicate::str::contains("VDOT 50.0"))
        .stdout(predicate::str::contains("Threshold"))
        .stdout(predicate::str::contains("Repetition"))
        .stdout(predicate::str::contains("Race Predictions"));
}

#[test]
fn test_paces_rejects_bad_distance() {
    let dir = tempdir().unwrap();
    maratron(dir.path())
        .args(["paces", "--vdot", "50", "--distance", "ultra"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid target distance"));
}

#[test]
fn test_plan_show_lists_dated_runs() {
    let dir = workspace_with_plan();
    maratron(dir.path())
        .args(["plan", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Spring Marathon"))
        .stdout(predicate::str::contains("Tue 2024-03-05"))
        .stdout(predicate::str::contains("Sun 2024-03-10"))
        .stdout(predicate::str::contains("Mon 2024-03-11"))
        .stdout(predicate::str::contains("Tempo Run"));
}

#[test]
fn test_complete_and_reopen_sync_run_log() {
    let dir = workspace_with_plan();

    maratron(dir.path())
        .args(["plan", "complete", "--week", "1", "--run", "0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("marked done"))
        .stdout(predicate::str::contains("Logged Tempo Run on 2024-03-05"));

    maratron(dir.path())
        .args(["runs", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Tempo Run"))
        .stdout(predicate::str::contains("00:37:30"));

    maratron(dir.path())
        .args(["plan", "reopen", "--week", "1", "--run", "0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("marked not done"))
        .stdout(predicate::str::contains("Removed log entry"));

    maratron(dir.path())
        .args(["runs", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No runs logged yet"));
}

#[test]
fn test_set_day_moves_one_run() {
    let dir = workspace_with_plan();
    maratron(dir.path())
        .args(["plan", "set-day", "--week", "2", "--run", "1", "--day", "saturday"])
        .assert()
        .success()
        .stdout(predicate::str::contains("moved to Saturday (2024-03-16)"));
}

#[test]
fn test_reschedule_small_and_large_changes() {
    let dir = workspace_with_plan();

    maratron(dir.path())
        .args(["plan", "reschedule", "--start", "2024-03-11"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2024-03-11 to 2024-03-25"));

    maratron(dir.path())
        .args(["plan", "reschedule", "--start", "2024-03-11", "--end", "2024-05-06"])
        .assert()
        .success()
        .stdout(predicate::str::contains("change the plan length (2 -> 8 weeks)"));
}

#[test]
fn test_unknown_run_fails() {
    let dir = workspace_with_plan();
    maratron(dir.path())
        .args(["plan", "complete", "--week", "9", "--run", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_stats_with_imported_runs() {
    let dir = tempdir().unwrap();
    let runs_file = dir.path().join("runs.json");
    fs::write(
        &runs_file,
        r#"[
            { "date": "2020-01-01", "distance": 10, "unit": "km", "duration": "50:00" },
            { "date": "2020-01-02", "distance": 5, "distanceUnit": "miles", "duration": "40:00" }
        ]"#,
    )
    .unwrap();

    maratron(dir.path())
        .args(["runs", "import"])
        .arg(&runs_file)
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 2 runs"));

    maratron(dir.path())
        .args(["stats", "--goal", "50"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Training Statistics"))
        .stdout(predicate::str::contains("All time:    11.2 mi over 2 runs"))
        .stdout(predicate::str::contains("Streak:      0 days"));
}

#[test]
fn test_onboarding_steps_unlock_in_order() {
    let dir = tempdir().unwrap();

    maratron(dir.path())
        .args(["onboarding", "complete", "training"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("locked"));

    maratron(dir.path())
        .args(["onboarding", "complete", "account"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Next step: profile"));

    maratron(dir.path())
        .args(["onboarding", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("✓ account"))
        .stdout(predicate::str::contains("→ profile"));
}

#[test]
fn test_config_init_and_show() {
    let dir = tempdir().unwrap();

    maratron(dir.path())
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration initialized"));
    assert!(dir.path().join("config.toml").exists());

    maratron(dir.path())
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));

    maratron(dir.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[profile]"))
        .stdout(predicate::str::contains("monthly_goal_miles"));
}
