use chrono::{FixedOffset, NaiveDate, TimeZone};
use maratron::models::{DistanceUnit, RunLogEntry};
use maratron::services::{compute_stats, GoalStatus};
use pretty_assertions::assert_eq;

fn run(date: &str, distance: f64, unit: DistanceUnit) -> RunLogEntry {
    let mut entry = RunLogEntry::new(NaiveDate::default(), distance, unit, "45:00".to_string());
    entry.date = date.to_string();
    entry
}

fn history() -> Vec<RunLogEntry> {
    vec![
        run("2024-03-13", 5.0, DistanceUnit::Miles),
        run("2024-03-12", 3.0, DistanceUnit::Miles),
        run("2024-03-11", 10.0, DistanceUnit::Kilometers),
        // Saturday evening locally, Sunday in UTC
        run("2024-03-10T03:00:00Z", 1.0, DistanceUnit::Miles),
        run("2024-03-05", 4.0, DistanceUnit::Miles),
        run("2024-02-28", 6.0, DistanceUnit::Miles),
        run("2024-03-14", 2.0, DistanceUnit::Miles),
        run("sometime last week", 5.0, DistanceUnit::Miles),
    ]
}

#[test]
fn test_dashboard_figures_in_local_time() {
    let eastern = FixedOffset::west_opt(5 * 3600).unwrap();
    let now = eastern.with_ymd_and_hms(2024, 3, 13, 12, 0, 0).unwrap();

    let stats = compute_stats(&history(), &now, 20.0);

    assert_eq!(stats.weekly_runs, 3);
    assert_eq!(stats.weekly_miles, 14.2);
    assert_eq!(stats.monthly_runs, 5);
    assert_eq!(stats.monthly_miles, 19.2);
    assert_eq!(stats.goal_progress_percent, 96);
    assert_eq!(stats.goal_status, GoalStatus::AlmostThere);
    assert_eq!(stats.streak_days, 3);
    assert_eq!(stats.total_runs, 7);
    assert_eq!(stats.total_miles, 27.2);
}

#[test]
fn test_goal_is_capped_and_status_follows() {
    let eastern = FixedOffset::west_opt(5 * 3600).unwrap();
    let now = eastern.with_ymd_and_hms(2024, 3, 13, 12, 0, 0).unwrap();

    let stats = compute_stats(&history(), &now, 10.0);
    assert_eq!(stats.goal_progress_percent, 100);
    assert_eq!(stats.goal_status, GoalStatus::Achieved);
    assert_eq!(stats.goal_status.to_string(), "Achieved");

    let stats = compute_stats(&history(), &now, 0.0);
    assert_eq!(stats.goal_progress_percent, 0);
    assert_eq!(stats.goal_status, GoalStatus::GettingStarted);
}

#[test]
fn test_streak_breaks_after_a_missed_day() {
    let utc = FixedOffset::east_opt(0).unwrap();
    let now = utc.with_ymd_and_hms(2024, 3, 16, 8, 0, 0).unwrap();

    let stats = compute_stats(&history(), &now, 100.0);
    assert_eq!(stats.streak_days, 0);
    assert_eq!(stats.weekly_runs, 5);
}

#[test]
fn test_empty_history() {
    let utc = FixedOffset::east_opt(0).unwrap();
    let now = utc.with_ymd_and_hms(2024, 3, 13, 12, 0, 0).unwrap();

    let stats = compute_stats(&[], &now, 100.0);
    assert_eq!(stats.total_runs, 0);
    assert_eq!(stats.total_miles, 0.0);
    assert_eq!(stats.streak_days, 0);
    assert_eq!(stats.goal_status, GoalStatus::GettingStarted);
}
