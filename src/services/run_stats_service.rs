use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use serde::Serialize;
use std::collections::BTreeSet;

use crate::models::pace::{format_pace, parse_clock, PACE_UNAVAILABLE};
use crate::models::RunLogEntry;

/// Monthly distance goal when the user has not set one
pub const DEFAULT_MONTHLY_GOAL_MILES: f64 = 100.0;

/// Dashboard figures for one user, all distances in miles
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunStats {
    pub weekly_miles: f64,
    pub weekly_runs: usize,
    pub monthly_miles: f64,
    pub monthly_runs: usize,
    pub monthly_goal_miles: f64,
    pub goal_progress_percent: u32,
    pub goal_status: GoalStatus,
    pub streak_days: u32,
    pub total_runs: usize,
    pub total_miles: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalStatus {
    Achieved,
    AlmostThere,
    GoodProgress,
    GettingStarted,
}

impl GoalStatus {
    pub fn from_percent(percent: u32) -> Self {
        match percent {
            p if p >= 100 => GoalStatus::Achieved,
            p if p >= 80 => GoalStatus::AlmostThere,
            p if p >= 50 => GoalStatus::GoodProgress,
            _ => GoalStatus::GettingStarted,
        }
    }
}

impl std::fmt::Display for GoalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GoalStatus::Achieved => write!(f, "Achieved"),
            GoalStatus::AlmostThere => write!(f, "Almost there"),
            GoalStatus::GoodProgress => write!(f, "Good progress"),
            GoalStatus::GettingStarted => write!(f, "Getting started"),
        }
    }
}

/// Compute weekly, monthly, streak and total figures as of `now`.
///
/// Run dates are read in `now`'s time zone. The week starts on the most
/// recent Sunday at 00:00 local and the month on the 1st. Entries whose date
/// does not parse are skipped.
pub fn compute_stats<Tz: TimeZone>(
    runs: &[RunLogEntry],
    now: &DateTime<Tz>,
    monthly_goal_miles: f64,
) -> RunStats {
    let tz = now.timezone();
    let now_local = now.naive_local();
    let week_floor = start_of_week(now_local.date()).and_time(NaiveTime::MIN);
    let month_floor = start_of_month(now_local.date()).and_time(NaiveTime::MIN);

    let mut weekly_miles = 0.0;
    let mut weekly_runs = 0;
    let mut monthly_miles = 0.0;
    let mut monthly_runs = 0;
    let mut total_miles = 0.0;
    let mut total_runs = 0;
    let mut run_days = BTreeSet::new();

    for entry in runs {
        let Some(ts) = entry.local_timestamp(&tz) else {
            tracing::debug!("Skipping run with unparsable date {:?}", entry.date);
            continue;
        };
        let miles = entry.distance_miles();

        total_runs += 1;
        total_miles += miles;
        run_days.insert(ts.date());

        if in_window(ts, week_floor, now_local) {
            weekly_runs += 1;
            weekly_miles += miles;
        }
        if in_window(ts, month_floor, now_local) {
            monthly_runs += 1;
            monthly_miles += miles;
        }
    }

    let goal_progress = goal_progress_percent(monthly_miles, monthly_goal_miles);

    RunStats {
        weekly_miles: round_tenth(weekly_miles),
        weekly_runs,
        monthly_miles: round_tenth(monthly_miles),
        monthly_runs,
        monthly_goal_miles,
        goal_progress_percent: goal_progress,
        goal_status: GoalStatus::from_percent(goal_progress),
        streak_days: current_streak(&run_days, now_local.date()),
        total_runs,
        total_miles: round_tenth(total_miles),
    }
}

/// Consecutive days with a run, counting back from the latest run day.
///
/// Days after `today` are ignored. The streak is broken unless the latest
/// run was today or yesterday.
pub fn current_streak(run_days: &BTreeSet<NaiveDate>, today: NaiveDate) -> u32 {
    let mut days = run_days.range(..=today).rev();
    let Some(&latest) = days.next() else {
        return 0;
    };
    if latest < today - Duration::days(1) {
        return 0;
    }

    let mut streak = 1;
    let mut expected = latest - Duration::days(1);
    for &day in days {
        if day != expected {
            break;
        }
        streak += 1;
        expected = day - Duration::days(1);
    }
    streak
}

/// Most recent Sunday on or before `date`
pub fn start_of_week(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_sunday()))
}

pub fn start_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Whole-percent progress toward the goal, capped at 100
pub fn goal_progress_percent(miles: f64, goal_miles: f64) -> u32 {
    if goal_miles.is_nan() || goal_miles <= 0.0 || !miles.is_finite() || miles <= 0.0 {
        return 0;
    }
    (100.0 * miles / goal_miles).round().min(100.0) as u32
}

/// Pace of a logged run as `M:SS` per its own unit, or `"N/A"`
pub fn entry_pace(entry: &RunLogEntry) -> String {
    let seconds = match parse_clock(&entry.duration) {
        Some(s) if s > 0 => s,
        _ => return PACE_UNAVAILABLE.to_string(),
    };
    if !entry.distance.is_finite() || entry.distance <= 0.0 {
        return PACE_UNAVAILABLE.to_string();
    }
    format_pace((seconds as f64 / entry.distance).round() as u32)
}

pub fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn in_window(ts: NaiveDateTime, floor: NaiveDateTime, now: NaiveDateTime) -> bool {
    ts >= floor && ts <= now
}
