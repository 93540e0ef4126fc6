use chrono::{Datelike, Duration, NaiveDate};
use tracing::{debug, info};

use crate::errors::ScheduleError;
use crate::models::{DayOfWeek, PlannedRun, TrainingPlan};
use crate::services::week_calendar::{week_start, weeks_between};

/// Summary of one date-assignment pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssignmentReport {
    pub runs_dated: usize,
    pub runs_changed: usize,
}

/// Lay every run of `plan` onto a concrete calendar date.
///
/// Week `w` starts at `start_date + (w-1)*7`. Runs with a preferred day land
/// on that weekday inside the week; the rest fill the earliest free days in
/// declared order. The plan is checked before anything is written, so on
/// error it is left exactly as it was.
pub fn assign_dates(plan: &mut TrainingPlan) -> Result<AssignmentReport, ScheduleError> {
    let start = validate_plan(plan)?;
    let mut report = AssignmentReport::default();

    for week in &mut plan.schedule {
        let first_day = week_start(start, week.week_number);
        let dates = week_dates(first_day, &week.runs);

        for (run, date) in week.runs.iter_mut().zip(dates) {
            if run.date != Some(date) {
                debug!(
                    "Week {} {} run moved from {:?} to {}",
                    week.week_number, run.run_type, run.date, date
                );
                run.set_date(date);
                report.runs_changed += 1;
            }
            report.runs_dated += 1;
        }
    }

    info!(
        "Assigned dates for plan {}: {} runs, {} changed",
        plan.id, report.runs_dated, report.runs_changed
    );
    Ok(report)
}

/// Change one run's preferred day and re-date only that run.
///
/// Passing `None` clears the preference; the run keeps its date while that
/// day is free in the week. Returns the run's new date.
pub fn reassign_run_day(
    plan: &mut TrainingPlan,
    week_number: u32,
    run_index: usize,
    day: Option<DayOfWeek>,
) -> Result<NaiveDate, ScheduleError> {
    let start = plan.start_date.ok_or(ScheduleError::MissingStartDate)?;
    let not_found = ScheduleError::RunNotFound {
        week_number,
        run_index,
    };

    let week = plan.week_mut(week_number).ok_or_else(|| not_found.clone())?;
    let run = week.runs.get_mut(run_index).ok_or(not_found)?;
    run.day = day;

    let first_day = week_start(start, week_number);
    let date = week_dates(first_day, &week.runs)[run_index];
    week.runs[run_index].set_date(date);

    debug!(
        "Run {} of week {} now on {:?} ({})",
        run_index, week_number, day, date
    );
    Ok(date)
}

/// Days from `week_start` to the first `day` on or after it (0-6)
pub fn day_offset(week_start: NaiveDate, day: DayOfWeek) -> u32 {
    let target = day.to_weekday().num_days_from_monday();
    let from = week_start.weekday().num_days_from_monday();
    (target + 7 - from) % 7
}

/// Check that the plan can be dated and return its start date
pub fn validate_plan(plan: &TrainingPlan) -> Result<NaiveDate, ScheduleError> {
    let start = plan.start_date.ok_or(ScheduleError::MissingStartDate)?;

    if let Some(end) = plan.end_date {
        let range_weeks = weeks_between(start, end);
        if range_weeks != i64::from(plan.weeks) {
            return Err(ScheduleError::DateRangeMismatch {
                plan_weeks: plan.weeks,
                range_weeks,
            });
        }
    }

    if plan.schedule.len() != plan.weeks as usize {
        return Err(ScheduleError::InvalidSchedule(format!(
            "plan declares {} weeks but schedule has {}",
            plan.weeks,
            plan.schedule.len()
        )));
    }

    let mut numbers: Vec<u32> = plan.schedule.iter().map(|w| w.week_number).collect();
    numbers.sort_unstable();
    if numbers.iter().zip(1u32..).any(|(n, expected)| *n != expected) {
        return Err(ScheduleError::InvalidSchedule(format!(
            "week numbers must run 1..={} without gaps, got {:?}",
            plan.weeks, numbers
        )));
    }

    Ok(start)
}

/// Dates for every run of one week, in run order.
///
/// Preferred days claim their slots first. A run without one keeps its
/// current date if that date is inside the week and still free; the rest
/// fill the earliest free days.
fn week_dates(first_day: NaiveDate, runs: &[PlannedRun]) -> Vec<NaiveDate> {
    let mut claimed = [false; 7];
    let mut offsets: Vec<Option<usize>> = vec![None; runs.len()];

    for (idx, run) in runs.iter().enumerate() {
        if let Some(day) = run.day {
            let offset = day_offset(first_day, day) as usize;
            claimed[offset] = true;
            offsets[idx] = Some(offset);
        }
    }

    for (idx, run) in runs.iter().enumerate() {
        if run.day.is_some() {
            continue;
        }
        let kept = run
            .date
            .map(|d| (d - first_day).num_days())
            .filter(|days| (0..7).contains(days))
            .map(|days| days as usize);
        if let Some(offset) = kept.filter(|o| !claimed[*o]) {
            claimed[offset] = true;
            offsets[idx] = Some(offset);
        }
    }

    offsets
        .iter()
        .enumerate()
        .map(|(idx, offset)| {
            let offset = offset.unwrap_or_else(|| match claimed.iter().position(|taken| !taken) {
                Some(free) => {
                    claimed[free] = true;
                    free
                }
                None => idx % 7,
            });
            first_day + Duration::days(offset as i64)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DistanceUnit, RunType};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn plan() -> TrainingPlan {
        // 2024-03-04 is a Monday
        serde_json::from_value(json!({
            "id": "plan-1",
            "userId": "user-1",
            "weeks": 2,
            "startDate": "2024-03-04",
            "endDate": "2024-03-18",
            "schedule": [
                {
                    "weekNumber": 1,
                    "runs": [
                        { "type": "easy", "mileage": 3 },
                        { "type": "tempo", "mileage": 5, "day": "Tuesday" },
                        { "type": "long", "mileage": 10, "day": "Sunday" },
                        { "type": "easy", "mileage": 3 }
                    ]
                },
                {
                    "weekNumber": 2,
                    "runs": [
                        { "type": "easy", "mileage": 4 },
                        { "type": "long", "mileage": 12 }
                    ]
                }
            ]
        }))
        .unwrap()
    }

    fn dates(plan: &TrainingPlan, week: u32) -> Vec<NaiveDate> {
        plan.week(week)
            .unwrap()
            .runs
            .iter()
            .map(|r| r.date.unwrap())
            .collect()
    }

    #[test]
    fn test_explicit_days_and_default_slots() {
        let mut plan = plan();
        let report = assign_dates(&mut plan).unwrap();

        assert_eq!(report.runs_dated, 6);
        assert_eq!(report.runs_changed, 6);
        assert_eq!(
            dates(&plan, 1),
            vec![
                date("2024-03-04"),
                date("2024-03-05"),
                date("2024-03-10"),
                date("2024-03-06"),
            ]
        );
        assert_eq!(dates(&plan, 2), vec![date("2024-03-11"), date("2024-03-12")]);
    }

    #[test]
    fn test_assignment_is_idempotent() {
        let mut plan = plan();
        assign_dates(&mut plan).unwrap();
        let first = plan.clone();

        let report = assign_dates(&mut plan).unwrap();
        assert_eq!(report.runs_changed, 0);
        assert_eq!(plan, first);
    }

    #[test]
    fn test_day_offset_wraps_within_week() {
        // Week starting on a Wednesday
        let start = date("2024-03-06");
        assert_eq!(day_offset(start, DayOfWeek::Wednesday), 0);
        assert_eq!(day_offset(start, DayOfWeek::Sunday), 4);
        assert_eq!(day_offset(start, DayOfWeek::Monday), 5);
        assert_eq!(day_offset(start, DayOfWeek::Tuesday), 6);
    }

    #[test]
    fn test_full_week_falls_back_to_index() {
        let mut plan = plan();
        plan.weeks = 1;
        plan.end_date = None;
        plan.schedule.truncate(1);
        let runs = &mut plan.schedule[0].runs;
        runs.clear();
        for _ in 0..8 {
            runs.push(PlannedRun::new(RunType::Easy, 2.0, DistanceUnit::Miles));
        }

        assign_dates(&mut plan).unwrap();
        let assigned = dates(&plan, 1);
        assert_eq!(assigned[6], date("2024-03-10"));
        assert_eq!(assigned[7], date("2024-03-04"));
    }

    #[test]
    fn test_mismatched_range_leaves_plan_untouched() {
        let mut plan = plan();
        plan.end_date = Some(date("2024-04-01"));
        let before = plan.clone();

        let err = assign_dates(&mut plan).unwrap_err();
        assert_eq!(
            err,
            ScheduleError::DateRangeMismatch {
                plan_weeks: 2,
                range_weeks: 4
            }
        );
        assert_eq!(plan, before);
    }

    #[test]
    fn test_missing_start_and_bad_schedule() {
        let mut plan = plan();
        plan.start_date = None;
        assert_eq!(assign_dates(&mut plan), Err(ScheduleError::MissingStartDate));

        let mut plan = self::plan();
        plan.schedule[1].week_number = 3;
        assert!(matches!(
            assign_dates(&mut plan),
            Err(ScheduleError::InvalidSchedule(_))
        ));

        let mut plan = self::plan();
        plan.schedule.pop();
        assert!(matches!(
            assign_dates(&mut plan),
            Err(ScheduleError::InvalidSchedule(_))
        ));
    }

    #[test]
    fn test_reassign_touches_one_run() {
        let mut plan = plan();
        assign_dates(&mut plan).unwrap();
        let before = plan.clone();

        let new_date = reassign_run_day(&mut plan, 1, 0, Some(DayOfWeek::Saturday)).unwrap();
        assert_eq!(new_date, date("2024-03-09"));

        let week = plan.week(1).unwrap();
        assert_eq!(week.runs[0].day, Some(DayOfWeek::Saturday));
        assert_eq!(&week.runs[1..], &before.week(1).unwrap().runs[1..]);
        assert_eq!(plan.week(2), before.week(2));
    }

    #[test]
    fn test_assign_after_reassign_keeps_other_runs() {
        let mut plan = plan();
        assign_dates(&mut plan).unwrap();
        reassign_run_day(&mut plan, 1, 0, Some(DayOfWeek::Saturday)).unwrap();
        let after_move = plan.clone();

        let report = assign_dates(&mut plan).unwrap();
        assert_eq!(report.runs_changed, 0);
        assert_eq!(plan, after_move);
        assert_eq!(
            dates(&plan, 1),
            vec![
                date("2024-03-09"),
                date("2024-03-05"),
                date("2024-03-10"),
                date("2024-03-06"),
            ]
        );
    }

    #[test]
    fn test_clearing_a_day_returns_run_to_a_free_slot() {
        let mut plan = plan();
        assign_dates(&mut plan).unwrap();
        reassign_run_day(&mut plan, 1, 0, Some(DayOfWeek::Saturday)).unwrap();

        // Saturday is unclaimed once the preference goes, so the run stays put
        let date_after_clear = reassign_run_day(&mut plan, 1, 0, None).unwrap();
        assert_eq!(date_after_clear, date("2024-03-09"));
        assert_eq!(plan.week(1).unwrap().runs[0].day, None);
    }

    #[test]
    fn test_stale_date_outside_week_is_replaced() {
        let mut plan = plan();
        plan.schedule[1].runs[0].date = Some(date("2024-03-05"));

        assign_dates(&mut plan).unwrap();
        assert_eq!(dates(&plan, 2), vec![date("2024-03-11"), date("2024-03-12")]);
    }

    #[test]
    fn test_reassign_unknown_run() {
        let mut plan = plan();
        let err = reassign_run_day(&mut plan, 1, 9, None).unwrap_err();
        assert_eq!(
            err,
            ScheduleError::RunNotFound {
                week_number: 1,
                run_index: 9
            }
        );
    }
}
