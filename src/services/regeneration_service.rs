//! Decide whether a change to a plan's date range can be handled by
//! re-dating the existing runs or needs a rebuilt plan.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::errors::ScheduleError;
use crate::models::TrainingPlan;
use crate::services::plan_schedule_service::{assign_dates, AssignmentReport};
use crate::services::week_calendar::weeks_between;

/// Largest change in plan length, in weeks, absorbed by re-dating
pub const REGENERATION_WEEK_THRESHOLD: i64 = 1;

/// A plan's start/end pair. Either end may be unset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    pub fn of_plan(plan: &TrainingPlan) -> Self {
        Self {
            start: plan.start_date,
            end: plan.end_date,
        }
    }

    /// Whole weeks in the range, if both ends are set
    pub fn weeks(&self) -> Option<i64> {
        Some(weeks_between(self.start?, self.end?))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum DateChangeDecision {
    /// Keep the skeleton and re-run date assignment
    Reschedule { original_weeks: i64, new_weeks: i64 },
    /// The structure no longer fits; build a new plan
    Regenerate {
        original_weeks: Option<i64>,
        new_weeks: Option<i64>,
    },
}

impl DateChangeDecision {
    pub fn requires_regeneration(&self) -> bool {
        matches!(self, DateChangeDecision::Regenerate { .. })
    }
}

/// True when the new range differs from the old by more than
/// [`REGENERATION_WEEK_THRESHOLD`] whole weeks
pub fn should_regenerate(
    old_start: NaiveDate,
    old_end: NaiveDate,
    new_start: NaiveDate,
    new_end: NaiveDate,
) -> bool {
    let original = weeks_between(old_start, old_end);
    let updated = weeks_between(new_start, new_end);
    (updated - original).abs() > REGENERATION_WEEK_THRESHOLD
}

/// Classify a date-range edit. A range missing either end on either side
/// cannot be compared and is treated as structural.
pub fn evaluate_date_change(old: DateRange, new: DateRange) -> DateChangeDecision {
    match (old.weeks(), new.weeks()) {
        (Some(original_weeks), Some(new_weeks))
            if (new_weeks - original_weeks).abs() <= REGENERATION_WEEK_THRESHOLD =>
        {
            DateChangeDecision::Reschedule {
                original_weeks,
                new_weeks,
            }
        }
        (original_weeks, new_weeks) => {
            tracing::debug!(
                "Date change {:?} -> {:?} needs regeneration",
                original_weeks,
                new_weeks
            );
            DateChangeDecision::Regenerate {
                original_weeks,
                new_weeks,
            }
        }
    }
}

/// Move a plan to start on `new_start` and re-date its runs.
///
/// The skeleton keeps its length, so the stored end date becomes
/// `new_start + weeks*7`. Runs without a preferred day are laid out afresh
/// from the new start. On error the plan is unchanged.
pub fn apply_reschedule(
    plan: &mut TrainingPlan,
    new_start: NaiveDate,
) -> Result<AssignmentReport, ScheduleError> {
    let mut moved = plan.clone();
    moved.start_date = Some(new_start);
    moved.end_date = Some(new_start + Duration::days(i64::from(plan.weeks) * 7));
    for run in moved.schedule.iter_mut().flat_map(|w| w.runs.iter_mut()) {
        run.date = None;
    }

    let mut report = assign_dates(&mut moved)?;
    report.runs_changed = plan
        .schedule
        .iter()
        .zip(&moved.schedule)
        .flat_map(|(old, new)| old.runs.iter().zip(&new.runs))
        .filter(|(old, new)| old.date != new.date)
        .count();
    *plan = moved;
    Ok(report)
}
