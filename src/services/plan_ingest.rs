//! Normalisation of loosely shaped plan payloads.
//!
//! Field aliases are handled by the model's serde attributes; this module
//! fills in what can be inferred and rejects what cannot be repaired, so
//! everything past this point works on canonical types.

use serde_json::Value;
use uuid::Uuid;

use crate::errors::IngestError;
use crate::models::{TrainingPlan, WeekSchedule};

const SCHEDULE_KEYS: [&str; 3] = ["schedule", "planData", "weeksData"];

/// Parse a whole plan document
pub fn parse_plan(json: &str) -> Result<TrainingPlan, IngestError> {
    plan_from_value(serde_json::from_str(json)?)
}

pub fn plan_from_value(value: Value) -> Result<TrainingPlan, IngestError> {
    let mut plan: TrainingPlan = serde_json::from_value(value)?;
    if plan.id.trim().is_empty() {
        plan.id = Uuid::new_v4().to_string();
    }
    normalise_schedule(&mut plan.schedule)?;
    if plan.weeks == 0 {
        plan.weeks = plan.schedule.len() as u32;
    }
    Ok(plan)
}

/// Parse just a schedule: either a bare array of weeks or an object holding
/// one under `schedule`, `planData` or `weeksData`
pub fn parse_schedule(json: &str) -> Result<Vec<WeekSchedule>, IngestError> {
    schedule_from_value(serde_json::from_str(json)?)
}

pub fn schedule_from_value(value: Value) -> Result<Vec<WeekSchedule>, IngestError> {
    let weeks = match value {
        Value::Array(_) => value,
        Value::Object(mut map) => SCHEDULE_KEYS
            .iter()
            .find_map(|key| map.remove(*key))
            .ok_or_else(|| IngestError::Invalid("no schedule array found".to_string()))?,
        other => {
            return Err(IngestError::Invalid(format!(
                "expected a schedule array, got {}",
                type_name(&other)
            )))
        }
    };

    let mut schedule: Vec<WeekSchedule> = serde_json::from_value(weeks)?;
    normalise_schedule(&mut schedule)?;
    Ok(schedule)
}

fn normalise_schedule(schedule: &mut [WeekSchedule]) -> Result<(), IngestError> {
    for (idx, week) in schedule.iter_mut().enumerate() {
        if week.week_number == 0 {
            week.week_number = idx as u32 + 1;
        }
        for (run_idx, run) in week.runs.iter().enumerate() {
            if !run.mileage.is_finite() || run.mileage < 0.0 {
                return Err(IngestError::Invalid(format!(
                    "week {} run {} has invalid distance {}",
                    week.week_number, run_idx, run.mileage
                )));
            }
        }
        week.recompute_done();
    }
    Ok(())
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
