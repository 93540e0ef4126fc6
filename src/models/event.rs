use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Notifications published by the plan store after a successful write
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlanEvent {
    /// The user's active plan was replaced or deactivated
    ActivePlanChanged {
        user_id: String,
        plan_id: Option<String>,
    },
    /// Run dates or the plan's date range changed
    ScheduleUpdated {
        plan_id: String,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    },
    /// A planned run was marked done or reopened
    RunCompletionChanged {
        plan_id: String,
        week_number: u32,
        run_index: usize,
        done: bool,
        week_done: bool,
    },
}
