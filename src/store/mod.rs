//! Collaborator contracts for plan and run-log persistence.
//!
//! The engine only talks to storage through these traits. `memory` holds an
//! in-process implementation; the CLI provides a sled-backed one.

pub mod memory;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::StoreError;
use crate::models::{RunLogEntry, TrainingPlan, WeekSchedule};

pub use memory::InMemoryStore;

/// Partial update of a stored plan. Unset fields are left as stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<Vec<WeekSchedule>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
}

impl PlanPatch {
    pub fn schedule(schedule: Vec<WeekSchedule>) -> Self {
        Self {
            schedule: Some(schedule),
            ..Default::default()
        }
    }

    /// Schedule plus both dates, as written after a reschedule
    pub fn dated(plan: &TrainingPlan) -> Self {
        Self {
            schedule: Some(plan.schedule.clone()),
            start_date: plan.start_date,
            end_date: plan.end_date,
        }
    }

    pub fn apply(self, plan: &mut TrainingPlan) {
        if let Some(schedule) = self.schedule {
            plan.schedule = schedule;
        }
        if let Some(start) = self.start_date {
            plan.start_date = Some(start);
        }
        if let Some(end) = self.end_date {
            plan.end_date = Some(end);
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlanStore: Send + Sync {
    async fn get_running_plan(&self, id: &str) -> Result<TrainingPlan, StoreError>;

    /// The user's active plan, if any
    async fn active_plan(&self, user_id: &str) -> Result<Option<TrainingPlan>, StoreError>;

    /// Insert or replace a whole plan. Saving an active plan deactivates the
    /// user's other plans.
    async fn save_plan(&self, plan: TrainingPlan) -> Result<TrainingPlan, StoreError>;

    async fn update_running_plan(&self, id: &str, patch: PlanPatch) -> Result<TrainingPlan, StoreError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RunStore: Send + Sync {
    /// Every entry for the user, in no particular order
    async fn list_runs(&self, user_id: &str) -> Result<Vec<RunLogEntry>, StoreError>;

    /// Store an entry, assigning an id and creation time if missing
    async fn create_run(&self, entry: RunLogEntry) -> Result<RunLogEntry, StoreError>;

    async fn delete_run(&self, id: &str) -> Result<(), StoreError>;
}
