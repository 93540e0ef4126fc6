use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use super::{PlanPatch, PlanStore, RunStore};
use crate::errors::StoreError;
use crate::models::{RunLogEntry, TrainingPlan};

/// Process-local store, mainly for tests and dry runs.
///
/// Failures can be queued per operation family to exercise error paths;
/// each queued error is returned once.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    plans: RwLock<HashMap<String, TrainingPlan>>,
    runs: RwLock<Vec<RunLogEntry>>,
    plan_failures: Mutex<Vec<StoreError>>,
    run_failures: Mutex<Vec<StoreError>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_plan(plan: TrainingPlan) -> Self {
        let mut plans = HashMap::new();
        plans.insert(plan.id.clone(), plan);
        Self {
            plans: RwLock::new(plans),
            ..Default::default()
        }
    }

    /// Make the next plan write fail with `error`
    pub async fn fail_next_plan_write(&self, error: StoreError) {
        self.plan_failures.lock().await.push(error);
    }

    /// Make the next run-log create/delete fail with `error`
    pub async fn fail_next_run_write(&self, error: StoreError) {
        self.run_failures.lock().await.push(error);
    }

    pub async fn run_count(&self) -> usize {
        self.runs.read().await.len()
    }

    async fn take_failure(queue: &Mutex<Vec<StoreError>>) -> Result<(), StoreError> {
        match queue.lock().await.pop() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl PlanStore for InMemoryStore {
    async fn get_running_plan(&self, id: &str) -> Result<TrainingPlan, StoreError> {
        self.plans
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("plan {}", id)))
    }

    async fn active_plan(&self, user_id: &str) -> Result<Option<TrainingPlan>, StoreError> {
        Ok(self
            .plans
            .read()
            .await
            .values()
            .find(|p| p.user_id == user_id && p.active)
            .cloned())
    }

    async fn save_plan(&self, plan: TrainingPlan) -> Result<TrainingPlan, StoreError> {
        Self::take_failure(&self.plan_failures).await?;

        let mut plans = self.plans.write().await;
        if plan.active {
            for other in plans.values_mut() {
                if other.user_id == plan.user_id && other.id != plan.id {
                    other.active = false;
                }
            }
        }
        plans.insert(plan.id.clone(), plan.clone());
        Ok(plan)
    }

    async fn update_running_plan(&self, id: &str, patch: PlanPatch) -> Result<TrainingPlan, StoreError> {
        Self::take_failure(&self.plan_failures).await?;

        let mut plans = self.plans.write().await;
        let plan = plans
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(format!("plan {}", id)))?;
        patch.apply(plan);
        Ok(plan.clone())
    }
}

#[async_trait]
impl RunStore for InMemoryStore {
    async fn list_runs(&self, user_id: &str) -> Result<Vec<RunLogEntry>, StoreError> {
        Ok(self
            .runs
            .read()
            .await
            .iter()
            .filter(|r| r.user_id.as_deref() == Some(user_id))
            .cloned()
            .collect())
    }

    async fn create_run(&self, mut entry: RunLogEntry) -> Result<RunLogEntry, StoreError> {
        Self::take_failure(&self.run_failures).await?;

        entry.id.get_or_insert_with(|| Uuid::new_v4().to_string());
        entry.created_at.get_or_insert_with(Utc::now);
        self.runs.write().await.push(entry.clone());
        Ok(entry)
    }

    async fn delete_run(&self, id: &str) -> Result<(), StoreError> {
        Self::take_failure(&self.run_failures).await?;

        let mut runs = self.runs.write().await;
        let before = runs.len();
        runs.retain(|r| r.id.as_deref() != Some(id));
        if runs.len() == before {
            return Err(StoreError::NotFound(format!("run {}", id)));
        }
        Ok(())
    }
}
