// Local storage module using sled embedded database

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use maratron::models::{RunLogEntry, SignupFlow, TrainingPlan};
use maratron::store::{PlanPatch, PlanStore, RunStore};
use maratron::StoreError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sled::{Db, Tree};
use std::path::{Path, PathBuf};

use crate::config::Config;

const PLANS_TREE: &str = "plans";
const RUNS_TREE: &str = "runs";
const ONBOARDING_TREE: &str = "onboarding";

/// Plans, run log and signup progress in one sled database.
///
/// Values are JSON so stored plans keep fields the engine does not model.
pub struct SledStore {
    db: Db,
}

impl SledStore {
    /// Database directory: `MARATRON_DB_PATH`, then the config file, then ~/.maratron/data
    pub fn db_path(config: &Config) -> Result<PathBuf> {
        if let Ok(path) = std::env::var("MARATRON_DB_PATH") {
            return Ok(PathBuf::from(path));
        }
        if let Some(path) = &config.storage.data_path {
            return Ok(path.clone());
        }
        Ok(Config::config_dir()?.join("data"))
    }

    pub fn init(config: &Config) -> Result<Self> {
        Self::open(&Self::db_path(config)?)
    }

    pub fn open(path: &Path) -> Result<Self> {
        tracing::info!("Initializing sled database at {:?}", path);
        let db = sled::open(path).context("Failed to open sled database")?;
        Ok(Self { db })
    }

    pub fn load_signup_flow(&self, user_id: &str) -> Result<SignupFlow> {
        let tree = self.db.open_tree(ONBOARDING_TREE).context("Failed to open onboarding tree")?;
        match tree.get(user_id.as_bytes()).context("Failed to read signup progress")? {
            Some(value) => {
                let json = std::str::from_utf8(&value).context("Signup progress is not UTF-8")?;
                Ok(SignupFlow::from_json(json)?)
            }
            None => Ok(SignupFlow::new()),
        }
    }

    pub fn save_signup_flow(&self, user_id: &str, flow: &SignupFlow) -> Result<()> {
        let tree = self.db.open_tree(ONBOARDING_TREE).context("Failed to open onboarding tree")?;
        tree.insert(user_id.as_bytes(), flow.to_json()?.into_bytes())
            .context("Failed to save signup progress")?;
        self.db.flush().context("Failed to flush database")?;
        Ok(())
    }

    fn tree(&self, name: &str) -> Result<Tree, StoreError> {
        self.db.open_tree(name).map_err(storage_error)
    }

    fn get<T: DeserializeOwned>(&self, tree: &str, key: &str) -> Result<Option<T>, StoreError> {
        match self.tree(tree)?.get(key.as_bytes()).map_err(storage_error)? {
            Some(value) => serde_json::from_slice(&value)
                .map(Some)
                .map_err(|e| StoreError::Storage(format!("corrupt {} record {}: {}", tree, key, e))),
            None => Ok(None),
        }
    }

    fn put<T: Serialize>(&self, tree: &str, key: &str, value: &T) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec(value).map_err(|e| StoreError::Storage(e.to_string()))?;
        self.tree(tree)?
            .insert(key.as_bytes(), bytes)
            .map_err(storage_error)?;
        self.db.flush().map_err(storage_error)?;
        Ok(())
    }

    fn all<T: DeserializeOwned>(&self, tree: &str) -> Result<Vec<T>, StoreError> {
        let mut items = Vec::new();
        for item in self.tree(tree)?.iter() {
            let (key, value) = item.map_err(storage_error)?;
            match serde_json::from_slice(&value) {
                Ok(parsed) => items.push(parsed),
                Err(e) => tracing::warn!(
                    "Skipping unreadable {} record {}: {}",
                    tree,
                    String::from_utf8_lossy(&key),
                    e
                ),
            }
        }
        Ok(items)
    }
}

fn storage_error(e: sled::Error) -> StoreError {
    StoreError::Storage(e.to_string())
}

#[async_trait]
impl PlanStore for SledStore {
    async fn get_running_plan(&self, id: &str) -> Result<TrainingPlan, StoreError> {
        self.get(PLANS_TREE, id)?
            .ok_or_else(|| StoreError::NotFound(format!("plan {}", id)))
    }

    async fn active_plan(&self, user_id: &str) -> Result<Option<TrainingPlan>, StoreError> {
        Ok(self
            .all::<TrainingPlan>(PLANS_TREE)?
            .into_iter()
            .find(|p| p.user_id == user_id && p.active))
    }

    async fn save_plan(&self, plan: TrainingPlan) -> Result<TrainingPlan, StoreError> {
        if plan.active {
            for mut other in self.all::<TrainingPlan>(PLANS_TREE)? {
                if other.user_id == plan.user_id && other.id != plan.id && other.active {
                    other.active = false;
                    self.put(PLANS_TREE, &other.id, &other)?;
                }
            }
        }
        self.put(PLANS_TREE, &plan.id, &plan)?;
        tracing::debug!("Saved plan {}", plan.id);
        Ok(plan)
    }

    async fn update_running_plan(&self, id: &str, patch: PlanPatch) -> Result<TrainingPlan, StoreError> {
        let mut plan: TrainingPlan = self
            .get(PLANS_TREE, id)?
            .ok_or_else(|| StoreError::NotFound(format!("plan {}", id)))?;
        patch.apply(&mut plan);
        self.put(PLANS_TREE, id, &plan)?;
        Ok(plan)
    }
}

#[async_trait]
impl RunStore for SledStore {
    async fn list_runs(&self, user_id: &str) -> Result<Vec<RunLogEntry>, StoreError> {
        Ok(self
            .all::<RunLogEntry>(RUNS_TREE)?
            .into_iter()
            .filter(|r| r.user_id.as_deref() == Some(user_id))
            .collect())
    }

    async fn create_run(&self, mut entry: RunLogEntry) -> Result<RunLogEntry, StoreError> {
        if entry.id.is_none() {
            let next = self.db.generate_id().map_err(storage_error)?;
            entry.id = Some(format!("run-{:08}", next));
        }
        entry.created_at.get_or_insert_with(Utc::now);

        let id = entry.id.clone().unwrap_or_default();
        self.put(RUNS_TREE, &id, &entry)?;
        tracing::debug!("Saved run {}", id);
        Ok(entry)
    }

    async fn delete_run(&self, id: &str) -> Result<(), StoreError> {
        let removed = self
            .tree(RUNS_TREE)?
            .remove(id.as_bytes())
            .map_err(storage_error)?;
        if removed.is_none() {
            return Err(StoreError::NotFound(format!("run {}", id)));
        }
        self.db.flush().map_err(storage_error)?;
        tracing::debug!("Deleted run {}", id);
        Ok(())
    }
}
