use thiserror::Error;

/// Problems laying a plan onto calendar dates
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("Plan has no start date")]
    MissingStartDate,
    #[error("Date range spans {range_weeks} weeks but the plan has {plan_weeks}; regenerate the plan")]
    DateRangeMismatch { plan_weeks: u32, range_weeks: i64 },
    #[error("Invalid schedule: {0}")]
    InvalidSchedule(String),
    #[error("Run {run_index} not found in week {week_number}")]
    RunNotFound { week_number: u32, run_index: usize },
}

/// Failures reported by the plan and run-log collaborators
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Resource not found: {0}")]
    NotFound(String),
}

impl StoreError {
    /// Network and storage failures are worth retrying; a missing record is not
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Network(_) | StoreError::Storage(_))
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OnboardingError {
    #[error("Unknown signup step: {0}")]
    UnknownStep(String),
    #[error("Step '{step}' is locked; complete '{current}' first")]
    StepLocked { step: String, current: String },
    #[error("Completed steps are not a prefix of the signup order: {0}")]
    InconsistentState(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Malformed plan payload: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("Invalid plan payload: {0}")]
    Invalid(String),
}

/// Top-level error for callers that drive whole workflows
#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Schedule(#[from] ScheduleError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Onboarding(#[from] OnboardingError),
    #[error(transparent)]
    Ingest(#[from] IngestError),
}

impl EngineError {
    /// True when the plan's dates no longer fit its skeleton and the caller
    /// should offer regeneration instead of retrying
    pub fn requires_regeneration(&self) -> bool {
        matches!(
            self,
            EngineError::Schedule(ScheduleError::DateRangeMismatch { .. })
        )
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
