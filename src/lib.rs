//! Maratron training engine: pace zones, plan dating, run-log statistics and
//! the workflows that keep a plan and its run log in step.

pub mod config;
pub mod errors;
pub mod logging;
pub mod models;
pub mod services;
pub mod store;

pub use config::EngineConfig;
pub use errors::{EngineError, EngineResult, IngestError, OnboardingError, ScheduleError, StoreError};
