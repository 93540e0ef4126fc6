use anyhow::{Context, Result};
use std::env;

use crate::models::DistanceUnit;
use crate::services::pace_zone_service::MIN_ZONE_GAP_SECS_PER_MILE;
use crate::services::run_stats_service::DEFAULT_MONTHLY_GOAL_MILES;

/// Engine settings read from the environment
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub monthly_goal_miles: f64,
    pub default_unit: DistanceUnit,
    pub min_zone_gap_secs_per_mile: u32,
    pub log_level: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            monthly_goal_miles: DEFAULT_MONTHLY_GOAL_MILES,
            default_unit: DistanceUnit::Miles,
            min_zone_gap_secs_per_mile: MIN_ZONE_GAP_SECS_PER_MILE,
            log_level: "info".to_string(),
        }
    }
}

impl EngineConfig {
    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; unset keys keep their defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let monthly_goal_miles = match lookup("MARATRON_MONTHLY_GOAL_MILES") {
            Some(raw) => raw
                .trim()
                .parse::<f64>()
                .with_context(|| format!("MARATRON_MONTHLY_GOAL_MILES is not a number: {}", raw))?,
            None => defaults.monthly_goal_miles,
        };
        let default_unit = match lookup("MARATRON_DEFAULT_UNIT") {
            Some(raw) => raw.parse().context("MARATRON_DEFAULT_UNIT")?,
            None => defaults.default_unit,
        };
        let min_zone_gap_secs_per_mile = match lookup("MARATRON_MIN_ZONE_GAP_SECS") {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("MARATRON_MIN_ZONE_GAP_SECS is not a whole number: {}", raw))?,
            None => defaults.min_zone_gap_secs_per_mile,
        };
        let log_level = lookup("LOG_LEVEL").unwrap_or(defaults.log_level);

        Ok(Self {
            monthly_goal_miles,
            default_unit,
            min_zone_gap_secs_per_mile,
            log_level,
        })
    }
}
