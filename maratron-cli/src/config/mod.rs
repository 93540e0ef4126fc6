use anyhow::{Context, Result};
use maratron::models::{DistanceUnit, RaceDistance};
use maratron::services::run_stats_service::DEFAULT_MONTHLY_GOAL_MILES;
use maratron::EngineConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub profile: ProfileConfig,

    #[serde(default)]
    pub stats: StatsConfig,

    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileConfig {
    #[serde(default = "default_user_id")]
    pub user_id: String,

    #[serde(default = "default_vdot")]
    pub vdot: f64,

    #[serde(default = "default_distance_unit")]
    pub default_unit: String,

    #[serde(default = "default_race_distance")]
    pub race_distance: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsConfig {
    #[serde(default = "default_monthly_goal")]
    pub monthly_goal_miles: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Database directory; defaults to ~/.maratron/data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_path: Option<PathBuf>,
}

// Default value functions
fn default_user_id() -> String {
    "local".to_string()
}

fn default_vdot() -> f64 {
    35.0
}

fn default_distance_unit() -> String {
    "miles".to_string()
}

fn default_race_distance() -> String {
    "marathon".to_string()
}

fn default_monthly_goal() -> f64 {
    DEFAULT_MONTHLY_GOAL_MILES
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            user_id: default_user_id(),
            vdot: default_vdot(),
            default_unit: default_distance_unit(),
            race_distance: default_race_distance(),
        }
    }
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            monthly_goal_miles: default_monthly_goal(),
        }
    }
}

impl Config {
    /// Get config directory path (~/.maratron/)
    pub fn config_dir() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Could not find home directory")?;
        Ok(home.join(".maratron"))
    }

    /// Get config file path, preferring an explicit override
    pub fn config_file(override_path: Option<&Path>) -> Result<PathBuf> {
        match override_path {
            Some(path) => Ok(path.to_path_buf()),
            None => Ok(Self::config_dir()?.join("config.toml")),
        }
    }

    /// Load configuration from file, falling back to defaults when absent
    pub fn load(override_path: Option<&Path>) -> Result<Self> {
        let config_file = Self::config_file(override_path)?;

        if !config_file.exists() {
            tracing::info!("Config file not found, using defaults");
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&config_file).context("Failed to read config file")?;
        let config: Config = toml::from_str(&contents).context("Failed to parse config file")?;

        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, override_path: Option<&Path>) -> Result<PathBuf> {
        let config_file = Self::config_file(override_path)?;
        if let Some(dir) = config_file.parent() {
            fs::create_dir_all(dir).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(&config_file, contents).context("Failed to write config file")?;

        Ok(config_file)
    }

    pub fn default_unit(&self) -> Result<DistanceUnit> {
        self.profile
            .default_unit
            .parse()
            .context("Invalid profile.default_unit")
    }

    pub fn race_distance(&self) -> Result<RaceDistance> {
        self.profile
            .race_distance
            .parse()
            .context("Invalid profile.race_distance")
    }

    /// Engine settings: `MARATRON_*` environment variables first, then this file
    pub fn engine_config(&self) -> Result<EngineConfig> {
        EngineConfig::from_lookup(|key| {
            std::env::var(key).ok().or_else(|| match key {
                "MARATRON_MONTHLY_GOAL_MILES" => Some(self.stats.monthly_goal_miles.to_string()),
                "MARATRON_DEFAULT_UNIT" => Some(self.profile.default_unit.clone()),
                _ => None,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.profile.user_id, "local");
        assert_eq!(config.profile.vdot, 35.0);
        assert_eq!(config.stats.monthly_goal_miles, 100.0);
        assert_eq!(config.default_unit().unwrap(), DistanceUnit::Miles);
        assert_eq!(config.race_distance().unwrap(), RaceDistance::Marathon);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: Config = toml::from_str("[profile]\nvdot = 48.5\n").unwrap();
        assert_eq!(config.profile.vdot, 48.5);
        assert_eq!(config.profile.default_unit, "miles");
        assert!(config.storage.data_path.is_none());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let serialized = toml::to_string(&config).unwrap();
        let deserialized: Config = toml::from_str(&serialized).unwrap();

        assert_eq!(config.profile.user_id, deserialized.profile.user_id);
        assert_eq!(config.stats.monthly_goal_miles, deserialized.stats.monthly_goal_miles);
    }

    #[test]
    fn test_save_and_load_with_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.profile.default_unit = "km".to_string();
        config.save(Some(&path)).unwrap();

        let loaded = Config::load(Some(&path)).unwrap();
        assert_eq!(loaded.default_unit().unwrap(), DistanceUnit::Kilometers);
    }
}
