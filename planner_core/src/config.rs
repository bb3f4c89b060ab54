//! Configuration file support for the planner.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/planner/config.toml`.

use crate::distribution::{Aggregator, TieBreak, DEFAULT_TOP_K};
use crate::routine::DEFAULT_CYCLE_COUNT;
use crate::{Error, Result, Routine};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub user: UserConfig,

    #[serde(default)]
    pub routine: RoutineConfig,

    #[serde(default)]
    pub distribution: DistributionConfig,

    #[serde(default)]
    pub analytics: AnalyticsConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Identity the routine is stored under
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UserConfig {
    #[serde(default = "default_user_id")]
    pub id: String,
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            id: default_user_id(),
        }
    }
}

/// Routine defaults
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RoutineConfig {
    #[serde(default = "default_cycle_count")]
    pub default_cycle_count: u32,

    /// Cycle counts offered by front ends; the model accepts any positive count
    #[serde(default = "default_cycle_choices")]
    pub cycle_choices: Vec<u32>,
}

impl Default for RoutineConfig {
    fn default() -> Self {
        Self {
            default_cycle_count: default_cycle_count(),
            cycle_choices: default_cycle_choices(),
        }
    }
}

impl RoutineConfig {
    /// A fresh empty routine using the configured cycle count
    pub fn new_routine(&self) -> Result<Routine> {
        Routine::new(self.default_cycle_count)
    }
}

/// Distribution aggregator settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DistributionConfig {
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    #[serde(default)]
    pub tie_break: TieBreak,
}

impl Default for DistributionConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            tie_break: TieBreak::default(),
        }
    }
}

impl DistributionConfig {
    pub fn aggregator(&self) -> Result<Aggregator> {
        Aggregator::new(self.top_k, self.tie_break)
    }
}

/// Analytics settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    /// Workouts per week that count as 100% consistency
    #[serde(default = "default_weekly_target")]
    pub weekly_target: u32,

    #[serde(default = "default_top_exercises")]
    pub top_exercises: usize,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            weekly_target: default_weekly_target(),
            top_exercises: default_top_exercises(),
        }
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));
    base.join("planner")
}

fn default_user_id() -> String {
    "default".into()
}

fn default_cycle_count() -> u32 {
    DEFAULT_CYCLE_COUNT
}

fn default_cycle_choices() -> Vec<u32> {
    vec![1, 2, 3, 4, 5, 6, 8, 10, 12]
}

fn default_top_k() -> usize {
    DEFAULT_TOP_K
}

fn default_weekly_target() -> u32 {
    5
}

fn default_top_exercises() -> usize {
    5
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Reject values the core would refuse later anyway
    pub fn validate(&self) -> Result<()> {
        if self.routine.default_cycle_count == 0 {
            return Err(Error::Config("routine.default_cycle_count must be at least 1".into()));
        }
        if self.routine.cycle_choices.contains(&0) {
            return Err(Error::Config("routine.cycle_choices must all be at least 1".into()));
        }
        if self.distribution.top_k == 0 {
            return Err(Error::Config("distribution.top_k must be at least 1".into()));
        }
        Ok(())
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
            .unwrap_or_else(|| PathBuf::from("."));
        base.join("planner").join("config.toml")
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }

    pub fn routines_dir(&self) -> PathBuf {
        self.data.data_dir.join("routines")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.routine.default_cycle_count, 4);
        assert_eq!(config.distribution.top_k, 3);
        assert_eq!(config.distribution.tie_break, TieBreak::FirstSeen);
        assert_eq!(config.analytics.weekly_target, 5);
        assert_eq!(config.user.id, "default");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_roundtrip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.routine.default_cycle_count = 8;
        config.distribution.tie_break = TieBreak::Alphabetical;
        config.save_to(&path).unwrap();

        let parsed = Config::load_from(&path).unwrap();
        assert_eq!(parsed.routine.default_cycle_count, 8);
        assert_eq!(parsed.distribution.tie_break, TieBreak::Alphabetical);
        assert_eq!(parsed.routine.cycle_choices, config.routine.cycle_choices);
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
[routine]
default_cycle_count = 1

[distribution]
tie_break = "alphabetical"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.routine.default_cycle_count, 1);
        assert_eq!(config.routine.cycle_choices.len(), 9); // default
        assert_eq!(config.distribution.top_k, 3); // default
        assert_eq!(config.distribution.tie_break, TieBreak::Alphabetical);

        let routine = config.routine.new_routine().unwrap();
        assert_eq!(routine.cycle_count(), 1);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[distribution]\ntop_k = 0\n").unwrap();

        assert!(matches!(Config::load_from(&path), Err(Error::Config(_))));
    }
}
