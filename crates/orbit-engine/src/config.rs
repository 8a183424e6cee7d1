use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use orbit_db::DatabaseConfig;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct EngineConfig {
    #[serde(default)]
    pub database: DatabaseSection,

    #[serde(default)]
    pub tracking: TrackingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseSection {
    pub path: String,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        let data_dir = dirs::data_dir().unwrap_or_else(|| PathBuf::from("/tmp")).join("orbit");

        Self { path: data_dir.join("usage.db").to_string_lossy().to_string() }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TrackingConfig {
    /// Screen-time goal the health score is measured against.
    pub daily_goal_minutes: i64,
    /// Our own package; excluded from displayed app lists.
    pub host_package: String,
    /// Entries below this foreground time are hidden from displayed lists.
    pub min_display_duration_ms: i64,
    /// How long after startup the one-shot backfill waits before running.
    pub backfill_delay_secs: u64,
    /// Interval of the recurring "save today" task.
    pub save_interval_secs: u64,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            daily_goal_minutes: 180,
            host_package: String::new(),
            min_display_duration_ms: 60_000,
            backfill_delay_secs: 10,
            save_interval_secs: 1800,
        }
    }
}

impl EngineConfig {
    /// Default configuration file path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("/tmp"))
            .join("orbit")
            .join("engine.toml")
    }

    /// Load configuration from file, creating default if it doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        Self::load_from_path(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from_path(config_path: &Path) -> Result<Self> {
        debug!("Loading engine configuration from {:?}", config_path);

        if !config_path.exists() {
            info!("Configuration file not found at {:?}, creating default configuration", config_path);
            let default_config = Self::default();
            default_config.save_to_path(config_path)?;
            return Ok(default_config);
        }

        let config_content = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {:?}", config_path))?;

        let config: EngineConfig = toml::from_str(&config_content)
            .with_context(|| format!("Failed to parse config file: {:?}", config_path))?;

        info!("Loaded engine configuration from {:?}", config_path);
        Ok(config)
    }

    /// Save configuration to a specific path
    pub fn save_to_path(&self, config_path: &Path) -> Result<()> {
        debug!("Saving engine configuration to {:?}", config_path);

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let config_content = toml::to_string_pretty(self)
            .with_context(|| "Failed to serialize configuration to TOML")?;

        fs::write(config_path, config_content)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;

        Ok(())
    }

    pub fn database_config(&self) -> DatabaseConfig {
        DatabaseConfig { path: self.database.path.clone() }
    }
}
