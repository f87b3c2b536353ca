//! Configuration file support for Grounded.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/grounded/config.toml`.

use crate::{Catalog, Error, ExerciseDefinition, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub exercises: ExercisesConfig,
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

/// Session behaviour for the terminal host
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Wait `step_seconds` on timed steps and advance automatically
    #[serde(default)]
    pub pace_timed_steps: bool,

    /// Window used by `status` for per-exercise totals
    #[serde(default = "default_history_days")]
    pub history_days: i64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            pace_timed_steps: false,
            history_days: default_history_days(),
        }
    }
}

/// User-defined exercises appended to the built-in catalog
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct ExercisesConfig {
    #[serde(default)]
    pub custom: Vec<ExerciseDefinition>,
}

fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| home_dir().join(".local/share"));
    base.join("grounded")
}

fn default_history_days() -> i64 {
    7
}

fn home_dir() -> PathBuf {
    dirs::home_dir()
        .or_else(|| std::env::var_os("HOME").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("."))
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!(
                "No config file found at {:?}, using defaults",
                config_path
            );
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

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| home_dir().join(".config"));
        base.join("grounded").join("config.toml")
    }

    fn validate(&self) -> Result<()> {
        if self.session.history_days < 1 {
            return Err(Error::Config(format!(
                "session.history_days must be at least 1, got {}",
                self.session.history_days
            )));
        }
        Ok(())
    }

    /// The catalog to run: `base` followed by any custom exercises
    pub fn catalog(&self, base: &Catalog) -> Result<Catalog> {
        if self.exercises.custom.is_empty() {
            return Ok(base.clone());
        }
        base.with_additional(self.exercises.custom.clone())
    }

    /// Journal path under the data directory
    pub fn wal_path(data_dir: &Path) -> PathBuf {
        data_dir.join("wal").join("completions.wal")
    }

    /// CSV archive path under the data directory
    pub fn csv_path(data_dir: &Path) -> PathBuf {
        data_dir.join("completions.csv")
    }
}
