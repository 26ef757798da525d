//! Configuration file support for the novena tracker.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/novena/config.toml`.

use crate::recommend::LiturgicalCalendarConfig;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub liturgical: LiturgicalConfig,

    #[serde(default)]
    pub novena: NovenaConfig,
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

/// Feast source and recommendation settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LiturgicalConfig {
    #[serde(flatten)]
    pub recommendations: LiturgicalCalendarConfig,

    #[serde(default = "default_provider_timeout_secs")]
    pub provider_timeout_secs: u64,

    /// Directory of `{year}.json` calendars; the bundled calendar is used when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calendar_dir: Option<PathBuf>,
}

impl Default for LiturgicalConfig {
    fn default() -> Self {
        Self {
            recommendations: LiturgicalCalendarConfig::default(),
            provider_timeout_secs: default_provider_timeout_secs(),
            calendar_dir: None,
        }
    }
}

impl LiturgicalConfig {
    pub fn provider_timeout(&self) -> Duration {
        Duration::from_secs(self.provider_timeout_secs)
    }
}

/// Novena defaults
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NovenaConfig {
    #[serde(default = "default_intention")]
    pub default_intention: String,
}

impl Default for NovenaConfig {
    fn default() -> Self {
        Self {
            default_intention: default_intention(),
        }
    }
}

fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| home_dir().join(".local/share"));
    base.join("novena")
}

fn default_provider_timeout_secs() -> u64 {
    10
}

fn default_intention() -> String {
    crate::prayers::DEFAULT_INTENTION.to_string()
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
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| home_dir().join(".config"));
        base.join("novena").join("config.toml")
    }

    /// Save the current configuration to the default path
    pub fn save(&self) -> Result<()> {
        let config_path = Self::default_config_path();
        self.save_to(&config_path)
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
}
