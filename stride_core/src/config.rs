//! Configuration file support for Stride.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/stride/config.toml`.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub video: VideoConfig,

    #[serde(default)]
    pub session: SessionConfig,
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

/// Exercise video locator configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VideoConfig {
    #[serde(default = "default_video_base_path")]
    pub base_path: String,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            base_path: default_video_base_path(),
        }
    }
}

impl VideoConfig {
    /// Resource locator for an exercise id under the configured base path
    pub fn src_for(&self, exercise_id: &str) -> String {
        crate::catalog::video_src(&self.base_path, exercise_id)
    }
}

/// Session pacing configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_rest_extension_sec")]
    pub rest_extension_sec: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            rest_extension_sec: default_rest_extension_sec(),
        }
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| {
        let home = std::env::var("HOME").expect("HOME environment variable not set");
        PathBuf::from(home).join(".local/share")
    });
    base.join("stride")
}

fn default_video_base_path() -> String {
    "videos/".into()
}

fn default_rest_extension_sec() -> u32 {
    crate::catalog::REST_DURATION_SEC
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
        let base = dirs::config_dir().unwrap_or_else(|| {
            let home = std::env::var("HOME").expect("HOME environment variable not set");
            PathBuf::from(home).join(".config")
        });
        base.join("stride").join("config.toml")
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
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
