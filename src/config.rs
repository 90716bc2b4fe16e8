use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::ExtractionMode;

/// Batch tool configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Extractor used when none is given on the command line
    pub mode: ExtractionMode,

    /// Cell separator of the `<directory>.csv` output
    pub delimiter: String,

    /// Output files written next to a processed directory
    pub write_xml: bool,
    pub write_delimited: bool,

    /// Worker threads for extraction; all cores when unset
    pub workers: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            mode: ExtractionMode::FormFields,
            delimiter: "|".to_string(),
            write_xml: true,
            write_delimited: true,
            workers: None,
        }
    }
}

impl Config {
    /// Load configuration from config directory
    pub fn load() -> Result<Self> {
        if let Some(config_path) = Self::get_config_path() {
            if config_path.exists() {
                let content = fs::read_to_string(&config_path)?;
                return Self::from_toml(&content);
            }
        }

        // Return default configuration if no config found
        Ok(Config::default())
    }

    /// Parse and validate configuration text
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to config directory
    pub fn save(&self) -> Result<()> {
        if let Some(config_path) = Self::get_config_path() {
            // Create config directory if it doesn't exist
            if let Some(parent) = config_path.parent() {
                fs::create_dir_all(parent)?;
            }

            let content = toml::to_string_pretty(self)?;
            fs::write(&config_path, content)?;
        }

        Ok(())
    }

    /// Get the path to the config file
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("questionnaires").join("config.toml"))
    }

    /// Initialize default config file
    pub fn init_default() -> Result<()> {
        let config = Config::default();
        config.save()?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.delimiter.is_empty() {
            bail!("delimiter must not be empty");
        }
        if self.workers == Some(0) {
            bail!("workers must be at least 1");
        }
        Ok(())
    }
}
