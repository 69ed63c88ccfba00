//! Configuration management for prodbook.
//!
//! Handles loading configuration from TOML files. Every key is
//! optional; a partial file overrides only what it names.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::core::row::DEFAULT_RUN_COLUMNS;
use crate::writer::OutputFormat;

/// Project-local configuration file name.
pub const PROJECT_CONFIG_FILE: &str = ".prodbook.toml";

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Logbook synthesis settings
    pub logbook: LogbookConfig,

    /// Output settings
    pub output: OutputConfig,
}

/// Logbook synthesis settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogbookConfig {
    /// Number of run columns per row
    pub run_columns: usize,
}

/// Output settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Format sheets are written in
    pub format: OutputFormat,

    /// Directory sheet files are written into
    pub dir: PathBuf,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Looks for config in:
    /// 1. `.prodbook.toml` in current directory
    /// 2. `~/.config/prodbook/config.toml`
    /// 3. Falls back to defaults
    pub fn load() -> anyhow::Result<Self> {
        // Try local config first
        let local_config = PathBuf::from(PROJECT_CONFIG_FILE);
        if local_config.exists() {
            return Self::load_from_file(&local_config);
        }

        // Try global config
        if let Some(config_dir) = dirs::config_dir() {
            let global_config = config_dir.join("prodbook").join("config.toml");
            if global_config.exists() {
                return Self::load_from_file(&global_config);
            }
        }

        // Return defaults
        Ok(Self::default())
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("invalid config file {}", path.display()))?;
        Ok(config)
    }

    /// Save configuration to the global config file.
    pub fn save(&self) -> anyhow::Result<()> {
        let config_dir = Self::config_dir()
            .ok_or_else(|| anyhow::anyhow!("could not determine config directory"))?;
        self.save_to(&config_dir.join("config.toml"))
    }

    /// Save configuration to a specific file, creating parent
    /// directories as needed.
    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("failed to create config directory {}", parent.display())
                })?;
            }
        }

        let content = self.to_toml()?;
        std::fs::write(path, content)
            .with_context(|| format!("failed to write config file {}", path.display()))?;

        Ok(())
    }

    /// Render the current settings as a TOML document.
    pub fn to_toml(&self) -> anyhow::Result<String> {
        toml::to_string_pretty(self).context("failed to serialize configuration")
    }

    /// Get the config directory path.
    pub fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("prodbook"))
    }
}

impl Default for LogbookConfig {
    fn default() -> Self {
        Self { run_columns: DEFAULT_RUN_COLUMNS }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { format: OutputFormat::Csv, dir: PathBuf::from(".") }
    }
}
