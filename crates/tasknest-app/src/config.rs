//! User configuration loaded from `config.toml`.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use tasknest_core::{Category, Priority, SortKey, StatusFilter};

const APP_DIR: &str = "tasknest";
const CONFIG_FILE: &str = "config.toml";
const DATA_FILE: &str = "tasks.json";

/// Resolved application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppConfig {
    data_file: Option<PathBuf>,
    /// Defaults applied to new tasks and listings.
    pub defaults: DefaultsConfig,
}

/// `[defaults]` block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DefaultsConfig {
    /// Category for `add` when none is given.
    pub category: Category,
    /// Priority for `add` when none is given.
    pub priority: Priority,
    /// Sort order for `ls` when none is given.
    pub sort: SortKey,
    /// Status filter for `ls` when none is given.
    pub status: StatusFilter,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default)]
    data_file: Option<PathBuf>,
    #[serde(default)]
    defaults: RawDefaults,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawDefaults {
    category: Option<String>,
    priority: Option<String>,
    sort: Option<String>,
    status: Option<String>,
}

impl AppConfig {
    /// Load configuration from `explicit`, or from the per-user config
    /// directory when no path is given.
    ///
    /// A missing file at the default location yields the built-in defaults;
    /// a missing explicit file is an error.
    ///
    /// # Errors
    /// Fails when the file cannot be read or holds invalid values.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        match default_config_path() {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load configuration from a specific file.
    ///
    /// A relative `data_file` is resolved against the directory holding the
    /// config file.
    ///
    /// # Errors
    /// Fails when the file cannot be read or holds invalid values.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents =
            fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
        let mut config =
            Self::from_toml_str(&contents).with_context(|| format!("failed to parse {}", path.display()))?;
        if let (Some(data_file), Some(base)) = (config.data_file.as_mut(), path.parent()) {
            if data_file.is_relative() {
                *data_file = base.join(&*data_file);
            }
        }
        Ok(config)
    }

    /// Parse configuration from TOML text.
    ///
    /// # Errors
    /// Fails on malformed TOML, unknown keys or unknown enum values.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let raw: RawConfig = toml::from_str(contents)?;
        Ok(Self {
            data_file: raw.data_file,
            defaults: raw.defaults.resolve()?,
        })
    }

    /// Override the data file location.
    #[must_use]
    pub fn with_data_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_file = Some(path.into());
        self
    }

    /// Data file location: the configured one, or `<data_dir>/tasknest/tasks.json`.
    ///
    /// # Errors
    /// Fails when nothing is configured and the platform has no data directory.
    pub fn data_file(&self) -> Result<PathBuf> {
        if let Some(path) = &self.data_file {
            return Ok(path.clone());
        }
        default_data_file().ok_or_else(|| anyhow!("no data directory available; set `data_file` in {CONFIG_FILE}"))
    }
}

impl RawDefaults {
    fn resolve(self) -> Result<DefaultsConfig> {
        let mut defaults = DefaultsConfig::default();
        if let Some(raw) = self.category {
            defaults.category = raw.parse().context("invalid defaults.category")?;
        }
        if let Some(raw) = self.priority {
            defaults.priority = raw.parse().context("invalid defaults.priority")?;
        }
        if let Some(raw) = self.sort {
            defaults.sort = raw.parse().context("invalid defaults.sort")?;
        }
        if let Some(raw) = self.status {
            defaults.status = raw.parse().context("invalid defaults.status")?;
        }
        Ok(defaults)
    }
}

/// `<config_dir>/tasknest/config.toml`, if the platform has a config directory.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
}

/// `<data_dir>/tasknest/tasks.json`, if the platform has a data directory.
pub fn default_data_file() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join(APP_DIR).join(DATA_FILE))
}
