use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{Error, Result};

/// The app theme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Follow the platform preference
    #[default]
    Auto,
    Light,
    Dark,
}

impl Theme {
    /// Every accepted theme, in declaration order
    pub const ALL: [Theme; 3] = [Theme::Auto, Theme::Light, Theme::Dark];

    /// Returns the stored literal for this theme
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Auto => "auto",
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Theme::ALL
            .into_iter()
            .find(|theme| theme.as_str() == s)
            .ok_or_else(|| Error::validation("theme", s))
    }
}

/// Configuration for an hms_divide context
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// File backing the durable options store
    pub storage_path: PathBuf,
    /// How long toasts stay before clearing themselves
    #[serde(serialize_with = "super::serde::serialize_millis")]
    #[serde(deserialize_with = "super::serde::deserialize_millis")]
    pub toast_timeout: Duration,
    /// Capacity of the storage change broadcast channel
    pub change_buffer: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            storage_path: PathBuf::from(super::DEFAULT_STORAGE_PATH),
            toast_timeout: super::DEFAULT_TOAST_TIMEOUT,
            change_buffer: super::DEFAULT_CHANGE_BUFFER,
        }
    }
}

impl Config {
    /// Loads a configuration from a JSON file; missing fields use defaults
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        tracing::info!("Loading config from `{}`", path.display());
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&contents)
            .map_err(|e| {
                Error::config(format!("Error parsing config file {}: {}", path.display(), e))
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that the configuration is usable
    pub fn validate(&self) -> Result<()> {
        if self.change_buffer == 0 {
            return Err(Error::config("change_buffer must be greater than 0"));
        }
        if self.storage_path.as_os_str().is_empty() {
            return Err(Error::config("storage_path must not be empty"));
        }
        Ok(())
    }
}
