//! Optional `~/.hacker_stories/config.toml`.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::query::API_BASE;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid TOML in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// The file as written by the user; anything left out takes its default.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    pub api_base: Option<String>,
    #[serde(default)]
    pub default_search: Option<String>,
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
    #[serde(default)]
    pub log_level: Option<String>,
    #[serde(default)]
    pub log_file_path: Option<PathBuf>,
    #[serde(default)]
    pub dark_mode: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub api_base: String,
    pub default_search: String,
    pub request_timeout: Duration,
    pub log_level: String,
    pub log_file_path: PathBuf,
    pub dark_mode: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base: API_BASE.to_string(),
            default_search: "React".to_string(),
            request_timeout: Duration::from_secs(30),
            log_level: "info".to_string(),
            log_file_path: config_dir().join("hacker_stories.log"),
            dark_mode: true,
        }
    }
}

impl AppConfig {
    pub fn merge(file: ConfigFile) -> Self {
        let defaults = Self::default();
        Self {
            api_base: file.api_base.unwrap_or(defaults.api_base),
            default_search: file.default_search.unwrap_or(defaults.default_search),
            request_timeout: file
                .request_timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),
            log_level: file.log_level.unwrap_or(defaults.log_level),
            log_file_path: file.log_file_path.unwrap_or(defaults.log_file_path),
            dark_mode: file.dark_mode.unwrap_or(defaults.dark_mode),
        }
    }
}

pub fn config_dir() -> PathBuf {
    dirs_next::home_dir()
        .map(|home| home.join(".hacker_stories"))
        .unwrap_or_else(|| PathBuf::from(".hacker_stories"))
}

pub fn default_config_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// A missing file is not an error: it yields `Ok(None)`.
pub fn load_config_file(path: &Path) -> Result<Option<ConfigFile>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let file = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(Some(file))
}

pub fn load(path: &Path) -> Result<AppConfig, ConfigError> {
    let file = load_config_file(path)?.unwrap_or_default();
    Ok(AppConfig::merge(file))
}
