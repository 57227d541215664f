//! Configuration for the menu service
//!
//! Settings come from a JSON file when one is given (or `./config.json`
//! exists), otherwise from environment variables. The three upstream
//! identities are required and checked by [`Config::validate`] before any
//! request is built.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::data::extract::DEFAULT_MARKER_ID;
use crate::data::upstream::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};
use crate::data::SelectionMode;

/// File looked up in the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "config.json";

/// Errors raised while loading or validating configuration
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// A required setting is absent or blank
    #[error("Missing required setting: {0}")]
    Missing(&'static str),

    /// The config file could not be read
    #[error("Failed to read config file {path}: {reason}")]
    Read { path: PathBuf, reason: String },

    /// The config file is not valid JSON for this shape
    #[error("Failed to parse config file {path}: {reason}")]
    Parse { path: PathBuf, reason: String },
}

/// Settings consumed by the resolver and the upstream client
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// BiteMenu menu identity
    pub menu_id: String,
    /// BiteMenu location identity
    pub location_id: String,
    /// Site identity sent as `whereami`
    pub where_am_i: String,
    /// Upstream endpoint
    pub base_url: String,
    /// Element id of the embedded payload
    pub marker_id: String,
    /// Cache directory, platform default when `None`
    pub cache_dir: Option<PathBuf>,
    /// How the requested day is selected from a batch
    pub mode: SelectionMode,
    /// Upper bound on a single upstream request
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            menu_id: String::new(),
            location_id: String::new(),
            where_am_i: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            marker_id: DEFAULT_MARKER_ID.to_string(),
            cache_dir: None,
            mode: SelectionMode::default(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Config {
    /// Loads configuration from `path`, `./config.json`, or the environment
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))
            }
            None => Ok(Self::from_env()),
        }
    }

    /// Parses a JSON config file; unknown keys (e.g. a bot token) are ignored
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        serde_json::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Reads `MENU_ID`, `LOCATION_ID`, `WHERE_AM_I`, and the optional
    /// `MENU_BASE_URL` and `MENU_CACHE_DIR`
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            menu_id: lookup("MENU_ID").unwrap_or_default(),
            location_id: lookup("LOCATION_ID").unwrap_or_default(),
            where_am_i: lookup("WHERE_AM_I").unwrap_or_default(),
            base_url: lookup("MENU_BASE_URL").unwrap_or(defaults.base_url),
            cache_dir: lookup("MENU_CACHE_DIR").map(PathBuf::from),
            ..defaults
        }
    }

    /// Checks that every identity needed to build a request is present
    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("menu_id", &self.menu_id),
            ("location_id", &self.location_id),
            ("where_am_i", &self.where_am_i),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::Missing(name));
            }
        }
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::Missing("base_url"));
        }
        Ok(())
    }
}
