//! Client configuration.
//!
//! A small TOML file at the platform config location. The API key may live
//! in the file or in `ATLAS_API_KEY`; the environment wins so ephemeral
//! shells can override a saved key.

use std::error::Error as StdError;
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

pub const DEFAULT_BASE_URL: &str = "https://api.atlashq.io/v1";

/// Errors that can occur when loading configuration from disk.
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to parse the configuration file as valid TOML.
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Read { path, source } => {
                write!(f, "Failed to read config at {}: {}", path.display(), source)
            }
            ConfigError::Parse { path, source } => {
                write!(f, "Failed to parse config at {}: {}", path.display(), source)
            }
        }
    }
}

impl StdError for ConfigError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            ConfigError::Read { source, .. } => Some(source),
            ConfigError::Parse { source, .. } => Some(source),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct Config {
    /// Atlas API base URL. Falls back to the hosted endpoint.
    pub base_url: Option<String>,
    /// API key; `ATLAS_API_KEY` takes precedence when set.
    pub api_key: Option<String>,
    /// Agent to open chat with when `--agent` is not given.
    pub default_agent: Option<String>,
}

impl Config {
    pub fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("io", "atlashq", "atlas-chat")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    pub fn load() -> Result<Self, ConfigError> {
        let Some(path) = Self::config_path() else {
            return Ok(Config::default());
        };
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Write the config atomically: temp file in the same directory, then
    /// rename over the target.
    pub fn save_to(&self, path: &Path) -> Result<(), Box<dyn StdError + Send + Sync>> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        let mut temp = NamedTempFile::new_in(parent)?;
        let contents = toml::to_string_pretty(self)?;
        temp.write_all(contents.as_bytes())?;
        temp.flush()?;
        temp.persist(path)?;
        Ok(())
    }

    pub fn effective_base_url(&self) -> String {
        std::env::var("ATLAS_BASE_URL")
            .ok()
            .or_else(|| self.base_url.clone())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
    }

    pub fn resolve_api_key(&self) -> Result<String, Box<dyn StdError + Send + Sync>> {
        if let Ok(key) = std::env::var("ATLAS_API_KEY") {
            if !key.is_empty() {
                return Ok(key);
            }
        }
        self.api_key.clone().ok_or_else(|| {
            "No API key configured.\n\nEither set it in the config file or export it:\n  export ATLAS_API_KEY=\"your-api-key-here\""
                .into()
        })
    }

    /// Resolve the agent to chat with: explicit flag, then config default.
    pub fn resolve_agent(&self, flag: Option<String>) -> Result<String, Box<dyn StdError + Send + Sync>> {
        flag.or_else(|| self.default_agent.clone()).ok_or_else(|| {
            "No agent selected. Pass --agent <AGENT_ID> or set default_agent in the config file."
                .into()
        })
    }
}
