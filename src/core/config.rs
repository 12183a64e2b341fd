//! Read-only configuration: `config.toml` plus environment and CLI overrides.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::core::constants::{API_KEY_ENV_VAR, BASE_URL_ENV_VAR, DEFAULT_BASE_URL, DEFAULT_MODEL};
use crate::ui::theme::ThemeMode;

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

#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct Config {
    /// Model identifier sent with every request
    pub model: Option<String>,
    /// Base URL of the completion API (e.g. "https://api.openai.com/v1")
    pub base_url: Option<String>,
    /// Initial theme: "light" or "dark"
    pub theme: Option<String>,
}

impl Config {
    /// Load from the platform config directory. A missing file yields defaults.
    pub fn load() -> Result<Config, ConfigError> {
        match Self::default_config_path() {
            Some(path) => Self::load_from_path(&path),
            None => Ok(Config::default()),
        }
    }

    pub fn load_from_path(config_path: &Path) -> Result<Config, ConfigError> {
        if !config_path.exists() {
            return Ok(Config::default());
        }
        let contents = fs::read_to_string(config_path).map_err(|source| ConfigError::Read {
            path: config_path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: config_path.to_path_buf(),
            source,
        })
    }

    pub fn default_config_path() -> Option<PathBuf> {
        ProjectDirs::from("org", "chatbox", "chatbox")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }
}

/// Values given on the command line; they win over everything else.
#[derive(Debug, Default, Clone)]
pub struct SettingOverrides {
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub theme: Option<ThemeMode>,
}

/// Fully resolved settings for one chat session. Fixed for the session's lifetime.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSettings {
    pub model: String,
    pub base_url: String,
    pub api_key: Option<String>,
    pub theme: ThemeMode,
}

impl SessionSettings {
    /// Resolve using the process environment.
    pub fn from_environment(config: &Config, overrides: &SettingOverrides) -> Self {
        Self::resolve(config, overrides, |name| std::env::var(name).ok())
    }

    /// Precedence: overrides, then environment, then config file, then defaults.
    /// The API key only ever comes from the environment.
    pub fn resolve<F>(config: &Config, overrides: &SettingOverrides, env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |value: Option<String>| value.filter(|v| !v.trim().is_empty());

        let model = non_blank(overrides.model.clone())
            .or_else(|| non_blank(config.model.clone()))
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let base_url = non_blank(overrides.base_url.clone())
            .or_else(|| non_blank(env(BASE_URL_ENV_VAR)))
            .or_else(|| non_blank(config.base_url.clone()))
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let theme = overrides.theme.unwrap_or_else(|| match config.theme.as_deref() {
            None => ThemeMode::default(),
            Some(name) => name.parse().unwrap_or_else(|_| {
                warn!(theme = name, "unknown theme in config; using light");
                ThemeMode::default()
            }),
        });

        SessionSettings {
            model,
            base_url,
            api_key: non_blank(env(API_KEY_ENV_VAR)),
            theme,
        }
    }
}
