use crate::logging::LogLevel;
use crate::messages::ChatMessage;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_URI: &str = "wss://guhws.nin0.dev";
pub const DEFAULT_RECONNECT_MAX_TRIALS: u32 = 5;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read configuration file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Could not determine configuration directory")]
    NoConfigDir,
}

/// Identity the session sends with every message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BotConfig {
    pub username: String,
    pub key: String,
    /// Reserved for backlog delivery; nothing fills it yet
    #[serde(default)]
    pub stale_messages: Vec<ChatMessage>,
}

impl BotConfig {
    pub fn new(username: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            key: key.into(),
            stale_messages: Vec::new(),
        }
    }
}

/// Endpoint and reconnect policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebSocketConfig {
    #[serde(default = "default_uri")]
    pub uri: String,
    #[serde(default = "default_reconnect")]
    pub reconnect: bool,
    #[serde(default = "default_reconnect_max_trials")]
    pub reconnect_max_trials: u32,
}

impl Default for WebSocketConfig {
    fn default() -> Self {
        Self {
            uri: default_uri(),
            reconnect: default_reconnect(),
            reconnect_max_trials: default_reconnect_max_trials(),
        }
    }
}

impl WebSocketConfig {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            ..Self::default()
        }
    }

    pub fn with_reconnect(mut self, reconnect: bool) -> Self {
        self.reconnect = reconnect;
        self
    }

    pub fn with_max_trials(mut self, reconnect_max_trials: u32) -> Self {
        self.reconnect_max_trials = reconnect_max_trials;
        self
    }
}

fn default_uri() -> String {
    DEFAULT_URI.to_string()
}

fn default_reconnect() -> bool {
    true
}

fn default_reconnect_max_trials() -> u32 {
    DEFAULT_RECONNECT_MAX_TRIALS
}

/// Session configuration, fixed for the lifetime of a client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub log_level: LogLevel,
    pub bot: BotConfig,
    #[serde(default)]
    pub websocket: WebSocketConfig,
}

impl Config {
    pub fn new(bot: BotConfig, websocket: WebSocketConfig) -> Self {
        Self {
            log_level: LogLevel::default(),
            bot,
            websocket,
        }
    }

    pub fn with_log_level(mut self, log_level: LogLevel) -> Self {
        self.log_level = log_level;
        self
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Get the default config file path
    pub fn default_config_file() -> Result<PathBuf, ConfigError> {
        ProjectDirs::from("dev", "callisto", "callisto")
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .ok_or(ConfigError::NoConfigDir)
    }

    /// Load the default config file if there is one
    pub fn load_default() -> Result<Option<Self>, ConfigError> {
        let path = Self::default_config_file()?;
        if path.exists() {
            Self::load(&path).map(Some)
        } else {
            Ok(None)
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bot.username.trim().is_empty() {
            return Err(ConfigError::Invalid("bot.username must not be empty".into()));
        }
        if self.websocket.uri.trim().is_empty() {
            return Err(ConfigError::Invalid("websocket.uri must not be empty".into()));
        }
        Ok(())
    }
}
