use crate::config::{BotConfig, Config, WebSocketConfig};
use crate::logging::LogLevel;
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "callisto")]
#[command(about = "A small command bot for nin0-dev's chat server")]
pub struct Cli {
    /// Path to a TOML configuration file (defaults to the per-user config file)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// WebSocket endpoint, e.g. wss://guhws.nin0.dev
    #[arg(long)]
    pub uri: Option<String>,

    /// Bot username
    #[arg(short, long)]
    pub username: Option<String>,

    /// Bot key
    #[arg(short, long)]
    pub key: Option<String>,

    /// Log level: debug, info, warning, error (or 1-4)
    #[arg(short, long)]
    pub log_level: Option<LogLevel>,

    /// Maximum automatic reconnect attempts
    #[arg(long)]
    pub max_trials: Option<u32>,

    /// Do not reconnect after an unexpected close
    #[arg(long)]
    pub no_reconnect: bool,

    /// Command prefix the bot answers to
    #[arg(short, long, default_value = "!")]
    pub prefix: String,
}

impl Cli {
    /// Build the session configuration from the config file and flags.
    ///
    /// Flags override values read from the file.
    pub fn resolve_config(&self) -> Result<Config> {
        let base = match &self.config {
            Some(path) => Some(
                Config::load(path)
                    .with_context(|| format!("Failed to load {}", path.display()))?,
            ),
            None => Config::load_default().context("Failed to load default configuration")?,
        };

        let mut config = match base {
            Some(config) => config,
            None => {
                let username = self
                    .username
                    .clone()
                    .context("No configuration file found; --username is required")?;
                let key = self
                    .key
                    .clone()
                    .context("No configuration file found; --key is required")?;
                Config::new(BotConfig::new(username, key), WebSocketConfig::default())
            }
        };

        if let Some(username) = &self.username {
            config.bot.username = username.clone();
        }
        if let Some(key) = &self.key {
            config.bot.key = key.clone();
        }
        if let Some(uri) = &self.uri {
            config.websocket.uri = uri.clone();
        }
        if let Some(max_trials) = self.max_trials {
            config.websocket.reconnect_max_trials = max_trials;
        }
        if self.no_reconnect {
            config.websocket.reconnect = false;
        }
        if let Some(level) = self.log_level {
            config.log_level = level;
        }

        config.validate().context("Invalid configuration")?;
        Ok(config)
    }
}
