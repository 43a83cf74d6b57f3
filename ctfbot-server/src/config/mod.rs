//! Configuration module for ctfbot-server.
//!
//! Handles loading configuration from TOML files and CLI arguments, and
//! reading the credential files the configuration points at.

pub mod file;

use crate::config::file::FileConfig;
use ctfbot_core::poll::PollEmojis;
use std::fmt;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    ValidationError(String),

    #[error("failed to read credential file {path:?}: {source}")]
    CredentialFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid webhook url: {0}")]
    InvalidWebhookUrl(#[from] url::ParseError),
}

/// Server settings after overrides and validation.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub listen: SocketAddr,
    pub upstream_base_url: Url,
    pub user_agent: String,
    pub upstream_timeout: Duration,
    pub votes_path: PathBuf,
    pub emojis: PollEmojis,
    pub discord_api_base: Url,
    pub bot_token_file: PathBuf,
    pub webhook_url_file: PathBuf,
}

/// Chat credentials read from their files.
#[derive(Clone)]
pub struct Credentials {
    pub bot_token: String,
    pub webhook_url: Url,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("bot_token", &"<redacted>")
            .field("webhook_url", &"<redacted>")
            .finish()
    }
}

/// Configuration loader that handles the complete loading process.
pub struct ConfigLoader {
    config_path: PathBuf,
    listen_override: Option<SocketAddr>,
}

impl ConfigLoader {
    /// Create a new config loader.
    pub fn new(config_path: impl AsRef<Path>, listen_override: Option<SocketAddr>) -> Self {
        Self {
            config_path: config_path.as_ref().to_path_buf(),
            listen_override,
        }
    }

    /// Load and process the configuration.
    ///
    /// This will:
    /// 1. Read the TOML file
    /// 2. Apply CLI overrides
    /// 3. Validate the configuration
    pub fn load(&self) -> Result<LoadedConfig, ConfigError> {
        let config_content = std::fs::read_to_string(&self.config_path)?;
        self.load_str(&config_content)
    }

    fn load_str(&self, content: &str) -> Result<LoadedConfig, ConfigError> {
        let mut file_config: FileConfig = toml::from_str(content)?;

        if let Some(listen) = self.listen_override {
            file_config.server.listen = listen;
        }

        validate(&file_config)?;
        Ok(build_loaded_config(file_config))
    }
}

fn validate(config: &FileConfig) -> Result<(), ConfigError> {
    if config.poll.yes_emoji.id == config.poll.no_emoji.id {
        return Err(ConfigError::ValidationError(format!(
            "yes and no emoji share the id {}",
            config.poll.yes_emoji.id
        )));
    }
    if config.upstream.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "upstream.timeout_secs must be greater than zero".to_string(),
        ));
    }
    // Endpoint paths are joined onto the base, which drops a last segment
    // that has no trailing slash.
    if !config.discord.api_base.path().ends_with('/') {
        return Err(ConfigError::ValidationError(format!(
            "discord.api_base must end with '/': {}",
            config.discord.api_base
        )));
    }
    Ok(())
}

fn build_loaded_config(file_config: FileConfig) -> LoadedConfig {
    let FileConfig {
        server,
        upstream,
        votes,
        poll,
        credentials,
        discord,
    } = file_config;

    LoadedConfig {
        listen: server.listen,
        upstream_base_url: upstream.base_url,
        user_agent: upstream.user_agent,
        upstream_timeout: Duration::from_secs(upstream.timeout_secs),
        votes_path: votes.path,
        emojis: PollEmojis {
            yes: poll.yes_emoji,
            no: poll.no_emoji,
        },
        discord_api_base: discord.api_base,
        bot_token_file: credentials.bot_token_file,
        webhook_url_file: credentials.webhook_url_file,
    }
}

impl LoadedConfig {
    /// Read the bot token and webhook URL. Surrounding whitespace is trimmed.
    pub fn read_credentials(&self) -> Result<Credentials, ConfigError> {
        let bot_token = read_secret(&self.bot_token_file)?;
        let webhook_url = Url::parse(&read_secret(&self.webhook_url_file)?)?;
        Ok(Credentials {
            bot_token,
            webhook_url,
        })
    }
}

fn read_secret(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path)
        .map(|content| content.trim().to_string())
        .map_err(|source| ConfigError::CredentialFile {
            path: path.to_path_buf(),
            source,
        })
}
