//! TOML file configuration structures.
//!
//! These structs directly map to the `ctfbot.toml` file format.

use ctfbot_core::poll::{PollEmoji, PollEmojis};
use ctfbot_sdk::client::CtftimeClient;
use ctfbot_sdk::objects::SITE_ORIGIN;
use serde::{Deserialize, Serialize};
use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use url::Url;

/// Root configuration structure as read from the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub votes: VotesConfig,
    #[serde(default)]
    pub poll: PollConfig,
    pub credentials: CredentialsConfig,
    #[serde(default)]
    pub discord: DiscordConfig,
}

/// Server configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The address and port to listen on (e.g., "127.0.0.1:8080").
    #[serde(default = "default_listen_addr")]
    pub listen: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen_addr(),
        }
    }
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from((Ipv4Addr::LOCALHOST, 8080))
}

/// Where event data is fetched from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    #[serde(default = "default_base_url")]
    pub base_url: Url,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> Url {
    Url::parse(SITE_ORIGIN).expect("valid site origin")
}

fn default_user_agent() -> String {
    CtftimeClient::DEFAULT_USER_AGENT.to_string()
}

fn default_timeout_secs() -> u64 {
    CtftimeClient::DEFAULT_TIMEOUT.as_secs()
}

/// Vote file location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VotesConfig {
    #[serde(default = "default_votes_path")]
    pub path: PathBuf,
}

impl Default for VotesConfig {
    fn default() -> Self {
        Self {
            path: default_votes_path(),
        }
    }
}

fn default_votes_path() -> PathBuf {
    PathBuf::from("votes.json")
}

/// Emoji attached to poll announcements.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollConfig {
    pub yes_emoji: PollEmoji,
    pub no_emoji: PollEmoji,
}

impl Default for PollConfig {
    fn default() -> Self {
        let PollEmojis { yes, no } = PollEmojis::default();
        Self {
            yes_emoji: yes,
            no_emoji: no,
        }
    }
}

/// Files holding the chat credentials. Their content is read at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialsConfig {
    pub bot_token_file: PathBuf,
    pub webhook_url_file: PathBuf,
}

/// Chat platform REST endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscordConfig {
    #[serde(default = "default_api_base")]
    pub api_base: Url,
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
        }
    }
}

fn default_api_base() -> Url {
    Url::parse("https://discord.com/api/v10/").expect("valid default api base")
}
