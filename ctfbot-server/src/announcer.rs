//! Poll delivery to Discord.
//!
//! Announcements go out through the channel webhook with `?wait=true` so the
//! response carries the created message. Reactions are attached through the
//! bot REST API, since webhooks cannot react.

use async_trait::async_trait;
use ctfbot_core::poll::{AnnounceError, AnnouncedMessage, Announcer, PollEmoji};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Sends poll announcements through a webhook and reacts with the bot token.
pub struct DiscordAnnouncer {
    http_client: reqwest::Client,
    webhook_url: Url,
    api_base: Url,
    bot_token: String,
}

#[derive(Serialize)]
struct WebhookMessage<'a> {
    content: &'a str,
}

/// The part of the created message we need. Snowflakes arrive as strings.
#[derive(Deserialize)]
struct CreatedMessage {
    id: String,
    channel_id: String,
}

impl DiscordAnnouncer {
    pub fn new(
        webhook_url: Url,
        api_base: Url,
        bot_token: String,
        timeout: Duration,
    ) -> Result<Self, AnnounceError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AnnounceError::Transport(e.to_string()))?;
        Ok(Self {
            http_client,
            webhook_url,
            api_base,
            bot_token,
        })
    }

    fn reaction_url(
        &self,
        message: &AnnouncedMessage,
        emoji: &PollEmoji,
    ) -> Result<Url, AnnounceError> {
        let emoji = urlencoding::encode(&format!("{}:{}", emoji.name, emoji.id)).into_owned();
        let path = format!(
            "channels/{}/messages/{}/reactions/{}/@me",
            message.channel_id, message.message_id, emoji
        );
        self.api_base
            .join(&path)
            .map_err(|e| AnnounceError::InvalidResponse(e.to_string()))
    }
}

async fn reject(response: reqwest::Response) -> AnnounceError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    AnnounceError::Rejected { status, body }
}

fn parse_snowflake(value: &str, field: &str) -> Result<u64, AnnounceError> {
    value.parse().map_err(|_| {
        AnnounceError::InvalidResponse(format!("{field} is not a snowflake: {value}"))
    })
}

#[async_trait]
impl Announcer for DiscordAnnouncer {
    async fn post(&self, content: &str) -> Result<AnnouncedMessage, AnnounceError> {
        let mut url = self.webhook_url.clone();
        url.query_pairs_mut().append_pair("wait", "true");

        let response = self
            .http_client
            .post(url)
            .json(&WebhookMessage { content })
            .send()
            .await
            .map_err(|e| AnnounceError::Transport(e.to_string()))?;
        if !response.status().is_success() {
            return Err(reject(response).await);
        }

        let created: CreatedMessage = response
            .json()
            .await
            .map_err(|e| AnnounceError::InvalidResponse(e.to_string()))?;
        let message = AnnouncedMessage {
            message_id: parse_snowflake(&created.id, "id")?,
            channel_id: parse_snowflake(&created.channel_id, "channel_id")?,
        };
        tracing::debug!(message_id = message.message_id, "Announcement posted");
        Ok(message)
    }

    async fn react(
        &self,
        message: &AnnouncedMessage,
        emoji: &PollEmoji,
    ) -> Result<(), AnnounceError> {
        let url = self.reaction_url(message, emoji)?;
        let response = self
            .http_client
            .put(url)
            .header("Authorization", format!("Bot {}", self.bot_token))
            .send()
            .await
            .map_err(|e| AnnounceError::Transport(e.to_string()))?;
        if !response.status().is_success() {
            return Err(reject(response).await);
        }
        Ok(())
    }
}
