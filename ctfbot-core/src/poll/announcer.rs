//! Announcement side of a poll: the message text, the two vote emoji, and
//! the [`Announcer`] seam to the chat platform.

use async_trait::async_trait;
use ctfbot_sdk::objects::{EventRecord, Vote};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A custom emoji used as a vote button.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PollEmoji {
    pub name: String,
    pub id: u64,
}

impl PollEmoji {
    pub fn new(name: impl Into<String>, id: u64) -> Self {
        Self {
            name: name.into(),
            id,
        }
    }

    /// Inline message markup, e.g. `<:yes:1148772032302039121>`.
    pub fn markup(&self) -> String {
        format!("<:{}:{}>", self.name, self.id)
    }
}

/// The "yes" and "no" emoji of a poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollEmojis {
    pub yes: PollEmoji,
    pub no: PollEmoji,
}

impl PollEmojis {
    /// Map a reaction's emoji id to a vote. Anything else is not a vote.
    pub fn classify(&self, emoji_id: Option<u64>) -> Option<Vote> {
        match emoji_id? {
            id if id == self.yes.id => Some(Vote::Yes),
            id if id == self.no.id => Some(Vote::No),
            _ => None,
        }
    }
}

impl Default for PollEmojis {
    fn default() -> Self {
        Self {
            yes: PollEmoji::new("yes", 1148772032302039121),
            no: PollEmoji::new("no", 1148772028216778792),
        }
    }
}

/// Where an announcement ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnnouncedMessage {
    pub message_id: u64,
    pub channel_id: u64,
}

/// Errors from posting an announcement or attaching a reaction.
#[derive(Debug, Error)]
pub enum AnnounceError {
    /// The request never got a response.
    #[error("transport error: {0}")]
    Transport(String),

    /// The chat platform refused the request.
    #[error("rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },

    /// The response did not identify the posted message.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Posts poll announcements and attaches vote reactions.
#[async_trait]
pub trait Announcer: Send + Sync {
    /// Post `content` and return where it landed.
    async fn post(&self, content: &str) -> Result<AnnouncedMessage, AnnounceError>;

    /// Add `emoji` as a reaction on `message`.
    async fn react(
        &self,
        message: &AnnouncedMessage,
        emoji: &PollEmoji,
    ) -> Result<(), AnnounceError>;
}

/// Poll announcement text for an event.
pub fn announcement_text(event: &EventRecord) -> String {
    let mut message = format!("> # [{}](<{}>)\n", event.title, event.url);
    message.push_str(&format!("> ## Event ID: `{}`\n", event.id));
    message.push_str(&format!("> ## Format: {}\n", event.format));
    message.push_str(&format!("> ## Link: {}", event.url));
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        let emojis = PollEmojis::default();
        assert_eq!(emojis.classify(Some(1148772032302039121)), Some(Vote::Yes));
        assert_eq!(emojis.classify(Some(1148772028216778792)), Some(Vote::No));
        assert_eq!(emojis.classify(Some(1)), None);
        assert_eq!(emojis.classify(None), None);
    }

    #[test]
    fn test_markup() {
        assert_eq!(
            PollEmojis::default().yes.markup(),
            "<:yes:1148772032302039121>"
        );
    }

    #[test]
    fn test_announcement_text() {
        let event = EventRecord {
            id: 2790,
            title: "KITCTFCTF 2025".to_string(),
            url: "https://kitctf.de/".to_string(),
            format: "Jeopardy".to_string(),
            location: "Online".to_string(),
            start: None,
            end: None,
            description: String::new(),
            team_count: 0,
            top_teams: Vec::new(),
            logo: None,
        };
        assert_eq!(
            announcement_text(&event),
            "> # [KITCTFCTF 2025](<https://kitctf.de/>)\n\
             > ## Event ID: `2790`\n\
             > ## Format: Jeopardy\n\
             > ## Link: https://kitctf.de/"
        );
    }
}
