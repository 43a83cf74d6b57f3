use serde::{Deserialize, Serialize};

use super::vote::Participant;

/// A reaction-added event relayed by the chat gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionAdded {
    /// The message the reaction was added to.
    pub message_id: u64,
    /// Custom emoji id. `None` for unicode emoji, which never count as votes.
    pub emoji_id: Option<u64>,
    pub user: Participant,
    /// Set when the reacting account is a bot, including our own.
    #[serde(default)]
    pub bot: bool,
}

/// The two answers a poll accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Vote {
    Yes,
    No,
}

/// Who cast a vote. Identical to what gets stored for "yes" voters.
pub type Voter = Participant;
