//! Event channel factories and handles.

use ctfbot_sdk::objects::ReactionAdded;
use tokio::sync::mpsc;

/// Default buffer size for event channels.
///
/// Reactions are human-paced, so a small bound is plenty and keeps memory
/// bounded if a poll task stalls on storage.
pub const DEFAULT_CHANNEL_BUFFER: usize = 64;

/// Sender handle for ReactionAdded events.
pub type ReactionSender = mpsc::Sender<ReactionAdded>;
/// Receiver handle for ReactionAdded events.
pub type ReactionReceiver = mpsc::Receiver<ReactionAdded>;

/// Create a new ReactionAdded channel.
///
/// Each poll session owns one receiver; the manager keeps the sender.
pub fn reaction_channel() -> (ReactionSender, ReactionReceiver) {
    mpsc::channel(DEFAULT_CHANNEL_BUFFER)
}
