//! Event channels between the chat gateway and the poll tasks.
//!
//! # Event Flow
//!
//! 1. The gateway relays a `ReactionAdded` to the `PollManager`
//! 2. `PollManager` routes it by message id to that poll's `PollRunner`
//! 3. `PollRunner` records the vote through the `VoteStore`

pub mod channels;

pub use channels::{DEFAULT_CHANNEL_BUFFER, ReactionReceiver, ReactionSender, reaction_channel};
pub use ctfbot_sdk::objects::ReactionAdded;
