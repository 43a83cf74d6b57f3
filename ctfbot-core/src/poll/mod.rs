//! Reaction polls.
//!
//! A poll is announced as a message carrying a "yes" and a "no" reaction.
//! Each open poll is one [`PollRunner`] task owned by the [`PollManager`];
//! reactions relayed from the gateway are routed to the task by message id,
//! and every qualifying reaction becomes one [`crate::votes::RecordVote`].
//!
//! ```text
//! Announced ──► Listening ──► Abandoned
//!                  │  ▲        (cancelled, or stream closed)
//!                  └──┘
//!              reaction → vote
//! ```

pub mod announcer;
pub mod manager;
pub mod session;

pub use announcer::{
    AnnounceError, AnnouncedMessage, Announcer, PollEmoji, PollEmojis, announcement_text,
};
pub use manager::PollManager;
pub use session::{PollRunner, PollSession, PollState, ReactionOutcome};
