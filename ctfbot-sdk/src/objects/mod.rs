pub mod api;
pub mod event;
pub mod reaction;
pub mod vote;

pub use api::ApiEvent;
pub use event::{EventRecord, ListingSummary, TeamLink, WindowSummary};
pub use reaction::{ReactionAdded, Vote, Voter};
pub use vote::{Participant, VoteMap, VoteRecord};

/// Origin of the upstream event-listing site.
pub const SITE_ORIGIN: &str = "https://ctftime.org";
