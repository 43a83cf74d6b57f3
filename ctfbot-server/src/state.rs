//! Application state shared across all request handlers.

use ctfbot_core::fetch::{EventFetcher, EventSource};
use ctfbot_core::poll::{Announcer, PollManager};
use ctfbot_core::votes::VoteStore;
use std::sync::Arc;

/// Event fetcher over a type-erased source, so tests can swap in fixtures.
pub type SharedFetcher = EventFetcher<Arc<dyn EventSource>>;

/// Application state that is shared across all request handlers.
///
/// This is cloneable and cheap to pass around (everything is behind Arc).
#[derive(Clone)]
pub struct AppState {
    pub fetcher: Arc<SharedFetcher>,
    /// The one vote store every poll task writes through.
    pub votes: Arc<VoteStore>,
    pub polls: Arc<PollManager>,
    pub announcer: Arc<dyn Announcer>,
}

impl AppState {
    pub fn new(
        source: Arc<dyn EventSource>,
        votes: Arc<VoteStore>,
        polls: Arc<PollManager>,
        announcer: Arc<dyn Announcer>,
    ) -> Self {
        Self {
            fetcher: Arc::new(EventFetcher::new(source)),
            votes,
            polls,
            announcer,
        }
    }
}
