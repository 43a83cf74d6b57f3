use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// A team entry from an event's ranking table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TeamLink {
    pub name: String,
    pub profile_url: String,
}

/// Normalized view of a single competition.
///
/// Built once from upstream data and never mutated afterwards. Refreshing an
/// event means fetching and building a new record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: u64,
    pub title: String,
    /// Official site of the event. Empty when the organizers did not publish one.
    pub url: String,
    pub format: String,
    pub location: String,
    #[serde(with = "time::serde::rfc3339::option")]
    pub start: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub end: Option<OffsetDateTime>,
    pub description: String,
    /// Registered teams at fetch time.
    pub team_count: u32,
    /// At most [`EventRecord::MAX_TOP_TEAMS`] entries, in page order.
    pub top_teams: Vec<TeamLink>,
    pub logo: Option<String>,
}

impl EventRecord {
    pub const MAX_TOP_TEAMS: usize = 10;

    /// Start time as unix seconds, for chat timestamp markup.
    pub fn start_epoch(&self) -> Option<i64> {
        self.start.map(OffsetDateTime::unix_timestamp)
    }

    /// End time as unix seconds, for chat timestamp markup.
    pub fn end_epoch(&self) -> Option<i64> {
        self.end.map(OffsetDateTime::unix_timestamp)
    }
}

/// One row of the upcoming-events listing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingSummary {
    pub title: String,
    pub event_id: u64,
    pub url: String,
    #[serde(with = "time::serde::rfc3339")]
    pub start: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub end: OffsetDateTime,
}

/// One event returned by the time-windowed API query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowSummary {
    pub id: u64,
    pub title: String,
    pub url: String,
    #[serde(with = "time::serde::rfc3339")]
    pub start: OffsetDateTime,
}

impl WindowSummary {
    pub fn start_epoch(&self) -> i64 {
        self.start.unix_timestamp()
    }
}
