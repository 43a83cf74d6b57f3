//! Wire types of the CTFtime JSON API (`/api/v1/events/`).

use serde::Deserialize;
use time::OffsetDateTime;

use super::event::{EventRecord, WindowSummary};

/// An event as returned by the upstream API.
///
/// Only the fields the bot displays are modelled; everything else in the
/// payload is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApiEvent {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(with = "time::serde::rfc3339")]
    pub start: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub finish: OffsetDateTime,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub format: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub onsite: bool,
    #[serde(default)]
    pub participants: u32,
    #[serde(default)]
    pub logo: String,
}

impl ApiEvent {
    /// Location as displayed to users: online events with no location read
    /// "Online", and the upstream "On-line" spelling is normalized.
    fn display_location(&self) -> String {
        if !self.onsite && self.location.trim().is_empty() {
            return "Online".to_string();
        }
        self.location.trim().replace("On-line", "Online")
    }
}

impl From<ApiEvent> for EventRecord {
    fn from(event: ApiEvent) -> Self {
        let location = event.display_location();
        let logo = (!event.logo.is_empty()).then_some(event.logo);
        EventRecord {
            id: event.id,
            title: event.title,
            url: event.url,
            format: event.format,
            location,
            start: Some(event.start),
            end: Some(event.finish),
            description: event.description.trim().to_string(),
            team_count: event.participants,
            top_teams: Vec::new(),
            logo,
        }
    }
}

impl From<ApiEvent> for WindowSummary {
    fn from(event: ApiEvent) -> Self {
        WindowSummary {
            id: event.id,
            title: event.title,
            url: event.url,
            start: event.start,
        }
    }
}
