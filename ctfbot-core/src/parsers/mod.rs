//! Parsers for CTFtime HTML pages.
//!
//! - `event_page`: one event's detail page into an [`EventRecord`]
//! - `listing`: the upcoming-events listing into [`ListingSummary`] rows
//!
//! Both are pure functions over the page text. Fetching lives in
//! [`crate::fetch`].
//!
//! [`EventRecord`]: ctfbot_sdk::objects::EventRecord
//! [`ListingSummary`]: ctfbot_sdk::objects::ListingSummary

pub mod event_page;
pub mod listing;

pub use event_page::{INFO_PANEL_FIELDS, InfoField, PanelField, parse_event_page};
pub use listing::{MAX_LISTING, parse_date_range, parse_listing};

use ctfbot_sdk::objects::SITE_ORIGIN;
use scraper::{ElementRef, Selector};
use thiserror::Error;
use url::Url;

/// The fetched document does not match the structure the parser expects.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedUpstream {
    /// A required element is absent.
    #[error("missing element: {0}")]
    MissingElement(&'static str),

    /// The information panel has fewer paragraphs than the field table needs.
    #[error("information panel has {found} paragraphs, expected at least {expected}")]
    PanelTooShort { expected: usize, found: usize },

    /// A numeric field did not parse.
    #[error("invalid {field}: {value:?}")]
    InvalidNumber { field: &'static str, value: String },

    /// A date or date range did not parse.
    #[error("invalid date {value:?}: {reason}")]
    InvalidDate { value: String, reason: String },

    /// A link could not be resolved against the site origin.
    #[error("invalid link {0:?}")]
    InvalidLink(String),

    /// A built-in CSS selector failed to compile.
    #[error("invalid selector {0:?}")]
    InvalidSelector(&'static str),
}

pub(crate) fn selector(css: &'static str) -> Result<Selector, MalformedUpstream> {
    Selector::parse(css).map_err(|_| MalformedUpstream::InvalidSelector(css))
}

/// Concatenated text content of an element.
pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect()
}

/// Table rows without any `td` cell are headers.
pub(crate) fn is_header_row(row: ElementRef<'_>, td: &Selector) -> bool {
    row.select(td).next().is_none()
}

/// Resolve a site-relative link against [`SITE_ORIGIN`].
pub(crate) fn resolve_link(href: &str) -> Result<Url, MalformedUpstream> {
    Url::parse(SITE_ORIGIN)
        .and_then(|origin| origin.join(href))
        .map_err(|_| MalformedUpstream::InvalidLink(href.to_string()))
}
