//! Event detail page parser.
//!
//! The information panel on the page has no labels or ids on its
//! paragraphs, so fields are read by position. All positions live in
//! [`INFO_PANEL_FIELDS`]; when the upstream layout shifts, that table is the
//! only thing to update.

use ctfbot_sdk::objects::{EventRecord, TeamLink};
use scraper::{ElementRef, Html};
use tracing::debug;

use super::{MalformedUpstream, element_text, is_header_row, resolve_link, selector};

/// Marker the page's bold text is rewritten to before parsing.
const HEADING_MARKER: &str = "### ";

/// A field read from the information panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfoField {
    Location,
    Format,
    OfficialUrl,
}

/// Where a field sits in the panel and which label precedes its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelField {
    /// Index among the panel's direct `p` children.
    pub index: usize,
    pub field: InfoField,
    pub prefix: &'static str,
}

pub const INFO_PANEL_FIELDS: [PanelField; 3] = [
    PanelField {
        index: 1,
        field: InfoField::Location,
        prefix: "",
    },
    PanelField {
        index: 4,
        field: InfoField::Format,
        prefix: "Format: ",
    },
    PanelField {
        index: 5,
        field: InfoField::OfficialUrl,
        prefix: "Official URL: ",
    },
];

/// Number of paragraphs the panel must have for every field to be present.
const fn required_panel_len() -> usize {
    let mut max = 0;
    let mut i = 0;
    while i < INFO_PANEL_FIELDS.len() {
        if INFO_PANEL_FIELDS[i].index > max {
            max = INFO_PANEL_FIELDS[i].index;
        }
        i += 1;
    }
    max + 1
}

#[derive(Debug, Default)]
struct PanelValues {
    location: String,
    format: String,
    url: String,
}

/// Rewrite line-break and bold markup into plain-text markers.
///
/// Text extraction downstream expects newlines and markdown headings, not
/// tags, so this runs on the raw page before it is parsed.
pub fn preprocess(html: &str) -> String {
    html.replace("<br />", "\n")
        .replace("<br/>", "\n")
        .replace("<br>", "\n")
        .replace("<b>", HEADING_MARKER)
}

/// Parse an event detail page into an [`EventRecord`].
///
/// The page does not carry dates in a structured form, so `start` and `end`
/// are left empty; the API path fills them.
pub fn parse_event_page(event_id: u64, html: &str) -> Result<EventRecord, MalformedUpstream> {
    let document = Html::parse_document(&preprocess(html));

    let title = parse_title(&document)?;
    let team_count = parse_team_count(&document)?;
    let panel = parse_info_panel(&document)?;
    let description = parse_description(&document)?;
    let top_teams = parse_top_teams(&document)?;

    debug!(
        event_id,
        team_count,
        top_teams = top_teams.len(),
        "Parsed event page"
    );

    Ok(EventRecord {
        id: event_id,
        title,
        url: panel.url,
        format: panel.format,
        location: panel.location,
        start: None,
        end: None,
        description,
        team_count,
        top_teams,
        logo: None,
    })
}

fn parse_title(document: &Html) -> Result<String, MalformedUpstream> {
    let heading = selector("div.page-header h2")?;
    let title = document
        .select(&heading)
        .next()
        .map(|h| element_text(h).trim().to_string())
        .ok_or(MalformedUpstream::MissingElement("page header title"))?;
    if title.is_empty() {
        return Err(MalformedUpstream::MissingElement("page header title"));
    }
    Ok(title)
}

fn parse_team_count(document: &Html) -> Result<u32, MalformedUpstream> {
    let paragraph = selector("p")?;
    let text = document
        .select(&paragraph)
        .map(element_text)
        .find(|text| text.contains("teams total"))
        .ok_or(MalformedUpstream::MissingElement("teams total paragraph"))?;
    let token = text.split_whitespace().next().unwrap_or_default();
    token
        .parse()
        .map_err(|_| MalformedUpstream::InvalidNumber {
            field: "team count",
            value: token.to_string(),
        })
}

fn parse_info_panel(document: &Html) -> Result<PanelValues, MalformedUpstream> {
    let panel_selector = selector("div.span10")?;
    let panel = document
        .select(&panel_selector)
        .next()
        .ok_or(MalformedUpstream::MissingElement("information panel"))?;

    let paragraphs: Vec<String> = panel
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|child| child.value().name() == "p")
        .map(element_text)
        .collect();

    let expected = required_panel_len();
    if paragraphs.len() < expected {
        return Err(MalformedUpstream::PanelTooShort {
            expected,
            found: paragraphs.len(),
        });
    }

    let mut values = PanelValues::default();
    for entry in INFO_PANEL_FIELDS {
        let raw = paragraphs[entry.index].replace(HEADING_MARKER, "");
        let raw = raw.trim();
        let value = raw.strip_prefix(entry.prefix).unwrap_or(raw).trim();
        match entry.field {
            InfoField::Location => values.location = value.replace("On-line", "Online"),
            InfoField::Format => values.format = value.to_string(),
            InfoField::OfficialUrl => values.url = value.to_string(),
        }
    }
    Ok(values)
}

fn parse_description(document: &Html) -> Result<String, MalformedUpstream> {
    let description = selector("#id_description")?;
    document
        .select(&description)
        .next()
        .map(|d| element_text(d).trim().to_string())
        .ok_or(MalformedUpstream::MissingElement("description"))
}

fn parse_top_teams(document: &Html) -> Result<Vec<TeamLink>, MalformedUpstream> {
    let row_selector = selector("tr")?;
    let cell_selector = selector("td")?;
    let link_selector = selector("a[href]")?;

    let teams = document
        .select(&row_selector)
        .filter(|row| !is_header_row(*row, &cell_selector))
        .take(EventRecord::MAX_TOP_TEAMS)
        .filter_map(|row| {
            let link = row.select(&link_selector).next()?;
            let href = link.value().attr("href")?;
            match resolve_link(href) {
                Ok(profile_url) => Some(TeamLink {
                    name: element_text(link).trim().to_string(),
                    profile_url: profile_url.to_string(),
                }),
                Err(e) => {
                    debug!(error = %e, "Skipping team row");
                    None
                }
            }
        })
        .collect();
    Ok(teams)
}
