//! Upcoming-events listing parser.
//!
//! Rows look like:
//!
//! ```text
//! | <a href="/event/2790">KITCTFCTF 2025</a> | 3 Oct., 18:00 UTC — 5 Oct. 2025, 18:00 UTC | ... |
//! ```
//!
//! The start bound omits its year, so it is rebuilt from the current year.
//! Upstream formatting is not uniform across rows, so a row that fails to
//! parse is logged and skipped instead of failing the whole listing.

use ctfbot_sdk::objects::ListingSummary;
use scraper::{ElementRef, Html, Selector};
use time::{Date, Month, OffsetDateTime, PrimitiveDateTime, Time};
use tracing::warn;

use super::{MalformedUpstream, element_text, is_header_row, resolve_link, selector};

/// Upper bound on how many rows a caller may request.
pub const MAX_LISTING: usize = 15;

const RANGE_SEPARATOR: char = '—';

/// Full month names. Upstream mixes abbreviations ("Oct", "Sept") with
/// AP-style names ("March", "June"), so any prefix of at least three letters
/// is accepted.
const MONTHS: [(&str, Month); 12] = [
    ("January", Month::January),
    ("February", Month::February),
    ("March", Month::March),
    ("April", Month::April),
    ("May", Month::May),
    ("June", Month::June),
    ("July", Month::July),
    ("August", Month::August),
    ("September", Month::September),
    ("October", Month::October),
    ("November", Month::November),
    ("December", Month::December),
];

struct RowSelectors {
    cell: Selector,
    link: Selector,
}

/// Parse up to `count` rows of the upcoming listing.
///
/// `count` is clamped to `1..=MAX_LISTING`. Header rows are recognized by
/// their lack of `td` cells, so a table without a header still yields
/// `count` rows. Fails only when the listing table itself is missing.
pub fn parse_listing(
    html: &str,
    count: usize,
    current_year: i32,
) -> Result<Vec<ListingSummary>, MalformedUpstream> {
    let count = count.clamp(1, MAX_LISTING);
    let document = Html::parse_document(html);

    let container = selector("div.container")?;
    let table = document
        .select(&container)
        .nth(1)
        .ok_or(MalformedUpstream::MissingElement("listing container"))?;

    let row_selector = selector("tr")?;
    let selectors = RowSelectors {
        cell: selector("td")?,
        link: selector("a[href]")?,
    };

    let summaries = table
        .select(&row_selector)
        .filter(|row| !is_header_row(*row, &selectors.cell))
        .take(count)
        .enumerate()
        .filter_map(|(index, row)| match parse_row(row, &selectors, current_year) {
            Ok(summary) => Some(summary),
            Err(e) => {
                warn!(row = index, error = %e, "Skipping malformed listing row");
                None
            }
        })
        .collect();
    Ok(summaries)
}

fn parse_row(
    row: ElementRef<'_>,
    selectors: &RowSelectors,
    current_year: i32,
) -> Result<ListingSummary, MalformedUpstream> {
    let mut cells = row.select(&selectors.cell);
    let name_cell = cells
        .next()
        .ok_or(MalformedUpstream::MissingElement("event cell"))?;
    let date_cell = cells
        .next()
        .ok_or(MalformedUpstream::MissingElement("date cell"))?;

    let link = name_cell
        .select(&selectors.link)
        .next()
        .ok_or(MalformedUpstream::MissingElement("event link"))?;
    let href = link
        .value()
        .attr("href")
        .ok_or(MalformedUpstream::MissingElement("event link"))?;
    let url = resolve_link(href)?;

    let last_segment = url
        .path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).next_back())
        .unwrap_or_default();
    let event_id = last_segment
        .parse()
        .map_err(|_| MalformedUpstream::InvalidNumber {
            field: "event id",
            value: last_segment.to_string(),
        })?;

    let title = element_text(name_cell).trim().to_string();
    if title.is_empty() {
        return Err(MalformedUpstream::MissingElement("event title"));
    }

    let (start, end) = parse_date_range(&element_text(date_cell), current_year)?;

    Ok(ListingSummary {
        title,
        event_id,
        url: url.to_string(),
        start,
        end,
    })
}

/// Parse `"3 Oct., 18:00 — 5 Oct. 2025, 18:00 UTC"` into UTC instants.
///
/// The start bound takes `current_year`; the end bound must carry its own.
/// A range whose rebuilt start falls after its end is rejected.
pub fn parse_date_range(
    text: &str,
    current_year: i32,
) -> Result<(OffsetDateTime, OffsetDateTime), MalformedUpstream> {
    let (start, end) = text
        .split_once(RANGE_SEPARATOR)
        .ok_or_else(|| invalid_date(text, "missing range separator"))?;

    let start = parse_bound(start.trim(), Some(current_year))?;
    let end = parse_bound(end.trim(), None)?;
    if start > end {
        return Err(invalid_date(text, "start is after end"));
    }
    Ok((start, end))
}

/// Parse one bound: `"<day> <Mon>.[ <year>], <HH>:<MM>[ UTC]"`.
fn parse_bound(text: &str, default_year: Option<i32>) -> Result<OffsetDateTime, MalformedUpstream> {
    let (date_part, time_part) = text
        .rsplit_once(',')
        .ok_or_else(|| invalid_date(text, "missing time"))?;

    let mut tokens = date_part.split_whitespace();
    let day: u8 = tokens
        .next()
        .and_then(|t| t.parse().ok())
        .ok_or_else(|| invalid_date(text, "invalid day"))?;
    let month = tokens
        .next()
        .map(|t| t.trim_end_matches(['.', ',']))
        .and_then(month_from_name)
        .ok_or_else(|| invalid_date(text, "invalid month"))?;
    let year = match tokens.next() {
        Some(token) => token
            .parse()
            .map_err(|_| invalid_date(text, "invalid year"))?,
        None => default_year.ok_or_else(|| invalid_date(text, "missing year"))?,
    };
    if tokens.next().is_some() {
        return Err(invalid_date(text, "unexpected trailing date text"));
    }

    let mut time_tokens = time_part.split_whitespace();
    let (hour, minute) = time_tokens
        .next()
        .and_then(|t| t.split_once(':'))
        .and_then(|(h, m)| Some((h.parse::<u8>().ok()?, m.parse::<u8>().ok()?)))
        .ok_or_else(|| invalid_date(text, "invalid time"))?;
    match time_tokens.next() {
        None | Some("UTC") => {}
        Some(_) => return Err(invalid_date(text, "unsupported timezone")),
    }

    let date = Date::from_calendar_date(year, month, day)
        .map_err(|e| invalid_date(text, &e.to_string()))?;
    let time = Time::from_hms(hour, minute, 0).map_err(|e| invalid_date(text, &e.to_string()))?;
    Ok(PrimitiveDateTime::new(date, time).assume_utc())
}

fn month_from_name(name: &str) -> Option<Month> {
    if name.chars().count() < 3 {
        return None;
    }
    MONTHS
        .iter()
        .find(|(full, _)| full.starts_with(name))
        .map(|(_, month)| *month)
}

fn invalid_date(value: &str, reason: &str) -> MalformedUpstream {
    MalformedUpstream::InvalidDate {
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
