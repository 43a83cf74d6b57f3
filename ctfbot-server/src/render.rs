//! Chat message bodies for the commands.
//!
//! Everything is markdown in quote blocks. Times use Discord timestamp
//! markup (`<t:epoch:style>`) so each reader sees their own timezone.

use ctfbot_sdk::objects::{EventRecord, ListingSummary, VoteRecord, WindowSummary};

/// Discord timestamp styles used by the commands.
#[derive(Debug, Clone, Copy)]
pub enum TimestampStyle {
    ShortDate,
    ShortTime,
    ShortDateTime,
    Relative,
}

impl TimestampStyle {
    fn code(self) -> char {
        match self {
            TimestampStyle::ShortDate => 'd',
            TimestampStyle::ShortTime => 't',
            TimestampStyle::ShortDateTime => 'f',
            TimestampStyle::Relative => 'R',
        }
    }
}

pub fn timestamp(epoch: i64, style: TimestampStyle) -> String {
    format!("<t:{}:{}>", epoch, style.code())
}

fn timestamp_or_unknown(epoch: Option<i64>, style: TimestampStyle) -> String {
    epoch.map_or_else(|| "unknown".to_string(), |e| timestamp(e, style))
}

/// Multi-line text inside a quote block.
fn quoted(text: &str) -> String {
    text.replace('\n', "\n> ")
}

/// `ctfinfo`: the scraped event page.
pub fn event_info(event: &EventRecord) -> String {
    let mut message = format!("> # [{}](<{}>)\n", event.title, event.url);
    message.push_str(&format!("> ## Event ID: `{}`\n", event.id));
    message.push_str(&format!("> ## Format: {}\n", event.format));
    message.push_str(&format!("> ## Location: {}\n", event.location));
    message.push_str(&format!("> ## Teams: {}\n", event.team_count));
    message.push_str("> ## Description \n> ");
    message.push_str(&quoted(&event.description));
    message.push('\n');
    if !event.top_teams.is_empty() {
        message.push_str("> ## Top teams\n");
        for team in &event.top_teams {
            message.push_str(&format!("> 🔹 [{}](<{}>)\n", team.name, team.profile_url));
        }
    }
    message
}

/// `getctf`: rows of the upcoming listing.
pub fn listing(rows: &[ListingSummary]) -> String {
    let mut message = String::from("> ## Here are some upcoming CTFs:\n");
    for row in rows {
        let start = row.start.unix_timestamp();
        message.push_str(&format!(
            "> [{}](<{}>) on {}{} Event ID: `{}`\n",
            row.title,
            row.url,
            timestamp(start, TimestampStyle::ShortDate),
            timestamp(start, TimestampStyle::ShortTime),
            row.event_id
        ));
    }
    message.push_str("> \n> ***all dates are in UTC*** \n");
    message
}

/// `upcoming`: events starting in the next week.
pub fn upcoming(events: &[WindowSummary]) -> String {
    let mut message = String::from("> # Upcoming CTF Events\n");
    message.push_str("> Here are the upcoming CTF events in the next 7 days.\n");
    if events.is_empty() {
        message.push_str("> *Nothing scheduled.*\n");
    }
    for event in events {
        message.push_str(&format!(
            "> **[{}](<{}>)** Event ID: `{}` starts {}\n",
            event.title,
            event.url,
            event.id,
            timestamp(event.start_epoch(), TimestampStyle::ShortDateTime)
        ));
    }
    message
}

/// `more_info`: one event from the API.
pub fn more_info(event: &EventRecord) -> String {
    let start = event.start_epoch();
    let end = event.end_epoch();

    let mut message = format!("> # [{}](<{}>)\n", event.title, event.url);
    if !event.description.is_empty() {
        message.push_str(&format!("> {}\n", quoted(&event.description)));
    }
    message.push_str(&format!(
        "> **Start:** {} {}\n",
        timestamp_or_unknown(start, TimestampStyle::ShortDate),
        timestamp_or_unknown(start, TimestampStyle::ShortTime)
    ));
    message.push_str(&format!(
        "> **End:** {} {}\n",
        timestamp_or_unknown(end, TimestampStyle::ShortDate),
        timestamp_or_unknown(end, TimestampStyle::ShortTime)
    ));
    message.push_str(&format!(
        "> **When?** {}\n",
        timestamp_or_unknown(start, TimestampStyle::Relative)
    ));
    if let Some(logo) = event.logo.as_deref().filter(|l| !l.is_empty()) {
        message.push_str(&format!("> {logo}\n"));
    }
    message
}

/// `ctfparticipants`: everyone who voted yes.
pub fn participants(record: &VoteRecord) -> String {
    let mut message = format!("> # [{}](<{}>)\n", record.name, record.url);
    message.push_str("> ## Participants:\n");
    for participant in &record.participants {
        message.push_str(&format!(
            "> **{}** ({})\n",
            participant.display_name, participant.username
        ));
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use ctfbot_sdk::objects::{Participant, TeamLink};
    use time::macros::datetime;

    fn event() -> EventRecord {
        EventRecord {
            id: 2790,
            title: "KITCTFCTF 2025".to_string(),
            url: "https://kitctf.de/".to_string(),
            format: "Jeopardy".to_string(),
            location: "Online".to_string(),
            start: Some(datetime!(2025-10-03 18:00 UTC)),
            end: Some(datetime!(2025-10-05 18:00 UTC)),
            description: "Line one\nLine two".to_string(),
            team_count: 312,
            top_teams: vec![TeamLink {
                name: "kalmarunionen".to_string(),
                profile_url: "https://ctftime.org/team/114856".to_string(),
            }],
            logo: None,
        }
    }

    #[test]
    fn test_event_info() {
        let message = event_info(&event());
        assert!(message.starts_with("> # [KITCTFCTF 2025](<https://kitctf.de/>)\n"));
        assert!(message.contains("> ## Teams: 312\n"));
        assert!(message.contains("> ## Description \n> Line one\n> Line two\n"));
        assert!(message.contains("> 🔹 [kalmarunionen](<https://ctftime.org/team/114856>)"));
    }

    #[test]
    fn test_listing() {
        let rows = vec![ListingSummary {
            title: "KITCTFCTF 2025".to_string(),
            event_id: 2790,
            url: "https://ctftime.org/event/2790".to_string(),
            start: datetime!(2025-10-03 18:00 UTC),
            end: datetime!(2025-10-05 18:00 UTC),
        }];
        let message = listing(&rows);
        assert!(message.contains(
            "> [KITCTFCTF 2025](<https://ctftime.org/event/2790>) on <t:1759514400:d><t:1759514400:t> Event ID: `2790`\n"
        ));
        assert!(message.ends_with("***all dates are in UTC*** \n"));
    }

    #[test]
    fn test_upcoming_empty() {
        assert!(upcoming(&[]).contains("Nothing scheduled"));
    }

    #[test]
    fn test_more_info_timestamps() {
        let message = more_info(&event());
        assert!(message.contains("> **Start:** <t:1759514400:d> <t:1759514400:t>\n"));
        assert!(message.contains("> **End:** <t:1759687200:d> <t:1759687200:t>\n"));
        assert!(message.contains("> **When?** <t:1759514400:R>\n"));

        let undated = EventRecord {
            start: None,
            end: None,
            ..event()
        };
        assert!(more_info(&undated).contains("> **Start:** unknown unknown\n"));
    }

    #[test]
    fn test_participants() {
        let record = VoteRecord {
            url: "https://kitctf.de/".to_string(),
            votes_yes: 1,
            votes_no: 0,
            participants: vec![Participant {
                id: "1".to_string(),
                username: "alice".to_string(),
                display_name: "Alice".to_string(),
            }],
            name: "KITCTFCTF 2025".to_string(),
        };
        assert_eq!(
            participants(&record),
            "> # [KITCTFCTF 2025](<https://kitctf.de/>)\n> ## Participants:\n> **Alice** (alice)\n"
        );
    }
}
