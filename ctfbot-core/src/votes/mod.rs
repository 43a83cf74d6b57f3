//! Vote bookkeeping.
//!
//! [`upsert_vote`] is the pure mapping update; [`VoteStore`] persists the
//! mapping and serializes every read-modify-write through one lock.

pub mod store;

pub use store::{GetVoteRecord, LoadVotes, RecordVote, SaveVotes, StoreError, VoteStore};

use ctfbot_sdk::objects::{Vote, VoteMap, Voter};

/// What [`upsert_vote`] did with a vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteOutcome {
    /// The vote was counted.
    Counted(Vote),
    /// A "yes" from someone already listed as a participant. Nothing counted.
    DuplicateYes,
}

/// Apply one vote to the mapping.
///
/// The record for `event_id` is created empty if missing, and its `name` and
/// `url` are overwritten with the given values. A "yes" appends the voter to
/// the participants and bumps `votes_yes`, unless the voter is already
/// listed, in which case neither changes. A "no" always bumps `votes_no`.
pub fn upsert_vote(
    votes: &mut VoteMap,
    event_id: u64,
    name: &str,
    url: &str,
    vote: Vote,
    voter: &Voter,
) -> VoteOutcome {
    let record = votes.entry(event_id.to_string()).or_default();
    record.name = name.to_string();
    record.url = url.to_string();

    match vote {
        Vote::Yes if record.has_participant(&voter.id) => VoteOutcome::DuplicateYes,
        Vote::Yes => {
            record.votes_yes += 1;
            record.participants.push(voter.clone());
            VoteOutcome::Counted(Vote::Yes)
        }
        Vote::No => {
            record.votes_no += 1;
            VoteOutcome::Counted(Vote::No)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn voter(id: &str) -> Voter {
        Voter {
            id: id.to_string(),
            username: format!("user{id}"),
            display_name: format!("User {id}"),
        }
    }

    #[test]
    fn test_first_vote_creates_record() {
        let mut votes = VoteMap::new();
        let outcome = upsert_vote(&mut votes, 2790, "KITCTFCTF", "https://kitctf.de/", Vote::Yes, &voter("1"));
        assert_eq!(outcome, VoteOutcome::Counted(Vote::Yes));
        let record = &votes["2790"];
        assert_eq!(record.name, "KITCTFCTF");
        assert_eq!(record.votes_yes, 1);
        assert_eq!(record.votes_no, 0);
        assert_eq!(record.participants, vec![voter("1")]);
    }

    #[test]
    fn test_duplicate_yes_is_ignored() {
        let mut votes = VoteMap::new();
        upsert_vote(&mut votes, 2790, "KITCTFCTF", "", Vote::Yes, &voter("1"));
        let outcome = upsert_vote(&mut votes, 2790, "KITCTFCTF", "", Vote::Yes, &voter("1"));
        assert_eq!(outcome, VoteOutcome::DuplicateYes);
        let record = &votes["2790"];
        assert_eq!(record.votes_yes, 1);
        assert_eq!(record.participants.len(), 1);
    }

    #[test]
    fn test_yes_count_tracks_participants() {
        let mut votes = VoteMap::new();
        for id in ["1", "2", "1", "3", "2"] {
            upsert_vote(&mut votes, 7, "e", "", Vote::Yes, &voter(id));
        }
        let record = &votes["7"];
        assert_eq!(record.votes_yes, 3);
        assert_eq!(record.votes_yes as usize, record.participants.len());
    }

    #[test]
    fn test_no_votes_are_independent() {
        let mut votes = VoteMap::new();
        upsert_vote(&mut votes, 7, "e", "", Vote::No, &voter("1"));
        upsert_vote(&mut votes, 7, "e", "", Vote::No, &voter("1"));
        let record = &votes["7"];
        assert_eq!(record.votes_no, 2);
        assert_eq!(record.votes_yes, 0);
        assert!(record.participants.is_empty());
    }

    #[test]
    fn test_name_and_url_are_overwritten() {
        let mut votes = VoteMap::new();
        upsert_vote(&mut votes, 7, "old", "https://old/", Vote::No, &voter("1"));
        upsert_vote(&mut votes, 7, "new", "https://new/", Vote::No, &voter("2"));
        assert_eq!(votes["7"].name, "new");
        assert_eq!(votes["7"].url, "https://new/");
    }
}
