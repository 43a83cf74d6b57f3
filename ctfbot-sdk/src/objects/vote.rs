use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Persisted vote state, keyed by the stringified event id.
///
/// A `BTreeMap` keeps the serialized file in a stable key order, so saving
/// what was loaded reproduces the same document.
pub type VoteMap = BTreeMap<String, VoteRecord>;

/// Someone who voted "yes" on an event poll.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Participant {
    /// Chat platform user id.
    pub id: String,
    pub username: String,
    #[serde(rename = "displayname")]
    pub display_name: String,
}

/// Aggregated poll result for one event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteRecord {
    #[serde(default)]
    pub url: String,
    #[serde(rename = "votesyes", default)]
    pub votes_yes: u64,
    #[serde(rename = "votesno", default)]
    pub votes_no: u64,
    #[serde(default)]
    pub participants: Vec<Participant>,
    #[serde(default)]
    pub name: String,
}

impl VoteRecord {
    pub fn has_participant(&self, id: &str) -> bool {
        self.participants.iter().any(|p| p.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_legacy_layout() {
        let json = r#"{
            "2790": {
                "url": "https://kitctf.de/",
                "votesyes": 1,
                "votesno": 2,
                "participants": [
                    {"id": "42", "username": "alice", "displayname": "Alice"}
                ],
                "name": "KITCTFCTF 2025"
            }
        }"#;
        let votes: VoteMap = serde_json::from_str(json).unwrap();
        let record = &votes["2790"];
        assert_eq!(record.votes_yes, 1);
        assert_eq!(record.votes_no, 2);
        assert_eq!(record.participants[0].display_name, "Alice");
        assert!(record.has_participant("42"));
        assert!(!record.has_participant("43"));
    }
}
