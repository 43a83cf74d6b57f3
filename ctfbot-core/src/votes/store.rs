//! File-backed vote store.
//!
//! The whole mapping lives in one pretty-printed JSON file. Writes go to a
//! temporary sibling which is then renamed over the target, so a reader
//! never sees a half-written file. Every operation takes the store's async
//! mutex, which makes load-modify-save cycles from concurrent poll tasks
//! run one at a time instead of overwriting each other.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use ctfbot_sdk::objects::{Vote, VoteMap, VoteRecord, Voter};
use kanau::processor::Processor;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::debug;

use super::{VoteOutcome, upsert_vote};

/// Errors from reading or writing the vote file.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The file exists but could not be read or written.
    #[error("vote storage unavailable: {0}")]
    StorageUnavailable(#[from] std::io::Error),

    /// The file content is not a valid vote mapping.
    #[error("vote storage corrupt: {0}")]
    StorageCorrupt(#[from] serde_json::Error),
}

/// Shared handle to the vote file.
///
/// Hold it behind an `Arc` and give every poll task the same instance; the
/// lock only serializes callers that share it.
#[derive(Debug)]
pub struct VoteStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl VoteStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the whole mapping. A missing or empty file is an empty mapping.
    pub async fn load(&self) -> Result<VoteMap, StoreError> {
        let _guard = self.lock.lock().await;
        self.read_file().await
    }

    /// Replace the whole mapping.
    pub async fn save(&self, votes: &VoteMap) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        self.write_file(votes).await
    }

    /// Load, apply one vote, and save, as a single critical section.
    ///
    /// The record is saved even for a repeated "yes", since its name and url
    /// are refreshed with every vote.
    pub async fn record_vote(
        &self,
        event_id: u64,
        name: &str,
        url: &str,
        vote: Vote,
        voter: &Voter,
    ) -> Result<VoteOutcome, StoreError> {
        let _guard = self.lock.lock().await;
        let mut votes = self.read_file().await?;
        let outcome = upsert_vote(&mut votes, event_id, name, url, vote, voter);
        self.write_file(&votes).await?;
        Ok(outcome)
    }

    async fn read_file(&self) -> Result<VoteMap, StoreError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = ?self.path, "Vote file missing, starting empty");
                return Ok(VoteMap::new());
            }
            Err(e) => return Err(e.into()),
        };
        if content.trim().is_empty() {
            return Ok(VoteMap::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    async fn write_file(&self, votes: &VoteMap) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(votes)?;
        let temp_path = self.path.with_extension("json.tmp");
        tokio::fs::write(&temp_path, json).await?;
        tokio::fs::rename(&temp_path, &self.path).await?;
        Ok(())
    }
}

/// Read the whole mapping.
#[derive(Debug, Clone, Copy)]
pub struct LoadVotes;

impl Processor<LoadVotes> for VoteStore {
    type Output = VoteMap;
    type Error = StoreError;
    #[tracing::instrument(skip_all, err, name = "VOTES:LoadVotes")]
    async fn process(&self, _query: LoadVotes) -> Result<VoteMap, StoreError> {
        self.load().await
    }
}

/// Replace the whole mapping.
#[derive(Debug, Clone)]
pub struct SaveVotes {
    pub votes: VoteMap,
}

impl Processor<SaveVotes> for VoteStore {
    type Output = ();
    type Error = StoreError;
    #[tracing::instrument(skip_all, err, name = "VOTES:SaveVotes")]
    async fn process(&self, command: SaveVotes) -> Result<(), StoreError> {
        self.save(&command.votes).await
    }
}

/// Look up the record of one event. `None` if nobody has voted yet.
#[derive(Debug, Clone, Copy)]
pub struct GetVoteRecord {
    pub event_id: u64,
}

impl Processor<GetVoteRecord> for VoteStore {
    type Output = Option<VoteRecord>;
    type Error = StoreError;
    #[tracing::instrument(skip_all, err, name = "VOTES:GetVoteRecord")]
    async fn process(&self, query: GetVoteRecord) -> Result<Option<VoteRecord>, StoreError> {
        let mut votes = self.load().await?;
        Ok(votes.remove(&query.event_id.to_string()))
    }
}

/// Apply one vote and persist it.
#[derive(Debug, Clone)]
pub struct RecordVote {
    pub event_id: u64,
    pub name: String,
    pub url: String,
    pub vote: Vote,
    pub voter: Voter,
}

impl Processor<RecordVote> for VoteStore {
    type Output = VoteOutcome;
    type Error = StoreError;
    #[tracing::instrument(skip_all, err, name = "VOTES:RecordVote")]
    async fn process(&self, command: RecordVote) -> Result<VoteOutcome, StoreError> {
        self.record_vote(
            command.event_id,
            &command.name,
            &command.url,
            command.vote,
            &command.voter,
        )
        .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn voter(id: &str) -> Voter {
        Voter {
            id: id.to_string(),
            username: format!("user{id}"),
            display_name: format!("User {id}"),
        }
    }

    fn store_in(dir: &tempfile::TempDir) -> VoteStore {
        VoteStore::new(dir.path().join("votes.json"))
    }

    #[tokio::test]
    async fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let votes = store_in(&dir).load().await.unwrap();
        assert!(votes.is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        tokio::fs::write(store.path(), "{ not json").await.unwrap();
        let err = store.load().await.unwrap_err();
        assert!(matches!(err, StoreError::StorageCorrupt(_)));
    }

    #[tokio::test]
    async fn test_unreadable_file() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the file should be cannot be read as text.
        let store = VoteStore::new(dir.path());
        let err = store.load().await.unwrap_err();
        assert!(matches!(err, StoreError::StorageUnavailable(_)));
    }

    #[tokio::test]
    async fn test_save_of_load_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let original = r#"{
            "1": {"url": "https://a/", "votesyes": 1, "votesno": 0,
                  "participants": [{"id": "9", "username": "u9", "displayname": "U 9"}],
                  "name": "A"},
            "2": {"url": "", "votesyes": 0, "votesno": 3, "participants": [], "name": "B"}
        }"#;
        tokio::fs::write(store.path(), original).await.unwrap();

        let votes = store.process(LoadVotes).await.unwrap();
        store.process(SaveVotes { votes }).await.unwrap();

        let before: serde_json::Value = serde_json::from_str(original).unwrap();
        let after: serde_json::Value =
            serde_json::from_str(&tokio::fs::read_to_string(store.path()).await.unwrap()).unwrap();
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn test_record_vote_persists() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store
            .record_vote(2790, "KITCTFCTF", "https://kitctf.de/", Vote::Yes, &voter("1"))
            .await
            .unwrap();
        store
            .record_vote(2790, "KITCTFCTF", "https://kitctf.de/", Vote::No, &voter("2"))
            .await
            .unwrap();

        let record = store
            .process(GetVoteRecord { event_id: 2790 })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.votes_yes, 1);
        assert_eq!(record.votes_no, 1);
        assert_eq!(record.participants, vec![voter("1")]);
        assert!(store.process(GetVoteRecord { event_id: 1 }).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_yes_refreshes_name_and_url() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store
            .record_vote(7, "Old Name", "https://old/", Vote::Yes, &voter("1"))
            .await
            .unwrap();
        let outcome = store
            .record_vote(7, "New Name", "https://new/", Vote::Yes, &voter("1"))
            .await
            .unwrap();
        assert_eq!(outcome, VoteOutcome::DuplicateYes);

        let record = store.load().await.unwrap().remove("7").unwrap();
        assert_eq!(record.name, "New Name");
        assert_eq!(record.url, "https://new/");
        assert_eq!(record.votes_yes, 1);
        assert_eq!(record.participants, vec![voter("1")]);
    }

    #[tokio::test]
    async fn test_duplicate_yes_keeps_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.record_vote(7, "e", "", Vote::Yes, &voter("1")).await.unwrap();
        let outcome = store.record_vote(7, "e", "", Vote::Yes, &voter("1")).await.unwrap();
        assert_eq!(outcome, VoteOutcome::DuplicateYes);
        let record = store.load().await.unwrap().remove("7").unwrap();
        assert_eq!(record.votes_yes, 1);
        assert_eq!(record.participants.len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_votes_are_not_lost() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(store_in(&dir));

        let mut handles = Vec::new();
        for event_id in 1..=2u64 {
            for user in 0..10 {
                let store = store.clone();
                handles.push(tokio::spawn(async move {
                    store
                        .process(RecordVote {
                            event_id,
                            name: format!("CTF {event_id}"),
                            url: String::new(),
                            vote: Vote::Yes,
                            voter: voter(&user.to_string()),
                        })
                        .await
                }));
            }
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let votes = store.load().await.unwrap();
        assert_eq!(votes.len(), 2);
        for key in ["1", "2"] {
            assert_eq!(votes[key].votes_yes, 10);
            assert_eq!(votes[key].participants.len(), 10);
        }
    }
}
