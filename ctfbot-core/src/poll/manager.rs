//! Registry of open polls.
//!
//! The PollManager is responsible for:
//! - Announcing a poll and attaching its vote reactions
//! - Spawning one `PollRunner` task per poll, keyed by message id
//! - Routing relayed reactions to the task that owns the message
//! - Cancelling a single poll, or all of them on shutdown

use std::collections::HashMap;
use std::sync::Arc;

use ctfbot_sdk::objects::{EventRecord, ReactionAdded};
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::announcer::{AnnounceError, Announcer, PollEmojis, announcement_text};
use super::session::{PollRunner, PollSession, PollState};
use crate::events::{ReactionSender, reaction_channel};
use crate::votes::VoteStore;

struct ActivePoll {
    session: PollSession,
    reaction_tx: ReactionSender,
    cancel_tx: watch::Sender<bool>,
    handle: JoinHandle<PollState>,
}

/// Owns every running poll task.
pub struct PollManager {
    store: Arc<VoteStore>,
    emojis: PollEmojis,
    polls: Mutex<HashMap<u64, ActivePoll>>,
}

impl PollManager {
    pub fn new(store: Arc<VoteStore>, emojis: PollEmojis) -> Self {
        Self {
            store,
            emojis,
            polls: Mutex::new(HashMap::new()),
        }
    }

    /// Announce a poll for `event` and start listening for votes on it.
    ///
    /// Nothing is spawned if posting the message or attaching either
    /// reaction fails.
    pub async fn open(
        &self,
        event: &EventRecord,
        announcer: &dyn Announcer,
    ) -> Result<PollSession, AnnounceError> {
        let message = announcer.post(&announcement_text(event)).await?;
        announcer.react(&message, &self.emojis.yes).await?;
        announcer.react(&message, &self.emojis.no).await?;

        let session = PollSession {
            event_id: event.id,
            message_id: message.message_id,
            channel_id: message.channel_id,
        };
        info!(
            event_id = session.event_id,
            message_id = session.message_id,
            state = ?PollState::Announced,
            "Poll announced"
        );

        let (reaction_tx, reaction_rx) = reaction_channel();
        let (cancel_tx, cancel_rx) = watch::channel(false);
        let runner = PollRunner::new(
            session,
            event.title.clone(),
            event.url.clone(),
            self.emojis.clone(),
            self.store.clone(),
        );
        let handle = tokio::spawn(runner.run(reaction_rx, cancel_rx));

        let previous = self.polls.lock().await.insert(
            session.message_id,
            ActivePoll {
                session,
                reaction_tx,
                cancel_tx,
                handle,
            },
        );
        if let Some(previous) = previous {
            warn!(
                message_id = session.message_id,
                "Replacing poll registered for the same message"
            );
            let _ = previous.cancel_tx.send(true);
        }
        Ok(session)
    }

    /// Hand a reaction to the poll that owns its message.
    ///
    /// Returns `false` when no open poll owns the message.
    pub async fn dispatch(&self, reaction: ReactionAdded) -> bool {
        let message_id = reaction.message_id;
        let sender = {
            let polls = self.polls.lock().await;
            match polls.get(&message_id) {
                Some(poll) => poll.reaction_tx.clone(),
                None => {
                    debug!(message_id, "Reaction for a message without a poll");
                    return false;
                }
            }
        };

        if sender.send(reaction).await.is_err() {
            warn!(message_id, "Poll task has stopped, dropping it");
            self.polls.lock().await.remove(&message_id);
            return false;
        }
        true
    }

    /// Stop the poll on `message_id`. Returns the closed session, if any.
    pub async fn close(&self, message_id: u64) -> Option<PollSession> {
        let poll = self.polls.lock().await.remove(&message_id)?;
        let session = poll.session;
        stop(poll).await;
        Some(session)
    }

    /// Sessions currently listening, in no particular order.
    pub async fn sessions(&self) -> Vec<PollSession> {
        self.polls
            .lock()
            .await
            .values()
            .map(|poll| poll.session)
            .collect()
    }

    /// Cancel every poll and wait for the tasks to finish.
    pub async fn shutdown(&self) {
        let polls: Vec<ActivePoll> = self.polls.lock().await.drain().map(|(_, p)| p).collect();
        info!(count = polls.len(), "Stopping open polls");
        for poll in polls {
            stop(poll).await;
        }
    }
}

async fn stop(poll: ActivePoll) {
    let message_id = poll.session.message_id;
    let _ = poll.cancel_tx.send(true);
    match poll.handle.await {
        Ok(state) => debug!(message_id, ?state, "Poll task finished"),
        Err(e) => warn!(message_id, error = %e, "Poll task did not finish cleanly"),
    }
}
