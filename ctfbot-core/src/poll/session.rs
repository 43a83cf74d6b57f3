//! One poll's listening loop.
//!
//! A session moves Announced → Listening and stays there, recording a vote
//! for every qualifying reaction, until the hosting side cancels it or its
//! reaction stream closes (Abandoned). No vote failure ends the loop.

use std::convert::Infallible;
use std::sync::Arc;

use ctfbot_sdk::objects::ReactionAdded;
use kanau::processor::Processor;
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, error, info};

use super::announcer::PollEmojis;
use crate::events::ReactionReceiver;
use crate::votes::{RecordVote, VoteOutcome, VoteStore};

/// Identity of an open poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct PollSession {
    pub event_id: u64,
    pub message_id: u64,
    pub channel_id: u64,
}

/// Lifecycle of a poll session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PollState {
    /// Message posted, reactions attached.
    Announced,
    /// Waiting for reactions.
    Listening,
    /// Cancelled or stream closed. Votes are no longer recorded.
    Abandoned,
}

/// Drives a single [`PollSession`].
pub struct PollRunner {
    session: PollSession,
    /// Event title and URL copied into every vote record.
    name: String,
    url: String,
    emojis: PollEmojis,
    store: Arc<VoteStore>,
}

impl PollRunner {
    pub fn new(
        session: PollSession,
        name: String,
        url: String,
        emojis: PollEmojis,
        store: Arc<VoteStore>,
    ) -> Self {
        Self {
            session,
            name,
            url,
            emojis,
            store,
        }
    }

    pub fn session(&self) -> PollSession {
        self.session
    }

    /// Listen until `cancel_rx` flips to `true` or the reaction stream ends.
    pub async fn run(
        self,
        mut reaction_rx: ReactionReceiver,
        mut cancel_rx: watch::Receiver<bool>,
    ) -> PollState {
        let event_id = self.session.event_id;
        let message_id = self.session.message_id;

        info!(event_id, message_id, state = ?PollState::Listening, "Poll listening");

        loop {
            tokio::select! {
                biased;

                changed = cancel_rx.changed() => {
                    if changed.is_err() || *cancel_rx.borrow() {
                        info!(event_id, message_id, "Poll cancelled");
                        break;
                    }
                }

                reaction = reaction_rx.recv() => {
                    let Some(reaction) = reaction else {
                        info!(event_id, message_id, "Reaction stream closed");
                        break;
                    };
                    let Ok(outcome) = self.process(reaction).await;
                    debug!(event_id, message_id, ?outcome, "Reaction handled");
                }
            }
        }

        info!(event_id, message_id, state = ?PollState::Abandoned, "Poll stopped");
        PollState::Abandoned
    }
}

/// What happened to one reaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactionOutcome {
    /// Bot reaction, another message, or an emoji that is not a vote.
    Ignored,
    Recorded(VoteOutcome),
    /// The store failed; the vote is lost.
    Lost,
}

impl Processor<ReactionAdded> for PollRunner {
    type Output = ReactionOutcome;
    type Error = Infallible;

    async fn process(&self, reaction: ReactionAdded) -> Result<ReactionOutcome, Infallible> {
        if reaction.bot || reaction.message_id != self.session.message_id {
            return Ok(ReactionOutcome::Ignored);
        }
        let Some(vote) = self.emojis.classify(reaction.emoji_id) else {
            return Ok(ReactionOutcome::Ignored);
        };

        let command = RecordVote {
            event_id: self.session.event_id,
            name: self.name.clone(),
            url: self.url.clone(),
            vote,
            voter: reaction.user,
        };
        match self.store.process(command).await {
            Ok(outcome) => {
                info!(
                    event_id = self.session.event_id,
                    ?vote,
                    ?outcome,
                    "Vote recorded"
                );
                Ok(ReactionOutcome::Recorded(outcome))
            }
            Err(e) => {
                error!(
                    event_id = self.session.event_id,
                    ?vote,
                    error = %e,
                    "Failed to record vote, vote lost"
                );
                Ok(ReactionOutcome::Lost)
            }
        }
    }
}
