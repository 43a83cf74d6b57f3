//! Poll lifecycle handlers.
//!
//! # Endpoints
//!
//! - `POST   /commands/ctfpoll/{id}`  – announce a poll and start collecting votes
//! - `DELETE /polls/{message_id}`     – stop collecting votes on a poll
//! - `POST   /gateway/reactions`      – relay a reaction-added event

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, post},
};
use ctfbot_core::poll::PollSession;
use ctfbot_sdk::objects::ReactionAdded;
use serde::Serialize;

use super::ApiError;
use crate::state::AppState;

/// Build the poll router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/commands/ctfpoll/{event_id}", post(ctfpoll))
        .route("/polls/{message_id}", delete(close_poll))
        .route("/gateway/reactions", post(relay_reaction))
}

/// Scrape the event page, then announce and open the poll.
async fn ctfpoll(
    State(state): State<AppState>,
    Path(event_id): Path<u64>,
) -> Result<(StatusCode, Json<PollSession>), ApiError> {
    let event = state.fetcher.event_info(event_id).await?;
    let session = state.polls.open(&event, state.announcer.as_ref()).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

async fn close_poll(
    State(state): State<AppState>,
    Path(message_id): Path<u64>,
) -> Result<Json<PollSession>, ApiError> {
    let session = state
        .polls
        .close(message_id)
        .await
        .ok_or(ApiError::NotFound("no open poll on this message"))?;
    tracing::info!(message_id, event_id = session.event_id, "Poll closed");
    Ok(Json(session))
}

#[derive(Debug, Serialize)]
struct RelayResult {
    /// Whether an open poll owns the message.
    routed: bool,
}

async fn relay_reaction(
    State(state): State<AppState>,
    Json(reaction): Json<ReactionAdded>,
) -> (StatusCode, Json<RelayResult>) {
    let routed = state.polls.dispatch(reaction).await;
    (StatusCode::ACCEPTED, Json(RelayResult { routed }))
}
