//! Read-only command handlers.
//!
//! # Endpoints
//!
//! - `GET /commands/ctfinfo/{id}`         – scraped event page
//! - `GET /commands/getctf?amount=`       – first rows of the upcoming listing
//! - `GET /commands/upcoming`             – API events starting in the next 7 days
//! - `GET /commands/more_info/{id}`       – one event from the API
//! - `GET /commands/ctfparticipants/{id}` – "yes" voters of an event poll

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use ctfbot_core::parsers::MAX_LISTING;
use ctfbot_core::votes::GetVoteRecord;
use kanau::processor::Processor;
use serde::Deserialize;
use time::{Duration, OffsetDateTime};

use super::{ApiError, CommandReply};
use crate::render;
use crate::state::AppState;

/// Rows shown by `getctf` when no amount is given.
pub const DEFAULT_LISTING_AMOUNT: usize = 10;

/// How far ahead `upcoming` looks.
pub const UPCOMING_WINDOW: Duration = Duration::days(7);

/// Build the command router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/commands/ctfinfo/{event_id}", get(ctfinfo))
        .route("/commands/getctf", get(getctf))
        .route("/commands/upcoming", get(upcoming))
        .route("/commands/more_info/{event_id}", get(more_info))
        .route("/commands/ctfparticipants/{event_id}", get(ctfparticipants))
}

async fn ctfinfo(
    State(state): State<AppState>,
    Path(event_id): Path<u64>,
) -> Result<Json<CommandReply>, ApiError> {
    let event = state.fetcher.event_info(event_id).await?;
    Ok(CommandReply::new(render::event_info(&event)))
}

#[derive(Debug, Deserialize)]
struct ListingQuery {
    amount: Option<usize>,
}

async fn getctf(
    State(state): State<AppState>,
    Query(query): Query<ListingQuery>,
) -> Result<Json<CommandReply>, ApiError> {
    let amount = query.amount.unwrap_or(DEFAULT_LISTING_AMOUNT);
    if !(1..=MAX_LISTING).contains(&amount) {
        return Err(ApiError::BadRequest(format!(
            "amount must be between 1 and {MAX_LISTING}"
        )));
    }
    let year = OffsetDateTime::now_utc().year();
    let rows = state.fetcher.upcoming_listing(amount, year).await?;
    Ok(CommandReply::new(render::listing(&rows)))
}

async fn upcoming(State(state): State<AppState>) -> Json<CommandReply> {
    let now = OffsetDateTime::now_utc();
    let events = state
        .fetcher
        .fetch_window(
            now.unix_timestamp(),
            (now + UPCOMING_WINDOW).unix_timestamp(),
        )
        .await;
    tracing::info!(count = events.len(), "Upcoming events fetched");
    CommandReply::new(render::upcoming(&events))
}

async fn more_info(
    State(state): State<AppState>,
    Path(event_id): Path<u64>,
) -> Result<Json<CommandReply>, ApiError> {
    let event = state
        .fetcher
        .fetch_event(event_id)
        .await
        .ok_or(ApiError::EventUnavailable(event_id))?;
    Ok(CommandReply::new(render::more_info(&event)))
}

async fn ctfparticipants(
    State(state): State<AppState>,
    Path(event_id): Path<u64>,
) -> Result<Json<CommandReply>, ApiError> {
    let record = state
        .votes
        .process(GetVoteRecord { event_id })
        .await?
        .ok_or(ApiError::NotFound("no poll results for this event"))?;
    Ok(CommandReply::new(render::participants(&record)))
}
