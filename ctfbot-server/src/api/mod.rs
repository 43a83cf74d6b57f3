//! HTTP surface used by the chat gateway relay.
//!
//! The relay turns slash commands into requests on [`commands`] and forwards
//! reaction-added events to [`polls`]. Command endpoints answer with the
//! rendered message body for the relay to post.

pub mod commands;
pub mod polls;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use ctfbot_core::fetch::FetchError;
use ctfbot_core::poll::AnnounceError;
use ctfbot_core::votes::StoreError;
use serde::Serialize;

/// A rendered chat message.
#[derive(Debug, Serialize)]
pub struct CommandReply {
    pub content: String,
}

impl CommandReply {
    pub fn new(content: String) -> Json<Self> {
        Json(Self { content })
    }
}

/// Errors that can occur in API handlers.
#[derive(Debug)]
pub enum ApiError {
    /// Event page or listing could not be fetched or parsed.
    Fetch(FetchError),
    /// The JSON API did not return the event.
    EventUnavailable(u64),
    /// The vote file could not be read.
    Storage(StoreError),
    /// Posting the poll or attaching its reactions failed.
    Announce(AnnounceError),
    /// Nothing stored or open under the requested id.
    NotFound(&'static str),
    /// A query parameter is outside its allowed range.
    BadRequest(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Fetch(FetchError::UpstreamUnavailable(e)) => {
                tracing::error!(error = %e, "Upstream unavailable");
                (StatusCode::BAD_GATEWAY, "upstream unavailable").into_response()
            }
            ApiError::Fetch(FetchError::MalformedUpstream(e)) => {
                tracing::error!(error = %e, "Upstream document malformed");
                (StatusCode::BAD_GATEWAY, "upstream document malformed").into_response()
            }
            ApiError::EventUnavailable(event_id) => {
                (StatusCode::BAD_GATEWAY, format!("event {event_id} unavailable")).into_response()
            }
            ApiError::Storage(e) => {
                tracing::error!(error = %e, "Vote storage error");
                (StatusCode::INTERNAL_SERVER_ERROR, "vote storage unavailable").into_response()
            }
            ApiError::Announce(e) => {
                tracing::error!(error = %e, "Poll announcement failed");
                (StatusCode::BAD_GATEWAY, "poll announcement failed").into_response()
            }
            ApiError::NotFound(what) => (StatusCode::NOT_FOUND, what).into_response(),
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message).into_response(),
        }
    }
}

impl From<FetchError> for ApiError {
    fn from(e: FetchError) -> Self {
        ApiError::Fetch(e)
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        ApiError::Storage(e)
    }
}

impl From<AnnounceError> for ApiError {
    fn from(e: AnnounceError) -> Self {
        ApiError::Announce(e)
    }
}
