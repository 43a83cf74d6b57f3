//! Event fetching: the HTML page path and the JSON API path.
//!
//! [`EventSource`] is the seam to the network. [`EventFetcher`] wraps a
//! source and applies the failure policy:
//!
//! - page commands (`event_info`, `upcoming_listing`) return a [`FetchError`]
//!   so the caller can abort and show nothing partial
//! - API lookups (`fetch_event`, `fetch_window`) are best-effort: failures are
//!   logged and an empty result is returned

use std::sync::Arc;

use async_trait::async_trait;
use ctfbot_sdk::client::{ClientError, CtftimeClient};
use ctfbot_sdk::objects::{ApiEvent, EventRecord, ListingSummary, WindowSummary};
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::parsers::{MalformedUpstream, parse_event_page, parse_listing};

/// Errors from a page command.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network failure or non-success status.
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(#[from] ClientError),

    /// The page did not have the expected structure.
    #[error("malformed upstream document: {0}")]
    MalformedUpstream(#[from] MalformedUpstream),
}

/// Where event data comes from.
///
/// Implemented by [`CtftimeClient`] for production and by fixtures in tests.
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Raw HTML of an event detail page.
    async fn event_page(&self, event_id: u64) -> Result<String, ClientError>;

    /// Raw HTML of the upcoming listing page.
    async fn listing_page(&self) -> Result<String, ClientError>;

    /// One event from the JSON API.
    async fn api_event(&self, event_id: u64) -> Result<ApiEvent, ClientError>;

    /// API events starting in `[start, finish)`, as unix seconds.
    async fn api_window(&self, start: i64, finish: i64) -> Result<Vec<ApiEvent>, ClientError>;
}

#[async_trait]
impl EventSource for CtftimeClient {
    async fn event_page(&self, event_id: u64) -> Result<String, ClientError> {
        CtftimeClient::event_page(self, event_id).await
    }

    async fn listing_page(&self) -> Result<String, ClientError> {
        CtftimeClient::listing_page(self).await
    }

    async fn api_event(&self, event_id: u64) -> Result<ApiEvent, ClientError> {
        self.event(event_id).await
    }

    async fn api_window(&self, start: i64, finish: i64) -> Result<Vec<ApiEvent>, ClientError> {
        self.events_between(start, finish).await
    }
}

#[async_trait]
impl<T: EventSource + ?Sized> EventSource for Arc<T> {
    async fn event_page(&self, event_id: u64) -> Result<String, ClientError> {
        (**self).event_page(event_id).await
    }

    async fn listing_page(&self) -> Result<String, ClientError> {
        (**self).listing_page().await
    }

    async fn api_event(&self, event_id: u64) -> Result<ApiEvent, ClientError> {
        (**self).api_event(event_id).await
    }

    async fn api_window(&self, start: i64, finish: i64) -> Result<Vec<ApiEvent>, ClientError> {
        (**self).api_window(start, finish).await
    }
}

/// Fetches and normalizes events from an [`EventSource`].
pub struct EventFetcher<S> {
    source: S,
}

impl<S: EventSource> EventFetcher<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Fetch and parse an event detail page.
    pub async fn event_info(&self, event_id: u64) -> Result<EventRecord, FetchError> {
        let html = self.source.event_page(event_id).await.inspect_err(|e| {
            error!(event_id, error = %e, "Failed to fetch event page");
        })?;
        let record = parse_event_page(event_id, &html).inspect_err(|e| {
            error!(event_id, error = %e, "Event page did not match the expected layout");
        })?;
        Ok(record)
    }

    /// Fetch and parse the first `count` rows of the upcoming listing.
    ///
    /// Malformed rows are already dropped by the parser; only a missing
    /// page or table is an error here.
    pub async fn upcoming_listing(
        &self,
        count: usize,
        current_year: i32,
    ) -> Result<Vec<ListingSummary>, FetchError> {
        let html = self.source.listing_page().await.inspect_err(|e| {
            error!(error = %e, "Failed to fetch upcoming listing");
        })?;
        let summaries = parse_listing(&html, count, current_year).inspect_err(|e| {
            error!(error = %e, "Upcoming listing did not match the expected layout");
        })?;
        debug!(requested = count, parsed = summaries.len(), "Parsed upcoming listing");
        Ok(summaries)
    }

    /// One event from the API, or `None` if the upstream request failed.
    pub async fn fetch_event(&self, event_id: u64) -> Option<EventRecord> {
        match self.source.api_event(event_id).await {
            Ok(event) => Some(event.into()),
            Err(e) => {
                warn!(event_id, error = %e, "API event request failed");
                None
            }
        }
    }

    /// Events the API reports for `[start, finish)`, in upstream order.
    ///
    /// The window is applied by the upstream query only; returned events
    /// are not filtered again here.
    pub async fn fetch_window(&self, start: i64, finish: i64) -> Vec<WindowSummary> {
        match self.source.api_window(start, finish).await {
            Ok(events) => {
                debug!(start, finish, count = events.len(), "API window request returned");
                events.into_iter().map(WindowSummary::from).collect()
            }
            Err(e) => {
                warn!(start, finish, error = %e, "API window request failed");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    const NOW: i64 = 1_759_500_000;
    const WEEK: i64 = 7 * 24 * 60 * 60;

    fn api_event(id: u64, start: &str) -> String {
        format!(
            r#"{{"id": {id}, "title": "CTF {id}", "url": "https://ctf{id}.example/",
                "start": "{start}", "finish": "2025-10-12T18:00:00+00:00",
                "onsite": false, "location": "", "participants": 10,
                "format": "Jeopardy", "description": "", "logo": ""}}"#
        )
    }

    fn json_error() -> ClientError {
        ClientError::Json(serde_json::from_str::<u8>("not json").unwrap_err())
    }

    /// In-memory source serving canned documents.
    struct FixtureSource {
        page: Option<String>,
        listing: Option<String>,
        window: Option<String>,
    }

    #[async_trait]
    impl EventSource for FixtureSource {
        async fn event_page(&self, _event_id: u64) -> Result<String, ClientError> {
            self.page.clone().ok_or_else(json_error)
        }

        async fn listing_page(&self) -> Result<String, ClientError> {
            self.listing.clone().ok_or_else(json_error)
        }

        async fn api_event(&self, event_id: u64) -> Result<ApiEvent, ClientError> {
            let body = api_event(event_id, "2025-10-03T18:00:00+00:00");
            Ok(serde_json::from_str(&body)?)
        }

        async fn api_window(&self, _start: i64, _finish: i64) -> Result<Vec<ApiEvent>, ClientError> {
            let body = self.window.as_deref().ok_or_else(json_error)?;
            Ok(serde_json::from_str(body)?)
        }
    }

    fn source() -> FixtureSource {
        FixtureSource {
            page: None,
            listing: None,
            window: None,
        }
    }

    #[tokio::test]
    async fn test_fetch_window_returns_everything_upstream_sent() {
        // One event started before NOW; it must not be filtered out.
        let window = format!(
            "[{}, {}, {}]",
            api_event(1, "2025-10-01T00:00:00+00:00"),
            api_event(2, "2025-10-04T00:00:00+00:00"),
            api_event(3, "2025-10-06T00:00:00+00:00"),
        );
        let fetcher = EventFetcher::new(FixtureSource {
            window: Some(window),
            ..source()
        });
        let events = fetcher.fetch_window(NOW, NOW + WEEK).await;
        assert_eq!(events.len(), 3);
        assert!(events[0].start_epoch() < NOW);
        let ids: Vec<u64> = events.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_fetch_window_failure_is_empty() {
        let fetcher = EventFetcher::new(source());
        assert!(fetcher.fetch_window(NOW, NOW + WEEK).await.is_empty());
    }

    /// A client pointed at a local server that answers 503 to everything.
    async fn unavailable_client() -> CtftimeClient {
        let router = axum::Router::new().fallback(|| async {
            (axum::http::StatusCode::SERVICE_UNAVAILABLE, "try again later")
        });
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        CtftimeClient::new(
            url::Url::parse(&format!("http://{addr}/")).unwrap(),
            CtftimeClient::DEFAULT_USER_AGENT,
            std::time::Duration::from_secs(5),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_upstream_status_error_policy() {
        let fetcher = EventFetcher::new(unavailable_client().await);

        assert!(fetcher.fetch_window(NOW, NOW + WEEK).await.is_empty());
        assert!(fetcher.fetch_event(2790).await.is_none());

        let err = fetcher.event_info(2790).await.unwrap_err();
        assert!(matches!(
            err,
            FetchError::UpstreamUnavailable(ClientError::Api { status, .. })
                if status.as_u16() == 503
        ));
    }

    #[tokio::test]
    async fn test_fetch_event_normalizes() {
        let fetcher = EventFetcher::new(source());
        let record = fetcher.fetch_event(2790).await.unwrap();
        assert_eq!(record.id, 2790);
        assert_eq!(record.location, "Online");
        assert_eq!(
            record.start,
            Some(OffsetDateTime::from_unix_timestamp(1_759_514_400).unwrap())
        );
    }

    #[tokio::test]
    async fn test_event_info_unavailable() {
        let fetcher = EventFetcher::new(source());
        let err = fetcher.event_info(2790).await.unwrap_err();
        assert!(matches!(err, FetchError::UpstreamUnavailable(_)));
    }

    #[tokio::test]
    async fn test_event_info_malformed() {
        let fetcher = EventFetcher::new(FixtureSource {
            page: Some("<html><body>Not Found</body></html>".to_string()),
            ..source()
        });
        let err = fetcher.event_info(2790).await.unwrap_err();
        assert!(matches!(
            err,
            FetchError::MalformedUpstream(MalformedUpstream::MissingElement(_))
        ));
    }

    #[tokio::test]
    async fn test_upcoming_listing_unavailable() {
        let fetcher = EventFetcher::new(source());
        let err = fetcher.upcoming_listing(5, 2025).await.unwrap_err();
        assert!(matches!(err, FetchError::UpstreamUnavailable(_)));
    }
}
