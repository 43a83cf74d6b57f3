//! CTFtime client: event pages, the upcoming listing, and the v1 JSON API.

use std::time::Duration;

use reqwest::Client;
use tracing::debug;
use url::Url;

use super::{ClientError, parse_json, parse_text};
use crate::objects::ApiEvent;

/// Typed HTTP client for CTFtime.
///
/// Every request carries a browser user agent, since the site rejects the
/// default `reqwest` one, and a bounded timeout. Nothing is retried.
#[derive(Debug, Clone)]
pub struct CtftimeClient {
    http: Client,
    base_url: Url,
}

impl CtftimeClient {
    pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_11_5) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/50.0.2661.102 Safari/537.36";
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);
    /// Page size requested from the window query.
    pub const WINDOW_LIMIT: u32 = 100;

    /// Create a client against `base_url` (normally
    /// [`SITE_ORIGIN`](crate::objects::SITE_ORIGIN)).
    pub fn new(base_url: Url, user_agent: &str, timeout: Duration) -> Result<Self, ClientError> {
        let http = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;
        Ok(Self { http, base_url })
    }

    /// `GET /event/{id}` – raw HTML of an event detail page.
    pub async fn event_page(&self, event_id: u64) -> Result<String, ClientError> {
        let url = self.base_url.join(&format!("/event/{event_id}"))?;
        debug!(%url, "Fetching event page");
        let resp = self.http.get(url).send().await?;
        parse_text(resp).await
    }

    /// `GET /event/list/upcoming` – raw HTML of the upcoming listing.
    pub async fn listing_page(&self) -> Result<String, ClientError> {
        let url = self.base_url.join("/event/list/upcoming")?;
        debug!(%url, "Fetching upcoming listing");
        let resp = self.http.get(url).send().await?;
        parse_text(resp).await
    }

    /// `GET /api/v1/events/{id}/` – one event from the JSON API.
    pub async fn event(&self, event_id: u64) -> Result<ApiEvent, ClientError> {
        let url = self.base_url.join(&format!("/api/v1/events/{event_id}/"))?;
        debug!(%url, "Fetching API event");
        let resp = self.http.get(url).send().await?;
        parse_json(resp).await
    }

    /// `GET /api/v1/events/?limit=&start=&finish=` – events starting in
    /// `[start, finish)`, both given as unix seconds.
    pub async fn events_between(
        &self,
        start: i64,
        finish: i64,
    ) -> Result<Vec<ApiEvent>, ClientError> {
        let url = self.base_url.join("/api/v1/events/")?;
        debug!(%url, start, finish, "Fetching API event window");
        let resp = self
            .http
            .get(url)
            .query(&[
                ("limit", Self::WINDOW_LIMIT.to_string()),
                ("start", start.to_string()),
                ("finish", finish.to_string()),
            ])
            .send()
            .await?;
        parse_json(resp).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::{
        Router,
        extract::{RawQuery, State},
        http::{HeaderMap, StatusCode},
        routing::get,
    };
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Seen {
        requests: Arc<Mutex<Vec<(Option<String>, Option<String>)>>>,
    }

    async fn window(
        State(seen): State<Seen>,
        RawQuery(query): RawQuery,
        headers: HeaderMap,
    ) -> ([(&'static str, &'static str); 1], &'static str) {
        let agent = headers
            .get("user-agent")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        seen.requests.lock().unwrap().push((query, agent));
        ([("content-type", "application/json")], "[]")
    }

    async fn serve(router: Router) -> Url {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        Url::parse(&format!("http://{addr}/")).unwrap()
    }

    fn client(base: Url) -> CtftimeClient {
        CtftimeClient::new(
            base,
            CtftimeClient::DEFAULT_USER_AGENT,
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_window_query_and_user_agent() {
        let seen = Seen::default();
        let router = Router::new()
            .route("/api/v1/events/", get(window))
            .with_state(seen.clone());
        let client = client(serve(router).await);

        let events = client.events_between(1_759_500_000, 1_760_104_800).await.unwrap();
        assert!(events.is_empty());

        let requests = seen.requests.lock().unwrap().clone();
        assert_eq!(requests.len(), 1);
        assert_eq!(
            requests[0].0.as_deref(),
            Some("limit=100&start=1759500000&finish=1760104800")
        );
        assert_eq!(
            requests[0].1.as_deref(),
            Some(CtftimeClient::DEFAULT_USER_AGENT)
        );
    }

    #[tokio::test]
    async fn test_non_success_status_is_api_error() {
        let router = Router::new().route(
            "/event/{id}",
            get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "down for maintenance") }),
        );
        let client = client(serve(router).await);

        match client.event_page(2790).await.unwrap_err() {
            ClientError::Api { status, body } => {
                assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
                assert_eq!(body, "down for maintenance");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_event_page_text() {
        let router = Router::new().route(
            "/event/{id}",
            get(|axum::extract::Path(id): axum::extract::Path<u64>| async move {
                format!("<html>event {id}</html>")
            }),
        );
        let client = client(serve(router).await);
        assert_eq!(client.event_page(2790).await.unwrap(), "<html>event 2790</html>");
    }
}
