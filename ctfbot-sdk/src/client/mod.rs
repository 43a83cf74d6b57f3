//! HTTP client for the CTFtime site and API.
//!
//! Gated behind the `client` cargo feature so crates that only need the
//! shared types do not pull in `reqwest`.

mod ctftime;

pub use ctftime::CtftimeClient;

use reqwest::StatusCode;

/// Errors produced by the upstream HTTP client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Transport-level failure (DNS, TLS, timeout, connection reset, …).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The upstream returned a non-2xx status code.
    #[error("upstream error: status {status}, body: {body}")]
    Api { status: StatusCode, body: String },

    /// Response body could not be deserialized.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The base URL could not be joined with the endpoint path.
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
}

async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, ClientError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(ClientError::Api { status, body });
    }
    Ok(resp)
}

async fn parse_json<T: serde::de::DeserializeOwned>(
    resp: reqwest::Response,
) -> Result<T, ClientError> {
    let resp = check_status(resp).await?;
    let bytes = resp.bytes().await?;
    serde_json::from_slice(&bytes).map_err(ClientError::Json)
}

async fn parse_text(resp: reqwest::Response) -> Result<String, ClientError> {
    let resp = check_status(resp).await?;
    Ok(resp.text().await?)
}
