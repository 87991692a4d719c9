//! # edb GitHub source
//!
//! [`GithubClient`] lists a user's public events from the GitHub REST API and hands them to
//! the fetchers as [`RemoteEvent`]s.

use std::time::Duration;

use async_trait::async_trait;
use edb_core::{EventSource, FetchError, RemoteEvent};
use reqwest::header::{ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::Client;
use tracing::debug;

/// Public GitHub API root
pub const DEFAULT_API_URL: &str = "https://api.github.com";

const MEDIA_TYPE: &str = "application/vnd.github+json";
const AGENT: &str = concat!("edb/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone)]
pub struct GithubClient {
    client: Client,
    base_url: String,
    token: String,
}

impl GithubClient {
    pub fn new(base_url: &str, token: impl Into<String>) -> Self {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build().unwrap_or_else(|_| Client::new());
        Self { client, base_url: base_url.trim_end_matches('/').to_string(), token: token.into() }
    }

    pub fn base_url(&self) -> &str { &self.base_url }

    fn events_url(&self, username: &str) -> String { format!("{}/users/{}/events/public", self.base_url, username) }
}

impl std::fmt::Debug for GithubClient {
    // keep the token out of logs
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GithubClient").field("base_url", &self.base_url).finish_non_exhaustive()
    }
}

#[async_trait]
impl EventSource for GithubClient {
    async fn fetch_events(&self, username: &str) -> Result<Vec<RemoteEvent>, FetchError> {
        let response = self
            .client
            .get(self.events_url(username))
            .header(AUTHORIZATION, format!("Bearer {}", self.token))
            .header(ACCEPT, MEDIA_TYPE)
            .header(USER_AGENT, AGENT)
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.into()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let remaining = response.headers().get("x-ratelimit-remaining").and_then(|v| v.to_str().ok()).map(str::to_owned);
        let body = response.bytes().await.map_err(|e| FetchError::Transport(e.into()))?;
        let events: Vec<RemoteEvent> = serde_json::from_slice(&body).map_err(|e| FetchError::Decode(e.into()))?;

        debug!("{}: {} events, rate limit remaining {}", username, events.len(), remaining.as_deref().unwrap_or("unknown"));
        Ok(events)
    }
}
