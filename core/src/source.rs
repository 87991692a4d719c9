use async_trait::async_trait;

use crate::{error::FetchError, event::RemoteEvent};

/// A remote feed of activity events.
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Fetch the most recent events performed by `username`.
    async fn fetch_events(&self, username: &str) -> Result<Vec<RemoteEvent>, FetchError>;
}
