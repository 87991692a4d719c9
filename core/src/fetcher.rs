use std::{sync::Arc, time::Duration};

use tokio::{
    select,
    sync::watch,
    time::{interval, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;
use tracing::Level;

use crate::{error::CycleError, event::Event, logger::Logger, source::EventSource, storage::EventStorage};

/// Time between polls
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(60);

const MIN_INTERVAL: Duration = Duration::from_millis(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetcherState {
    Idle,
    Fetching,
    Saved,
    FetchFailed,
    SaveFailed,
    Waiting,
    Stopped,
}

/// Polls the event source for one tracked user and saves what it receives.
///
/// The first poll happens as soon as [`Fetcher::run`] starts. Fetch and save failures are
/// logged and retried on the next tick; only cancellation ends the loop.
pub struct Fetcher {
    username: String,
    source: Arc<dyn EventSource>,
    storage: Arc<dyn EventStorage>,
    logger: Arc<dyn Logger>,
    interval: Duration,
    state: watch::Sender<FetcherState>,
}

impl Fetcher {
    pub fn new(username: impl Into<String>, source: Arc<dyn EventSource>, storage: Arc<dyn EventStorage>, logger: Arc<dyn Logger>) -> Self {
        let (state, _) = watch::channel(FetcherState::Idle);
        Self { username: username.into(), source, storage, logger, interval: DEFAULT_INTERVAL, state }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval.max(MIN_INTERVAL);
        self
    }

    pub fn username(&self) -> &str { &self.username }

    pub fn interval(&self) -> Duration { self.interval }

    /// Watch the fetcher's progress through its cycle
    pub fn state(&self) -> watch::Receiver<FetcherState> { self.state.subscribe() }

    /// Poll until `cancel` fires. Cancellation is only observed between cycles.
    pub async fn run(self, cancel: CancellationToken) {
        let mut ticker = interval(self.interval);
        // a slow cycle pushes the schedule back rather than causing a burst of catch-up polls
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }

            if let Err(e) = self.run_once().await {
                self.logger.log(Level::WARN, &format!("{}: {}", self.username, e));
            }
            self.state.send_replace(FetcherState::Waiting);
        }

        self.state.send_replace(FetcherState::Stopped);
        self.logger.log(Level::INFO, &format!("fetcher for {} stopped", self.username));
    }

    /// Run a single fetch and save cycle, returning the number of events saved.
    pub async fn run_once(&self) -> Result<usize, CycleError> {
        self.state.send_replace(FetcherState::Fetching);
        self.logger.log(Level::INFO, &format!("fetching {}", self.username));

        let remote = match self.source.fetch_events(&self.username).await {
            Ok(remote) => remote,
            Err(e) => {
                self.state.send_replace(FetcherState::FetchFailed);
                return Err(e.into());
            }
        };
        self.logger.log(Level::INFO, &format!("received {} events for {}", remote.len(), self.username));

        let events: Vec<Event> = remote.into_iter().map(|r| Event::from_remote(r, &self.username)).collect();
        let count = events.len();

        if let Err(e) = self.storage.save_events(events).await {
            self.state.send_replace(FetcherState::SaveFailed);
            return Err(e.into());
        }

        self.state.send_replace(FetcherState::Saved);
        Ok(count)
    }
}
