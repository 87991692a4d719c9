use std::{sync::Arc, time::Duration};

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::Level;

use crate::{
    fetcher::{Fetcher, FetcherState, DEFAULT_INTERVAL},
    logger::Logger,
    source::EventSource,
    storage::EventStorage,
};

struct RunningFetcher {
    username: String,
    state: tokio::sync::watch::Receiver<FetcherState>,
    task: JoinHandle<()>,
}

/// Owns one [`Fetcher`] task per tracked user and their shared shutdown.
///
/// Every fetcher observes the same cancellation token, so [`FetcherSupervisor::shutdown`]
/// stops them all with a single signal and then waits for each task to exit. Call it
/// before closing the store the fetchers write to.
pub struct FetcherSupervisor {
    source: Arc<dyn EventSource>,
    storage: Arc<dyn EventStorage>,
    logger: Arc<dyn Logger>,
    interval: Duration,
    cancel: CancellationToken,
    fetchers: std::sync::Mutex<Vec<RunningFetcher>>,
}

impl FetcherSupervisor {
    pub fn new(source: Arc<dyn EventSource>, storage: Arc<dyn EventStorage>, logger: Arc<dyn Logger>) -> Self {
        Self {
            source,
            storage,
            logger,
            interval: DEFAULT_INTERVAL,
            cancel: CancellationToken::new(),
            fetchers: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Spawn a fetcher for each username. Returns immediately; must be called within a tokio runtime.
    pub fn start<I, S>(&self, usernames: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut fetchers = self.lock_fetchers();
        let before = fetchers.len();

        for username in usernames {
            let fetcher = Fetcher::new(username, self.source.clone(), self.storage.clone(), self.logger.clone()).with_interval(self.interval);
            let username = fetcher.username().to_owned();
            let state = fetcher.state();
            let task = tokio::spawn(fetcher.run(self.cancel.clone()));
            fetchers.push(RunningFetcher { username, state, task });
        }

        self.logger.log(Level::INFO, &format!("starting fetchers({})", fetchers.len() - before));
    }

    /// Usernames of the fetchers that have been started and not yet joined
    pub fn usernames(&self) -> Vec<String> { self.lock_fetchers().iter().map(|f| f.username.clone()).collect() }

    /// Current state of the fetcher for `username`, if one is running
    pub fn state_of(&self, username: &str) -> Option<FetcherState> {
        self.lock_fetchers().iter().find(|f| f.username == username).map(|f| *f.state.borrow())
    }

    /// Cancel every fetcher and wait for all of them to exit.
    ///
    /// There is no timeout: a fetcher blocked inside a fetch or save delays the return
    /// until that call completes.
    pub async fn shutdown(&self) {
        self.cancel.cancel();

        let fetchers = std::mem::take(&mut *self.lock_fetchers());
        if fetchers.is_empty() {
            return;
        }

        self.logger.log(Level::INFO, &format!("stopping fetchers({})", fetchers.len()));
        for fetcher in fetchers {
            if let Err(e) = fetcher.task.await {
                self.logger.log(Level::WARN, &format!("fetcher for {} did not exit cleanly: {}", fetcher.username, e));
            }
        }
        self.logger.log(Level::INFO, "all fetchers stopped");
    }

    fn lock_fetchers(&self) -> std::sync::MutexGuard<'_, Vec<RunningFetcher>> {
        // a poisoned list is still a valid list of handles
        self.fetchers.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Drop for FetcherSupervisor {
    fn drop(&mut self) {
        self.cancel.cancel();
        for fetcher in self.lock_fetchers().drain(..) {
            fetcher.task.abort();
        }
    }
}
