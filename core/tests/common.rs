#![allow(dead_code)]

use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use edb_core::{storage::sort_by_timestamp, Event, EventSource, EventStorage, FetchError, Logger, RemoteActor, RemoteEvent, RemoteRepo, StorageError};
use tokio::sync::watch;
use tracing::Level;

// Initialize tracing for tests
#[ctor::ctor]
fn init_tracing() { tracing_subscriber::fmt().with_max_level(Level::INFO).with_test_writer().init(); }

pub fn ts(y: i32, m: u32, d: u32) -> DateTime<Utc> { Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap() }

pub fn remote(id: &str, actor: &str) -> RemoteEvent {
    RemoteEvent {
        id: id.to_owned(),
        kind: "PushEvent".to_owned(),
        created_at: ts(2000, 1, 1),
        actor: Some(RemoteActor { login: actor.to_owned() }),
        repo: Some(RemoteRepo { name: format!("{actor}/edb") }),
    }
}

/// In-memory storage with a single lock standing in for write serialization
pub struct MemoryStorage {
    partitions: Mutex<BTreeMap<String, BTreeMap<String, Event>>>,
    failing_saves: AtomicUsize,
    saves: watch::Sender<usize>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        let (saves, _) = watch::channel(0);
        Self { partitions: Mutex::new(BTreeMap::new()), failing_saves: AtomicUsize::new(0), saves }
    }

    /// Reject the next `n` saves with a transaction failure
    pub fn fail_next_saves(&self, n: usize) { self.failing_saves.store(n, Ordering::SeqCst); }

    pub fn saves(&self) -> usize { *self.saves.borrow() }

    /// Wait until at least `n` batches have been committed
    pub async fn wait_for_saves(&self, n: usize) {
        let mut rx = self.saves.subscribe();
        rx.wait_for(|count| *count >= n).await.expect("storage dropped");
    }
}

#[async_trait]
impl EventStorage for MemoryStorage {
    async fn save_events(&self, events: Vec<Event>) -> Result<(), StorageError> {
        let failing = self.failing_saves.load(Ordering::SeqCst);
        if failing > 0 {
            self.failing_saves.store(failing - 1, Ordering::SeqCst);
            return Err(StorageError::transaction("disk full"));
        }

        let mut partitions = self.partitions.lock().unwrap();
        for event in events {
            partitions.entry(event.actor.clone()).or_default().insert(event.id.clone(), event);
        }
        drop(partitions);

        self.saves.send_modify(|count| *count += 1);
        Ok(())
    }

    async fn events(&self) -> Result<Vec<Event>, StorageError> {
        let partitions = self.partitions.lock().unwrap();
        let mut events: Vec<Event> = partitions.values().flat_map(|p| p.values().cloned()).collect();
        sort_by_timestamp(&mut events);
        Ok(events)
    }

    async fn events_by_actor(&self, actor: &str) -> Result<Vec<Event>, StorageError> {
        let partitions = self.partitions.lock().unwrap();
        Ok(partitions.get(actor).map(|p| p.values().cloned().collect()).unwrap_or_default())
    }
}

/// Replays scripted responses in order, then answers with one fresh event per call
#[derive(Default)]
pub struct ScriptedSource {
    script: Mutex<VecDeque<Result<Vec<RemoteEvent>, FetchError>>>,
    calls: AtomicUsize,
}

impl ScriptedSource {
    pub fn new(script: Vec<Result<Vec<RemoteEvent>, FetchError>>) -> Self {
        Self { script: Mutex::new(script.into()), calls: AtomicUsize::new(0) }
    }

    pub fn calls(&self) -> usize { self.calls.load(Ordering::SeqCst) }
}

#[async_trait]
impl EventSource for ScriptedSource {
    async fn fetch_events(&self, username: &str) -> Result<Vec<RemoteEvent>, FetchError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        match self.script.lock().unwrap().pop_front() {
            Some(response) => response,
            None => Ok(vec![remote(&format!("{username}-{call}"), username)]),
        }
    }
}

#[derive(Default)]
pub struct MemoryLogger {
    lines: Mutex<Vec<(Level, String)>>,
}

impl MemoryLogger {
    pub fn new() -> Self { Self::default() }

    pub fn contains(&self, level: Level, needle: &str) -> bool {
        self.lines.lock().unwrap().iter().any(|(l, line)| *l == level && line.contains(needle))
    }
}

impl Logger for MemoryLogger {
    fn log(&self, level: Level, message: &str) { self.lines.lock().unwrap().push((level, message.to_owned())); }
}
