use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use edb_core::{Event, EventStorage, StorageError};
use sled::Config;
use tokio::task;
use tracing::{debug, info};

use crate::database::Database;

/// Event store backed by a sled database directory.
///
/// The store owns the database exclusively between [`open`](Self::open) and
/// [`close`](Self::close). Closing is idempotent and safe on a store that was never opened.
#[derive(Default)]
pub struct SledEventStore {
    database: Mutex<Option<Arc<Database>>>,
}

impl SledEventStore {
    /// A store with nothing open yet
    pub fn new() -> Self { Self::default() }

    pub fn with_path(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let store = Self::new();
        store.open(path)?;
        Ok(store)
    }

    /// A throwaway store that is deleted when closed
    pub fn open_temporary() -> Result<Self, StorageError> {
        let db = Config::new().temporary(true).flush_every_ms(None).open().map_err(StorageError::unavailable)?;
        let store = Self::new();
        *store.lock() = Some(Arc::new(Database::open(db)?));
        Ok(store)
    }

    /// Open or create the database at `path`, creating the top level events tree.
    pub fn open(&self, path: impl AsRef<Path>) -> Result<(), StorageError> {
        let path = path.as_ref();
        let mut database = self.lock();
        if database.is_some() {
            return Err(StorageError::unavailable("store is already open"));
        }

        std::fs::create_dir_all(path).map_err(StorageError::unavailable)?;
        let db = sled::open(path).map_err(StorageError::unavailable)?;
        *database = Some(Arc::new(Database::open(db)?));

        info!("opened event store at {}", path.display());
        Ok(())
    }

    /// Flush and release the database. Operations still in flight finish against it first.
    pub fn close(&self) -> Result<(), StorageError> {
        match self.lock().take() {
            Some(database) => {
                database.flush()?;
                info!("closed event store");
            }
            None => debug!("event store already closed"),
        }
        Ok(())
    }

    pub fn is_open(&self) -> bool { self.lock().is_some() }

    /// The open database, for direct inspection in tests and tooling
    pub fn database(&self) -> Result<Arc<Database>, StorageError> { self.lock().clone().ok_or(StorageError::Closed) }

    fn lock(&self) -> MutexGuard<'_, Option<Arc<Database>>> { self.database.lock().unwrap_or_else(PoisonError::into_inner) }
}

#[async_trait]
impl EventStorage for SledEventStore {
    // sled calls block, so each operation runs on the blocking pool
    async fn save_events(&self, events: Vec<Event>) -> Result<(), StorageError> {
        let database = self.database()?;
        task::spawn_blocking(move || database.save_events(&events)).await.map_err(StorageError::transaction)?
    }

    async fn events(&self) -> Result<Vec<Event>, StorageError> {
        let database = self.database()?;
        task::spawn_blocking(move || database.events()).await.map_err(StorageError::transaction)?
    }

    async fn events_by_actor(&self, actor: &str) -> Result<Vec<Event>, StorageError> {
        let database = self.database()?;
        let actor = actor.to_owned();
        task::spawn_blocking(move || database.events_by_actor(&actor)).await.map_err(StorageError::transaction)?
    }
}
