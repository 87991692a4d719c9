use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use edb_core::{storage::sort_by_timestamp, Event, StorageError};
use sled::transaction::{ConflictableTransactionResult, TransactionResult, Transactional};
use sled::Db;

use crate::error::{sled_error, transaction_error};

/// Registry tree: one key per actor that has a partition
pub const EVENTS_TREE: &str = "events";

/// Name of the tree holding one actor's events, keyed by event id
pub fn partition_name(actor: &str) -> String { format!("{EVENTS_TREE}/{actor}") }

pub struct Database {
    pub(crate) db: Db,
    pub(crate) actors: sled::Tree,
    // sled transactions do not isolate a scan across trees; writers hold this exclusively
    commit: RwLock<()>,
}

impl Database {
    pub fn open(db: Db) -> Result<Self, StorageError> {
        let actors = db.open_tree(EVENTS_TREE).map_err(StorageError::unavailable)?;
        Ok(Self { db, actors, commit: RwLock::new(()) })
    }

    /// Upsert every event in one transaction spanning the registry and each touched partition.
    pub fn save_events(&self, events: &[Event]) -> Result<(), StorageError> {
        if events.is_empty() {
            return Ok(());
        }

        // Encode before the transaction starts so that a bad record aborts the batch with nothing written.
        // trees[0] is the registry; partitions follow in first-seen order.
        let mut trees = vec![self.actors.clone()];
        let mut partitions: HashMap<&str, usize> = HashMap::new();
        let mut records = Vec::with_capacity(events.len());
        for event in events {
            let value = serde_json::to_vec(event).map_err(StorageError::transaction)?;
            let index = match partitions.get(event.actor.as_str()) {
                Some(index) => *index,
                None => {
                    // Opening a tree is not transactional; a partition left behind by a failed batch stays empty
                    trees.push(self.db.open_tree(partition_name(&event.actor)).map_err(sled_error)?);
                    partitions.insert(event.actor.as_str(), trees.len() - 1);
                    trees.len() - 1
                }
            };
            records.push((index, event.actor.as_bytes(), event.id.as_bytes(), value));
        }

        let _commit = self.commit.write().unwrap_or_else(PoisonError::into_inner);
        let result: TransactionResult<()> = trees.as_slice().transaction(|views| -> ConflictableTransactionResult<()> {
            for (index, actor, id, value) in &records {
                views[0].insert(*actor, &b""[..])?;
                views[*index].insert(*id, value.as_slice())?;
            }
            Ok(())
        });
        result.map_err(transaction_error)?;

        self.db.flush().map_err(sled_error)?;
        Ok(())
    }

    /// Every event in every partition, stably sorted by timestamp
    pub fn events(&self) -> Result<Vec<Event>, StorageError> {
        let _commit = self.commit.read().unwrap_or_else(PoisonError::into_inner);
        let mut events = Vec::new();
        for item in self.actors.iter() {
            let (actor, _) = item.map_err(sled_error)?;
            let actor = String::from_utf8_lossy(&actor);
            self.scan_partition(&actor, &mut events)?;
        }

        sort_by_timestamp(&mut events);
        Ok(events)
    }

    pub fn events_by_actor(&self, actor: &str) -> Result<Vec<Event>, StorageError> {
        let _commit = self.commit.read().unwrap_or_else(PoisonError::into_inner);
        let mut events = Vec::new();
        if self.has_actor(actor)? {
            self.scan_partition(actor, &mut events)?;
        }
        Ok(events)
    }

    /// Whether any event has ever been saved for `actor`
    pub fn has_actor(&self, actor: &str) -> Result<bool, StorageError> { self.actors.contains_key(actor).map_err(sled_error) }

    fn scan_partition(&self, actor: &str, events: &mut Vec<Event>) -> Result<(), StorageError> {
        let tree = self.db.open_tree(partition_name(actor)).map_err(sled_error)?;
        for item in tree.iter() {
            let (key, value) = item.map_err(sled_error)?;
            let event = serde_json::from_slice(&value).map_err(|source| StorageError::CorruptRecord {
                actor: actor.to_owned(),
                id: String::from_utf8_lossy(&key).into_owned(),
                source,
            })?;
            events.push(event);
        }
        Ok(())
    }

    /// Store raw bytes as a record of `actor`, bypassing encoding. For exercising decode failures.
    #[doc(hidden)]
    pub fn insert_raw(&self, actor: &str, id: &str, value: &[u8]) -> Result<(), StorageError> {
        let _commit = self.commit.write().unwrap_or_else(PoisonError::into_inner);
        self.db.open_tree(partition_name(actor)).map_err(sled_error)?.insert(id, value).map_err(sled_error)?;
        self.actors.insert(actor, &b""[..]).map_err(sled_error)?;
        Ok(())
    }

    pub fn flush(&self) -> Result<(), StorageError> {
        self.db.flush().map_err(sled_error)?;
        Ok(())
    }
}
