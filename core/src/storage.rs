use async_trait::async_trait;

use crate::{error::StorageError, event::Event};

/// Durable storage of events, partitioned by actor.
///
/// Implementations must apply `save_events` atomically: either every event of the batch
/// becomes visible or none does. Backends without their own write serialization need a
/// single write lock around it.
#[async_trait]
pub trait EventStorage: Send + Sync {
    /// Upsert each event under `(event.actor, event.id)`, creating partitions as needed.
    async fn save_events(&self, events: Vec<Event>) -> Result<(), StorageError>;

    /// All events in the store, ascending by timestamp. Tie order is unspecified.
    async fn events(&self) -> Result<Vec<Event>, StorageError>;

    /// Events for one actor in key (`id`) order. A missing partition yields an empty list.
    async fn events_by_actor(&self, actor: &str) -> Result<Vec<Event>, StorageError>;
}

/// Stable sort by ascending timestamp, keeping traversal order among equal timestamps.
pub fn sort_by_timestamp(events: &mut [Event]) { events.sort_by_key(|e| e.timestamp); }
