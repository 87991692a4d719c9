//! # edb sled storage
//!
//! [`SledEventStore`] persists events in a sled database, one tree per actor.
//!
//! Layout:
//! - `events`: registry of actors, one empty-valued key per partition
//! - `events/<actor>`: the actor's events, keyed by event id, JSON encoded
//!
//! Writes run as a single sled transaction across the registry and every partition the batch
//! touches, and are flushed before `save_events` returns.

mod database;
mod engine;
mod error;

pub use database::{partition_name, Database, EVENTS_TREE};
pub use engine::SledEventStore;
