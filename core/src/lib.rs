//! # edb core
//!
//! The event model shared by every edb crate, the [`EventStorage`] and [`EventSource`]
//! seams, and the polling machinery that connects them: one [`Fetcher`] per tracked
//! user, owned by a [`FetcherSupervisor`].
//!
//! ```rust,no_run
//! # use std::sync::Arc;
//! # use edb_core::{EventSource, EventStorage, FetcherSupervisor, TracingLogger};
//! # async fn example(source: Arc<dyn EventSource>, storage: Arc<dyn EventStorage>) {
//! let supervisor = FetcherSupervisor::new(source, storage, Arc::new(TracingLogger));
//! supervisor.start(["benbjohnson", "susy"]);
//!
//! // ... later, before closing the store
//! supervisor.shutdown().await;
//! # }
//! ```

pub mod error;
pub mod event;
pub mod fetcher;
pub mod logger;
pub mod source;
pub mod storage;
pub mod supervisor;

pub use error::{CycleError, FetchError, StorageError};
pub use event::{Event, RemoteActor, RemoteEvent, RemoteRepo};
pub use fetcher::{Fetcher, FetcherState, DEFAULT_INTERVAL};
pub use logger::{Logger, TracingLogger};
pub use source::EventSource;
pub use storage::EventStorage;
pub use supervisor::FetcherSupervisor;
