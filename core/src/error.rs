use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors returned by an [`EventStorage`](crate::storage::EventStorage) backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backing store could not be created, opened or locked
    #[error("storage unavailable: {0}")]
    Unavailable(BoxError),

    /// The store has not been opened, or has already been closed
    #[error("store is closed")]
    Closed,

    /// A read or write transaction did not complete
    #[error("transaction failed: {0}")]
    TransactionFailed(BoxError),

    /// A stored record could not be decoded
    #[error("corrupt record {id:?} in partition {actor:?}: {source}")]
    CorruptRecord {
        actor: String,
        id: String,
        #[source]
        source: serde_json::Error,
    },
}

impl StorageError {
    pub fn unavailable(err: impl Into<BoxError>) -> Self { StorageError::Unavailable(err.into()) }

    pub fn transaction(err: impl Into<BoxError>) -> Self { StorageError::TransactionFailed(err.into()) }
}

/// Errors returned by an [`EventSource`](crate::source::EventSource).
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(BoxError),
    #[error("unexpected status: {0}")]
    Status(u16),
    #[error("decode failed: {0}")]
    Decode(BoxError),
}

/// Why a single fetch/save cycle did not complete. Never fatal to the fetcher.
#[derive(Debug, Error)]
pub enum CycleError {
    #[error("list events: {0}")]
    FetchFailed(#[from] FetchError),
    #[error("save events: {0}")]
    SaveFailed(#[from] StorageError),
}
