use edb_core::StorageError;
use sled::transaction::TransactionError;

pub fn sled_error(err: sled::Error) -> StorageError { StorageError::transaction(err) }

pub fn transaction_error(err: TransactionError<()>) -> StorageError {
    match err {
        TransactionError::Abort(()) => StorageError::transaction("transaction aborted"),
        TransactionError::Storage(e) => sled_error(e),
    }
}
