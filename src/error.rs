// Typed failures for store and storage operations

use crate::task::TaskId;
use thiserror::Error;

type Source = Box<dyn std::error::Error + Send + Sync>;

/// Errors surfaced by [`TaskStore`](crate::TaskStore) and its storage backends
///
/// All variants are local to a single operation; none is fatal to the
/// process. A `StorageWrite` means the attempted mutation did not take
/// effect in memory either.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The persisted value is inaccessible or malformed
    #[error("failed to read persisted tasks")]
    StorageRead(#[source] Source),

    /// The collection could not be written back to storage
    #[error("failed to write tasks to storage")]
    StorageWrite(#[source] Source),

    /// No task with the given identifier exists in the collection
    #[error("no task with id {0}")]
    TaskNotFound(TaskId),
}

impl StoreError {
    pub(crate) fn read(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        StoreError::StorageRead(Box::new(source))
    }

    pub(crate) fn write(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        StoreError::StorageWrite(Box::new(source))
    }
}
