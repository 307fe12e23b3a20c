// Task collection store: read-modify-write over a single storage key

use crate::error::StoreError;
use crate::storage::Storage;
use crate::task::{self, Task, TaskId};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

/// Storage key the serialized collection lives under
pub const TASKS_KEY: &str = "TASKS";

/// Persistent, newest-first task collection
///
/// The store holds an immutable snapshot of the collection and swaps it
/// only after a successful persist, so the in-memory view never diverges
/// from storage. A mutex is held across each whole read-modify-write, so
/// rapid-fire mutations cannot lose updates and the store can be shared
/// behind `Arc` from a view layer.
#[derive(Debug)]
pub struct TaskStore<S> {
    storage: S,
    tasks: Mutex<Arc<Vec<Task>>>,
}

impl<S: Storage> TaskStore<S> {
    /// Create a store with an empty snapshot
    ///
    /// Call [`load`](Self::load) to populate it from storage.
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            tasks: Mutex::new(Arc::new(Vec::new())),
        }
    }

    /// Create a store and load the persisted collection in one step
    pub fn open(storage: S) -> Result<Self, StoreError> {
        let store = Self::new(storage);
        store.load()?;
        Ok(store)
    }

    /// Current snapshot of the collection, newest-first
    pub fn tasks(&self) -> Arc<Vec<Task>> {
        Arc::clone(&self.lock())
    }

    /// Read the persisted collection into the snapshot
    ///
    /// An absent key yields an empty collection. A malformed value is a
    /// `StorageRead` error and leaves the snapshot untouched. Idempotent.
    pub fn load(&self) -> Result<Arc<Vec<Task>>, StoreError> {
        let mut guard = self.lock();

        let tasks = match self.storage.read(TASKS_KEY)? {
            Some(raw) => serde_json::from_str::<Vec<Task>>(&raw).map_err(StoreError::read)?,
            None => Vec::new(),
        };
        debug!(count = tasks.len(), "loaded persisted tasks");

        let snapshot = Arc::new(tasks);
        *guard = Arc::clone(&snapshot);
        Ok(snapshot)
    }

    /// Add a pending task at the front of the collection and persist
    ///
    /// The task is stamped with the current instant; a stamp already
    /// present in the collection is nudged forward until unique. Returns
    /// the updated collection.
    pub fn add(&self, title: impl Into<String>) -> Result<Arc<Vec<Task>>, StoreError> {
        let mut guard = self.lock();

        let mut timestamp = task::now_iso();
        while guard.iter().any(|t| t.timestamp == timestamp) {
            timestamp = task::next_millis(&timestamp);
        }

        let mut next = Vec::with_capacity(guard.len() + 1);
        next.push(Task::new(title, timestamp));
        next.extend(guard.iter().cloned());

        self.commit(&mut guard, next)
    }

    /// Set the done flag of the task identified by `id` and persist
    ///
    /// Returns the updated collection, or `TaskNotFound` if no task
    /// carries that identifier.
    pub fn set_status(&self, id: &TaskId, status: bool) -> Result<Arc<Vec<Task>>, StoreError> {
        let mut guard = self.lock();
        let pos = position(&guard, id)?;

        let mut next: Vec<Task> = guard.iter().cloned().collect();
        next[pos].status = status;

        self.commit(&mut guard, next)
    }

    /// Remove the task identified by `id` and persist
    ///
    /// Returns the updated collection, or `TaskNotFound` if no task
    /// carries that identifier.
    pub fn remove(&self, id: &TaskId) -> Result<Arc<Vec<Task>>, StoreError> {
        let mut guard = self.lock();
        let pos = position(&guard, id)?;

        let mut next: Vec<Task> = guard.iter().cloned().collect();
        next.remove(pos);

        self.commit(&mut guard, next)
    }

    fn lock(&self) -> MutexGuard<'_, Arc<Vec<Task>>> {
        self.tasks.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Persist `next`, then swap it in as the current snapshot
    ///
    /// On a write failure the snapshot keeps its previous value.
    fn commit(
        &self,
        guard: &mut MutexGuard<'_, Arc<Vec<Task>>>,
        next: Vec<Task>,
    ) -> Result<Arc<Vec<Task>>, StoreError> {
        let raw = serde_json::to_string(&next).map_err(StoreError::write)?;
        self.storage.write(TASKS_KEY, &raw)?;

        let snapshot = Arc::new(next);
        **guard = Arc::clone(&snapshot);
        debug!(count = snapshot.len(), "persisted task collection");
        Ok(snapshot)
    }
}

fn position(tasks: &[Task], id: &TaskId) -> Result<usize, StoreError> {
    tasks
        .iter()
        .position(|t| t.timestamp == id.as_str())
        .ok_or_else(|| StoreError::TaskNotFound(id.clone()))
}
