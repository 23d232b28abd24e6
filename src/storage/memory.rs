use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use tokio::sync::{broadcast, Mutex};

use super::{change_channel, notify, DurableStore, Entries, StorageChanges, StorageMap};
use crate::core::{Result, DEFAULT_CHANGE_BUFFER};

/// Shared state between store handles
struct Inner {
    entries: Mutex<Entries>,
    changes: broadcast::Sender<StorageChanges>,
}

/// A process-local durable store.
///
/// Clones are handles onto the same entries; each clone stands in for one
/// context attached to the store.
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

impl MemoryStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::with_values(StorageMap::new())
    }

    /// Creates a store seeded with `values`
    pub fn with_values(values: StorageMap) -> Self {
        Self::with_capacity(values, DEFAULT_CHANGE_BUFFER)
    }

    /// Creates a seeded store whose change channel holds `capacity`
    /// notifications, at least one
    pub fn with_capacity(values: StorageMap, capacity: usize) -> Self {
        MemoryStore {
            inner: Arc::new(Inner {
                entries: Mutex::new(Entries::new(values)),
                changes: change_channel(capacity),
            }),
        }
    }

    /// Returns a copy of everything stored
    pub async fn dump(&self) -> StorageMap {
        self.inner.entries.lock().await.values().clone()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DurableStore for MemoryStore {
    fn get(&self, defaults: StorageMap) -> BoxFuture<'_, Result<StorageMap>> {
        async move { Ok(self.inner.entries.lock().await.get(defaults)) }.boxed()
    }

    fn set(&self, items: StorageMap) -> BoxFuture<'_, Result<()>> {
        async move {
            let mut entries = self.inner.entries.lock().await;
            let changes = entries.set(items);
            notify(&self.inner.changes, changes);
            Ok(())
        }
        .boxed()
    }

    fn remove(&self, keys: Vec<String>) -> BoxFuture<'_, Result<()>> {
        async move {
            let mut entries = self.inner.entries.lock().await;
            let changes = entries.remove(&keys);
            notify(&self.inner.changes, changes);
            Ok(())
        }
        .boxed()
    }

    fn subscribe(&self) -> broadcast::Receiver<StorageChanges> {
        self.inner.changes.subscribe()
    }
}
