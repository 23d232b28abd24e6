//! Durable key-value storage shared by every context
//!
//! A [`DurableStore`] holds untyped JSON values by key and notifies every
//! subscriber after each write that changed something, the writer included.
//! Listeners receive changes across the whole key space and must filter to
//! the keys they recognize.

mod file;
mod memory;

pub use self::file::JsonFileStore;
pub use self::memory::MemoryStore;

use std::collections::BTreeMap;

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::broadcast;

use crate::core::Result;

/// Stored values by key
pub type StorageMap = BTreeMap<String, Value>;

/// Changes delivered by one notification, by key
pub type StorageChanges = BTreeMap<String, StorageChange>;

/// The before and after of one key; `None` means the key is absent
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageChange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_value: Option<Value>,
}

/// An asynchronous key-value store with change notifications
pub trait DurableStore: Send + Sync {
    /// Returns the stored value for every key of `defaults`, falling back to
    /// the supplied default where the key is absent
    fn get(&self, defaults: StorageMap) -> BoxFuture<'_, Result<StorageMap>>;

    /// Upserts every entry of `items`
    fn set(&self, items: StorageMap) -> BoxFuture<'_, Result<()>>;

    /// Deletes `keys`; a later `get` falls back to defaults
    fn remove(&self, keys: Vec<String>) -> BoxFuture<'_, Result<()>>;

    /// Subscribes to change notifications
    fn subscribe(&self) -> broadcast::Receiver<StorageChanges>;
}

/// In-memory entries plus the change bookkeeping every store shares
#[derive(Debug, Clone, Default)]
pub(crate) struct Entries {
    values: StorageMap,
}

impl Entries {
    pub(crate) fn new(values: StorageMap) -> Self {
        Entries { values }
    }

    pub(crate) fn values(&self) -> &StorageMap {
        &self.values
    }

    pub(crate) fn get(&self, defaults: StorageMap) -> StorageMap {
        defaults
            .into_iter()
            .map(|(key, default)| {
                let value = self.values.get(&key).cloned().unwrap_or(default);
                (key, value)
            })
            .collect()
    }

    /// Applies an upsert, returning the keys whose value actually changed
    pub(crate) fn set(&mut self, items: StorageMap) -> StorageChanges {
        let mut changes = StorageChanges::new();
        for (key, value) in items {
            if self.values.get(&key) == Some(&value) {
                continue;
            }
            let old_value = self.values.insert(key.clone(), value.clone());
            changes.insert(
                key,
                StorageChange {
                    old_value,
                    new_value: Some(value),
                },
            );
        }
        changes
    }

    /// Applies a removal, returning the keys that were present
    pub(crate) fn remove(&mut self, keys: &[String]) -> StorageChanges {
        keys.iter()
            .filter_map(|key| {
                self.values.remove(key).map(|old_value| {
                    let change = StorageChange {
                        old_value: Some(old_value),
                        new_value: None,
                    };
                    (key.clone(), change)
                })
            })
            .collect()
    }

    /// Swaps in `values` wholesale, returning every key that differs
    pub(crate) fn replace(&mut self, values: StorageMap) -> StorageChanges {
        let mut changes = StorageChanges::new();
        for (key, old_value) in &self.values {
            if !values.contains_key(key) {
                let change = StorageChange {
                    old_value: Some(old_value.clone()),
                    new_value: None,
                };
                changes.insert(key.clone(), change);
            }
        }
        for (key, new_value) in &values {
            let old_value = self.values.get(key);
            if old_value != Some(new_value) {
                let change = StorageChange {
                    old_value: old_value.cloned(),
                    new_value: Some(new_value.clone()),
                };
                changes.insert(key.clone(), change);
            }
        }
        self.values = values;
        changes
    }
}

/// Creates the change channel of a store; a zero capacity holds one notification
pub(crate) fn change_channel(capacity: usize) -> broadcast::Sender<StorageChanges> {
    let (tx, _) = broadcast::channel(capacity.max(1));
    tx
}

/// Sends a notification unless it is empty; having no subscribers is fine
pub(crate) fn notify(tx: &broadcast::Sender<StorageChanges>, changes: StorageChanges) {
    if changes.is_empty() {
        return;
    }
    let keys: Vec<&String> = changes.keys().collect();
    tracing::debug!(?keys, "Broadcasting storage changes");
    if tx.send(changes).is_err() {
        tracing::trace!("No storage subscribers");
    }
}
