use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex as StdMutex, OnceLock, Weak};

use futures::future::{BoxFuture, FutureExt};
use tokio::fs;
use tokio::sync::{broadcast, Mutex};

use super::{change_channel, notify, DurableStore, Entries, StorageChanges, StorageMap};
use crate::core::{Config, Error, Result};

/// Live stores by resolved path, so every open of one file in this process
/// shares entries and notifications
static OPEN_STORES: OnceLock<StdMutex<HashMap<PathBuf, Weak<Inner>>>> = OnceLock::new();

/// Shared state between store handles
struct Inner {
    path: PathBuf,
    entries: Mutex<Entries>,
    changes: broadcast::Sender<StorageChanges>,
}

/// A durable store persisted as one JSON object in a file.
///
/// Every open of the same file within a process returns a handle onto one
/// shared store, so all of them see each other's notifications. Each
/// operation re-reads the file first and only rewrites the keys it touches,
/// which keeps writes from other processes; those are announced as changes
/// on the next operation.
#[derive(Clone)]
pub struct JsonFileStore {
    inner: Arc<Inner>,
}

impl JsonFileStore {
    /// Opens the store at `path`; a missing file is an empty store.
    ///
    /// `capacity` sizes the change channel of a newly created store and is
    /// ignored when the file is already open in this process.
    pub async fn open(path: impl AsRef<Path>, capacity: usize) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let key = resolve(&path).await;
        if let Some(inner) = lookup(&key)? {
            tracing::debug!(path = %path.display(), "Reusing open storage file");
            return Ok(JsonFileStore { inner });
        }

        let values = read_values(&path).await?;
        tracing::debug!(path = %path.display(), keys = values.len(), "Opened storage file");
        let created = Arc::new(Inner {
            path,
            entries: Mutex::new(Entries::new(values)),
            changes: change_channel(capacity),
        });

        let mut stores = registry()?;
        if let Some(inner) = stores.get(&key).and_then(Weak::upgrade) {
            return Ok(JsonFileStore { inner });
        }
        stores.retain(|_, store| store.strong_count() > 0);
        stores.insert(key, Arc::downgrade(&created));
        Ok(JsonFileStore { inner: created })
    }

    /// Opens the store described by `config`
    pub async fn from_config(config: &Config) -> Result<Self> {
        Self::open(&config.storage_path, config.change_buffer).await
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    /// Brings `entries` up to date with the file, announcing what changed
    /// on disk since the last operation
    async fn reload(&self, entries: &mut Entries) -> Result<()> {
        let values = read_values(&self.inner.path).await?;
        let external = entries.replace(values);
        if !external.is_empty() {
            tracing::debug!(path = %self.inner.path.display(), "Storage file changed on disk");
        }
        notify(&self.inner.changes, external);
        Ok(())
    }

    /// Writes `entries` to a sibling temp file, then renames it over the store
    async fn flush(&self, entries: &Entries) -> Result<()> {
        if let Some(parent) = self.inner.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let contents = serde_json::to_string_pretty(entries.values())?;
        let tmp_path = self.inner.path.with_extension("json.tmp");
        fs::write(&tmp_path, contents).await?;
        fs::rename(&tmp_path, &self.inner.path).await?;
        Ok(())
    }

    /// Reloads, applies `edit` to a copy, flushes it, then commits and
    /// notifies. Nothing is written when `edit` changes nothing.
    async fn write(&self, edit: impl FnOnce(&mut Entries) -> StorageChanges) -> Result<()> {
        let mut entries = self.inner.entries.lock().await;
        self.reload(&mut entries).await?;

        let mut updated = entries.clone();
        let changes = edit(&mut updated);
        if changes.is_empty() {
            return Ok(());
        }
        self.flush(&updated).await?;
        *entries = updated;
        notify(&self.inner.changes, changes);
        Ok(())
    }
}

impl DurableStore for JsonFileStore {
    fn get(&self, defaults: StorageMap) -> BoxFuture<'_, Result<StorageMap>> {
        async move {
            let mut entries = self.inner.entries.lock().await;
            self.reload(&mut entries).await?;
            Ok(entries.get(defaults))
        }
        .boxed()
    }

    fn set(&self, items: StorageMap) -> BoxFuture<'_, Result<()>> {
        self.write(move |entries| entries.set(items)).boxed()
    }

    fn remove(&self, keys: Vec<String>) -> BoxFuture<'_, Result<()>> {
        async move { self.write(|entries| entries.remove(&keys)).await }.boxed()
    }

    fn subscribe(&self) -> broadcast::Receiver<StorageChanges> {
        self.inner.changes.subscribe()
    }
}

fn registry() -> Result<std::sync::MutexGuard<'static, HashMap<PathBuf, Weak<Inner>>>> {
    OPEN_STORES
        .get_or_init(Default::default)
        .lock()
        .map_err(|_| Error::storage("open storage registry is poisoned"))
}

fn lookup(key: &Path) -> Result<Option<Arc<Inner>>> {
    Ok(registry()?.get(key).and_then(Weak::upgrade))
}

/// Resolves `path` to an absolute key, through its parent when the file
/// does not exist yet
async fn resolve(path: &Path) -> PathBuf {
    if let Ok(resolved) = fs::canonicalize(path).await {
        return resolved;
    }
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    match (fs::canonicalize(parent).await, path.file_name()) {
        (Ok(parent), Some(name)) => parent.join(name),
        _ => path.to_path_buf(),
    }
}

async fn read_values(path: &Path) -> Result<StorageMap> {
    match fs::read_to_string(path).await {
        Ok(contents) => serde_json::from_str(&contents)
            .map_err(|e| Error::storage(format!("Failed to parse {}: {}", path.display(), e))),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(StorageMap::new()),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio_test::assert_ok;

    #[tokio::test]
    async fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path().join("options.json"), 8).await.unwrap();

        let defaults = StorageMap::from([("theme".to_string(), json!("auto"))]);
        assert_eq!(store.get(defaults).await.unwrap()["theme"], json!("auto"));
    }

    #[tokio::test]
    async fn test_writes_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("options.json");

        let store = JsonFileStore::open(&path, 8).await.unwrap();
        let mut rx = store.subscribe();
        let items = StorageMap::from([
            ("theme".to_string(), json!("dark")),
            ("roundingDecimals".to_string(), json!(2)),
        ]);
        assert_ok!(store.set(items).await);
        assert_ok!(store.remove(vec!["theme".to_string()]).await);

        assert_eq!(rx.recv().await.unwrap().len(), 2);
        assert_eq!(rx.recv().await.unwrap()["theme"].new_value, None);

        let reopened = JsonFileStore::open(&path, 8).await.unwrap();
        let defaults = StorageMap::from([
            ("theme".to_string(), json!("auto")),
            ("roundingDecimals".to_string(), json!(4)),
        ]);
        let values = reopened.get(defaults).await.unwrap();
        assert_eq!(values["theme"], json!("auto"));
        assert_eq!(values["roundingDecimals"], json!(2));
    }

    #[tokio::test]
    async fn test_corrupt_file_is_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("options.json");
        std::fs::write(&path, "[1, 2, 3]").unwrap();

        let result = JsonFileStore::open(&path, 8).await;
        assert!(matches!(result, Err(Error::Storage(_))));
    }

    #[tokio::test]
    async fn test_opens_of_one_file_share_notifications() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("options.json");

        let popup = JsonFileStore::open(&path, 8).await.unwrap();
        let side = JsonFileStore::open(dir.path().join(".").join("options.json"), 8)
            .await
            .unwrap();
        let mut popup_rx = popup.subscribe();
        let mut side_rx = side.subscribe();

        assert_ok!(popup.set(StorageMap::from([("theme".to_string(), json!("dark"))])).await);
        assert_ok!(side.set(StorageMap::from([("hoursSuffix".to_string(), json!("h"))])).await);

        for rx in [&mut popup_rx, &mut side_rx] {
            assert_eq!(rx.recv().await.unwrap()["theme"].new_value, Some(json!("dark")));
            assert_eq!(rx.recv().await.unwrap()["hoursSuffix"].new_value, Some(json!("h")));
        }
        let on_disk: StorageMap =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(on_disk["theme"], json!("dark"));
        assert_eq!(on_disk["hoursSuffix"], json!("h"));
    }

    #[tokio::test]
    async fn test_writes_keep_external_changes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("options.json");
        let store = JsonFileStore::open(&path, 8).await.unwrap();
        let mut rx = store.subscribe();

        // another process writes behind our back
        std::fs::write(&path, r#"{"theme": "light", "minutesSuffix": "m"}"#).unwrap();
        assert_ok!(store.set(StorageMap::from([("theme".to_string(), json!("dark"))])).await);

        let external = rx.recv().await.unwrap();
        assert_eq!(external["theme"].new_value, Some(json!("light")));
        assert_eq!(external["minutesSuffix"].new_value, Some(json!("m")));
        let own = rx.recv().await.unwrap();
        assert_eq!(own["theme"].old_value, Some(json!("light")));
        assert_eq!(own["theme"].new_value, Some(json!("dark")));

        let on_disk: StorageMap =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(on_disk["theme"], json!("dark"));
        assert_eq!(on_disk["minutesSuffix"], json!("m"));
    }

    #[tokio::test]
    async fn test_zero_capacity_opens() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path().join("options.json"), 0).await.unwrap();
        let mut rx = store.subscribe();

        assert_ok!(store.set(StorageMap::from([("theme".to_string(), json!("dark"))])).await);
        assert_eq!(rx.recv().await.unwrap()["theme"].new_value, Some(json!("dark")));
    }
}
