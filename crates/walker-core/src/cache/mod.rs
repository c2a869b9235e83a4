//! Offline-first local record cache
//!
//! Each collection is stored under a fixed key as a JSON-encoded sequence of
//! [`Record`]s. A stored value that fails to decode reads as an empty
//! collection. Reads never write; the first write after such a read copies the
//! raw text aside to a quarantine key before overwriting it.

mod cart;
mod memory;

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tokio::sync::Mutex;

pub use cart::CartStore;
pub use memory::MemoryKeyValueStore;

use crate::db::KeyValueStore;
use crate::error::Result;
use crate::models::{LocalId, Payload, Record};
use crate::util::unix_millis_now;

/// Typed view over a [`KeyValueStore`] holding record collections.
pub struct RecordCache<S> {
    store: Arc<S>,
    write_lock: Arc<Mutex<()>>,
}

impl<S> Clone for RecordCache<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            write_lock: Arc::clone(&self.write_lock),
        }
    }
}

impl<S: KeyValueStore> RecordCache<S> {
    pub fn new(store: S) -> Self {
        Self::from_shared(Arc::new(store))
    }

    pub fn from_shared(store: Arc<S>) -> Self {
        Self {
            store,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// The underlying key-value store
    pub const fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Load a collection. Absent, unreadable or malformed values yield an empty list.
    pub async fn load<T: Payload>(&self) -> Vec<Record<T>> {
        load_or_default(self.store.as_ref(), T::COLLECTION.storage_key()).await
    }

    /// Overwrite a collection with `records`.
    pub async fn save<T: Payload>(&self, records: &[Record<T>]) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.write(records).await
    }

    /// Append one record to the end of a collection.
    pub async fn append<T: Payload>(&self, record: Record<T>) -> Result<()> {
        self.update::<T, _, _>(|records| records.push(record)).await
    }

    /// Read-modify-write a collection while holding the cache's write lock.
    ///
    /// The collection is saved after `apply` returns, whether or not it changed
    /// anything.
    pub async fn update<T, F, R>(&self, apply: F) -> Result<R>
    where
        T: Payload,
        F: FnOnce(&mut Vec<Record<T>>) -> R + Send,
        R: Send,
    {
        let _guard = self.write_lock.lock().await;
        let mut records: Vec<Record<T>> =
            load_for_write(self.store.as_ref(), T::COLLECTION.storage_key()).await?;
        let result = apply(&mut records);
        self.write(&records).await?;
        Ok(result)
    }

    /// Remove a record by local id, returning it when it existed.
    pub async fn remove<T: Payload>(&self, local_id: &LocalId) -> Result<Option<Record<T>>> {
        self.update::<T, _, _>(|records| {
            let position = records
                .iter()
                .position(|record| record.local_id() == *local_id)?;
            Some(records.remove(position))
        })
        .await
    }

    /// Find a record by local id
    pub async fn find<T: Payload>(&self, local_id: &LocalId) -> Option<Record<T>> {
        self.load::<T>()
            .await
            .into_iter()
            .find(|record| record.local_id() == *local_id)
    }

    /// Local ids starting with `prefix` (case-insensitive), in stored order
    pub async fn find_by_prefix<T: Payload>(&self, prefix: &str) -> Vec<LocalId> {
        let prefix = prefix.trim().to_ascii_lowercase();
        if prefix.is_empty() {
            return Vec::new();
        }

        self.load::<T>()
            .await
            .iter()
            .map(Record::local_id)
            .filter(|id| id.as_str().starts_with(&prefix))
            .collect()
    }

    /// Records not yet acknowledged by the remote store, oldest first
    pub async fn unsynced<T: Payload>(&self) -> Vec<Record<T>> {
        self.load::<T>()
            .await
            .into_iter()
            .filter(|record| !record.is_synced())
            .collect()
    }

    /// Drop every synced record from a collection, returning how many were removed.
    pub async fn prune_synced<T: Payload>(&self) -> Result<usize> {
        self.update::<T, _, _>(|records| {
            let before = records.len();
            records.retain(|record| !record.is_synced());
            before - records.len()
        })
        .await
    }

    async fn write<T: Payload>(&self, records: &[Record<T>]) -> Result<()> {
        let encoded = serde_json::to_string(records)?;
        self.store
            .set(T::COLLECTION.storage_key(), &encoded)
            .await
    }
}

/// Decode the JSON value stored under `key`, falling back to `V::default()`.
///
/// Never writes to the store; a malformed value is left where it is.
pub(crate) async fn load_or_default<S, V>(store: &S, key: &str) -> V
where
    S: KeyValueStore + ?Sized,
    V: DeserializeOwned + Default,
{
    let raw = match store.get(key).await {
        Ok(Some(raw)) => raw,
        Ok(None) => return V::default(),
        Err(error) => {
            tracing::warn!("Failed to read local key '{}': {}", key, error);
            return V::default();
        }
    };

    serde_json::from_str(&raw).unwrap_or_else(|error| {
        tracing::warn!(
            "Local key '{}' holds a malformed value ({}); treating it as empty",
            key,
            error
        );
        V::default()
    })
}

/// Load the value under `key` ahead of overwriting it.
///
/// Store errors are returned so the caller writes nothing. A malformed value is
/// quarantined and then treated as empty.
pub(crate) async fn load_for_write<S, V>(store: &S, key: &str) -> Result<V>
where
    S: KeyValueStore + ?Sized,
    V: DeserializeOwned + Default,
{
    let Some(raw) = store.get(key).await? else {
        return Ok(V::default());
    };

    match serde_json::from_str(&raw) {
        Ok(value) => Ok(value),
        Err(error) => {
            tracing::warn!(
                "Local key '{}' holds a malformed value ({}); replacing it",
                key,
                error
            );
            quarantine(store, key, &raw).await?;
            Ok(V::default())
        }
    }
}

async fn quarantine<S>(store: &S, key: &str, raw: &str) -> Result<()>
where
    S: KeyValueStore + ?Sized,
{
    let backup_key = format!("{key}.corrupt-{}", unix_millis_now());
    store.set(&backup_key, raw).await?;
    tracing::warn!("Moved malformed local value from '{}' to '{}'", key, backup_key);
    Ok(())
}
