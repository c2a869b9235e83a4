//! Reconciliation of locally created records with the remote store.
//!
//! A run walks the unsynced records of one collection oldest first and
//! issues one create request at a time. The first failure ends the run; the
//! records left behind are retried by the next run.

mod scheduler;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub use scheduler::{SyncScheduler, DEFAULT_SYNC_INTERVAL};

use crate::cache::RecordCache;
use crate::db::KeyValueStore;
use crate::error::Result;
use crate::models::{Collection, LocalId, Payload, Purchase, RemoteId, Sneaker};
use crate::remote::RemoteStore;

/// Outcome of one reconciler run over a collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub collection: Collection,
    /// Create requests issued
    pub attempted: usize,
    /// Records marked synced by this run
    pub synced: usize,
    /// Records still waiting for sync after the run
    pub remaining: usize,
    /// Error that stopped the run, if any
    pub failure: Option<String>,
    /// Another run over the same collection was already in progress
    pub skipped: bool,
}

impl SyncReport {
    const fn skipped(collection: Collection) -> Self {
        Self {
            collection,
            attempted: 0,
            synced: 0,
            remaining: 0,
            failure: None,
            skipped: true,
        }
    }

    /// Whether every pending record reached the remote store
    pub const fn is_complete(&self) -> bool {
        !self.skipped && self.failure.is_none() && self.remaining == 0
    }
}

/// Pushes unsynced records from a [`RecordCache`] to a [`RemoteStore`].
pub struct Reconciler<S, R> {
    cache: RecordCache<S>,
    remote: Arc<R>,
    in_flight: [AtomicBool; 2],
}

impl<S: KeyValueStore, R: RemoteStore> Reconciler<S, R> {
    pub fn new(cache: RecordCache<S>, remote: Arc<R>) -> Self {
        Self {
            cache,
            remote,
            in_flight: [AtomicBool::new(false), AtomicBool::new(false)],
        }
    }

    pub const fn cache(&self) -> &RecordCache<S> {
        &self.cache
    }

    pub const fn remote(&self) -> &Arc<R> {
        &self.remote
    }

    /// Reconcile every collection, sneakers first.
    pub async fn run_all(&self) -> Result<Vec<SyncReport>> {
        Ok(vec![
            self.run::<Sneaker>().await?,
            self.run::<Purchase>().await?,
        ])
    }

    /// Push the unsynced records of `T`'s collection.
    ///
    /// Remote failures end the run and are reported in [`SyncReport::failure`];
    /// only local store failures are returned as errors.
    pub async fn run<T: Payload>(&self) -> Result<SyncReport> {
        let collection = T::COLLECTION;
        let Some(_in_flight) = InFlight::acquire(self.flag(collection)) else {
            tracing::debug!("Sync of {} already in progress; skipping", collection);
            return Ok(SyncReport::skipped(collection));
        };

        let candidates = self.cache.unsynced::<T>().await;
        if candidates.is_empty() {
            tracing::debug!("No pending {} to sync", collection);
        }

        let mut acknowledged: Vec<(LocalId, RemoteId)> = Vec::new();
        let mut attempted = 0;
        let mut failure = None;

        for record in &candidates {
            let local_id = record.local_id();
            let payload = match serde_json::to_value(record.payload()) {
                Ok(payload) => payload,
                Err(error) => {
                    tracing::warn!("Failed to encode {} {}: {}", collection, local_id, error);
                    failure = Some(error.to_string());
                    break;
                }
            };

            attempted += 1;
            match self.remote.create(collection, payload).await {
                Ok(created) => {
                    let remote_id = created
                        .id
                        .unwrap_or_else(|| RemoteId::acknowledged(&local_id));
                    tracing::debug!("Synced {} {} as {}", collection, local_id, remote_id);
                    acknowledged.push((local_id, remote_id));
                }
                Err(error) => {
                    tracing::warn!(
                        "Sync of {} {} failed, stopping run: {}",
                        collection,
                        local_id,
                        error
                    );
                    failure = Some(error.to_string());
                    break;
                }
            }
        }

        // Apply by local id to whatever is stored now; records the user
        // appended or removed during the run are left as they are.
        let (synced, remaining) = self
            .cache
            .update::<T, _, _>(move |records| {
                let mut synced = 0;
                for (local_id, remote_id) in acknowledged {
                    if let Some(record) = records
                        .iter_mut()
                        .find(|record| record.local_id() == local_id && !record.is_synced())
                    {
                        record.mark_synced(remote_id);
                        synced += 1;
                    }
                }
                let remaining = records.iter().filter(|record| !record.is_synced()).count();
                (synced, remaining)
            })
            .await?;

        if attempted > 0 {
            tracing::info!(
                "Synced {}/{} pending {} ({} remaining)",
                synced,
                candidates.len(),
                collection,
                remaining
            );
        }

        Ok(SyncReport {
            collection,
            attempted,
            synced,
            remaining,
            failure,
            skipped: false,
        })
    }

    const fn flag(&self, collection: Collection) -> &AtomicBool {
        match collection {
            Collection::Sneakers => &self.in_flight[0],
            Collection::Purchases => &self.in_flight[1],
        }
    }
}

/// Marks a collection as being reconciled until dropped.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
