//! Storefront operations used by front ends.
//!
//! Writes go to the remote store first. When the remote store cannot take
//! them, they are kept in the local cache and picked up by the reconciler.

use std::sync::Arc;
use std::time::Duration;

use crate::cache::{CartStore, RecordCache};
use crate::db::KeyValueStore;
use crate::error::{Error, Result};
use crate::merge::{merge_listing, DisplayRecord};
use crate::models::{DomainKey, LocalId, Payload, Purchase, Record, Sneaker};
use crate::remote::{RemoteRecord, RemoteStore};
use crate::sync::{Reconciler, SyncReport, SyncScheduler};

/// Result of a create that may have fallen back to the local cache.
#[derive(Debug, Clone, PartialEq)]
pub enum CreateOutcome<T> {
    /// Accepted by the remote store
    Created(RemoteRecord),
    /// Remote store unavailable; queued for the reconciler
    SavedLocally { record: Record<T>, reason: String },
}

impl<T> CreateOutcome<T> {
    pub const fn is_saved_locally(&self) -> bool {
        matches!(self, Self::SavedLocally { .. })
    }
}

/// Thread-safe storefront service, cheap to clone.
pub struct StorefrontService<S, R> {
    cache: RecordCache<S>,
    remote: Arc<R>,
    reconciler: Arc<Reconciler<S, R>>,
}

impl<S, R> Clone for StorefrontService<S, R> {
    fn clone(&self) -> Self {
        Self {
            cache: self.cache.clone(),
            remote: Arc::clone(&self.remote),
            reconciler: Arc::clone(&self.reconciler),
        }
    }
}

impl<S: KeyValueStore, R: RemoteStore> StorefrontService<S, R> {
    pub fn new(store: Arc<S>, remote: Arc<R>) -> Self {
        let cache = RecordCache::from_shared(store);
        let reconciler = Arc::new(Reconciler::new(cache.clone(), Arc::clone(&remote)));
        Self {
            cache,
            remote,
            reconciler,
        }
    }

    pub const fn cache(&self) -> &RecordCache<S> {
        &self.cache
    }

    pub const fn reconciler(&self) -> &Arc<Reconciler<S, R>> {
        &self.reconciler
    }

    /// Cart persisted in this service's local store
    pub fn cart_store(&self) -> CartStore<S> {
        CartStore::new(Arc::clone(self.cache.store()))
    }

    /// Remote listing followed by local records still waiting for sync.
    ///
    /// An unreachable remote store yields only the pending local records.
    pub async fn merged_list<T: Payload + DomainKey>(&self) -> Vec<DisplayRecord<T>> {
        let remote = match self.remote.list(T::COLLECTION).await {
            Ok(remote) => remote,
            Err(error) => {
                tracing::warn!(
                    "Failed to list remote {}; showing local records only: {}",
                    T::COLLECTION,
                    error
                );
                Vec::new()
            }
        };
        let local = self.cache.load::<T>().await;
        merge_listing(&remote, &local)
    }

    pub async fn trigger_sync<T: Payload>(&self) -> Result<SyncReport> {
        self.reconciler.run::<T>().await
    }

    pub async fn trigger_sync_all(&self) -> Result<Vec<SyncReport>> {
        self.reconciler.run_all().await
    }

    /// Create a sneaker, saving it locally when the remote store fails.
    pub async fn create_sneaker(&self, sneaker: Sneaker) -> Result<CreateOutcome<Sneaker>> {
        sneaker.validate()?;
        self.create_or_save(sneaker).await
    }

    /// Turn the cart into a purchase and clear it.
    ///
    /// The cart is cleared whether the purchase reached the remote store or was
    /// saved locally.
    pub async fn checkout<C: KeyValueStore>(
        &self,
        user: &str,
        carts: &CartStore<C>,
    ) -> Result<CreateOutcome<Purchase>> {
        let user = user.trim();
        if user.is_empty() {
            return Err(Error::InvalidInput("Checkout requires a user".into()));
        }

        let cart = carts.load().await;
        if cart.is_empty() {
            return Err(Error::InvalidInput("Cart is empty".into()));
        }

        let purchase = cart.to_purchase(user, chrono::Utc::now());
        let outcome = self.create_or_save(purchase).await?;
        carts.clear().await?;
        Ok(outcome)
    }

    /// Delete a local record, and its remote entity when it has been synced.
    ///
    /// A failed remote delete leaves the local record in place.
    pub async fn delete_record<T: Payload>(&self, local_id: &LocalId) -> Result<Record<T>> {
        let record = self
            .cache
            .find::<T>(local_id)
            .await
            .ok_or_else(|| Error::NotFound(format!("{} {local_id}", T::COLLECTION.singular())))?;

        if let Some(remote_id) = record.remote_id() {
            if remote_id.is_acknowledgement() {
                tracing::debug!(
                    "{} {} has no remote id to delete",
                    T::COLLECTION.singular(),
                    local_id
                );
            } else {
                self.remote.delete(T::COLLECTION, remote_id).await?;
            }
        }

        self.cache
            .remove::<T>(local_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("{} {local_id}", T::COLLECTION.singular())))
    }

    /// Local records not yet accepted by the remote store
    pub async fn pending<T: Payload>(&self) -> Vec<Record<T>> {
        self.cache.unsynced::<T>().await
    }

    pub async fn local_records<T: Payload>(&self) -> Vec<Record<T>> {
        self.cache.load::<T>().await
    }

    pub async fn prune_synced<T: Payload>(&self) -> Result<usize> {
        self.cache.prune_synced::<T>().await
    }

    /// Build a background scheduler over this service's reconciler.
    pub fn scheduler(&self, period: Duration) -> SyncScheduler<S, R> {
        SyncScheduler::new(Arc::clone(&self.reconciler), period)
    }

    async fn create_or_save<T: Payload>(&self, payload: T) -> Result<CreateOutcome<T>> {
        let fields = serde_json::to_value(&payload)?;
        match self.remote.create(T::COLLECTION, fields).await {
            Ok(created) => {
                tracing::info!(
                    "Created {} {}",
                    T::COLLECTION.singular(),
                    created.id.as_ref().map_or("(no id)", |id| id.as_str())
                );
                Ok(CreateOutcome::Created(created))
            }
            Err(error) => {
                tracing::warn!(
                    "Remote create of {} failed; saving locally: {}",
                    T::COLLECTION.singular(),
                    error
                );
                let record = Record::new(payload);
                self.cache.append(record.clone()).await?;
                Ok(CreateOutcome::SavedLocally {
                    record,
                    reason: error.to_string(),
                })
            }
        }
    }
}
