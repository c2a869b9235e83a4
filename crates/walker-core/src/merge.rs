//! Merged listing of remote entities and locally pending records.

use std::collections::HashSet;

use crate::models::{DomainKey, LocalId, Payload, Record, RemoteId};
use crate::remote::RemoteRecord;

/// One row of a merged listing.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayRecord<T> {
    pub payload: T,
    pub remote_id: Option<RemoteId>,
    pub local_id: Option<LocalId>,
    /// Created locally and not yet acknowledged by the remote store
    pub pending: bool,
}

/// Merge the authoritative remote listing with local records awaiting sync.
///
/// Remote entries come first in server order. Unsynced local records follow
/// unless a remote entry (or an earlier local record) already carries the same
/// domain key, compared case-insensitively. Synced local records are never
/// shown from the cache.
pub fn merge_listing<T>(remote: &[RemoteRecord], local: &[Record<T>]) -> Vec<DisplayRecord<T>>
where
    T: Payload + DomainKey,
{
    let mut seen = HashSet::new();
    let mut merged = Vec::with_capacity(remote.len() + local.len());

    for entry in remote {
        match entry.decode::<T>() {
            Ok(payload) => {
                seen.insert(payload.normalized_key());
                merged.push(DisplayRecord {
                    payload,
                    remote_id: entry.id.clone(),
                    local_id: None,
                    pending: false,
                });
            }
            Err(error) => {
                tracing::debug!("Skipping undecodable {} entry: {}", T::COLLECTION, error);
            }
        }
    }

    for record in local.iter().filter(|record| !record.is_synced()) {
        if !seen.insert(record.payload().normalized_key()) {
            continue;
        }
        merged.push(DisplayRecord {
            payload: record.payload().clone(),
            remote_id: None,
            local_id: Some(record.local_id()),
            pending: true,
        });
    }

    merged
}
