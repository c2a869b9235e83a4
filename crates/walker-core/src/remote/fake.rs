//! In-process remote store used by reconciler and service tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::Semaphore;

use super::{RemoteError, RemoteRecord, RemoteResult, RemoteStore};
use crate::models::{Collection, RemoteId};

#[derive(Default)]
struct State {
    entities: HashMap<Collection, Vec<Value>>,
    next_id: i64,
    create_requests: Vec<(Collection, Value)>,
    delete_requests: Vec<(Collection, RemoteId)>,
    failing_creates: usize,
    rejected_names: HashSet<String>,
    offline: bool,
}

/// Scriptable stand-in for the storefront API.
///
/// Purchases are acknowledged without an id, like the real purchase endpoint.
#[derive(Default)]
pub(crate) struct FakeRemote {
    state: Mutex<State>,
    gate: Option<Semaphore>,
}

impl FakeRemote {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Creates block until [`FakeRemote::open_gate`] is called.
    pub(crate) fn gated() -> Self {
        Self {
            state: Mutex::default(),
            gate: Some(Semaphore::new(0)),
        }
    }

    pub(crate) fn open_gate(&self) {
        if let Some(gate) = &self.gate {
            gate.add_permits(Semaphore::MAX_PERMITS / 2);
        }
    }

    pub(crate) fn set_offline(&self, offline: bool) {
        self.state.lock().unwrap().offline = offline;
    }

    /// Fail the next `count` create requests.
    pub(crate) fn fail_next_creates(&self, count: usize) {
        self.state.lock().unwrap().failing_creates = count;
    }

    /// Reject every create whose `name` field equals `name`.
    pub(crate) fn reject_name(&self, name: &str) {
        self.state
            .lock()
            .unwrap()
            .rejected_names
            .insert(name.to_string());
    }

    pub(crate) fn seed(&self, collection: Collection, fields: Value) {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let mut fields = fields;
        fields["id"] = json!(state.next_id);
        state.entities.entry(collection).or_default().push(fields);
    }

    pub(crate) fn create_requests(&self) -> Vec<(Collection, Value)> {
        self.state.lock().unwrap().create_requests.clone()
    }

    pub(crate) fn created_names(&self) -> Vec<String> {
        self.create_requests()
            .iter()
            .filter_map(|(_, payload)| payload["name"].as_str().map(ToString::to_string))
            .collect()
    }

    pub(crate) fn delete_requests(&self) -> Vec<(Collection, RemoteId)> {
        self.state.lock().unwrap().delete_requests.clone()
    }

    pub(crate) fn entities(&self, collection: Collection) -> Vec<Value> {
        self.state
            .lock()
            .unwrap()
            .entities
            .get(&collection)
            .cloned()
            .unwrap_or_default()
    }

    fn unavailable() -> RemoteError {
        RemoteError::Rejected {
            status: 503,
            message: "Service unavailable".to_string(),
        }
    }
}

#[async_trait]
impl RemoteStore for FakeRemote {
    async fn create(&self, collection: Collection, payload: Value) -> RemoteResult<RemoteRecord> {
        self.state
            .lock()
            .unwrap()
            .create_requests
            .push((collection, payload.clone()));

        if let Some(gate) = &self.gate {
            gate.acquire().await.unwrap().forget();
        }

        let mut state = self.state.lock().unwrap();
        if state.offline {
            return Err(Self::unavailable());
        }
        if state.failing_creates > 0 {
            state.failing_creates -= 1;
            return Err(Self::unavailable());
        }
        if let Some(name) = payload["name"].as_str() {
            if state.rejected_names.contains(name) {
                return Err(RemoteError::Rejected {
                    status: 400,
                    message: format!("{name} rejected"),
                });
            }
        }

        state.next_id += 1;
        let mut fields = payload;
        fields["id"] = json!(state.next_id);
        state
            .entities
            .entry(collection)
            .or_default()
            .push(fields.clone());

        match collection {
            Collection::Sneakers => Ok(RemoteRecord::from_fields(fields)),
            Collection::Purchases => Ok(RemoteRecord::from_fields(json!({"success": true}))),
        }
    }

    async fn list(&self, collection: Collection) -> RemoteResult<Vec<RemoteRecord>> {
        let state = self.state.lock().unwrap();
        if state.offline {
            return Err(Self::unavailable());
        }
        Ok(state
            .entities
            .get(&collection)
            .into_iter()
            .flatten()
            .cloned()
            .map(RemoteRecord::from_fields)
            .collect())
    }

    async fn delete(&self, collection: Collection, id: &RemoteId) -> RemoteResult<()> {
        let mut state = self.state.lock().unwrap();
        state.delete_requests.push((collection, id.clone()));
        if state.offline {
            return Err(Self::unavailable());
        }
        let entities = state.entities.entry(collection).or_default();
        let before = entities.len();
        entities.retain(|fields| RemoteId::from_json(&fields["id"]).as_ref() != Some(id));
        if entities.len() == before {
            return Err(RemoteError::Rejected {
                status: 404,
                message: format!("{} not found", collection.singular()),
            });
        }
        Ok(())
    }
}
