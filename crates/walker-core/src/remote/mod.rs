//! Remote store adapter boundary.
//!
//! The adapter reports a binary outcome per request. It never retries; all
//! retry policy lives in the reconciler.

mod http;
#[cfg(test)]
pub(crate) mod fake;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use thiserror::Error;

pub use http::HttpRemoteStore;

use crate::models::{Collection, RemoteId};

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("Invalid remote configuration: {0}")]
    InvalidConfiguration(String),
    #[error("Remote request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Remote store rejected the request: {message}")]
    Rejected { status: u16, message: String },
    #[error("Invalid remote payload: {0}")]
    InvalidPayload(String),
}

impl RemoteError {
    /// HTTP status of a rejection, when one was received
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Rejected { status, .. } => Some(*status),
            Self::Transport(error) => error.status().map(|status| status.as_u16()),
            Self::InvalidConfiguration(_) | Self::InvalidPayload(_) => None,
        }
    }
}

pub type RemoteResult<T> = Result<T, RemoteError>;

/// An entity as represented by the remote store
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteRecord {
    pub id: Option<RemoteId>,
    pub fields: serde_json::Value,
}

impl RemoteRecord {
    /// Build a remote record from a JSON object, reading its `id` field.
    pub fn from_fields(fields: serde_json::Value) -> Self {
        let id = fields.get("id").and_then(RemoteId::from_json);
        Self { id, fields }
    }

    /// Decode the remote fields into a payload type
    pub fn decode<T: DeserializeOwned>(&self) -> RemoteResult<T> {
        serde_json::from_value(self.fields.clone())
            .map_err(|error| RemoteError::InvalidPayload(error.to_string()))
    }
}

/// CRUD surface of the remote collection endpoints.
#[async_trait]
pub trait RemoteStore: Send + Sync + 'static {
    /// Create an entity from `payload` in `collection`
    async fn create(
        &self,
        collection: Collection,
        payload: serde_json::Value,
    ) -> RemoteResult<RemoteRecord>;

    /// List the authoritative entities of `collection`
    async fn list(&self, collection: Collection) -> RemoteResult<Vec<RemoteRecord>>;

    /// Delete an entity by its remote id
    async fn delete(&self, collection: Collection, id: &RemoteId) -> RemoteResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Sneaker;
    use serde_json::json;

    #[test]
    fn test_from_fields_reads_numeric_id() {
        let record = RemoteRecord::from_fields(json!({"id": 7, "name": "Air Max"}));
        assert_eq!(record.id, Some(RemoteId::new("7")));
    }

    #[test]
    fn test_from_fields_without_id() {
        let record = RemoteRecord::from_fields(json!({"success": true}));
        assert_eq!(record.id, None);
    }

    #[test]
    fn test_decode_reports_invalid_payload() {
        let record = RemoteRecord::from_fields(json!({"id": 1}));
        let error = record.decode::<Sneaker>().unwrap_err();
        assert!(matches!(error, RemoteError::InvalidPayload(_)));
    }

    #[test]
    fn test_rejection_exposes_status() {
        let error = RemoteError::Rejected {
            status: 503,
            message: "down".to_string(),
        };
        assert_eq!(error.status(), Some(503));
        assert_eq!(RemoteError::InvalidPayload("x".into()).status(), None);
    }
}
