//! Generic locally cached record and its identifiers

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::Error;
use crate::util::unix_millis_now;

/// A locally generated record identifier, using UUID v7 (time-sortable)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LocalId(Uuid);

impl LocalId {
    /// Create a new unique local ID using UUID v7
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Get the string representation of this ID
    #[must_use]
    pub fn as_str(&self) -> String {
        self.0.to_string()
    }
}

impl Default for LocalId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for LocalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for LocalId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Identifier assigned by the remote store once a record is synced.
///
/// The backend hands out integer ids; they are kept in textual form so the
/// client never depends on the server's id type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RemoteId(String);

impl RemoteId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Placeholder id for a create the remote acknowledged without returning an id.
    #[must_use]
    pub fn acknowledged(local_id: &LocalId) -> Self {
        Self(format!("ack-{local_id}"))
    }

    /// Whether this id was synthesized from an acknowledgement.
    pub fn is_acknowledgement(&self) -> bool {
        self.0.starts_with("ack-")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Extract a remote id from a JSON value (number or non-empty string).
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Number(number) => Some(Self(number.to_string())),
            serde_json::Value::String(text) if !text.trim().is_empty() => {
                Some(Self(text.trim().to_string()))
            }
            _ => None,
        }
    }
}

impl fmt::Display for RemoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for RemoteId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        Self::from_json(&value)
            .ok_or_else(|| serde::de::Error::custom("remote id must be a number or a string"))
    }
}

/// A named collection of locally cached records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Sneakers,
    Purchases,
}

impl Collection {
    pub const ALL: [Self; 2] = [Self::Sneakers, Self::Purchases];

    /// Key under which the collection is persisted in the local store.
    pub const fn storage_key(self) -> &'static str {
        match self {
            Self::Sneakers => "sneakers",
            Self::Purchases => "purchases",
        }
    }

    /// Path segment of the remote collection endpoint.
    pub const fn endpoint(self) -> &'static str {
        match self {
            Self::Sneakers => "sneakers",
            Self::Purchases => "purchase",
        }
    }

    /// Field name the backend wraps a single created entity in.
    pub const fn singular(self) -> &'static str {
        match self {
            Self::Sneakers => "sneaker",
            Self::Purchases => "purchase",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.storage_key())
    }
}

impl FromStr for Collection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sneakers" | "sneaker" => Ok(Self::Sneakers),
            "purchases" | "purchase" => Ok(Self::Purchases),
            other => Err(Error::InvalidInput(format!("Unknown collection: {other}"))),
        }
    }
}

/// Domain payload carried by a [`Record`].
///
/// The cache and reconciler are generic over this trait and never look inside
/// the payload.
pub trait Payload: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const COLLECTION: Collection;
}

/// Key used to deduplicate local records against the remote listing.
///
/// Keys are compared case-insensitively.
pub trait DomainKey {
    fn domain_key(&self) -> String;

    fn normalized_key(&self) -> String {
        self.domain_key().trim().to_lowercase()
    }
}

/// A locally created record, tagged with its sync state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    rename_all = "camelCase",
    try_from = "StoredRecord<T>",
    bound(deserialize = "T: DeserializeOwned")
)]
pub struct Record<T> {
    local_id: LocalId,
    remote_id: Option<RemoteId>,
    payload: T,
    synced: bool,
    created_at: i64,
}

impl<T> Record<T> {
    /// Create a new unsynced record with a fresh local id
    #[must_use]
    pub fn new(payload: T) -> Self {
        Self {
            local_id: LocalId::new(),
            remote_id: None,
            payload,
            synced: false,
            created_at: unix_millis_now(),
        }
    }

    pub const fn local_id(&self) -> LocalId {
        self.local_id
    }

    pub const fn remote_id(&self) -> Option<&RemoteId> {
        self.remote_id.as_ref()
    }

    pub const fn payload(&self) -> &T {
        &self.payload
    }

    pub fn into_payload(self) -> T {
        self.payload
    }

    pub const fn is_synced(&self) -> bool {
        self.synced
    }

    /// Creation timestamp (Unix ms)
    pub const fn created_at(&self) -> i64 {
        self.created_at
    }

    /// Record the remote acknowledgement of this record.
    pub fn mark_synced(&mut self, remote_id: RemoteId) {
        self.remote_id = Some(remote_id);
        self.synced = true;
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredRecord<T> {
    local_id: LocalId,
    #[serde(default)]
    remote_id: Option<RemoteId>,
    payload: T,
    // Records written before the flag existed count as unsynced.
    #[serde(default)]
    synced: bool,
    #[serde(default)]
    created_at: i64,
}

impl<T> TryFrom<StoredRecord<T>> for Record<T> {
    type Error = String;

    fn try_from(value: StoredRecord<T>) -> Result<Self, Self::Error> {
        if value.synced && value.remote_id.is_none() {
            return Err(format!(
                "record {} is marked synced but has no remoteId",
                value.local_id
            ));
        }

        Ok(Self {
            local_id: value.local_id,
            remote_id: value.remote_id,
            payload: value.payload,
            synced: value.synced,
            created_at: value.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_local_id_unique() {
        let first = LocalId::new();
        let second = LocalId::new();
        assert_ne!(first, second);
    }

    #[test]
    fn test_local_id_parse() {
        let id = LocalId::new();
        let parsed: LocalId = id.as_str().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_remote_id_accepts_numbers_and_strings() {
        let from_number: RemoteId = serde_json::from_value(json!(42)).unwrap();
        let from_string: RemoteId = serde_json::from_value(json!("abc")).unwrap();
        assert_eq!(from_number.as_str(), "42");
        assert_eq!(from_string.as_str(), "abc");
        assert!(serde_json::from_value::<RemoteId>(json!(null)).is_err());
        assert!(serde_json::from_value::<RemoteId>(json!("  ")).is_err());
    }

    #[test]
    fn test_acknowledged_remote_id() {
        let local = LocalId::new();
        let remote = RemoteId::acknowledged(&local);
        assert!(remote.is_acknowledgement());
        assert!(remote.as_str().ends_with(&local.as_str()));
        assert!(!RemoteId::new("7").is_acknowledgement());
    }

    #[test]
    fn test_collection_parse_and_display() {
        assert_eq!("Sneakers".parse::<Collection>().unwrap(), Collection::Sneakers);
        assert_eq!("purchase".parse::<Collection>().unwrap(), Collection::Purchases);
        assert!("staff".parse::<Collection>().is_err());
        assert_eq!(Collection::Purchases.to_string(), "purchases");
        assert_eq!(Collection::Purchases.endpoint(), "purchase");
    }

    #[test]
    fn test_new_record_is_unsynced() {
        let record = Record::new(json!({"name": "Air Max"}));
        assert!(!record.is_synced());
        assert!(record.remote_id().is_none());
        assert!(record.created_at() > 0);
    }

    #[test]
    fn test_mark_synced_sets_remote_id() {
        let mut record = Record::new(json!({"name": "Air Max"}));
        record.mark_synced(RemoteId::new("12"));
        assert!(record.is_synced());
        assert_eq!(record.remote_id(), Some(&RemoteId::new("12")));
    }

    #[test]
    fn test_missing_synced_flag_means_unsynced() {
        let id = LocalId::new();
        let record: Record<serde_json::Value> = serde_json::from_value(json!({
            "localId": id.as_str(),
            "payload": {"name": "Legacy"}
        }))
        .unwrap();
        assert!(!record.is_synced());
        assert_eq!(record.local_id(), id);
    }

    #[test]
    fn test_synced_without_remote_id_is_rejected() {
        let result = serde_json::from_value::<Record<serde_json::Value>>(json!({
            "localId": LocalId::new().as_str(),
            "payload": {},
            "synced": true
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_record_serializes_camel_case() {
        let mut record = Record::new(json!({"name": "Dunk"}));
        record.mark_synced(RemoteId::new("3"));
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["remoteId"], json!("3"));
        assert_eq!(value["synced"], json!(true));
        assert!(value.get("localId").is_some());
        assert!(value.get("createdAt").is_some());
    }
}
