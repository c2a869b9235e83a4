//! HTTP implementation of the remote store against the storefront REST API.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::Deserialize;

use super::{RemoteError, RemoteRecord, RemoteResult, RemoteStore};
use crate::config::ClientConfig;
use crate::models::{Collection, RemoteId};
use crate::util::{compact_text, is_http_url, normalize_text_option};

#[derive(Clone)]
pub struct HttpRemoteStore {
    base_url: String,
    token: Option<String>,
    client: reqwest::Client,
}

impl fmt::Debug for HttpRemoteStore {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("HttpRemoteStore")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish_non_exhaustive()
    }
}

impl HttpRemoteStore {
    /// Create a client for the API rooted at `base_url` (e.g. `http://localhost:3001/api`).
    pub fn new(
        base_url: impl Into<String>,
        token: Option<String>,
        timeout: Option<Duration>,
    ) -> RemoteResult<Self> {
        let base_url = normalize_base_url(base_url.into())?;
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            base_url,
            token: normalize_text_option(token),
            client: builder.build()?,
        })
    }

    pub fn from_config(config: &ClientConfig) -> RemoteResult<Self> {
        Self::new(
            config.api_base_url.clone(),
            config.api_token.clone(),
            config.http_timeout,
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn collection_url(&self, collection: Collection) -> String {
        format!("{}/{}", self.base_url, collection.endpoint())
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        let request = request.header(reqwest::header::ACCEPT, "application/json");
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn read_json(response: Response) -> RemoteResult<serde_json::Value> {
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(RemoteError::Rejected {
                status: status.as_u16(),
                message: parse_api_error(status, &body),
            });
        }

        if body.trim().is_empty() {
            return Ok(serde_json::Value::Null);
        }
        serde_json::from_str(&body).map_err(|error| {
            RemoteError::InvalidPayload(format!(
                "response is not JSON ({error}): {}",
                compact_text(&body)
            ))
        })
    }
}

#[async_trait]
impl RemoteStore for HttpRemoteStore {
    async fn create(
        &self,
        collection: Collection,
        payload: serde_json::Value,
    ) -> RemoteResult<RemoteRecord> {
        let response = self
            .authorized(self.client.post(self.collection_url(collection)))
            .json(&payload)
            .send()
            .await?;

        let body = Self::read_json(response).await?;
        let created = unwrap_created(collection, body);
        tracing::debug!(
            collection = %collection,
            remote_id = created.id.as_ref().map_or("none", RemoteId::as_str),
            "Remote create succeeded"
        );
        Ok(created)
    }

    async fn list(&self, collection: Collection) -> RemoteResult<Vec<RemoteRecord>> {
        let response = self
            .authorized(self.client.get(self.collection_url(collection)))
            .send()
            .await?;

        match Self::read_json(response).await? {
            serde_json::Value::Array(entries) => {
                Ok(entries.into_iter().map(RemoteRecord::from_fields).collect())
            }
            other => Err(RemoteError::InvalidPayload(format!(
                "expected a JSON array for {collection}, got {}",
                compact_text(&other.to_string())
            ))),
        }
    }

    async fn delete(&self, collection: Collection, id: &RemoteId) -> RemoteResult<()> {
        let url = format!("{}/{}", self.collection_url(collection), id);
        let response = self.authorized(self.client.delete(url)).send().await?;
        Self::read_json(response).await?;
        Ok(())
    }
}

/// Create responses come either bare or wrapped as `{"success": true, "<singular>": {...}}`.
fn unwrap_created(collection: Collection, body: serde_json::Value) -> RemoteRecord {
    if let Some(inner) = body.get(collection.singular()).filter(|inner| inner.is_object()) {
        return RemoteRecord::from_fields(inner.clone());
    }
    RemoteRecord::from_fields(body)
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: Option<String>,
    message: Option<String>,
}

fn parse_api_error(status: StatusCode, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<ApiErrorBody>(body) {
        if let Some(message) = payload.error.or(payload.message) {
            return format!("{} ({})", message.trim(), status.as_u16());
        }
    }

    let trimmed = compact_text(body);
    if trimmed.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        format!("{} ({})", trimmed, status.as_u16())
    }
}

fn normalize_base_url(raw: String) -> RemoteResult<String> {
    let base_url = normalize_text_option(Some(raw)).ok_or_else(|| {
        RemoteError::InvalidConfiguration("API base URL must not be empty".to_string())
    })?;
    if is_http_url(&base_url) {
        Ok(base_url.trim_end_matches('/').to_string())
    } else {
        Err(RemoteError::InvalidConfiguration(
            "API base URL must include http:// or https://".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::sync::oneshot;

    use super::*;

    /// Serve a single canned response and hand back the raw request text.
    async fn spawn_one_shot_server(
        status_line: &str,
        body: &str,
    ) -> (String, oneshot::Receiver<String>) {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind test server");
        let address = listener.local_addr().expect("local address");
        let response = format!(
            "HTTP/1.1 {status_line}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
            body.len(),
            body
        );
        let (request_tx, request_rx) = oneshot::channel();

        tokio::spawn(async move {
            if let Ok((mut socket, _)) = listener.accept().await {
                let mut request_buffer = [0_u8; 4096];
                let read = socket.read(&mut request_buffer).await.unwrap_or(0);
                let _ = request_tx.send(String::from_utf8_lossy(&request_buffer[..read]).to_string());
                let _ = socket.write_all(response.as_bytes()).await;
            }
        });

        (format!("http://{address}/api"), request_rx)
    }

    #[test]
    fn normalize_base_url_rejects_invalid_values() {
        assert!(normalize_base_url(String::new()).is_err());
        assert!(normalize_base_url("localhost:3001/api".to_string()).is_err());
        assert_eq!(
            normalize_base_url("http://localhost:3001/api/".to_string()).unwrap(),
            "http://localhost:3001/api"
        );
    }

    #[test]
    fn debug_redacts_token() {
        let store =
            HttpRemoteStore::new("http://localhost:3001/api", Some("secret".into()), None).unwrap();
        let debug = format!("{store:?}");
        assert!(!debug.contains("secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn parse_api_error_prefers_error_field() {
        assert_eq!(
            parse_api_error(StatusCode::BAD_REQUEST, r#"{"error":"Missing name"}"#),
            "Missing name (400)"
        );
        assert_eq!(
            parse_api_error(StatusCode::BAD_GATEWAY, "   "),
            "HTTP 502"
        );
        assert_eq!(
            parse_api_error(StatusCode::INTERNAL_SERVER_ERROR, "boom"),
            "boom (500)"
        );
    }

    #[test]
    fn unwrap_created_reads_wrapped_entity() {
        let record = unwrap_created(
            Collection::Sneakers,
            json!({"success": true, "sneaker": {"id": 5, "name": "Air Max"}}),
        );
        assert_eq!(record.id, Some(RemoteId::new("5")));
        assert_eq!(record.fields["name"], json!("Air Max"));

        let ack = unwrap_created(Collection::Purchases, json!({"success": true}));
        assert_eq!(ack.id, None);
    }

    #[tokio::test]
    async fn create_posts_payload_with_bearer_token() {
        let (base_url, request_rx) = spawn_one_shot_server(
            "200 OK",
            r#"{"success":true,"sneaker":{"id":11,"name":"Air Max","price":100,"qty":1}}"#,
        )
        .await;
        let store = HttpRemoteStore::new(base_url, Some("token-1".into()), None).unwrap();

        let created = store
            .create(Collection::Sneakers, json!({"name": "Air Max", "price": 100}))
            .await
            .unwrap();
        assert_eq!(created.id, Some(RemoteId::new("11")));

        let request = request_rx.await.unwrap();
        assert!(request.starts_with("POST /api/sneakers "));
        assert!(request.to_ascii_lowercase().contains("authorization: bearer token-1"));
    }

    #[tokio::test]
    async fn create_maps_rejection_to_status_error() {
        let (base_url, _request_rx) =
            spawn_one_shot_server("400 Bad Request", r#"{"error":"Missing name"}"#).await;
        let store = HttpRemoteStore::new(base_url, None, None).unwrap();

        let error = store
            .create(Collection::Sneakers, json!({}))
            .await
            .unwrap_err();
        assert_eq!(error.status(), Some(400));
        assert!(error.to_string().contains("Missing name (400)"));
    }

    #[tokio::test]
    async fn list_returns_remote_records() {
        let (base_url, request_rx) = spawn_one_shot_server(
            "200 OK",
            r#"[{"id":2,"name":"Dunk"},{"id":1,"name":"Air Max"}]"#,
        )
        .await;
        let store = HttpRemoteStore::new(base_url, None, None).unwrap();

        let records = store.list(Collection::Sneakers).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].id, Some(RemoteId::new("1")));
        assert!(request_rx.await.unwrap().starts_with("GET /api/sneakers "));
    }

    #[tokio::test]
    async fn list_rejects_non_array_body() {
        let (base_url, _request_rx) = spawn_one_shot_server("200 OK", r#"{"rows":[]}"#).await;
        let store = HttpRemoteStore::new(base_url, None, None).unwrap();

        let error = store.list(Collection::Sneakers).await.unwrap_err();
        assert!(matches!(error, RemoteError::InvalidPayload(_)));
    }

    #[tokio::test]
    async fn delete_targets_entity_path() {
        let (base_url, request_rx) = spawn_one_shot_server("200 OK", r#"{"success":true}"#).await;
        let store = HttpRemoteStore::new(base_url, None, None).unwrap();

        store
            .delete(Collection::Sneakers, &RemoteId::new("9"))
            .await
            .unwrap();
        assert!(request_rx.await.unwrap().starts_with("DELETE /api/sneakers/9 "));
    }

    #[tokio::test]
    async fn unreachable_server_is_a_transport_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        drop(listener);

        let store = HttpRemoteStore::new(format!("http://{address}/api"), None, None).unwrap();
        let error = store
            .create(Collection::Sneakers, json!({"name": "Air Max"}))
            .await
            .unwrap_err();
        assert!(matches!(error, RemoteError::Transport(_)));
    }
}
