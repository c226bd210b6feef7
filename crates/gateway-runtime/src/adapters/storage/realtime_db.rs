//! Realtime database store over its REST interface.
//!
//! Every node is addressable as `{base}/{path}.json`:
//! - `GET` returns the node as JSON, `null` when absent
//! - `PUT` replaces the node with the request body
//!
//! An optional `auth` query parameter carries the database secret or ID token.
//! Each path segment is percent-encoded on its own, so a key can never reach
//! another node or the query string.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, Url};
use serde_json::Value;
use shared_types::StoreError;
use tracing::debug;

use super::KeyValueStore;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// REST client for a realtime database.
#[derive(Clone)]
pub struct RealtimeDbStore {
    client: Client,
    base_url: Url,
    auth_token: Option<String>,
}

impl RealtimeDbStore {
    /// Create a client for the database at `base_url`.
    pub fn new(base_url: &str, auth_token: Option<String>) -> Result<Self, StoreError> {
        let raw = base_url.trim();
        let base_url = Url::parse(raw)
            .ok()
            .filter(|url| matches!(url.scheme(), "http" | "https") && !url.cannot_be_a_base())
            .ok_or_else(|| {
                StoreError::Unavailable(format!("store URL {raw:?} is not an http(s) URL"))
            })?;

        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        Ok(Self {
            client,
            base_url,
            auth_token,
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// REST URL of the node at `path`, one encoded segment per `/`-separated part.
    pub fn node_url(&self, path: &str) -> Result<Url, StoreError> {
        let parts: Vec<&str> = path.split('/').filter(|part| !part.is_empty()).collect();
        let (node, parents) = match parts.split_last() {
            Some((last, parents)) => (format!("{last}.json"), parents),
            None => (".json".to_string(), &[][..]),
        };

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| StoreError::Unavailable(format!("{} cannot take a path", self.base_url)))?
            .pop_if_empty()
            .extend(parents)
            .push(&node);
        Ok(url)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.auth_token {
            Some(token) => request.query(&[("auth", token.as_str())]),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, StoreError> {
        let response = self
            .authorized(request)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response
            .text()
            .await
            .unwrap_or_else(|e| format!("<unreadable body: {e}>"));
        Err(StoreError::Backend {
            status: status.as_u16(),
            message: backend_message(&message),
        })
    }
}

impl std::fmt::Debug for RealtimeDbStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeDbStore")
            .field("base_url", &self.base_url.as_str())
            .field("authenticated", &self.auth_token.is_some())
            .finish()
    }
}

#[async_trait]
impl KeyValueStore for RealtimeDbStore {
    async fn get(&self, path: &str) -> Result<Option<Value>, StoreError> {
        let url = self.node_url(path)?;
        debug!(%path, "Store read");
        let response = self.send(self.client.get(url)).await?;
        let value: Value = response.json().await.map_err(|e| StoreError::Decode(e.to_string()))?;
        Ok((!value.is_null()).then_some(value))
    }

    async fn set(&self, path: &str, value: Value) -> Result<(), StoreError> {
        let url = self.node_url(path)?;
        debug!(%path, "Store write");
        self.send(self.client.put(url).json(&value)).await?;
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let url = self.node_url("")?;
        self.send(self.client.get(url).query(&[("shallow", "true")]))
            .await
            .map(|_| ())
    }
}

fn transport_error(error: reqwest::Error) -> StoreError {
    if error.is_decode() {
        StoreError::Decode(error.to_string())
    } else {
        StoreError::Unavailable(error.to_string())
    }
}

/// Error bodies look like `{"error": "Permission denied"}`.
fn backend_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("error").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}
