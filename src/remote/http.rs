//! HTTP record service - REST calls against `{base_url}/{resource}`.
//!
//! Requires the `http` feature. Uses reqwest.
//!
//! ## Routes
//!
//! - `GET /{resource}` - list, JSON array of records.
//! - `POST /{resource}` - create, body `{ "name", "email" }`.
//! - `PUT /{resource}/{id}` - update, body is the full record.
//! - `DELETE /{resource}/{id}` - delete, body ignored.

use std::time::Duration;

use reqwest::{Client, Response};

use super::{RecordService, RemoteError};
use crate::config::{ConfigError, SyncConfig};
use crate::record::{Record, RecordDraft, RecordId, RemoteRecord};

#[derive(Debug, Clone)]
pub struct HttpRecordService {
    client: Client,
    collection_url: String,
}

impl HttpRecordService {
    /// Service for `{base_url}/{resource}` with a default client (no timeout).
    pub fn new(base_url: &str, resource: &str) -> Self {
        Self::with_client(Client::new(), base_url, resource)
    }

    pub fn with_client(client: Client, base_url: &str, resource: &str) -> Self {
        Self {
            client,
            collection_url: format!(
                "{}/{}",
                base_url.trim_end_matches('/'),
                resource.trim_matches('/')
            ),
        }
    }

    pub fn from_config(config: &SyncConfig) -> Result<Self, ConfigError> {
        let mut builder = Client::builder();
        if let Some(ms) = config.request_timeout_ms {
            builder = builder.timeout(Duration::from_millis(ms));
        }
        let client = builder
            .build()
            .map_err(|e| ConfigError::Invalid(format!("http client: {}", e)))?;
        Ok(Self::with_client(client, &config.base_url, &config.resource))
    }

    pub fn collection_url(&self) -> &str {
        &self.collection_url
    }

    fn record_url(&self, id: RecordId) -> String {
        format!("{}/{}", self.collection_url, id)
    }
}

/// Map non-2xx statuses to `RemoteError::Status`, keeping the body text.
async fn check_status(response: Response) -> Result<Response, RemoteError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response
        .text()
        .await
        .unwrap_or_else(|e| format!("unreadable body: {}", e));
    Err(RemoteError::Status {
        status: status.as_u16(),
        message,
    })
}

impl RecordService for HttpRecordService {
    async fn list(&self) -> Result<Vec<Record>, RemoteError> {
        let response = self.client.get(&self.collection_url).send().await?;
        let response = check_status(response).await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn create(&self, draft: &RecordDraft) -> Result<RemoteRecord, RemoteError> {
        let response = self
            .client
            .post(&self.collection_url)
            .json(draft)
            .send()
            .await?;
        let response = check_status(response).await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn update(&self, record: &Record) -> Result<RemoteRecord, RemoteError> {
        let response = self
            .client
            .put(self.record_url(record.id))
            .json(record)
            .send()
            .await?;
        let response = check_status(response).await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn delete(&self, id: RecordId) -> Result<(), RemoteError> {
        let response = self.client.delete(self.record_url(id)).send().await?;
        check_status(response).await?;
        Ok(())
    }
}
