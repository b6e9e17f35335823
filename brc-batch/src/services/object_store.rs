//! Object store port and path-style HTTP implementation
//!
//! The store is key-addressed and reached with single-object GETs at
//! `{endpoint}/{bucket}/{key}` (path-style addressing). Request signing is
//! not a concern here; optional basic credentials cover S3-compatible
//! gateways that accept them, everything else is the deployment's problem.

use crate::types::ObjectKey;
use async_trait::async_trait;
use brc_common::config::ObjectStoreConfig;
use reqwest::StatusCode;
use std::time::Duration;
use thiserror::Error;

const USER_AGENT: &str = concat!("brc-batch/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Object store errors, surfaced per key and never fatal to a run
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("HTTP status {0} fetching {1}")]
    Status(u16, String),

    #[error("Network error: {0}")]
    Network(String),
}

/// Key-addressed blob store reachable with a single GET per object
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn get(&self, key: &ObjectKey) -> Result<Vec<u8>, StoreError>;
}

/// Path-style HTTP(S) object store client
pub struct HttpObjectStore {
    client: reqwest::Client,
    endpoint: String,
    bucket: String,
    access_key: Option<String>,
    secret_key: Option<String>,
}

impl HttpObjectStore {
    pub fn new(config: &ObjectStoreConfig) -> Result<HttpObjectStore, StoreError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| StoreError::Network(e.to_string()))?;

        Ok(HttpObjectStore {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            bucket: config.bucket.trim_matches('/').to_string(),
            access_key: config.access_key.clone(),
            secret_key: config.secret_key.clone(),
        })
    }

    fn object_url(&self, key: &ObjectKey) -> String {
        format!(
            "{}/{}/{}",
            self.endpoint,
            self.bucket,
            key.as_str().trim_start_matches('/')
        )
    }
}

#[async_trait]
impl ObjectStore for HttpObjectStore {
    async fn get(&self, key: &ObjectKey) -> Result<Vec<u8>, StoreError> {
        let mut request = self.client.get(self.object_url(key));
        if let Some(access_key) = &self.access_key {
            request = request.basic_auth(access_key, self.secret_key.as_deref());
        }

        let response = request
            .send()
            .await
            .map_err(|e| StoreError::Network(e.to_string()))?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(StoreError::NotFound(key.to_string())),
            status if !status.is_success() => {
                Err(StoreError::Status(status.as_u16(), key.to_string()))
            }
            _ => response
                .bytes()
                .await
                .map(|b| b.to_vec())
                .map_err(|e| StoreError::Network(e.to_string())),
        }
    }
}
