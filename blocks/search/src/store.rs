//! Read-only access to the externally hosted index objects.
//!
//! Tag shards and item batches are plain JSON objects addressed by a key
//! relative to the index prefix (`tags/g.json`, `items/batch-001.json`).
//! [`IndexStore`] is the seam; the engine never knows whether the bytes came
//! from a public HTTP bucket, a private S3 bucket or memory.

use async_trait::async_trait;
use aws_sdk_s3::Client as S3Client;
use serde::de::DeserializeOwned;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use crate::error::FetchError;

#[async_trait]
pub trait IndexStore: Send + Sync {
    /// Raw bytes of the object at `key`.
    async fn fetch(&self, key: &str) -> Result<Vec<u8>, FetchError>;

    /// Human readable location, for logs.
    fn describe(&self) -> String;
}

/// Fetch and decode one JSON object.
pub async fn fetch_json<T: DeserializeOwned>(
    store: &dyn IndexStore,
    key: &str,
) -> Result<T, FetchError> {
    let bytes = store.fetch(key).await?;
    serde_json::from_slice(&bytes).map_err(|source| FetchError::Decode {
        key: key.to_string(),
        source,
    })
}

fn join_key(prefix: &str, key: &str) -> String {
    let prefix = prefix.trim_matches('/');
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}/{}", prefix, key)
    }
}

// ========== HTTP (public bucket) ==========

/// Objects under a public base URL, e.g. an R2 `r2.dev` bucket.
pub struct HttpIndexStore {
    client: reqwest::Client,
    base_url: String,
    prefix: String,
    timeout: Duration,
}

impl HttpIndexStore {
    pub fn new(client: reqwest::Client, base_url: &str, prefix: &str, timeout: Duration) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            prefix: prefix.to_string(),
            timeout,
        }
    }

    fn url_for(&self, key: &str) -> String {
        format!("{}/{}", self.base_url, join_key(&self.prefix, key))
    }
}

#[async_trait]
impl IndexStore for HttpIndexStore {
    async fn fetch(&self, key: &str) -> Result<Vec<u8>, FetchError> {
        let url = self.url_for(key);
        tracing::debug!("Fetching index object {}", url);

        let response = self
            .client
            .get(&url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(key, e))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound(key.to_string()));
        }
        if !status.is_success() {
            return Err(FetchError::Status {
                key: key.to_string(),
                status: status.as_u16(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| FetchError::from_reqwest(key, e))?;
        Ok(bytes.to_vec())
    }

    fn describe(&self) -> String {
        format!("{}/{}", self.base_url, self.prefix.trim_matches('/'))
    }
}

// ========== S3 (private bucket) ==========

/// Objects in a private S3 (or S3-compatible) bucket.
pub struct S3IndexStore {
    client: S3Client,
    bucket: String,
    prefix: String,
    timeout: Duration,
}

impl S3IndexStore {
    pub fn new(client: S3Client, bucket: &str, prefix: &str, timeout: Duration) -> Self {
        Self {
            client,
            bucket: bucket.to_string(),
            prefix: prefix.to_string(),
            timeout,
        }
    }
}

#[async_trait]
impl IndexStore for S3IndexStore {
    async fn fetch(&self, key: &str) -> Result<Vec<u8>, FetchError> {
        let object_key = join_key(&self.prefix, key);

        let fetch = async {
            let result = self
                .client
                .get_object()
                .bucket(&self.bucket)
                .key(&object_key)
                .send()
                .await
                .map_err(|e| match e.as_service_error() {
                    Some(se) if se.is_no_such_key() => FetchError::NotFound(key.to_string()),
                    _ => FetchError::Storage {
                        key: key.to_string(),
                        message: format!("Failed to get object from S3: {}", e),
                    },
                })?;

            let body = result
                .body
                .collect()
                .await
                .map_err(|e| FetchError::Storage {
                    key: key.to_string(),
                    message: format!("Failed to read S3 body: {}", e),
                })?;
            Ok::<_, FetchError>(body.into_bytes().to_vec())
        };

        tokio::time::timeout(self.timeout, fetch)
            .await
            .map_err(|_| FetchError::Timeout(key.to_string()))?
    }

    fn describe(&self) -> String {
        format!("s3://{}/{}", self.bucket, self.prefix.trim_matches('/'))
    }
}

// ========== Memory ==========

/// In-memory store. Counts fetches per key so callers can assert on cache use.
#[derive(Default)]
pub struct MemoryIndexStore {
    objects: HashMap<String, Vec<u8>>,
    failing: HashSet<String>,
    fetches: Mutex<HashMap<String, usize>>,
}

impl MemoryIndexStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_json(mut self, key: &str, value: serde_json::Value) -> Self {
        self.objects.insert(key.to_string(), value.to_string().into_bytes());
        self
    }

    pub fn with_bytes(mut self, key: &str, bytes: &[u8]) -> Self {
        self.objects.insert(key.to_string(), bytes.to_vec());
        self
    }

    /// Make `key` fail as if the upstream were unreachable.
    pub fn with_failure(mut self, key: &str) -> Self {
        self.failing.insert(key.to_string());
        self
    }

    pub fn fetch_count(&self, key: &str) -> usize {
        self.fetches
            .lock()
            .map(|counts| counts.get(key).copied().unwrap_or(0))
            .unwrap_or(0)
    }

    pub fn total_fetches(&self) -> usize {
        self.fetches
            .lock()
            .map(|counts| counts.values().sum())
            .unwrap_or(0)
    }
}

#[async_trait]
impl IndexStore for MemoryIndexStore {
    async fn fetch(&self, key: &str) -> Result<Vec<u8>, FetchError> {
        if let Ok(mut counts) = self.fetches.lock() {
            *counts.entry(key.to_string()).or_insert(0) += 1;
        }

        if self.failing.contains(key) {
            return Err(FetchError::Status {
                key: key.to_string(),
                status: 503,
            });
        }

        self.objects
            .get(key)
            .cloned()
            .ok_or_else(|| FetchError::NotFound(key.to_string()))
    }

    fn describe(&self) -> String {
        format!("memory ({} objects)", self.objects.len())
    }
}

/// Memory store whose fetches take `delay` to complete, so concurrent
/// callers actually overlap.
#[cfg(test)]
pub(crate) struct SlowIndexStore {
    pub(crate) inner: MemoryIndexStore,
    pub(crate) delay: Duration,
}

#[cfg(test)]
#[async_trait]
impl IndexStore for SlowIndexStore {
    async fn fetch(&self, key: &str) -> Result<Vec<u8>, FetchError> {
        tokio::time::sleep(self.delay).await;
        self.inner.fetch(key).await
    }

    fn describe(&self) -> String {
        format!("slow {}", self.inner.describe())
    }
}
