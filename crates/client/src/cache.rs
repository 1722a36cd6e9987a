//! Fetch-once cache of search responses.
//!
//! One file per key (`<key>.json`) holding the raw response body followed by
//! a newline. An existing file is always a hit, even when empty; there is no
//! expiry and no invalidation. A failed fetch writes nothing, so that key is
//! tried again on the next run.

use std::collections::HashMap;
use std::sync::Arc;

use sheetsweep_core::{Error, Key, ResourceStore};
use tokio::sync::Mutex;

use crate::search::{SearchError, SearchSource};

/// Where a cache entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    /// Read from an existing file.
    Hit,
    /// Fetched from the search endpoint and persisted by this call.
    Fetched,
}

/// A persisted search response.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub key: Key,
    /// Body exactly as stored on disk.
    pub body: String,
    pub status: CacheStatus,
}

/// Errors from [`ResultCache::get_or_fetch`].
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("search failed: {0}")]
    Search(#[from] SearchError),

    #[error(transparent)]
    Store(#[from] Error),
}

/// Search responses cached on a `ResourceStore`.
pub struct ResultCache<S> {
    source: S,
    store: ResourceStore,
    locks: Mutex<HashMap<Key, Arc<Mutex<()>>>>,
}

impl<S: SearchSource> ResultCache<S> {
    pub fn new(source: S, store: ResourceStore) -> Self {
        Self { source, store, locks: Mutex::new(HashMap::new()) }
    }

    pub fn store(&self) -> &ResourceStore {
        &self.store
    }

    /// Return the cached response for `key`, fetching and persisting it first if absent.
    ///
    /// Calls for the same key are serialized, so at most one fetch is issued
    /// per key even under concurrent workers.
    pub async fn get_or_fetch(&self, key: &Key) -> Result<CacheEntry, CacheError> {
        let lock = self.lock_for(key).await;
        let _guard = lock.lock().await;

        let name = key.cache_file_name();
        if self.store.exists(&name).await {
            let bytes = self.store.read(&name).await?;
            tracing::debug!(%key, bytes = bytes.len(), "cache hit");
            let body = String::from_utf8_lossy(&bytes).into_owned();
            return Ok(CacheEntry { key: key.clone(), body, status: CacheStatus::Hit });
        }

        let mut body = self.source.fetch(key).await?;
        body.push('\n');
        self.store.write_once_append(&name, body.as_bytes()).await?;
        tracing::info!(%key, bytes = body.len(), "cached search response");

        Ok(CacheEntry { key: key.clone(), body, status: CacheStatus::Fetched })
    }

    async fn lock_for(&self, key: &Key) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks.entry(key.clone()).or_default().clone()
    }
}
