//! The enumerate → cache → extract → deduplicate → download pipeline.
//!
//! Three stages connected by bounded channels:
//!
//! 1. **resolve**: pulls keys and runs up to `key_workers` cache lookups at
//!    once; the search client's rate limiter spaces out actual fetches.
//! 2. **extract**: a single task that scans each entry for links and drops
//!    any link already dispatched during this run.
//! 3. **download**: up to `download_workers` downloads at once.
//!
//! The in-run seen-set is not persisted. Across runs, and across distinct
//! links that share a derived file name, the downloader's existence check is
//! what prevents repeated downloads. Under `random-forever` the set lives as
//! long as the process and is bounded only by the number of distinct links
//! the site serves.
//!
//! Cancelling the token stops every stage from taking new work and drops
//! in-flight requests. A cache entry or download whose write has already
//! started is finished by the store, so no entry is ever left half written.

mod summary;

pub use summary::RunSummary;

use std::collections::HashSet;
use std::sync::Arc;

use sheetsweep_core::{AppConfig, Key, ResourceStore};
use tokio::sync::{Semaphore, mpsc};
use tokio::task::{JoinError, JoinSet};
use tokio_util::sync::CancellationToken;

use crate::cache::{CacheEntry, ResultCache};
use crate::download::Downloader;
use crate::extract::extract_links;
use crate::search::SearchSource;
use summary::Counters;

/// Worker and queue sizing for a run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Concurrent key resolutions (default: 2)
    pub key_workers: usize,
    /// Concurrent downloads (default: 4)
    pub download_workers: usize,
    /// Capacity of each inter-stage queue (default: 64)
    pub queue_capacity: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self { key_workers: 2, download_workers: 4, queue_capacity: 64 }
    }
}

impl From<&AppConfig> for PipelineConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            key_workers: config.key_workers,
            download_workers: config.download_workers,
            queue_capacity: config.queue_capacity,
        }
    }
}

/// Drives keys through the cache, extractor, and downloader.
pub struct Orchestrator<S> {
    cache: Arc<ResultCache<S>>,
    downloader: Arc<Downloader>,
    downloads: ResourceStore,
    config: PipelineConfig,
}

impl<S: SearchSource + 'static> Orchestrator<S> {
    pub fn new(cache: ResultCache<S>, downloader: Downloader, downloads: ResourceStore, config: PipelineConfig) -> Self {
        Self { cache: Arc::new(cache), downloader: Arc::new(downloader), downloads, config }
    }

    /// Run every key through the pipeline until the keys run out or `cancel` fires.
    ///
    /// Per-key and per-link failures are logged and counted, never returned.
    pub async fn run<I>(&self, keys: I, cancel: CancellationToken) -> RunSummary
    where
        I: IntoIterator<Item = Key>,
        I::IntoIter: Send + 'static,
    {
        let counters = Arc::new(Counters::default());
        let capacity = self.config.queue_capacity.max(1);
        let (entry_tx, entry_rx) = mpsc::channel::<CacheEntry>(capacity);
        let (link_tx, link_rx) = mpsc::channel::<String>(capacity);

        tracing::info!(
            key_workers = self.config.key_workers,
            download_workers = self.config.download_workers,
            queue_capacity = capacity,
            "pipeline starting"
        );

        let resolve = tokio::spawn(resolve_keys(
            self.cache.clone(),
            keys.into_iter(),
            entry_tx,
            self.config.key_workers.max(1),
            counters.clone(),
            cancel.clone(),
        ));
        let extract = tokio::spawn(dedup_links(entry_rx, link_tx, counters.clone(), cancel.clone()));
        let download = tokio::spawn(download_links(
            self.downloader.clone(),
            self.downloads.clone(),
            link_rx,
            self.config.download_workers.max(1),
            counters.clone(),
            cancel.clone(),
        ));

        for (stage, handle) in [("resolve", resolve), ("extract", extract), ("download", download)] {
            if let Err(e) = handle.await {
                tracing::error!(stage, error = %e, "pipeline stage aborted");
            }
        }

        let summary = counters.snapshot();
        if cancel.is_cancelled() {
            tracing::warn!("pipeline cancelled before the key space was exhausted");
        }
        summary
    }
}

async fn resolve_keys<S, I>(
    cache: Arc<ResultCache<S>>, keys: I, entries: mpsc::Sender<CacheEntry>, workers: usize, counters: Arc<Counters>,
    cancel: CancellationToken,
) where
    S: SearchSource + 'static,
    I: Iterator<Item = Key> + Send,
{
    let semaphore = Arc::new(Semaphore::new(workers));
    let mut tasks = JoinSet::new();

    for key in keys {
        let permit = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            permit = semaphore.clone().acquire_owned() => match permit {
                Ok(permit) => permit,
                Err(_) => break,
            },
        };

        let cache = cache.clone();
        let entries = entries.clone();
        let counters = counters.clone();
        let cancel = cancel.clone();

        tasks.spawn(async move {
            let _permit = permit;

            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => return,
                result = cache.get_or_fetch(&key) => result,
            };

            match result {
                Ok(entry) => {
                    counters.record_entry(entry.status);
                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => {}
                        sent = entries.send(entry) => {
                            if sent.is_err() {
                                tracing::debug!(%key, "extract stage gone, dropping entry");
                            }
                        }
                    }
                }
                Err(e) => {
                    counters.record_key_failure();
                    tracing::warn!(%key, error = %e, "failed to resolve key");
                }
            }
        });

        while let Some(joined) = tasks.try_join_next() {
            log_join("resolve", joined);
        }
    }

    while let Some(joined) = tasks.join_next().await {
        log_join("resolve", joined);
    }
}

async fn dedup_links(
    mut entries: mpsc::Receiver<CacheEntry>, links: mpsc::Sender<String>, counters: Arc<Counters>,
    cancel: CancellationToken,
) {
    let mut seen = HashSet::new();

    loop {
        let entry = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            entry = entries.recv() => match entry {
                Some(entry) => entry,
                None => break,
            },
        };

        let found = extract_links(&entry.body);
        tracing::debug!(key = %entry.key, links = found.len(), "extracted links");

        for link in found {
            if !seen.insert(link.clone()) {
                continue;
            }
            counters.record_link();

            let sent = tokio::select! {
                biased;
                _ = cancel.cancelled() => return,
                sent = links.send(link) => sent,
            };
            if sent.is_err() {
                return;
            }
        }
    }
}

async fn download_links(
    downloader: Arc<Downloader>, store: ResourceStore, mut links: mpsc::Receiver<String>, workers: usize,
    counters: Arc<Counters>, cancel: CancellationToken,
) {
    let semaphore = Arc::new(Semaphore::new(workers));
    let mut tasks = JoinSet::new();

    loop {
        let link = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            link = links.recv() => match link {
                Some(link) => link,
                None => break,
            },
        };

        let permit = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            permit = semaphore.clone().acquire_owned() => match permit {
                Ok(permit) => permit,
                Err(_) => break,
            },
        };

        let downloader = downloader.clone();
        let store = store.clone();
        let counters = counters.clone();
        let cancel = cancel.clone();

        tasks.spawn(async move {
            let _permit = permit;

            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::debug!(url = %link, "download cancelled");
                    return;
                }
                outcome = downloader.download(&link, &store) => outcome,
            };
            counters.record_download(outcome);
        });

        while let Some(joined) = tasks.try_join_next() {
            log_join("download", joined);
        }
    }

    while let Some(joined) = tasks.join_next().await {
        log_join("download", joined);
    }
}

fn log_join(stage: &'static str, joined: Result<(), JoinError>) {
    if let Err(e) = joined
        && e.is_panic()
    {
        tracing::error!(stage, error = %e, "worker panicked");
    }
}
