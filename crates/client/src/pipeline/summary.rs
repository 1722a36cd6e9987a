//! Run counters.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::cache::CacheStatus;
use crate::download::DownloadOutcome;

/// Totals for one orchestrator run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Keys whose cache entry was obtained (hit or fetched).
    pub keys_resolved: u64,
    pub cache_hits: u64,
    pub fetched: u64,
    /// Keys whose entry could be neither read nor fetched.
    pub key_failures: u64,
    /// Distinct links dispatched to the downloader.
    pub links: u64,
    pub downloaded: u64,
    pub skipped: u64,
    pub download_failures: u64,
    pub bytes_written: u64,
}

/// Shared, lock-free counters behind a [`RunSummary`].
#[derive(Debug, Default)]
pub(crate) struct Counters {
    cache_hits: AtomicU64,
    fetched: AtomicU64,
    key_failures: AtomicU64,
    links: AtomicU64,
    downloaded: AtomicU64,
    skipped: AtomicU64,
    download_failures: AtomicU64,
    bytes_written: AtomicU64,
}

impl Counters {
    pub(crate) fn record_entry(&self, status: CacheStatus) {
        match status {
            CacheStatus::Hit => self.cache_hits.fetch_add(1, Ordering::Relaxed),
            CacheStatus::Fetched => self.fetched.fetch_add(1, Ordering::Relaxed),
        };
    }

    pub(crate) fn record_key_failure(&self) {
        self.key_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_link(&self) {
        self.links.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_download(&self, outcome: DownloadOutcome) {
        match outcome {
            DownloadOutcome::Succeeded(bytes) => {
                self.downloaded.fetch_add(1, Ordering::Relaxed);
                self.bytes_written.fetch_add(bytes, Ordering::Relaxed);
            }
            DownloadOutcome::Skipped(_) => {
                self.skipped.fetch_add(1, Ordering::Relaxed);
            }
            DownloadOutcome::Failed(_) => {
                self.download_failures.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    pub(crate) fn snapshot(&self) -> RunSummary {
        let cache_hits = self.cache_hits.load(Ordering::Relaxed);
        let fetched = self.fetched.load(Ordering::Relaxed);
        RunSummary {
            keys_resolved: cache_hits + fetched,
            cache_hits,
            fetched,
            key_failures: self.key_failures.load(Ordering::Relaxed),
            links: self.links.load(Ordering::Relaxed),
            downloaded: self.downloaded.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            download_failures: self.download_failures.load(Ordering::Relaxed),
            bytes_written: self.bytes_written.load(Ordering::Relaxed),
        }
    }
}
