//! sheetsweep entry point.
//!
//! Loads configuration, prepares the cache and download directories, and
//! runs the pipeline until the key space is exhausted or Ctrl-C is pressed.
//! Logging goes to stderr as JSON; `RUST_LOG` overrides the default `info` level.

use anyhow::{Context, Result};
use sheetsweep_client::{DownloadConfig, Downloader, Orchestrator, PipelineConfig, ResultCache, SearchClient, SearchConfig};
use sheetsweep_core::{AppConfig, ResourceStore, keyspace};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load().context("loading configuration")?;
    let alphabet = config.alphabet()?;

    tracing::info!(
        strategy = ?config.strategy,
        cache_dir = %config.cache_dir.display(),
        download_dir = %config.download_dir.display(),
        alphabet_size = alphabet.len(),
        "starting sheetsweep"
    );

    let cache_store = ResourceStore::open(&config.cache_dir).await.context("preparing cache directory")?;
    let download_store = ResourceStore::open(&config.download_dir).await.context("preparing download directory")?;

    let search = SearchClient::new(SearchConfig::from(&config)).context("building search client")?;
    let downloader = Downloader::new(DownloadConfig::from(&config)).context("building downloader")?;

    let orchestrator = Orchestrator::new(
        ResultCache::new(search, cache_store),
        downloader,
        download_store,
        PipelineConfig::from(&config),
    );

    let cancel = CancellationToken::new();
    tokio::spawn(cancel_on_interrupt(cancel.clone()));

    let keys = keyspace::keys(config.strategy, alphabet, config.iterations);
    let summary = orchestrator.run(keys, cancel).await;

    tracing::info!(
        keys_resolved = summary.keys_resolved,
        cache_hits = summary.cache_hits,
        fetched = summary.fetched,
        key_failures = summary.key_failures,
        links = summary.links,
        downloaded = summary.downloaded,
        skipped = summary.skipped,
        download_failures = summary.download_failures,
        bytes_written = summary.bytes_written,
        "run finished"
    );

    Ok(())
}

async fn cancel_on_interrupt(cancel: CancellationToken) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("interrupt received, stopping");
            cancel.cancel();
        }
        Err(e) => tracing::warn!(error = %e, "cannot listen for Ctrl-C; run will not be interruptible"),
    }
}
