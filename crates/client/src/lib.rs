//! Client code for sheetsweep.
//!
//! This crate provides the search client, the fetch-once result cache, link
//! extraction, the resource downloader, and the pipeline that ties them
//! together.

pub mod cache;
pub mod download;
pub mod extract;
pub mod pipeline;
pub mod search;

pub use cache::{CacheEntry, CacheError, CacheStatus, ResultCache};
pub use download::{DownloadConfig, DownloadOutcome, Downloader, FailureKind, SkipReason, derive_filename};
pub use extract::extract_links;
pub use pipeline::{Orchestrator, PipelineConfig, RunSummary};
pub use search::{SearchClient, SearchConfig, SearchError, SearchSource};
