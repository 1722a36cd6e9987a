//! Resource downloader.
//!
//! ### Pipeline per URL
//! 1. Derive a file name from the URL (see [`derive_filename`]).
//! 2. Skip without any network call if that name already exists.
//! 3. `GET` with a bounded timeout (default: 30s).
//! 4. Reject non-success statuses.
//! 5. Require `application/pdf` in the Content-Type header.
//! 6. Buffer the whole body; reject empty bodies.
//! 7. Create the file exclusively and write the buffer.
//!
//! Nothing touches the filesystem before step 7, so every failure up to
//! that point leaves the destination unchanged.

pub mod filename;

pub use filename::{FilenameError, derive_filename};

use std::fmt;
use std::time::{Duration, Instant};

use reqwest::{Client, header};
use sheetsweep_core::{AppConfig, Error, ResourceStore};

/// Content-Type substring a download must carry.
pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// Configuration for the downloader.
#[derive(Debug, Clone)]
pub struct DownloadConfig {
    /// Request timeout (default: 30s)
    pub timeout: Duration,

    /// Substring the Content-Type header must contain (default: "application/pdf")
    pub expected_content_type: String,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self { timeout: Duration::from_secs(30), expected_content_type: PDF_CONTENT_TYPE.to_string() }
    }
}

impl From<&AppConfig> for DownloadConfig {
    fn from(config: &AppConfig) -> Self {
        Self { timeout: config.download_timeout(), ..Default::default() }
    }
}

/// Why a download was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    AlreadyExists,
}

/// Why a download failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Connection, timeout, or body read failure; also URLs that cannot be requested.
    Transport,
    /// Non-2xx response.
    BadStatus,
    /// Content-Type missing or not the expected type.
    WrongContentType,
    /// 2xx response with a zero-length body.
    EmptyBody,
    /// File could not be created or fully written. A partial file may remain.
    WriteError,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FailureKind::Transport => "transport",
            FailureKind::BadStatus => "bad_status",
            FailureKind::WrongContentType => "wrong_content_type",
            FailureKind::EmptyBody => "empty_body",
            FailureKind::WriteError => "write_error",
        };
        f.write_str(s)
    }
}

/// Result of a single download attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadOutcome {
    Skipped(SkipReason),
    Failed(FailureKind),
    /// Bytes written to the new file.
    Succeeded(u64),
}

/// HTTP downloader writing into a `ResourceStore`.
#[derive(Debug, Clone)]
pub struct Downloader {
    http: Client,
    config: DownloadConfig,
}

impl Downloader {
    /// Create a new downloader with the given configuration.
    pub fn new(config: DownloadConfig) -> Result<Self, Error> {
        let http = Client::builder()
            .timeout(config.timeout)
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::HttpError(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { http, config })
    }

    pub fn config(&self) -> &DownloadConfig {
        &self.config
    }

    /// Download `url` into `destination` unless its derived file name is already there.
    ///
    /// Never returns an error; every failure is logged and folded into the outcome.
    pub async fn download(&self, url: &str, destination: &ResourceStore) -> DownloadOutcome {
        let filename = match derive_filename(url) {
            Ok(name) => name,
            Err(e @ FilenameError::NoFileName(_)) => {
                tracing::warn!(%url, error = %e, "no usable file name, not downloading");
                return DownloadOutcome::Failed(FailureKind::WriteError);
            }
            Err(e) => {
                tracing::warn!(%url, error = %e, "cannot request URL");
                return DownloadOutcome::Failed(FailureKind::Transport);
            }
        };
        let path = destination.entry_path(&filename);

        if destination.exists(&filename).await {
            tracing::info!(%url, path = %path.display(), "file already exists, skipping");
            return DownloadOutcome::Skipped(SkipReason::AlreadyExists);
        }

        let start = Instant::now();
        let response = match self.http.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(%url, error = %e, timeout = e.is_timeout(), "failed to download");
                return DownloadOutcome::Failed(FailureKind::Transport);
            }
        };

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(%url, status = status.as_u16(), "download failed");
            return DownloadOutcome::Failed(FailureKind::BadStatus);
        }

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        if !content_type.contains(&self.config.expected_content_type) {
            tracing::warn!(
                %url,
                %content_type,
                expected = %self.config.expected_content_type,
                "invalid content type"
            );
            return DownloadOutcome::Failed(FailureKind::WrongContentType);
        }

        let bytes = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(%url, error = %e, "failed to read response body");
                return DownloadOutcome::Failed(FailureKind::Transport);
            }
        };

        if bytes.is_empty() {
            tracing::warn!(%url, "downloaded 0 bytes; not creating file");
            return DownloadOutcome::Failed(FailureKind::EmptyBody);
        }

        match destination.create_new(&filename, &bytes).await {
            Ok(written) => {
                tracing::info!(
                    %url,
                    path = %path.display(),
                    bytes = written,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "downloaded"
                );
                DownloadOutcome::Succeeded(written)
            }
            Err(Error::AlreadyExists(_)) => {
                tracing::info!(%url, path = %path.display(), "file appeared during download, skipping");
                DownloadOutcome::Skipped(SkipReason::AlreadyExists)
            }
            Err(e) => {
                tracing::error!(%url, path = %path.display(), error = %e, "failed to write file");
                DownloadOutcome::Failed(FailureKind::WriteError)
            }
        }
    }
}
