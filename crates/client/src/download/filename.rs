//! Deterministic file names for downloaded resources.

use std::borrow::Cow;

use percent_encoding::percent_decode_str;
use url::Url;

/// Error type for file name derivation failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FilenameError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("no file name in URL path: {0}")]
    NoFileName(String),
}

/// Derive the on-disk name for a resource URL.
///
/// Steps:
/// 1. Parse the URL (http/https only)
/// 2. Take the last path segment
/// 3. Percent-decode it, keeping the raw segment if the result is not UTF-8
/// 4. Lowercase
/// 5. Replace every character outside `[a-z0-9._-]` with `_`
///
/// The result depends on the URL alone. Distinct URLs can map to the same
/// name (`sheet%20one.pdf` and `sheet_one.pdf` both give `sheet_one.pdf`);
/// the second one is then treated as already downloaded.
pub fn derive_filename(input: &str) -> Result<String, FilenameError> {
    let parsed = Url::parse(input.trim()).map_err(|e| FilenameError::InvalidUrl(e.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => return Err(FilenameError::UnsupportedScheme(scheme.to_string())),
    }

    let segment = parsed.path_segments().and_then(|mut segments| segments.next_back()).unwrap_or("");

    let decoded = match percent_decode_str(segment).decode_utf8() {
        Ok(decoded) => decoded,
        Err(_) => {
            tracing::debug!(segment, "segment is not valid UTF-8 once decoded, using it raw");
            Cow::Borrowed(segment)
        }
    };

    let name: String = decoded
        .to_lowercase()
        .chars()
        .map(|c| if is_safe_char(c) { c } else { '_' })
        .collect();

    if name.is_empty() || name == "." || name == ".." {
        return Err(FilenameError::NoFileName(input.to_string()));
    }

    Ok(name)
}

fn is_safe_char(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '.' | '_' | '-')
}
