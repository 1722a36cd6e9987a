//! Unified error types for sheetsweep.
//!
//! Every variant renders with a stable upper-case code prefix so log lines can
//! be filtered by failure class.

use std::io;
use std::path::Path;

/// Unified error type for the store, key, and client layers.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A key contained characters outside `[a-z0-9]` or had the wrong length.
    #[error("INVALID_KEY: {0}")]
    InvalidKey(String),

    /// An alphabet was empty, repeated a symbol, or contained unsafe characters.
    #[error("INVALID_ALPHABET: {0}")]
    InvalidAlphabet(String),

    /// No store entry exists at the given path.
    #[error("NOT_FOUND: {0}")]
    NotFound(String),

    /// An exclusive create found the path already taken.
    #[error("ALREADY_EXISTS: {0}")]
    AlreadyExists(String),

    /// Underlying filesystem failure (permissions, disk full, ...).
    #[error("STORE_IO: {path}: {source}")]
    StoreIo {
        path: String,
        #[source]
        source: io::Error,
    },

    /// HTTP client could not be constructed.
    #[error("HTTP_ERROR: {0}")]
    HttpError(String),
}

impl Error {
    /// Wrap an I/O error with the path it occurred on.
    pub fn store_io(path: &Path, source: io::Error) -> Self {
        Error::StoreIo { path: path.display().to_string(), source }
    }

    /// Classify an I/O error, mapping `NotFound` and `AlreadyExists` to their own variants.
    pub fn from_io(path: &Path, source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::NotFound => Error::NotFound(path.display().to_string()),
            io::ErrorKind::AlreadyExists => Error::AlreadyExists(path.display().to_string()),
            _ => Error::store_io(path, source),
        }
    }
}
