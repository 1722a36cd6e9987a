//! Search client error types.

use std::sync::Arc;

/// Transport-level failures of a search request.
///
/// HTTP status codes are not errors here: the body is returned whatever
/// the status.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SearchError {
    /// HTTP client could not be built.
    #[error("client build failed: {0}")]
    Build(Arc<reqwest::Error>),

    /// Request timeout.
    #[error("request timeout")]
    Timeout,

    /// Connection or protocol failure before a response arrived.
    #[error("network error: {0}")]
    Network(Arc<reqwest::Error>),

    /// Response arrived but its body could not be read.
    #[error("failed to read response body: {0}")]
    Body(Arc<reqwest::Error>),
}

impl From<reqwest::Error> for SearchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() { SearchError::Timeout } else { SearchError::Network(Arc::new(err)) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SearchError::Timeout;
        assert_eq!(err.to_string(), "request timeout");
    }
}
