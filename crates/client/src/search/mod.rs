//! Search endpoint client.
//!
//! ### Request shape
//!
//! - **Endpoint**: a fixed prefix such as
//!   `https://www.hillyard.com/safetydatasheet/search/results?q=`; the key
//!   is appended verbatim. Keys are `[a-z0-9]` only, so no escaping is needed.
//! - **Method**: plain `GET`, no extra headers.
//! - **Status codes**: ignored. Whatever body comes back is the result.
//! - **Rate limiting**: a minimum interval between requests, shared by all
//!   workers using the same client.

pub mod error;
pub mod rate_limit;

pub use error::SearchError;
pub use rate_limit::RateLimiter;

use async_trait::async_trait;
use sheetsweep_core::{AppConfig, Key};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Something that answers a search key with a raw response body.
#[async_trait]
pub trait SearchSource: Send + Sync {
    async fn fetch(&self, key: &Key) -> Result<String, SearchError>;
}

/// Search client configuration.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// URL prefix the key is appended to.
    pub base_url: String,
    /// Request timeout (default: 20s).
    pub timeout: Duration,
    /// Minimum spacing between requests (default: 250ms).
    pub min_interval: Duration,
}

impl Default for SearchConfig {
    fn default() -> Self {
        let app = AppConfig::default();
        Self { base_url: app.search_url.clone(), timeout: app.timeout(), min_interval: app.search_interval() }
    }
}

impl From<&AppConfig> for SearchConfig {
    fn from(config: &AppConfig) -> Self {
        Self { base_url: config.search_url.clone(), timeout: config.timeout(), min_interval: config.search_interval() }
    }
}

/// HTTP search client.
#[derive(Debug, Clone)]
pub struct SearchClient {
    http: reqwest::Client,
    config: SearchConfig,
    rate_limiter: Arc<RateLimiter>,
}

impl SearchClient {
    /// Create a new search client with the given configuration.
    pub fn new(config: SearchConfig) -> Result<Self, SearchError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| SearchError::Build(Arc::new(e)))?;

        let rate_limiter = Arc::new(RateLimiter::new(config.min_interval));
        Ok(Self { http, config, rate_limiter })
    }

    /// Full request URL for a key.
    pub fn request_url(&self, key: &Key) -> String {
        format!("{}{}", self.config.base_url, key)
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }
}

#[async_trait]
impl SearchSource for SearchClient {
    async fn fetch(&self, key: &Key) -> Result<String, SearchError> {
        self.rate_limiter.acquire().await;

        let start = Instant::now();
        let url = self.request_url(key);
        tracing::debug!(%key, %url, "querying search endpoint");

        let response = self.http.get(&url).send().await?;
        let status = response.status();

        let body = response.text().await.map_err(|e| {
            if e.is_timeout() { SearchError::Timeout } else { SearchError::Body(Arc::new(e)) }
        })?;

        tracing::debug!(
            %key,
            status = status.as_u16(),
            bytes = body.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "search completed"
        );

        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> SearchClient {
        SearchClient::new(SearchConfig {
            base_url: format!("{}/safetydatasheet/search/results?q=", server.uri()),
            timeout: Duration::from_secs(5),
            min_interval: Duration::ZERO,
        })
        .unwrap()
    }

    #[test]
    fn test_config_from_app_config() {
        let app = AppConfig { search_url: "https://example.com/s?q=".into(), timeout_ms: 1500, ..Default::default() };
        let config = SearchConfig::from(&app);
        assert_eq!(config.base_url, "https://example.com/s?q=");
        assert_eq!(config.timeout, Duration::from_millis(1500));
    }

    #[test]
    fn test_request_url_concatenates_key() {
        let client = SearchClient::new(SearchConfig {
            base_url: "https://example.com/safetydatasheet/search/results?q=".into(),
            ..Default::default()
        })
        .unwrap();
        let key = Key::new("ab").unwrap();
        assert_eq!(client.request_url(&key), "https://example.com/safetydatasheet/search/results?q=ab");
    }

    #[tokio::test]
    async fn test_fetch_returns_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/safetydatasheet/search/results"))
            .and(query_param("q", "qp"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<a href=\"https://x.test/a.pdf\">"))
            .expect(1)
            .mount(&server)
            .await;

        let body = client_for(&server).fetch(&Key::new("qp").unwrap()).await.unwrap();
        assert_eq!(body, "<a href=\"https://x.test/a.pdf\">");
    }

    #[tokio::test]
    async fn test_fetch_ignores_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500).set_body_string("server exploded"))
            .mount(&server)
            .await;

        let body = client_for(&server).fetch(&Key::new("a").unwrap()).await.unwrap();
        assert_eq!(body, "server exploded");
    }

    #[tokio::test]
    async fn test_fetch_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
            .mount(&server)
            .await;

        let client = SearchClient::new(SearchConfig {
            base_url: format!("{}/?q=", server.uri()),
            timeout: Duration::from_millis(200),
            min_interval: Duration::ZERO,
        })
        .unwrap();

        let result = client.fetch(&Key::new("a").unwrap()).await;
        assert!(matches!(result, Err(SearchError::Timeout)));
    }

    #[tokio::test]
    async fn test_fetch_connection_refused() {
        let client = SearchClient::new(SearchConfig {
            base_url: "http://127.0.0.1:1/?q=".into(),
            timeout: Duration::from_secs(2),
            min_interval: Duration::ZERO,
        })
        .unwrap();

        let result = client.fetch(&Key::new("a").unwrap()).await;
        assert!(matches!(result, Err(SearchError::Network(_)) | Err(SearchError::Timeout)));
    }
}
