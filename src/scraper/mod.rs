//! Scraper module for fetching HTML content from the target site
//!
//! This module provides the HTTP client that sends browser-like headers,
//! enforces a request timeout and optionally serves pages from a
//! time-boxed [`PageCache`]. Failures are terminal: nothing is retried.

pub mod cache;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use tracing::{debug, info};

pub use cache::{Clock, MemoryCache, PageCache, SystemClock};

/// Errors that can occur during scraping operations
#[derive(Error, Debug)]
pub enum ScraperError {
    /// Network-related errors (DNS failure, refused connection, etc.)
    #[error("Failed to connect to {url}: {message}")]
    Network { url: String, message: String },

    /// Request exceeded the configured timeout
    #[error("Request to {url} timed out")]
    Timeout { url: String },

    /// Upstream answered with a non-2xx status code
    #[error("{url} returned status {status}")]
    HttpStatus { url: String, status: u16 },

    /// Error reading response body
    #[error("Failed to read response body from {url}: {message}")]
    Response { url: String, message: String },

    /// The HTTP client could not be constructed
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),
}

impl ScraperError {
    /// Upstream status code, if the failure was a non-2xx response
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            ScraperError::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Anything that can turn a URL into a page body
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, ScraperError>;

    /// Fetch `url` with `params` appended to its query string
    async fn fetch_with_params(
        &self,
        url: &str,
        params: &[(&str, &str)],
    ) -> Result<String, ScraperError> {
        let full_url = url::Url::parse_with_params(url, params)
            .map(String::from)
            .map_err(|e| ScraperError::Network {
                url: url.to_string(),
                message: e.to_string(),
            })?;
        self.fetch(&full_url).await
    }
}

/// Configuration for the HTTP client
#[derive(Debug, Clone)]
pub struct ScraperConfig {
    /// Site origin, sent as the Referer header
    pub base_url: String,
    /// Whole-request timeout
    pub timeout: Duration,
    /// How long fetched pages stay cached
    pub cache_ttl: Duration,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            base_url: crate::config::DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(20),
            cache_ttl: Duration::from_secs(60),
        }
    }
}

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

const ACCEPT: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8";

/// HTTP client for scraping web pages
pub struct Scraper {
    client: Client,
    config: ScraperConfig,
    cache: Option<Arc<dyn PageCache>>,
}

impl Scraper {
    /// Create a new Scraper without a cache
    pub fn new(config: ScraperConfig) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ScraperError::ClientBuild(e.to_string()))?;

        Ok(Self {
            client,
            config,
            cache: None,
        })
    }

    /// Attach a page cache
    pub fn with_cache(mut self, cache: Arc<dyn PageCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn config(&self) -> &ScraperConfig {
        &self.config
    }

    /// Fetch a page, serving it from the cache when a fresh copy exists
    pub async fn fetch_page(&self, url: &str) -> Result<String, ScraperError> {
        if let Some(cache) = &self.cache {
            if let Some(html) = cache.get(url) {
                debug!("Cache hit for {}", url);
                return Ok(html);
            }
        }

        let html = self.do_fetch(url).await?;

        if let Some(cache) = &self.cache {
            cache.put(url, html.clone(), self.config.cache_ttl);
        }

        Ok(html)
    }

    async fn do_fetch(&self, url: &str) -> Result<String, ScraperError> {
        info!("Fetching URL: {}", url);

        let response = self
            .client
            .get(url)
            .header("User-Agent", USER_AGENT)
            .header("Referer", format!("{}/", self.config.base_url))
            .header("Accept", ACCEPT)
            .header("Accept-Language", "en-US,en;q=0.9,id;q=0.8")
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ScraperError::Timeout {
                        url: url.to_string(),
                    }
                } else {
                    ScraperError::Network {
                        url: url.to_string(),
                        message: e.to_string(),
                    }
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScraperError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let html = response.text().await.map_err(|e| {
            if e.is_timeout() {
                ScraperError::Timeout {
                    url: url.to_string(),
                }
            } else {
                ScraperError::Response {
                    url: url.to_string(),
                    message: e.to_string(),
                }
            }
        })?;

        info!("Fetched {} bytes of HTML", html.len());
        Ok(html)
    }
}

#[async_trait]
impl PageFetcher for Scraper {
    async fn fetch(&self, url: &str) -> Result<String, ScraperError> {
        self.fetch_page(url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Nothing listens on the discard port, so a network attempt fails fast.
    const UNREACHABLE: &str = "http://127.0.0.1:9/series/renegade-immortal/";

    fn test_config() -> ScraperConfig {
        ScraperConfig {
            timeout: Duration::from_secs(2),
            ..ScraperConfig::default()
        }
    }

    #[test]
    fn test_default_config() {
        let config = ScraperConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(20));
        assert_eq!(config.cache_ttl, Duration::from_secs(60));
        assert_eq!(config.base_url, "https://anichin.moe");
    }

    #[test]
    fn test_scraper_creation() {
        let scraper = Scraper::new(test_config()).unwrap();
        assert_eq!(scraper.config().timeout, Duration::from_secs(2));
        assert!(scraper.cache.is_none());
    }

    #[tokio::test]
    async fn test_cache_hit_bypasses_network() {
        let cache = Arc::new(MemoryCache::new());
        cache.put(UNREACHABLE, "<h1>cached</h1>".to_string(), Duration::from_secs(60));
        let scraper = Scraper::new(test_config()).unwrap().with_cache(cache);

        let html = scraper.fetch_page(UNREACHABLE).await.unwrap();
        assert_eq!(html, "<h1>cached</h1>");
    }

    #[tokio::test]
    async fn test_network_failure_carries_url() {
        let scraper = Scraper::new(test_config()).unwrap();
        let err = scraper.fetch_page(UNREACHABLE).await.unwrap_err();

        match err {
            ScraperError::Network { url, .. } | ScraperError::Timeout { url } => {
                assert_eq!(url, UNREACHABLE)
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_failed_fetch_is_not_cached() {
        let cache = Arc::new(MemoryCache::new());
        let scraper = Scraper::new(test_config()).unwrap().with_cache(cache.clone());

        assert!(scraper.fetch_page(UNREACHABLE).await.is_err());
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_params_are_part_of_cache_key() {
        let cache = Arc::new(MemoryCache::new());
        cache.put(
            "http://127.0.0.1:9/?s=soul+land",
            "results".to_string(),
            Duration::from_secs(60),
        );
        let scraper = Scraper::new(test_config()).unwrap().with_cache(cache);

        let html = scraper
            .fetch_with_params("http://127.0.0.1:9/", &[("s", "soul land")])
            .await
            .unwrap();
        assert_eq!(html, "results");
    }

    #[test]
    fn test_upstream_status() {
        let err = ScraperError::HttpStatus {
            url: "https://anichin.moe/x/".to_string(),
            status: 404,
        };
        assert_eq!(err.upstream_status(), Some(404));
        assert!(err.to_string().contains("404"));

        let err = ScraperError::Timeout {
            url: "https://anichin.moe/x/".to_string(),
        };
        assert_eq!(err.upstream_status(), None);
    }
}
