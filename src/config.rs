//! Configuration module for the Donghua Scraper API
//!
//! Handles loading environment variables and application configuration.

use std::env;
use std::str::FromStr;

use tracing::warn;

use crate::parser::theme::{self, Theme};

/// Default site origin scraped by the service
pub const DEFAULT_BASE_URL: &str = "https://anichin.moe";

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host address
    pub host: String,
    /// Server port
    pub port: u16,
    /// Origin of the scraped site, without trailing slash
    pub base_url: String,
    /// Upstream request timeout in seconds
    pub request_timeout_secs: u64,
    /// Page cache TTL in seconds (0 disables caching)
    pub cache_ttl_secs: u64,
    /// Name of the selector theme matching the site's skin
    pub theme: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: 20,
            cache_ttl_secs: 60,
            theme: "anichin".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        Self {
            host: env::var("HOST").unwrap_or(defaults.host),
            port: parse_var("PORT", defaults.port),
            base_url: env::var("BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.base_url),
            request_timeout_secs: parse_var("REQUEST_TIMEOUT_SECS", defaults.request_timeout_secs),
            cache_ttl_secs: parse_var("CACHE_TTL_SECS", defaults.cache_ttl_secs),
            theme: env::var("SITE_THEME").unwrap_or(defaults.theme),
        }
    }

    /// Whether the page cache should be wired into the fetcher
    pub fn cache_enabled(&self) -> bool {
        self.cache_ttl_secs > 0
    }

    /// Selector theme named by `SITE_THEME`, falling back to the default
    pub fn site_theme(&self) -> &'static Theme {
        theme::by_name(&self.theme).unwrap_or_else(|| {
            warn!("Unknown theme {:?}, using {}", self.theme, theme::ANICHIN.name);
            &theme::ANICHIN
        })
    }
}

fn parse_var<T: FromStr + Copy + std::fmt::Display>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("{} has invalid value {:?}, using {}", name, raw, default);
            default
        }),
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.port, 8080);
        assert_eq!(config.base_url, "https://anichin.moe");
        assert_eq!(config.request_timeout_secs, 20);
        assert_eq!(config.cache_ttl_secs, 60);
        assert!(config.cache_enabled());
    }

    #[test]
    fn test_cache_disabled_with_zero_ttl() {
        let config = Config {
            cache_ttl_secs: 0,
            ..Config::default()
        };
        assert!(!config.cache_enabled());
    }

    #[test]
    fn test_unknown_theme_falls_back() {
        let config = Config {
            theme: "no-such-skin".to_string(),
            ..Config::default()
        };
        assert_eq!(config.site_theme().name, "anichin");
    }

    #[test]
    fn test_parse_var_falls_back_on_garbage() {
        env::set_var("DONGHUA_TEST_BAD_NUMBER", "not-a-number");
        assert_eq!(parse_var("DONGHUA_TEST_BAD_NUMBER", 42u64), 42);
        env::set_var("DONGHUA_TEST_GOOD_NUMBER", " 7 ");
        assert_eq!(parse_var("DONGHUA_TEST_GOOD_NUMBER", 42u64), 7);
        assert_eq!(parse_var("DONGHUA_TEST_UNSET_NUMBER", 3u16), 3);
    }
}
