//! Global error handling module for the Donghua Scraper API
//!
//! This module provides a unified error type that handles all application errors
//! and converts them to appropriate HTTP responses with consistent JSON structure.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;

use crate::models::ApiError;
use crate::parser::ExtractError;
use crate::scraper::ScraperError;

/// Application-wide error type that unifies all error sources
#[derive(Debug, Error)]
pub enum AppError {
    /// Fetching the upstream page failed
    #[error("Scraping error: {0}")]
    Scraping(#[from] ScraperError),

    /// The page was fetched but lacks a mandatory field
    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractError),

    /// Validation errors (bad request)
    #[error("Validation error: {0}")]
    Validation(String),

    /// No route matches the request path
    #[error("Not found: {0}")]
    NotFound(String),
}

impl AppError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    /// Create a not found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        AppError::NotFound(msg.into())
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request - Validation errors
            AppError::Validation(_) => StatusCode::BAD_REQUEST,

            // 404 Not Found - missing resources, pages without a title, upstream 404
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Extraction(ExtractError::MissingTitle { .. }) => StatusCode::NOT_FOUND,

            // 502 Bad Gateway - upstream unreachable or failing
            AppError::Scraping(scraper_err) => match scraper_err {
                ScraperError::HttpStatus { status: 404, .. } => StatusCode::NOT_FOUND,
                ScraperError::HttpStatus { .. }
                | ScraperError::Network { .. }
                | ScraperError::Timeout { .. } => StatusCode::BAD_GATEWAY,
                ScraperError::Response { .. } | ScraperError::ClientBuild(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }

    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation(msg) => msg.clone(),
            AppError::NotFound(msg) => msg.clone(),

            AppError::Extraction(ExtractError::MissingTitle { url }) => {
                format!("No content found at {}", url)
            }

            AppError::Scraping(scraper_err) => match scraper_err {
                ScraperError::Network { message, .. } => {
                    format!("Failed to connect to upstream site: {}", message)
                }
                ScraperError::Timeout { .. } => "Upstream site did not respond in time".to_string(),
                ScraperError::HttpStatus { status: 404, url } => format!("Page not found: {}", url),
                ScraperError::HttpStatus { status, .. } => {
                    format!("Upstream site returned error status: {}", status)
                }
                ScraperError::Response { message, .. } => {
                    format!("Failed to read upstream response: {}", message)
                }
                ScraperError::ClientBuild(_) => "HTTP client is misconfigured".to_string(),
            },
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        self.status_code()
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("{}", self);
        } else {
            tracing::debug!("{}", self);
        }

        HttpResponse::build(status).json(ApiError::new(self.user_message()))
    }
}

/// Result type alias for operations that can fail with AppError
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn http_status(status: u16) -> AppError {
        AppError::Scraping(ScraperError::HttpStatus {
            url: "https://anichin.moe/seri/x/".to_string(),
            status,
        })
    }

    #[test]
    fn test_validation_error_status_code() {
        let error = AppError::validation("Invalid input");
        assert_eq!(error.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_not_found_error_status_code() {
        let error = AppError::not_found("Resource not found");
        assert_eq!(error.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_upstream_404_is_not_found() {
        assert_eq!(http_status(404).status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_upstream_failures_are_bad_gateway() {
        assert_eq!(http_status(503).status_code(), StatusCode::BAD_GATEWAY);

        let error = AppError::Scraping(ScraperError::Timeout {
            url: "https://anichin.moe/".to_string(),
        });
        assert_eq!(error.status_code(), StatusCode::BAD_GATEWAY);

        let error = AppError::Scraping(ScraperError::Network {
            url: "https://anichin.moe/".to_string(),
            message: "connection refused".to_string(),
        });
        assert_eq!(error.status_code(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_body_read_failure_is_internal() {
        let error = AppError::Scraping(ScraperError::Response {
            url: "https://anichin.moe/".to_string(),
            message: "invalid utf-8".to_string(),
        });
        assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_missing_title_is_not_found() {
        let error: AppError = ExtractError::MissingTitle {
            url: "https://anichin.moe/x/".to_string(),
        }
        .into();
        assert_eq!(error.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(error.user_message(), "No content found at https://anichin.moe/x/");
    }

    #[test]
    fn test_scraper_error_user_messages() {
        let error = AppError::Scraping(ScraperError::Network {
            url: "https://anichin.moe/".to_string(),
            message: "connection refused".to_string(),
        });
        assert!(error.user_message().contains("Failed to connect"));

        assert!(http_status(500).user_message().contains("500"));
        assert!(http_status(404).user_message().starts_with("Page not found"));
    }

    #[test]
    fn test_error_display() {
        let error = AppError::validation("test error");
        assert_eq!(format!("{}", error), "Validation error: test error");

        let error = AppError::not_found("No route for /api/nope");
        assert_eq!(format!("{}", error), "Not found: No route for /api/nope");
    }

    #[test]
    fn test_from_scraper_error() {
        let scraper_err = ScraperError::ClientBuild("tls".to_string());
        let app_err: AppError = scraper_err.into();
        assert!(matches!(app_err, AppError::Scraping(_)));
    }

    #[test]
    fn test_error_response_body() {
        let response = AppError::validation("Query parameter 's' is required").error_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
