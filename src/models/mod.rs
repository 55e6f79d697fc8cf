//! Data models for the Donghua Scraper API
//!
//! Response envelopes shared by every endpoint. The scraped records
//! themselves live in the parser module and are re-exported here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// Re-export parser models for convenience
pub use crate::parser::{
    DownloadGroup, EpisodeDetail, EpisodeRef, GenreTag, ListingCard, Navigation, ScheduleDay,
    SeriesDetail, StreamServer,
};

/// Value of the `status` field on successful responses
pub const STATUS_SUCCESS: &str = "success";

/// Value of the `status` field on error responses
pub const STATUS_ERROR: &str = "error";

/// Generic API response wrapper for successful responses
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    /// Always "success" for this type
    pub status: String,
    /// The response payload
    pub data: T,
    /// ISO timestamp of when data was fetched
    pub timestamp: String,
}

impl<T> ApiResponse<T> {
    /// Create a new successful API response with the current timestamp
    pub fn new(data: T) -> Self {
        Self::with_timestamp(data, Utc::now())
    }

    /// Create a new successful API response with a custom timestamp
    pub fn with_timestamp(data: T, timestamp: DateTime<Utc>) -> Self {
        Self {
            status: STATUS_SUCCESS.to_string(),
            data,
            timestamp: timestamp.to_rfc3339(),
        }
    }
}

/// API error response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Always "error" for this type
    pub status: String,
    /// Error message describing what went wrong
    pub error: String,
    /// ISO timestamp of when the error occurred
    pub timestamp: String,
}

impl ApiError {
    /// Create a new API error response with the current timestamp
    pub fn new(error: impl Into<String>) -> Self {
        Self::with_timestamp(error, Utc::now())
    }

    /// Create a new API error response with a custom timestamp
    pub fn with_timestamp(error: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            status: STATUS_ERROR.to_string(),
            error: error.into(),
            timestamp: timestamp.to_rfc3339(),
        }
    }
}

/// Series or episode record returned by the auto-classifying detail endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PageDetail {
    Series(SeriesDetail),
    Episode(EpisodeDetail),
}

/// One entry of the endpoint index served at `/`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct EndpointInfo {
    pub path: String,
    pub description: String,
}

/// Service banner
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServiceInfo {
    pub name: String,
    pub version: String,
    /// Site origin being scraped
    pub source: String,
    pub endpoints: Vec<EndpointInfo>,
}

impl ServiceInfo {
    pub fn new(source: impl Into<String>) -> Self {
        let endpoints = [
            ("/api/search?s={query}", "Search series by title"),
            ("/api/schedule", "Weekly release schedule"),
            ("/api/ongoing?page={n}", "Ongoing series"),
            ("/api/completed?page={n}", "Completed series"),
            ("/api/popular?page={n}", "Most popular series"),
            ("/api/rating?page={n}", "Highest rated series"),
            ("/api/recommended?page={n}", "Latest updates"),
            ("/api/genres", "Genre index"),
            ("/api/genres/{slug}?page={n}", "Series in a genre"),
            ("/api/series?url={url}", "Series details and episode list"),
            ("/api/episode?url={url}", "Episode streams, downloads and navigation"),
            ("/api/detail?url={url}", "Series or episode, detected from the page"),
        ]
        .into_iter()
        .map(|(path, description)| EndpointInfo {
            path: path.to_string(),
            description: description.to_string(),
        })
        .collect();

        Self {
            name: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            source: source.into(),
            endpoints,
        }
    }
}
