//! Donghua Scraper API Library
//!
//! This library scrapes listings, series pages and episode pages from an
//! anichin-style donghua site and exposes them through REST API endpoints.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod parser;
pub mod routes;
pub mod scraper;
