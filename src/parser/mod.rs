//! Parser module for extracting structured data from HTML
//!
//! Every extractor walks a DOM produced by `scraper` using the ordered
//! candidate selectors of a [`Theme`]. Optional fields go through
//! [`try_extract`] so a miss degrades to a default instead of failing the
//! whole page. Only a missing title on a detail page is a hard error.

pub mod card;
pub mod classify;
pub mod embed;
pub mod episode;
pub mod series;
pub mod theme;
pub mod links;

use scraper::{ElementRef, Selector};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};
use utoipa::ToSchema;

pub use card::{
    parse_genre_index, parse_listing, parse_schedule, CardMode, GenreTag, ListingCard,
    ScheduleDay,
};
pub use classify::{classify_page, PageKind, PageKindRule, Signal};
pub use embed::decode_embed;
pub use episode::{
    parse_episode_detail, DownloadGroup, DownloadLink, EpisodeDetail, Navigation,
    ResolutionLinks, StreamServer,
};
pub use series::{parse_series_detail, InfoFields, SeriesDetail};
pub use theme::Theme;
pub use links::{absolute_url, extract_slug};

/// Marker used when a field could not be found on the page
pub const UNKNOWN: &str = "Unknown";

/// Marker used for an empty synopsis or release time
pub const EMPTY_MARKER: &str = "-";

/// Errors raised when a page lacks a field every valid page has
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExtractError {
    #[error("No title heading found on {url}")]
    MissingTitle { url: String },
}

/// Site origin and selector table shared by every extractor
#[derive(Debug, Clone, Copy)]
pub struct SiteContext<'a> {
    pub base_url: &'a str,
    pub theme: &'a Theme,
}

impl<'a> SiteContext<'a> {
    pub fn new(base_url: &'a str, theme: &'a Theme) -> Self {
        Self { base_url, theme }
    }

    /// Resolve `href` against the site origin
    pub fn absolute(&self, href: &str) -> String {
        absolute_url(self.base_url, href)
    }
}

/// A link to an episode (or series index) with its display label
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeRef {
    pub label: String,
    pub slug: String,
    pub url: String,
}

/// Run one optional-field extractor, logging a miss at debug level
pub fn try_extract<T>(field: &'static str, extractor: impl FnOnce() -> Option<T>) -> Option<T> {
    let value = extractor();
    if value.is_none() {
        debug!(field, "field not found on page");
    }
    value
}

/// Parse a CSS selector from the theme table, skipping invalid ones
pub(crate) fn selector(css: &str) -> Option<Selector> {
    match Selector::parse(css) {
        Ok(sel) => Some(sel),
        Err(e) => {
            warn!("Invalid selector {:?}: {:?}", css, e);
            None
        }
    }
}

/// First element matching any candidate, candidates tried in order
pub(crate) fn select_first<'a>(scope: ElementRef<'a>, candidates: &[&str]) -> Option<ElementRef<'a>> {
    candidates
        .iter()
        .filter_map(|css| selector(css))
        .find_map(|sel| scope.select(&sel).next())
}

/// All elements matching the first candidate that matches anything
pub(crate) fn select_all<'a>(scope: ElementRef<'a>, candidates: &[&str]) -> Vec<ElementRef<'a>> {
    for sel in candidates.iter().filter_map(|css| selector(css)) {
        let found: Vec<_> = scope.select(&sel).collect();
        if !found.is_empty() {
            return found;
        }
    }
    Vec::new()
}

/// Whitespace-collapsed text content of an element
pub(crate) fn element_text(el: ElementRef<'_>) -> String {
    el.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Non-empty text of the first matching candidate
pub(crate) fn first_text(scope: ElementRef<'_>, candidates: &[&str]) -> Option<String> {
    candidates
        .iter()
        .filter_map(|css| selector(css))
        .flat_map(|sel| scope.select(&sel).map(element_text).collect::<Vec<_>>())
        .find(|text| !text.is_empty())
}

/// First non-empty attribute value among `attrs`
pub(crate) fn attr_any(el: ElementRef<'_>, attrs: &[&str]) -> Option<String> {
    attrs
        .iter()
        .filter_map(|name| el.value().attr(name))
        .map(str::trim)
        .find(|value| !value.is_empty())
        .map(str::to_string)
}

/// Image URL of an `<img>`, honouring lazy-load attributes
pub(crate) fn image_src(el: ElementRef<'_>) -> Option<String> {
    attr_any(el, &["data-src", "data-lazy-src", "src"]).filter(|src| !src.starts_with("data:"))
}

/// Anchor href, ignoring empty and fragment-only links
pub(crate) fn link_href(el: ElementRef<'_>) -> Option<String> {
    el.value()
        .attr("href")
        .map(str::trim)
        .filter(|href| !href.is_empty() && !href.starts_with('#') && !href.starts_with("javascript:"))
        .map(str::to_string)
}

/// Heading level of an element (`h1` → 1), if it is a heading
pub(crate) fn heading_level(el: ElementRef<'_>) -> Option<u8> {
    match el.value().name() {
        "h1" => Some(1),
        "h2" => Some(2),
        "h3" => Some(3),
        "h4" => Some(4),
        "h5" => Some(5),
        "h6" => Some(6),
        _ => None,
    }
}

/// Title of a detail page from the theme's heading candidates
pub(crate) fn page_title(root: ElementRef<'_>, ctx: &SiteContext<'_>) -> Option<String> {
    first_text(root, ctx.theme.title)
}
