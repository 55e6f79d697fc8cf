//! Listing pages: catalog cards, the weekly schedule and the genre index

use std::collections::HashSet;

use lazy_static::lazy_static;
use regex::Regex;
use scraper::{ElementRef, Html};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{
    attr_any, element_text, extract_slug, first_text, image_src, link_href, select_all,
    select_first, try_extract, SiteContext, EMPTY_MARKER,
};

/// Status used when a card shows none
pub const DEFAULT_STATUS: &str = "Ongoing";
/// Content type used when a card shows none
pub const DEFAULT_TYPE: &str = "Donghua";
/// Subtitle tag used when a card shows none
pub const DEFAULT_SUBTITLE: &str = "Sub";

lazy_static! {
    static ref EPISODE_NUMBER: Regex = Regex::new(r"(\d+(?:\.\d+)?)").unwrap();
}

/// Which output keys the card parser fills
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardMode {
    /// General listings: the episode marker is surfaced as `currentEpisode`
    Catalog,
    /// Schedule listings: `releaseTime` plus a bare `episode` number
    Schedule,
}

/// A compact listing-page representation of one series
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListingCard {
    pub title: String,
    pub slug: String,
    /// Absolute URL of the series or episode page
    pub url: String,
    pub poster: String,
    /// Never empty, defaults to "Ongoing"
    pub status: String,
    /// Never empty, defaults to "Donghua"
    #[serde(rename = "type")]
    pub content_type: String,
    /// Never empty, defaults to "Sub"
    pub subtitle: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<String>,
    /// Episode marker text in catalog mode (e.g. "Ep 12")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_episode: Option<String>,
    /// Episode number token in schedule mode
    #[serde(skip_serializing_if = "Option::is_none")]
    pub episode: Option<String>,
    /// Release time string in schedule mode
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_time: Option<String>,
}

/// One day of the release schedule
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleDay {
    pub day: String,
    pub list: Vec<ListingCard>,
}

/// A genre tag with its listing URL
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenreTag {
    pub name: String,
    pub slug: String,
    pub url: String,
}

/// Parse one listing item, or `None` when it has neither title nor link
pub fn parse_card(item: ElementRef<'_>, ctx: &SiteContext<'_>, mode: CardMode) -> Option<ListingCard> {
    let sel = &ctx.theme.card;

    let link = select_first(item, sel.link).and_then(|a| Some((a, link_href(a)?)));
    let title = try_extract("card.title", || first_text(item, sel.title)).or_else(|| {
        link.as_ref()
            .and_then(|(a, _)| attr_any(*a, &["title"]))
    });

    if title.is_none() && link.is_none() {
        return None;
    }

    let url = link
        .as_ref()
        .map(|(_, href)| ctx.absolute(href))
        .unwrap_or_default();
    let slug = extract_slug(&url);
    let title = title.unwrap_or_else(|| slug.replace('-', " "));

    let poster = try_extract("card.poster", || {
        select_first(item, sel.image).and_then(image_src)
    })
    .map(|src| ctx.absolute(&src))
    .unwrap_or_default();

    let episode_marker = try_extract("card.episode", || first_text(item, sel.episode));

    let status = try_extract("card.status", || first_text(item, sel.status))
        .or_else(|| episode_marker.as_deref().and_then(status_from_marker))
        .unwrap_or_else(|| DEFAULT_STATUS.to_string());

    let content_type = try_extract("card.type", || first_text(item, sel.content_type))
        .unwrap_or_else(|| DEFAULT_TYPE.to_string());

    let subtitle = try_extract("card.subtitle", || first_text(item, sel.subtitle))
        .unwrap_or_else(|| DEFAULT_SUBTITLE.to_string());

    let rating = try_extract("card.rating", || first_text(item, sel.rating));

    let mut card = ListingCard {
        title,
        slug,
        url,
        poster,
        status,
        content_type,
        subtitle,
        rating,
        current_episode: None,
        episode: None,
        release_time: None,
    };

    match mode {
        CardMode::Catalog => card.current_episode = episode_marker,
        CardMode::Schedule => {
            card.release_time = Some(
                try_extract("card.release_time", || first_text(item, sel.release_time))
                    .unwrap_or_else(|| EMPTY_MARKER.to_string()),
            );
            card.episode = Some(
                episode_marker
                    .as_deref()
                    .and_then(episode_token)
                    .unwrap_or_else(|| "?".to_string()),
            );
        }
    }

    Some(card)
}

/// Parse every card on a catalog, search or genre listing page
pub fn parse_listing(html: &str, ctx: &SiteContext<'_>) -> Vec<ListingCard> {
    let document = Html::parse_document(html);
    select_all(document.root_element(), ctx.theme.listing_item)
        .into_iter()
        .filter_map(|item| parse_card(item, ctx, CardMode::Catalog))
        .collect()
}

/// Parse the weekly release schedule, dropping days without cards
pub fn parse_schedule(html: &str, ctx: &SiteContext<'_>) -> Vec<ScheduleDay> {
    let document = Html::parse_document(html);
    let theme = ctx.theme;

    select_all(document.root_element(), theme.schedule_day)
        .into_iter()
        .filter_map(|day_box| {
            let day = first_text(day_box, theme.schedule_day_name)?;
            let list: Vec<_> = select_all(day_box, theme.schedule_item)
                .into_iter()
                .filter_map(|item| parse_card(item, ctx, CardMode::Schedule))
                .collect();
            (!list.is_empty()).then_some(ScheduleDay { day, list })
        })
        .collect()
}

/// Parse the genre widget into tags deduplicated by slug, sorted by name
pub fn parse_genre_index(html: &str, ctx: &SiteContext<'_>) -> Vec<GenreTag> {
    let document = Html::parse_document(html);
    let anchors = select_all(document.root_element(), ctx.theme.genre_index);
    let mut genres = collect_genres(anchors, ctx);
    genres.sort_by_key(|g| g.name.to_lowercase());
    genres
}

/// Genre tags from anchors, first occurrence of each slug wins
pub(crate) fn collect_genres<'a>(
    anchors: impl IntoIterator<Item = ElementRef<'a>>,
    ctx: &SiteContext<'_>,
) -> Vec<GenreTag> {
    let mut seen = HashSet::new();
    anchors
        .into_iter()
        .filter_map(|a| {
            let url = ctx.absolute(&link_href(a)?);
            let slug = extract_slug(&url);
            let name = element_text(a);
            if slug.is_empty() || name.is_empty() || !seen.insert(slug.clone()) {
                return None;
            }
            Some(GenreTag { name, slug, url })
        })
        .collect()
}

fn status_from_marker(marker: &str) -> Option<String> {
    let lower = marker.to_lowercase();
    if lower.contains("completed") || lower.contains("tamat") {
        Some("Completed".to_string())
    } else if lower.contains("ongoing") {
        Some("Ongoing".to_string())
    } else {
        None
    }
}

fn episode_token(marker: &str) -> Option<String> {
    EPISODE_NUMBER.captures(marker).map(|caps| caps[1].to_string())
}
