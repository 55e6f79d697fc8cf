//! Series info page: metadata, synopsis, genres and the episode index

use scraper::{ElementRef, Html, Node, Selector};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::card::collect_genres;
use super::theme::EpisodeListSelectors;
use super::{
    element_text, extract_slug, first_text, heading_level, image_src, link_href, page_title,
    select_all, select_first, selector, try_extract, EpisodeRef, ExtractError, SiteContext,
    EMPTY_MARKER, UNKNOWN,
};
use crate::parser::GenreTag;

/// Full metadata of a series page
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SeriesDetail {
    pub title: String,
    pub alt_titles: Vec<String>,
    pub poster: String,
    /// "-" when the page has no synopsis
    pub synopsis: String,
    pub info: InfoFields,
    pub genres: Vec<GenreTag>,
    pub episodes: Vec<EpisodeRef>,
}

/// Labeled info fields; labels missing from the page read "Unknown"
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InfoFields {
    pub status: String,
    pub studio: String,
    pub network: String,
    pub released: String,
    pub duration: String,
    pub country: String,
    #[serde(rename = "type")]
    pub content_type: String,
    pub episode_count: String,
    pub fansub: String,
    pub posted_by: String,
}

impl Default for InfoFields {
    fn default() -> Self {
        Self {
            status: UNKNOWN.to_string(),
            studio: UNKNOWN.to_string(),
            network: UNKNOWN.to_string(),
            released: UNKNOWN.to_string(),
            duration: UNKNOWN.to_string(),
            country: UNKNOWN.to_string(),
            content_type: UNKNOWN.to_string(),
            episode_count: UNKNOWN.to_string(),
            fansub: UNKNOWN.to_string(),
            posted_by: UNKNOWN.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InfoKey {
    Status,
    Studio,
    Network,
    Released,
    Duration,
    Country,
    Type,
    EpisodeCount,
    Fansub,
    PostedBy,
}

/// Label fragments (lowercase) recognized in `Label: Value` items.
/// Checked in order, so longer phrases come before their substrings.
const INFO_LABELS: &[(&str, InfoKey)] = &[
    ("posted by", InfoKey::PostedBy),
    ("diposting oleh", InfoKey::PostedBy),
    ("dipos oleh", InfoKey::PostedBy),
    ("status", InfoKey::Status),
    ("studio", InfoKey::Studio),
    ("network", InfoKey::Network),
    ("release", InfoKey::Released),
    ("rilis", InfoKey::Released),
    ("duration", InfoKey::Duration),
    ("durasi", InfoKey::Duration),
    ("country", InfoKey::Country),
    ("negara", InfoKey::Country),
    ("type", InfoKey::Type),
    ("tipe", InfoKey::Type),
    ("episode", InfoKey::EpisodeCount),
    ("fansub", InfoKey::Fansub),
];

impl InfoFields {
    fn slot(&mut self, key: InfoKey) -> &mut String {
        match key {
            InfoKey::Status => &mut self.status,
            InfoKey::Studio => &mut self.studio,
            InfoKey::Network => &mut self.network,
            InfoKey::Released => &mut self.released,
            InfoKey::Duration => &mut self.duration,
            InfoKey::Country => &mut self.country,
            InfoKey::Type => &mut self.content_type,
            InfoKey::EpisodeCount => &mut self.episode_count,
            InfoKey::Fansub => &mut self.fansub,
            InfoKey::PostedBy => &mut self.posted_by,
        }
    }

    /// Record `value` under the label's key unless already set
    fn record(&mut self, label: &str, value: &str) -> bool {
        let label = label.to_lowercase();
        let Some(key) = INFO_LABELS
            .iter()
            .find(|(fragment, _)| label.contains(fragment))
            .map(|(_, key)| *key)
        else {
            return false;
        };

        let slot = self.slot(key);
        if slot == UNKNOWN {
            *slot = value.to_string();
        }
        true
    }
}

/// Parse a series info page
///
/// Fails only when no title heading exists; every other field falls back
/// to a default when missing.
pub fn parse_series_detail(
    html: &str,
    page_url: &str,
    ctx: &SiteContext<'_>,
) -> Result<SeriesDetail, ExtractError> {
    let document = Html::parse_document(html);
    let root = document.root_element();
    let theme = ctx.theme;

    let title = page_title(root, ctx).ok_or_else(|| ExtractError::MissingTitle {
        url: page_url.to_string(),
    })?;

    let alt_titles = try_extract("series.alt_titles", || first_text(root, theme.alt_titles))
        .map(|text| split_titles(&text))
        .unwrap_or_default();

    let poster = try_extract("series.poster", || {
        select_first(root, theme.poster).and_then(image_src)
    })
    .map(|src| ctx.absolute(&src))
    .unwrap_or_default();

    let synopsis = try_extract("series.synopsis", || {
        synopsis_under_heading(root).or_else(|| {
            select_all(root, theme.synopsis_fallback)
                .into_iter()
                .map(block_text)
                .find(|text| !text.is_empty())
        })
    })
    .unwrap_or_else(|| EMPTY_MARKER.to_string());

    let info = parse_info_fields(root, ctx);
    let genres = collect_genres(select_all(root, theme.genres), ctx);
    let episodes = parse_episode_refs(root, &theme.episode_list, ctx);

    Ok(SeriesDetail {
        title,
        alt_titles,
        poster,
        synopsis,
        info,
        genres,
        episodes,
    })
}

fn split_titles(text: &str) -> Vec<String> {
    text.split([',', '|'])
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_info_fields(root: ElementRef<'_>, ctx: &SiteContext<'_>) -> InfoFields {
    let mut info = InfoFields::default();
    for item in select_all(root, ctx.theme.info_items) {
        let text = element_text(item);
        let Some((label, value)) = text.split_once(':') else {
            continue;
        };
        let value = value.trim();
        if !value.is_empty() {
            info.record(label.trim(), value);
        }
    }
    info
}

/// Text of the blocks following a "Synopsis" heading
///
/// Collects following siblings until a heading of the same or higher
/// level. When the heading sits alone in a wrapper, the wrapper's
/// following siblings are read instead.
fn synopsis_under_heading(root: ElementRef<'_>) -> Option<String> {
    let headings = Selector::parse("h1, h2, h3, h4, h5, h6").ok()?;
    let heading = root.select(&headings).find(|h| {
        let text = element_text(*h).to_lowercase();
        text.contains("synopsis") || text.contains("sinopsis")
    })?;
    let level = heading_level(heading)?;

    let own = text_until_heading(heading, level);
    if !own.is_empty() {
        return Some(own);
    }

    let parent = heading.parent().and_then(ElementRef::wrap)?;
    let lifted = text_until_heading(parent, level);
    (!lifted.is_empty()).then_some(lifted)
}

fn text_until_heading(start: ElementRef<'_>, level: u8) -> String {
    let mut parts = Vec::new();
    for sibling in start.next_siblings() {
        match sibling.value() {
            Node::Text(text) => {
                let text = text.trim();
                if !text.is_empty() {
                    parts.push(text.to_string());
                }
            }
            Node::Element(_) => {
                let Some(el) = ElementRef::wrap(sibling) else {
                    continue;
                };
                if heading_level(el).is_some_and(|l| l <= level) {
                    break;
                }
                // A wrapper holding the next section keeps only its leading text
                let nested = el
                    .descendants()
                    .filter_map(ElementRef::wrap)
                    .find(|d| heading_level(*d).is_some_and(|l| l <= level));
                if let Some(stop) = nested {
                    let text = text_before(el, stop);
                    if !text.is_empty() {
                        parts.push(text);
                    }
                    break;
                }
                let text = block_text(el);
                if !text.is_empty() {
                    parts.push(text);
                }
            }
            _ => {}
        }
    }
    parts.join("\n")
}

fn text_before(scope: ElementRef<'_>, stop: ElementRef<'_>) -> String {
    scope
        .descendants()
        .take_while(|node| node.id() != stop.id())
        .filter_map(|node| node.value().as_text())
        .map(|text| text.trim())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Text nodes of a block, trimmed and joined by newlines
pub(crate) fn block_text(el: ElementRef<'_>) -> String {
    el.text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Episode links from the first list rule that meets its match threshold
pub(crate) fn parse_episode_refs(
    root: ElementRef<'_>,
    selectors: &EpisodeListSelectors,
    ctx: &SiteContext<'_>,
) -> Vec<EpisodeRef> {
    let anchors = selectors.rules.iter().find_map(|rule| {
        let sel = selector(rule.selector)?;
        let found: Vec<_> = root.select(&sel).collect();
        (!found.is_empty() && found.len() >= rule.min_matches).then_some(found)
    });

    anchors
        .unwrap_or_default()
        .into_iter()
        .filter_map(|a| episode_ref(a, selectors, ctx))
        .collect()
}

fn episode_ref(
    anchor: ElementRef<'_>,
    selectors: &EpisodeListSelectors,
    ctx: &SiteContext<'_>,
) -> Option<EpisodeRef> {
    let url = ctx.absolute(&link_href(anchor)?);
    let slug = extract_slug(&url);

    let number = first_text(anchor, selectors.number);
    let title = first_text(anchor, selectors.title);
    let label = match (number, title) {
        (Some(n), Some(t)) => format!("{} - {}", n, t),
        (Some(only), None) | (None, Some(only)) => only,
        (None, None) => element_text(anchor),
    };
    let label = if label.is_empty() { slug.clone() } else { label };

    Some(EpisodeRef { label, slug, url })
}
