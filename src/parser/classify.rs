//! Page-kind classification for generic detail lookups
//!
//! Series and episode pages share no single reliable marker, so the kind is
//! decided by a ranked list of heuristic rules taken from the theme. The
//! first rule whose signal fires wins; a page matching nothing is treated
//! as a series page.

use scraper::{ElementRef, Html};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{select_first, SiteContext, Theme};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PageKind {
    Series,
    Episode,
}

/// Observable evidence about a page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// An element matching the CSS selector exists
    Selector(&'static str),
    /// Any of the theme's mirror, server-option or player selectors matches
    StreamMarkup,
    /// The page text contains the phrase (case-insensitive)
    PageText(&'static str),
    /// The requested URL's path has the word as a `/`- or `-`-delimited token
    /// (case-insensitive)
    UrlPath(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageKindRule {
    pub signal: Signal,
    pub kind: PageKind,
}

/// Decide whether `html` fetched from `page_url` is a series or episode page
pub fn classify_page(html: &str, page_url: &str, ctx: &SiteContext<'_>) -> PageKind {
    let document = Html::parse_document(html);
    let root = document.root_element();
    let mut page_text: Option<String> = None;
    let url_path = url_path(page_url);

    for rule in ctx.theme.page_kind_rules {
        let fired = match rule.signal {
            Signal::Selector(css) => select_first(root, &[css]).is_some(),
            Signal::StreamMarkup => has_stream_markup(root, ctx.theme),
            Signal::PageText(phrase) => page_text
                .get_or_insert_with(|| root.text().collect::<String>().to_lowercase())
                .contains(&phrase.to_lowercase()),
            Signal::UrlPath(word) => {
                let word = word.to_lowercase();
                url_path.split(['/', '-']).any(|token| token == word)
            }
        };
        if fired {
            tracing::debug!(signal = ?rule.signal, kind = ?rule.kind, "page kind rule matched");
            return rule.kind;
        }
    }

    PageKind::Series
}

fn has_stream_markup(root: ElementRef<'_>, theme: &Theme) -> bool {
    [theme.mirror_items, theme.server_options, theme.player_containers]
        .into_iter()
        .any(|candidates| select_first(root, candidates).is_some())
}

fn url_path(page_url: &str) -> String {
    url::Url::parse(page_url)
        .map(|u| u.path().to_string())
        .unwrap_or_else(|_| page_url.split(['?', '#']).next().unwrap_or("").to_string())
        .to_lowercase()
}
