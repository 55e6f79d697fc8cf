//! Declarative selector table for a site theme
//!
//! Each field lists candidate CSS selectors in priority order; extractors
//! take the first candidate that matches. Supporting another mirror or skin
//! means adding a `Theme` value, not forking the parsers.

use super::classify::{PageKind, PageKindRule, Signal};

type Candidates = &'static [&'static str];

/// Candidate selectors for one listing card
#[derive(Debug)]
pub struct CardSelectors {
    pub title: Candidates,
    pub link: Candidates,
    pub image: Candidates,
    pub status: Candidates,
    pub content_type: Candidates,
    pub episode: Candidates,
    pub subtitle: Candidates,
    pub rating: Candidates,
    pub release_time: Candidates,
}

/// An episode-list selector and the match count it needs to be trusted
#[derive(Debug)]
pub struct ListRule {
    pub selector: &'static str,
    pub min_matches: usize,
}

/// Selectors for an episode index (series page or watch-page sidebar)
#[derive(Debug)]
pub struct EpisodeListSelectors {
    /// Anchor selectors, tried in order
    pub rules: &'static [ListRule],
    /// Episode number inside an anchor
    pub number: Candidates,
    /// Episode title inside an anchor
    pub title: Candidates,
}

#[derive(Debug)]
pub struct Theme {
    pub name: &'static str,

    // Listing pages
    pub listing_item: Candidates,
    pub card: CardSelectors,
    pub schedule_day: Candidates,
    pub schedule_day_name: Candidates,
    pub schedule_item: Candidates,
    pub genre_index: Candidates,

    // Shared by detail pages
    pub title: Candidates,

    // Series page
    pub alt_titles: Candidates,
    pub poster: Candidates,
    pub synopsis_fallback: Candidates,
    pub info_items: Candidates,
    pub genres: Candidates,
    pub episode_list: EpisodeListSelectors,

    // Episode page
    pub mirror_items: Candidates,
    pub mirror_name: Candidates,
    pub mirror_attrs: Candidates,
    pub server_options: Candidates,
    pub embed_frames: Candidates,
    /// Player wrappers holding the embedded iframe
    pub player_containers: Candidates,
    pub download_boxes: Candidates,
    pub download_box_title: Candidates,
    pub download_box_lines: Candidates,
    pub nav_prev: Candidates,
    pub nav_next: Candidates,
    pub nav_series: Candidates,
    pub sidebar_list: EpisodeListSelectors,

    /// Ranked page-kind rules, first match wins
    pub page_kind_rules: &'static [PageKindRule],
}

/// Look up a built-in theme by name
pub fn by_name(name: &str) -> Option<&'static Theme> {
    THEMES.iter().copied().find(|t| t.name.eq_ignore_ascii_case(name))
}

pub static THEMES: &[&Theme] = &[&ANICHIN];

/// Anichin-style WordPress theme and its known skin variants
pub static ANICHIN: Theme = Theme {
    name: "anichin",

    listing_item: &["div.listupd article.bs", "div.listupd div.bs", "article.bs", "div.bs"],
    card: CardSelectors {
        title: &["div.tt h2", "h2[itemprop='headline']", "div.tt", "h2", "h3"],
        link: &["a[itemprop='url']", "div.bsx > a", "a"],
        image: &["img.ts-post-image", "img"],
        status: &["div.status", "span.status", "div.bt span.status"],
        content_type: &["div.typez", "span.typez", "span.type"],
        episode: &["span.epx:not(.cndwn)", "div.epx", "div.epin", "span.ep"],
        subtitle: &["span.sb", "div.sb", "span.sub"],
        rating: &["div.numscore", "span.scr", "div.rating strong"],
        release_time: &["span.epx.cndwn", "div.releasetime", "span.releasetime", "span.time"],
    },
    schedule_day: &["div.bixbox.schedulepage", "div.bixbox"],
    schedule_day_name: &["div.releases h3", "div.releases h2", "h3"],
    schedule_item: &["div.listupd div.bs", "div.bs", "article.bs"],
    genre_index: &["ul.genre li a", "div.genres a", "a[href*='/genres/']"],

    title: &["h1.entry-title", "h1.ts-title", "div.infox h1", "h1"],

    alt_titles: &["span.alter", "div.alter", "span.alternative"],
    poster: &["div.thumb img", "div.bigcontent img", "img.ts-post-image", "div.thumbook img"],
    synopsis_fallback: &[
        "div.entry-content[itemprop='description']",
        "div.entry-content",
        "div.synp div.desc",
        "div.desc",
    ],
    info_items: &["div.info-content div.spe span", "div.spe span", "div.infox li"],
    genres: &["div.genxed a", "div.genre-info a", "span.mgen a"],
    episode_list: EpisodeListSelectors {
        rules: &[
            ListRule { selector: "div.eplister ul li a", min_matches: 1 },
            ListRule { selector: "div.episodelist ul li a", min_matches: 3 },
            ListRule { selector: "ul#daftarepisode li a", min_matches: 3 },
            ListRule { selector: "div.bixbox.bxcl ul li a", min_matches: 3 },
            ListRule { selector: "div.bixbox ul li a[href*='episode']", min_matches: 3 },
        ],
        number: &["div.epl-num", "span.epl-num"],
        title: &["div.epl-title", "span.epl-title"],
    },

    mirror_items: &["ul#playeroptionsul li", "div.mirror ul li", "ul.mirror li"],
    mirror_name: &["span.title", "span.server", "span.name"],
    mirror_attrs: &["data-src", "data-url", "data-em", "data-embed", "data-video"],
    server_options: &[
        "select.mirror option",
        "select#server option",
        "select[name='mirror'] option",
    ],
    embed_frames: &[
        "div.video-content iframe",
        "#embed_holder iframe",
        "div.player-embed iframe",
        "#pembed iframe",
        "iframe",
    ],
    player_containers: &["div.video-content", "#embed_holder", "div.player-embed", "#pembed"],
    download_boxes: &["div.mctnx div.soraddl", "div.soraddl"],
    download_box_title: &["div.sorattl h3", "div.sorattl", "h3"],
    download_box_lines: &["div.soraurl div.slink", "div.soraurl", "ul li"],
    nav_prev: &["a[rel='prev']", "div.naveps div.nvs:first-child a", "a.prev"],
    nav_next: &["a[rel='next']", "div.naveps div.nvs:last-child a", "a.next"],
    nav_series: &[
        "div.naveps div.nvsc a",
        "div.nvs.nvsc a",
        "div.ts-breadcrumb li:nth-child(2) a",
        "a.all-episodes",
    ],
    sidebar_list: EpisodeListSelectors {
        rules: &[
            ListRule { selector: "div.bixbox.lpl li a", min_matches: 1 },
            ListRule { selector: "div#singlepisode div.episodelist ul li a", min_matches: 1 },
            ListRule { selector: "div.episodelist ul li a", min_matches: 3 },
            ListRule { selector: "div#mainepisode ul li a", min_matches: 3 },
        ],
        number: &["div.lpl_num", "span.lpl_num", "div.epl-num"],
        title: &["div.lpl_title", "span.lpl_title", "div.playinfo h3", "div.epl-title"],
    },

    page_kind_rules: &[
        PageKindRule { signal: Signal::Selector("ul#playeroptionsul"), kind: PageKind::Episode },
        PageKindRule { signal: Signal::Selector("select.mirror"), kind: PageKind::Episode },
        PageKindRule { signal: Signal::StreamMarkup, kind: PageKind::Episode },
        PageKindRule { signal: Signal::PageText("select video server"), kind: PageKind::Episode },
        PageKindRule { signal: Signal::UrlPath("episode"), kind: PageKind::Episode },
        PageKindRule { signal: Signal::Selector("div.eplister"), kind: PageKind::Series },
        PageKindRule { signal: Signal::Selector("div.spe"), kind: PageKind::Series },
    ],
};
