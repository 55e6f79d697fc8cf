//! Episode watch page: stream servers, downloads, navigation, sidebar list

use lazy_static::lazy_static;
use regex::Regex;
use scraper::{ElementRef, Html};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::series::parse_episode_refs;
use super::{
    attr_any, decode_embed, element_text, extract_slug, first_text, heading_level, link_href,
    page_title, select_all, select_first, try_extract, EpisodeRef, ExtractError, SiteContext,
    UNKNOWN,
};

/// Title used when an otherwise playable page has no title heading
pub const UNKNOWN_TITLE: &str = "Unknown Title";

/// Walk limit for the download section
const MAX_DOWNLOAD_STEPS: usize = 2000;

/// Heading words that end the download section
const STOP_KEYWORDS: &[&str] = &["watch", "history", "comment", "recommended", "related"];

/// Elements that make a `div` a container rather than a single line
const BLOCK_TAGS: &[&str] = &["div", "ul", "ol", "li", "p", "table", "tbody", "tr"];

lazy_static! {
    static ref RESOLUTION: Regex =
        Regex::new(r"(?i)\b(240p|360p|480p|720p|1080p|1440p|4k)\b").unwrap();
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StreamServer {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct DownloadLink {
    pub provider: String,
    pub url: String,
}

/// Links for one resolution, in page order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct ResolutionLinks {
    pub resolution: String,
    pub links: Vec<DownloadLink>,
}

/// A named batch of downloads, e.g. "Episode 01-20"
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct DownloadGroup {
    pub name: String,
    pub resolutions: Vec<ResolutionLinks>,
}

/// Links around the current episode; absent links are omitted
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Navigation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous: Option<EpisodeRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<EpisodeRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub series_index: Option<EpisodeRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeDetail {
    pub title: String,
    pub servers: Vec<StreamServer>,
    /// First server, or an empty placeholder when none resolved
    pub main_server: StreamServer,
    pub downloads: Vec<DownloadGroup>,
    pub navigation: Navigation,
    pub episodes: Vec<EpisodeRef>,
}

/// Parse an episode watch page
pub fn parse_episode_detail(
    html: &str,
    page_url: &str,
    ctx: &SiteContext<'_>,
) -> Result<EpisodeDetail, ExtractError> {
    let document = Html::parse_document(html);
    let root = document.root_element();

    let servers = parse_servers(root, ctx);
    let title = match page_title(root, ctx) {
        Some(title) => title,
        None if servers.is_empty() => {
            return Err(ExtractError::MissingTitle {
                url: page_url.to_string(),
            })
        }
        None => UNKNOWN_TITLE.to_string(),
    };

    let main_server = servers.first().cloned().unwrap_or_default();
    let downloads = parse_downloads(root, ctx);
    let navigation = parse_navigation(root, ctx);
    let episodes = parse_episode_refs(root, &ctx.theme.sidebar_list, ctx);

    tracing::debug!(
        url = page_url,
        servers = servers.len(),
        download_groups = downloads.len(),
        "parsed episode page"
    );

    Ok(EpisodeDetail {
        title,
        servers,
        main_server,
        downloads,
        navigation,
        episodes,
    })
}

type ServerStrategy = fn(ElementRef<'_>, &SiteContext<'_>) -> Vec<StreamServer>;

/// Stream servers from the first strategy that yields any
fn parse_servers(root: ElementRef<'_>, ctx: &SiteContext<'_>) -> Vec<StreamServer> {
    const STRATEGIES: [ServerStrategy; 3] = [mirror_list_servers, select_servers, frame_servers];

    STRATEGIES
        .iter()
        .map(|strategy| strategy(root, ctx))
        .find(|servers| !servers.is_empty())
        .unwrap_or_default()
}

fn mirror_list_servers(root: ElementRef<'_>, ctx: &SiteContext<'_>) -> Vec<StreamServer> {
    let theme = ctx.theme;
    select_all(root, theme.mirror_items)
        .into_iter()
        .enumerate()
        .filter_map(|(i, item)| {
            let url = resolve_stream(&attr_any(item, theme.mirror_attrs)?);
            if url.is_empty() {
                return None;
            }
            let name = first_text(item, theme.mirror_name)
                .or_else(|| Some(element_text(item)).filter(|t| !t.is_empty()))
                .unwrap_or_else(|| format!("Server {}", i + 1));
            Some(StreamServer { name, url })
        })
        .collect()
}

fn select_servers(root: ElementRef<'_>, ctx: &SiteContext<'_>) -> Vec<StreamServer> {
    select_all(root, ctx.theme.server_options)
        .into_iter()
        .enumerate()
        .filter_map(|(i, option)| {
            let url = resolve_stream(&attr_any(option, &["value", "data-em", "data-src"])?);
            if url.is_empty() {
                return None;
            }
            let name = Some(element_text(option))
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| format!("Server {}", i + 1));
            Some(StreamServer { name, url })
        })
        .collect()
}

fn frame_servers(root: ElementRef<'_>, ctx: &SiteContext<'_>) -> Vec<StreamServer> {
    select_first(root, ctx.theme.embed_frames)
        .and_then(|frame| attr_any(frame, &["src", "data-src", "data-lazy-src"]))
        .map(|raw| resolve_stream(&raw))
        .filter(|url| !url.is_empty())
        .map(|url| StreamServer {
            name: "Default".to_string(),
            url,
        })
        .into_iter()
        .collect()
}

/// Decode a mirror value and give protocol-relative URLs a scheme
fn resolve_stream(raw: &str) -> String {
    let url = decode_embed(raw).trim().to_string();
    if url.starts_with("//") {
        format!("https:{}", url)
    } else {
        url
    }
}

fn parse_downloads(root: ElementRef<'_>, ctx: &SiteContext<'_>) -> Vec<DownloadGroup> {
    let groups = downloads_after_heading(root, ctx);
    if !groups.is_empty() {
        return groups;
    }
    downloads_from_boxes(root, ctx)
}

/// Accumulates download lines into named groups
#[derive(Default)]
struct GroupBuilder {
    groups: Vec<DownloadGroup>,
}

impl GroupBuilder {
    fn start_group(&mut self, name: String) {
        self.groups.push(DownloadGroup {
            name,
            resolutions: Vec::new(),
        });
    }

    fn add_links(&mut self, implicit_group: &str, resolution: String, links: Vec<DownloadLink>) {
        if links.is_empty() {
            return;
        }
        if self.groups.is_empty() {
            self.start_group(implicit_group.to_string());
        }
        let Some(group) = self.groups.last_mut() else {
            return;
        };
        match group.resolutions.iter_mut().find(|r| r.resolution == resolution) {
            Some(existing) => existing.links.extend(links),
            None => group.resolutions.push(ResolutionLinks { resolution, links }),
        }
    }

    fn finish(mut self) -> Vec<DownloadGroup> {
        self.groups
            .retain(|g| g.resolutions.iter().any(|r| !r.links.is_empty()));
        self.groups
    }
}

/// Walk the document after the first "download" heading
///
/// Sub-headings open groups, resolution lines add links to the current
/// group and a stop-keyword heading ends the walk.
fn downloads_after_heading(root: ElementRef<'_>, ctx: &SiteContext<'_>) -> Vec<DownloadGroup> {
    let nodes: Vec<_> = root.descendants().collect();
    let Some(start) = nodes.iter().position(|node| {
        ElementRef::wrap(*node).is_some_and(|el| {
            heading_level(el).is_some() && element_text(el).to_lowercase().contains("download")
        })
    }) else {
        return Vec::new();
    };

    let section_name = ElementRef::wrap(nodes[start])
        .map(element_text)
        .unwrap_or_default();
    let mut builder = GroupBuilder::default();
    let mut index = start + nodes[start].descendants().count();
    let mut steps = 0;

    while index < nodes.len() {
        steps += 1;
        if steps > MAX_DOWNLOAD_STEPS {
            tracing::warn!("download section walk hit the step limit");
            break;
        }

        let node = nodes[index];
        let Some(el) = ElementRef::wrap(node) else {
            index += 1;
            continue;
        };

        if heading_level(el).is_some() {
            let text = element_text(el);
            let lower = text.to_lowercase();
            if lower.contains("download") {
                // nested download headings belong to the current section
            } else if STOP_KEYWORDS.iter().any(|k| lower.contains(k)) {
                break;
            } else if !text.is_empty() {
                builder.start_group(text);
            }
            index += node.descendants().count();
            continue;
        }

        if is_line(el) && resolution_token(&element_text(el)).is_some() {
            for (resolution, links) in line_segments(el, ctx) {
                builder.add_links(&section_name, resolution, links);
            }
            index += node.descendants().count();
            continue;
        }

        index += 1;
    }

    builder.finish()
}

/// One group per themed download box
fn downloads_from_boxes(root: ElementRef<'_>, ctx: &SiteContext<'_>) -> Vec<DownloadGroup> {
    let theme = ctx.theme;
    let mut builder = GroupBuilder::default();

    for download_box in select_all(root, theme.download_boxes) {
        let name = first_text(download_box, theme.download_box_title)
            .unwrap_or_else(|| "Download".to_string());
        builder.start_group(name.clone());

        for line in select_all(download_box, theme.download_box_lines) {
            if resolution_token(&element_text(line)).is_some() {
                for (resolution, links) in line_segments(line, ctx) {
                    builder.add_links(&name, resolution, links);
                }
                continue;
            }
            let resolution = first_text(line, &["strong", "b"]).unwrap_or_else(|| UNKNOWN.to_string());
            builder.add_links(&name, resolution, line_links(line, ctx));
        }
    }

    builder.finish()
}

/// A `li`/`p`/`tr`, or a `div` without block children, holding links
fn is_line(el: ElementRef<'_>) -> bool {
    let has_anchor = el
        .descendants()
        .filter_map(ElementRef::wrap)
        .any(|child| child.value().name() == "a");
    if !has_anchor {
        return false;
    }

    match el.value().name() {
        "li" | "p" | "tr" | "dd" => true,
        "div" => !el
            .children()
            .filter_map(ElementRef::wrap)
            .any(|child| BLOCK_TAGS.contains(&child.value().name())),
        _ => false,
    }
}

fn resolution_token(text: &str) -> Option<String> {
    RESOLUTION
        .captures(text)
        .map(|caps| caps[1].to_lowercase())
}

/// Every anchor of a line as a provider link
fn line_links(line: ElementRef<'_>, ctx: &SiteContext<'_>) -> Vec<DownloadLink> {
    line.descendants()
        .filter_map(ElementRef::wrap)
        .filter(|el| el.value().name() == "a")
        .enumerate()
        .filter_map(|(i, anchor)| download_link(anchor, i + 1, ctx))
        .collect()
}

/// Split a line into resolution buckets in document order
///
/// A resolution token in text outside an anchor opens a new bucket; anchors
/// that precede every token fall under the line's first token.
fn line_segments(line: ElementRef<'_>, ctx: &SiteContext<'_>) -> Vec<(String, Vec<DownloadLink>)> {
    let mut segments: Vec<(String, Vec<DownloadLink>)> = Vec::new();
    let mut anchors = 0;

    for node in line.descendants() {
        if let Some(text) = node.value().as_text() {
            let in_anchor = node
                .ancestors()
                .filter_map(ElementRef::wrap)
                .any(|el| el.value().name() == "a");
            if !in_anchor {
                if let Some(resolution) = resolution_token(text) {
                    segments.push((resolution, Vec::new()));
                }
            }
            continue;
        }

        let Some(anchor) = ElementRef::wrap(node).filter(|el| el.value().name() == "a") else {
            continue;
        };
        anchors += 1;
        let Some(link) = download_link(anchor, anchors, ctx) else {
            continue;
        };
        if segments.is_empty() {
            let resolution =
                resolution_token(&element_text(line)).unwrap_or_else(|| UNKNOWN.to_string());
            segments.push((resolution, Vec::new()));
        }
        if let Some((_, links)) = segments.last_mut() {
            links.push(link);
        }
    }

    segments
}

fn download_link(anchor: ElementRef<'_>, position: usize, ctx: &SiteContext<'_>) -> Option<DownloadLink> {
    let url = ctx.absolute(&link_href(anchor)?);
    let provider = Some(element_text(anchor))
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| format!("Link {}", position));
    Some(DownloadLink { provider, url })
}

fn parse_navigation(root: ElementRef<'_>, ctx: &SiteContext<'_>) -> Navigation {
    let theme = ctx.theme;
    let series_index = try_extract("episode.nav_series", || nav_link(root, theme.nav_series, ctx));
    let is_index = |link: &EpisodeRef| {
        series_index
            .as_ref()
            .is_some_and(|index| index.url == link.url)
    };

    let previous = try_extract("episode.nav_prev", || nav_link(root, theme.nav_prev, ctx))
        .filter(|link| !is_index(link));
    let next = try_extract("episode.nav_next", || nav_link(root, theme.nav_next, ctx))
        .filter(|link| !is_index(link));

    Navigation {
        previous,
        next,
        series_index,
    }
}

fn nav_link(root: ElementRef<'_>, candidates: &[&str], ctx: &SiteContext<'_>) -> Option<EpisodeRef> {
    let anchor = select_first(root, candidates)?;
    let url = ctx.absolute(&link_href(anchor)?);
    let slug = extract_slug(&url);
    let label = Some(element_text(anchor))
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| slug.clone());
    Some(EpisodeRef { label, slug, url })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::theme::ANICHIN;
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;

    const BASE: &str = "https://anichin.moe";
    const PAGE: &str = "https://anichin.moe/renegade-immortal-episode-12/";

    fn ctx() -> SiteContext<'static> {
        SiteContext::new(BASE, &ANICHIN)
    }

    fn episode_page() -> String {
        let encoded = STANDARD.encode(r#"<iframe src="//ok.ru/videoembed/777" allowfullscreen></iframe>"#);
        format!(
            r#"
<html><body>
  <h1 class="entry-title">Renegade Immortal Episode 12</h1>
  <div class="video-content"><iframe src="https://fallback.example/e/1"></iframe></div>
  <ul id="playeroptionsul">
    <li data-src="{encoded}"><span class="title">OK.ru</span></li>
    <li data-src="https://dailymotion.com/embed/video/x8"><span class="title">Dailymotion</span></li>
    <li data-src=""><span class="title">Broken</span></li>
    <li data-src="https://rumble.com/embed/v5"></li>
  </ul>
  <div class="naveps">
    <div class="nvs"><a href="/renegade-immortal-episode-11/" rel="prev">Prev</a></div>
    <div class="nvs nvsc"><a href="/seri/renegade-immortal/">All Episodes</a></div>
    <div class="nvs"><a href="/renegade-immortal-episode-13/" rel="next">Next</a></div>
  </div>
  <div class="entry-content">
    <h2>Download Renegade Immortal Episode 12</h2>
    <h3>Episode 01-20</h3>
    <p>360p <a href="https://mega.nz/file/abc">Provider1</a></p>
    <ul>
      <li><strong>720p</strong> <a href="https://mega.nz/file/def">Mega</a> <a href="https://gofile.io/d/xyz">Gofile</a></li>
      <li>720p <a href="/go/terabox">Terabox</a></li>
    </ul>
    <h3>Batch</h3>
    <p>Coming soon</p>
    <h3>Recommended Series</h3>
    <p>1080p <a href="https://spam.example/">Not a download</a></p>
  </div>
  <div class="bixbox lpl">
    <ul>
      <li><a href="/renegade-immortal-episode-13/"><div class="lpl_num">13</div><div class="lpl_title">Renegade Immortal Episode 13</div></a></li>
      <li><a href="/renegade-immortal-episode-12/"><div class="lpl_num">12</div></a></li>
    </ul>
  </div>
</body></html>
"#
        )
    }

    #[test]
    fn test_parse_episode_detail_full() {
        let detail = parse_episode_detail(&episode_page(), PAGE, &ctx()).unwrap();
        assert_eq!(detail.title, "Renegade Immortal Episode 12");
        assert_eq!(detail.servers.len(), 3);
        assert_eq!(
            detail.servers[0],
            StreamServer {
                name: "OK.ru".to_string(),
                url: "https://ok.ru/videoembed/777".to_string(),
            }
        );
        assert_eq!(detail.servers[1].name, "Dailymotion");
        assert_eq!(detail.servers[2].name, "Server 4");
        assert_eq!(detail.main_server, detail.servers[0]);
        assert_eq!(detail.episodes.len(), 2);
        assert_eq!(detail.episodes[0].label, "13 - Renegade Immortal Episode 13");
        assert_eq!(detail.episodes[1].label, "12");
    }

    #[test]
    fn test_download_groups_by_sub_heading_and_resolution() {
        let detail = parse_episode_detail(&episode_page(), PAGE, &ctx()).unwrap();
        assert_eq!(detail.downloads.len(), 1);

        let group = &detail.downloads[0];
        assert_eq!(group.name, "Episode 01-20");
        assert_eq!(group.resolutions.len(), 2);
        assert_eq!(group.resolutions[0].resolution, "360p");
        assert_eq!(
            group.resolutions[0].links,
            vec![DownloadLink {
                provider: "Provider1".to_string(),
                url: "https://mega.nz/file/abc".to_string(),
            }]
        );

        let providers: Vec<_> = group.resolutions[1]
            .links
            .iter()
            .map(|l| (l.provider.as_str(), l.url.as_str()))
            .collect();
        assert_eq!(
            providers,
            vec![
                ("Mega", "https://mega.nz/file/def"),
                ("Gofile", "https://gofile.io/d/xyz"),
                ("Terabox", "https://anichin.moe/go/terabox"),
            ]
        );
    }

    #[test]
    fn test_download_single_group_fixture() {
        let html = r#"
<h1>Ep 1</h1>
<h2>Download</h2>
<h3>Episode 01-20</h3>
<p>360p <a href="https://files.example/x">Provider1</a></p>
"#;
        let detail = parse_episode_detail(html, PAGE, &ctx()).unwrap();
        assert_eq!(
            detail.downloads,
            vec![DownloadGroup {
                name: "Episode 01-20".to_string(),
                resolutions: vec![ResolutionLinks {
                    resolution: "360p".to_string(),
                    links: vec![DownloadLink {
                        provider: "Provider1".to_string(),
                        url: "https://files.example/x".to_string(),
                    }],
                }],
            }]
        );
    }

    #[test]
    fn test_lines_before_sub_heading_use_section_name() {
        let html = r#"
<h1>Ep 2</h1>
<div><h2>Download Episode 2</h2></div>
<div class="slink">1080P <a href="https://files.example/hd">Drive</a></div>
<h4>Comments</h4>
<div class="slink">480p <a href="https://files.example/sd">Drive</a></div>
"#;
        let detail = parse_episode_detail(html, PAGE, &ctx()).unwrap();
        assert_eq!(detail.downloads.len(), 1);
        assert_eq!(detail.downloads[0].name, "Download Episode 2");
        assert_eq!(detail.downloads[0].resolutions.len(), 1);
        assert_eq!(detail.downloads[0].resolutions[0].resolution, "1080p");
    }

    #[test]
    fn test_break_separated_resolutions_in_one_paragraph() {
        let html = r#"
<h1>Ep 5</h1>
<h2>Download</h2>
<p>360p <a href=https://a/1>Mega</a><br>720p <a href=https://a/2>Mega</a><br><b>1080p</b> <a href=https://a/3>Drive</a> <a href=https://a/4>Mega</a></p>
"#;
        let detail = parse_episode_detail(html, PAGE, &ctx()).unwrap();
        assert_eq!(detail.downloads.len(), 1);
        let summary: Vec<_> = detail.downloads[0]
            .resolutions
            .iter()
            .map(|r| {
                let urls: Vec<_> = r.links.iter().map(|l| l.url.as_str()).collect();
                (r.resolution.as_str(), urls)
            })
            .collect();
        assert_eq!(
            summary,
            vec![
                ("360p", vec!["https://a/1"]),
                ("720p", vec!["https://a/2"]),
                ("1080p", vec!["https://a/3", "https://a/4"]),
            ]
        );
    }

    #[test]
    fn test_download_walk_stops_at_step_limit() {
        let html = format!(
            r#"<h1>Ep 6</h1>
<h2>Download</h2>
<h3>Batch</h3>
<p>360p <a href="https://early.example/x">Early</a></p>
{}
<p>720p <a href="https://late.example/x">Late</a></p>"#,
            "<span>x</span>".repeat(MAX_DOWNLOAD_STEPS)
        );
        let detail = parse_episode_detail(&html, PAGE, &ctx()).unwrap();
        assert_eq!(detail.downloads.len(), 1);
        assert_eq!(detail.downloads[0].name, "Batch");
        let resolutions: Vec<_> = detail.downloads[0]
            .resolutions
            .iter()
            .map(|r| r.resolution.as_str())
            .collect();
        assert_eq!(resolutions, vec!["360p"]);
    }

    #[test]
    fn test_download_boxes_fallback() {
        let html = r#"
<h1>Ep 3</h1>
<div class="mctnx">
  <div class="soraddl">
    <div class="sorattl"><h3>Renegade Immortal 3 Sub Indo</h3></div>
    <div class="soraurl">
      <div class="slink"><strong>480p</strong> <a href="https://a.example/1">Pixeldrain</a></div>
      <div class="slink"><strong>4K</strong> <a href="https://a.example/2">Pixeldrain</a></div>
    </div>
  </div>
  <div class="soraddl">
    <div class="sorattl"><h3>Empty box</h3></div>
  </div>
</div>
"#;
        let detail = parse_episode_detail(html, PAGE, &ctx()).unwrap();
        assert_eq!(detail.downloads.len(), 1);
        let group = &detail.downloads[0];
        assert_eq!(group.name, "Renegade Immortal 3 Sub Indo");
        let resolutions: Vec<_> = group.resolutions.iter().map(|r| r.resolution.as_str()).collect();
        assert_eq!(resolutions, vec!["480p", "4k"]);
    }

    #[test]
    fn test_select_dropdown_servers() {
        let encoded = STANDARD.encode(r#"<iframe src="https://player.example/v/9"></iframe>"#);
        let html = format!(
            r#"<h1>Ep 4</h1>
<select class="mirror">
  <option value="">Select Video Server</option>
  <option value="{encoded}">Server HD</option>
  <option value="//cdn.example/v/10"></option>
</select>"#
        );
        let detail = parse_episode_detail(&html, PAGE, &ctx()).unwrap();
        assert_eq!(
            detail.servers,
            vec![
                StreamServer {
                    name: "Server HD".to_string(),
                    url: "https://player.example/v/9".to_string(),
                },
                StreamServer {
                    name: "Server 3".to_string(),
                    url: "https://cdn.example/v/10".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_iframe_is_last_resort() {
        let html = r#"<h1>Ep 5</h1><div id="embed_holder"><iframe data-src="https://player.example/only"></iframe></div>"#;
        let detail = parse_episode_detail(html, PAGE, &ctx()).unwrap();
        assert_eq!(detail.servers.len(), 1);
        assert_eq!(detail.servers[0].name, "Default");
        assert_eq!(detail.main_server.url, "https://player.example/only");
    }

    #[test]
    fn test_no_servers_gives_placeholder() {
        let detail = parse_episode_detail("<h1>Ep 6</h1>", PAGE, &ctx()).unwrap();
        assert!(detail.servers.is_empty());
        assert_eq!(detail.main_server, StreamServer::default());
        assert!(detail.downloads.is_empty());
        assert!(detail.episodes.is_empty());
    }

    #[test]
    fn test_navigation_links_and_omission() {
        let detail = parse_episode_detail(&episode_page(), PAGE, &ctx()).unwrap();
        let nav = &detail.navigation;
        assert_eq!(nav.previous.as_ref().unwrap().slug, "renegade-immortal-episode-11");
        assert_eq!(nav.next.as_ref().unwrap().url, "https://anichin.moe/renegade-immortal-episode-13/");
        assert_eq!(nav.series_index.as_ref().unwrap().label, "All Episodes");

        let html = r#"<h1>Ep 1</h1><a href="/ep-2/" rel="next">Next</a>"#;
        let detail = parse_episode_detail(html, PAGE, &ctx()).unwrap();
        let json = serde_json::to_value(&detail.navigation).unwrap();
        assert_eq!(json.as_object().unwrap().len(), 1);
        assert_eq!(json["next"]["slug"], "ep-2");
    }

    #[test]
    fn test_missing_title_with_streams_is_tolerated() {
        let html = r#"<ul id="playeroptionsul"><li data-src="https://x.example/e"><span class="title">X</span></li></ul>"#;
        let detail = parse_episode_detail(html, PAGE, &ctx()).unwrap();
        assert_eq!(detail.title, UNKNOWN_TITLE);
    }

    #[test]
    fn test_missing_title_without_streams_is_an_error() {
        let err = parse_episode_detail("<p>nothing here</p>", PAGE, &ctx()).unwrap_err();
        assert_eq!(err, ExtractError::MissingTitle { url: PAGE.to_string() });
    }

    #[test]
    fn test_episode_detail_serialization() {
        let detail = parse_episode_detail(&episode_page(), PAGE, &ctx()).unwrap();
        let json = serde_json::to_value(&detail).unwrap();
        assert!(json.get("mainServer").is_some());
        assert!(json["navigation"].get("seriesIndex").is_some());
        assert_eq!(json["downloads"][0]["resolutions"][0]["links"][0]["provider"], "Provider1");
    }
}
