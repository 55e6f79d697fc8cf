//! Link normalization: absolute URLs and slugs

use url::Url;

/// Resolve a possibly-relative reference against the site origin
///
/// Handles absolute `http(s)://` links, protocol-relative `//host/path`,
/// root-relative `/path` and bare `segment/path` references.
pub fn absolute_url(base_url: &str, href: &str) -> String {
    let href = href.trim();
    if href.is_empty() {
        return String::new();
    }
    if href.starts_with("http://") || href.starts_with("https://") {
        return href.to_string();
    }

    let base = base_url.trim_end_matches('/');
    match Url::parse(&format!("{}/", base)).and_then(|b| b.join(href)) {
        Ok(joined) => joined.to_string(),
        Err(_) if href.starts_with("//") => format!("https:{}", href),
        Err(_) if href.starts_with('/') => format!("{}{}", base, href),
        Err(_) => format!("{}/{}", base, href),
    }
}

/// Last non-empty path segment of a URL, without query or trailing slash
///
/// Returns an empty string when there is no path segment or when an
/// absolute URL fails to parse.
pub fn extract_slug(url: &str) -> String {
    let url = url.trim();
    if let Ok(parsed) = Url::parse(url) {
        return parsed
            .path_segments()
            .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
            .map(|s| s.to_string())
            .unwrap_or_default();
    }
    if has_scheme(url) {
        return String::new();
    }

    // Relative reference: strip query/fragment and a protocol-relative host.
    let path = url.split(['?', '#']).next().unwrap_or("");
    let path = match path.strip_prefix("//") {
        Some(rest) => rest.split_once('/').map(|(_, p)| p).unwrap_or(""),
        None => path,
    };
    path.split('/')
        .filter(|s| !s.is_empty())
        .last()
        .unwrap_or("")
        .to_string()
}

/// Whether the reference starts with an RFC 3986 scheme such as `https:`
fn has_scheme(reference: &str) -> bool {
    reference.split_once(':').is_some_and(|(scheme, _)| {
        let mut chars = scheme.chars();
        chars.next().is_some_and(|c| c.is_ascii_alphabetic())
            && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://anichin.moe";

    #[test]
    fn test_absolute_url_variants() {
        assert_eq!(
            absolute_url(BASE, "https://cdn.test/a.jpg"),
            "https://cdn.test/a.jpg"
        );
        assert_eq!(absolute_url(BASE, "//cdn.test/a.jpg"), "https://cdn.test/a.jpg");
        assert_eq!(
            absolute_url(BASE, "/seri/soul-land-2/"),
            "https://anichin.moe/seri/soul-land-2/"
        );
        assert_eq!(
            absolute_url(BASE, "soul-land-2-episode-10/"),
            "https://anichin.moe/soul-land-2-episode-10/"
        );
        assert_eq!(absolute_url(BASE, "   "), "");
    }

    #[test]
    fn test_absolute_url_with_trailing_slash_base() {
        assert_eq!(
            absolute_url("https://anichin.moe/", "/genres/action/"),
            "https://anichin.moe/genres/action/"
        );
    }

    #[test]
    fn test_extract_slug() {
        assert_eq!(extract_slug("https://site/seri/foo-bar/"), "foo-bar");
        assert_eq!(extract_slug("https://anichin.moe/seri/foo-bar/?ref=home#top"), "foo-bar");
        assert_eq!(extract_slug("/seri/foo-bar"), "foo-bar");
        assert_eq!(extract_slug("foo-bar/"), "foo-bar");
        assert_eq!(extract_slug("//cdn.test/x/y.mp4?t=1"), "y.mp4");
    }

    #[test]
    fn test_extract_slug_degenerate_input() {
        assert_eq!(extract_slug(""), "");
        assert_eq!(extract_slug("https://anichin.moe/"), "");
        assert_eq!(extract_slug("/"), "");
        assert_eq!(extract_slug("?s=query"), "");
        assert_eq!(extract_slug("http://"), "");
        assert_eq!(extract_slug("https://"), "");
        assert_eq!(extract_slug("https:///"), "");
        // Relative paths with a colon after the first slash are not schemes
        assert_eq!(extract_slug("seri/a:b/"), "a:b");
    }
}
