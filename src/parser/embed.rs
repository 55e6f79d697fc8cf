//! Decoding of obfuscated player embeds
//!
//! Mirror lists carry either a plain URL or a base64-encoded HTML fragment
//! such as `<iframe src="...">`. Decoding is best-effort: any failure
//! returns the raw value untouched.

use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD, URL_SAFE, URL_SAFE_NO_PAD};
use base64::Engine;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref SRC_ATTR: Regex = Regex::new(r#"(?i)\bsrc\s*=\s*["']([^"']+)["']"#).unwrap();
}

/// Resolve a mirror attribute value to a player URL
pub fn decode_embed(raw: &str) -> String {
    let value = raw.trim();
    if value.starts_with("http") || value.starts_with("//") {
        return raw.to_string();
    }

    match decode_base64(value) {
        Some(decoded) => match SRC_ATTR.captures(&decoded) {
            Some(caps) => caps[1].trim().to_string(),
            None => decoded,
        },
        None => raw.to_string(),
    }
}

/// Decode standard or URL-safe base64 into UTF-8 text
fn decode_base64(value: &str) -> Option<String> {
    if value.is_empty() {
        return None;
    }

    [&STANDARD, &STANDARD_NO_PAD, &URL_SAFE, &URL_SAFE_NO_PAD]
        .iter()
        .find_map(|engine| engine.decode(value).ok())
        .and_then(|bytes| String::from_utf8(bytes).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(text: &str) -> String {
        STANDARD.encode(text)
    }

    #[test]
    fn test_absolute_url_passes_through() {
        assert_eq!(
            decode_embed("https://ok.ru/videoembed/123"),
            "https://ok.ru/videoembed/123"
        );
        assert_eq!(decode_embed("//cdn.example/x"), "//cdn.example/x");
    }

    #[test]
    fn test_iframe_fragment_yields_src() {
        let raw = encode(r#"<iframe src="https://cdn.example/x" frameborder="0"></iframe>"#);
        assert_eq!(decode_embed(&raw), "https://cdn.example/x");
    }

    #[test]
    fn test_single_quoted_src() {
        let raw = encode("<IFRAME width='100%' SRC='https://player.test/e/abc'></IFRAME>");
        assert_eq!(decode_embed(&raw), "https://player.test/e/abc");
    }

    #[test]
    fn test_decoded_text_without_src_is_returned() {
        let raw = encode("https://direct.example/video.mp4");
        assert_eq!(decode_embed(&raw), "https://direct.example/video.mp4");
    }

    #[test]
    fn test_unpadded_base64() {
        let raw = encode(r#"<iframe src="https://cdn.example/y"></iframe>"#);
        let unpadded = raw.trim_end_matches('=');
        assert_eq!(decode_embed(unpadded), "https://cdn.example/y");
    }

    #[test]
    fn test_garbage_is_returned_unchanged() {
        assert_eq!(decode_embed("%%%not-base64%%%"), "%%%not-base64%%%");
        assert_eq!(decode_embed(""), "");
    }

    #[test]
    fn test_binary_payload_is_returned_unchanged() {
        let raw = STANDARD.encode([0xff, 0xfe, 0x00, 0x81]);
        assert_eq!(decode_embed(&raw), raw);
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Anything that already looks like a URL is returned as-is
        #[test]
        fn property_http_input_is_identity(rest in "\\PC{0,60}") {
            let input = format!("http{}", rest);
            prop_assert_eq!(decode_embed(&input), input);
        }

        /// An encoded iframe always yields exactly its src
        #[test]
        fn property_encoded_iframe_yields_src(path in "[a-z0-9/]{1,30}") {
            let src = format!("https://cdn.example/{}", path);
            let raw = STANDARD.encode(format!(r#"<iframe src="{}"></iframe>"#, src));
            prop_assert_eq!(decode_embed(&raw), src);
        }

        /// Decoding never panics on arbitrary input
        #[test]
        fn property_never_panics(input in "\\PC{0,80}") {
            let _ = decode_embed(&input);
        }
    }
}
