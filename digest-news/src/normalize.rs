//! Plain-text normalization of feed markup

use std::sync::LazyLock;

use quick_xml::escape::resolve_html5_entity;
use regex::{Captures, Regex};

/// Default excerpt length in characters
pub const DEFAULT_MAX_LEN: usize = 600;

/// Marker appended to truncated excerpts
const ELLIPSIS: &str = "...";

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^<]+?>").expect("tag pattern is valid"));

static ENTITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(#[0-9]+;?|#[xX][0-9a-fA-F]+;?|[a-zA-Z][a-zA-Z0-9]{0,31};?)")
        .expect("entity pattern is valid")
});

/// Named references HTML also accepts without the trailing `;`
const LEGACY_ENTITIES: &[&str] = &[
    "AElig", "AMP", "Aacute", "Acirc", "Agrave", "Aring", "Atilde", "Auml", "COPY", "Ccedil",
    "ETH", "Eacute", "Ecirc", "Egrave", "Euml", "GT", "Iacute", "Icirc", "Igrave", "Iuml", "LT",
    "Ntilde", "Oacute", "Ocirc", "Ograve", "Oslash", "Otilde", "Ouml", "QUOT", "REG", "THORN",
    "Uacute", "Ucirc", "Ugrave", "Uuml", "Yacute", "aacute", "acirc", "acute", "aelig", "agrave",
    "amp", "aring", "atilde", "auml", "brvbar", "ccedil", "cedil", "cent", "copy", "curren",
    "deg", "divide", "eacute", "ecirc", "egrave", "eth", "euml", "frac12", "frac14", "frac34",
    "gt", "iacute", "icirc", "iexcl", "igrave", "iquest", "iuml", "laquo", "lt", "macr", "micro",
    "middot", "nbsp", "not", "ntilde", "oacute", "ocirc", "ograve", "ordf", "ordm", "oslash",
    "otilde", "ouml", "para", "plusmn", "pound", "quot", "raquo", "reg", "sect", "shy", "sup1",
    "sup2", "sup3", "szlig", "thorn", "times", "uacute", "ucirc", "ugrave", "uml", "uuml",
    "yacute", "yen", "yuml",
];

static IMG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<img[^>]+src=["']([^"']+)["']"#).expect("img pattern is valid")
});

/// Turns feed body markup into a bounded plain-text excerpt
#[derive(Debug, Clone, Copy)]
pub struct TextNormalizer {
    max_len: usize,
}

impl TextNormalizer {
    pub fn new(max_len: usize) -> Self {
        Self { max_len }
    }

    /// Strip tags, decode entities, flatten newlines and cap the length.
    ///
    /// Length is counted in characters; a truncated excerpt ends with `...`.
    pub fn normalize(&self, raw: &str) -> String {
        let text = decode_entities(&strip_tags(raw));
        let text = text.replace('\n', " ");
        let text = text.trim();

        if text.chars().count() > self.max_len {
            let mut cut: String = text.chars().take(self.max_len).collect();
            cut.push_str(ELLIPSIS);
            cut
        } else {
            text.to_string()
        }
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LEN)
    }
}

/// Remove anything that looks like a tag
pub fn strip_tags(html: &str) -> String {
    TAG_RE.replace_all(html, "").into_owned()
}

/// Decode named and numeric character references.
///
/// Every HTML5 named reference is known. The legacy names (`&amp`, `&auml`,
/// ...) also decode without their `;`, and a numeric reference outside the
/// Unicode range becomes U+FFFD. Unknown names are left untouched.
pub fn decode_entities(text: &str) -> String {
    ENTITY_RE
        .replace_all(text, |caps: &Captures| {
            decode_reference(&caps[1]).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

fn decode_reference(reference: &str) -> Option<String> {
    if let Some(num) = reference.strip_prefix('#') {
        let num = num.trim_end_matches(';');
        let code = match num.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok(),
            None => num.parse::<u32>().ok(),
        };
        let decoded = code
            .filter(|&c| c != 0)
            .and_then(char::from_u32)
            .unwrap_or(char::REPLACEMENT_CHARACTER);
        return Some(decoded.to_string());
    }

    if let Some(name) = reference.strip_suffix(';') {
        if let Some(decoded) = resolve_html5_entity(name) {
            return Some(decoded.to_string());
        }
    }

    // Longest legacy name the reference starts with, e.g. `&ampx` -> `&x`
    (2..=reference.len())
        .rev()
        .filter(|&end| reference.is_char_boundary(end))
        .find_map(|end| {
            let (name, rest) = reference.split_at(end);
            LEGACY_ENTITIES
                .contains(&name)
                .then(|| resolve_html5_entity(name))
                .flatten()
                .map(|decoded| format!("{}{}", decoded, rest))
        })
}

/// Extract image URL from HTML content (finds first <img src="...">)
pub fn extract_image_from_html(html: &str) -> Option<String> {
    IMG_RE
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_tags() {
        assert_eq!(strip_tags("<p>Hej <b>världen</b>!</p>"), "Hej världen!");
    }

    #[test]
    fn test_decode_entities() {
        assert_eq!(decode_entities("R&auml;ntan &amp; kronan"), "Räntan & kronan");
        assert_eq!(decode_entities("&#229;&#xE4;&#X00F6;"), "åäö");
        assert_eq!(decode_entities("a&nbsp;b"), "a\u{a0}b");
        assert_eq!(decode_entities("&bogus; &amp"), "&bogus; &");
    }

    #[test]
    fn test_decode_full_named_set() {
        assert_eq!(decode_entities("Fran&ccedil;ois"), "François");
        assert_eq!(decode_entities("Stra&szlig;e"), "Straße");
        assert_eq!(decode_entities("pre&shy;mi&shy;er"), "pre\u{ad}mi\u{ad}er");
        assert_eq!(decode_entities("&times; &deg;C"), "× °C");
        assert_eq!(decode_entities("&rarr; &hearts;"), "→ ♥");
    }

    #[test]
    fn test_decode_legacy_names_without_semicolon() {
        assert_eq!(decode_entities("Bolag &amp Co"), "Bolag & Co");
        assert_eq!(decode_entities("R&aumlntan"), "Räntan");
        assert_eq!(decode_entities("&ampx;"), "&x;");
        // only the legacy set may drop the semicolon
        assert_eq!(decode_entities("&hellip"), "&hellip");
    }

    #[test]
    fn test_decode_numeric_edge_cases() {
        assert_eq!(decode_entities("&#229"), "å");
        assert_eq!(decode_entities("&#0;"), "\u{fffd}");
        assert_eq!(decode_entities("&#xD800;"), "\u{fffd}");
        assert_eq!(decode_entities("&#99999999999;"), "\u{fffd}");
    }

    #[test]
    fn test_normalized_description_is_not_double_encoded() {
        let n = TextNormalizer::default();
        assert_eq!(n.normalize("<p>Fran&ccedil;ois &amp Co</p>"), "François & Co");
    }

    #[test]
    fn test_entities_decoded_after_tags_stripped() {
        // escaped markup survives as text instead of being eaten as a tag
        let n = TextNormalizer::default();
        assert_eq!(n.normalize("<p>5 &lt; 6</p>"), "5 < 6");
    }

    #[test]
    fn test_normalize_flattens_newlines_and_trims() {
        let n = TextNormalizer::default();
        assert_eq!(n.normalize("\n  <p>Rad ett\nrad två</p>\n"), "Rad ett rad två");
    }

    #[test]
    fn test_normalize_truncates_by_characters() {
        let n = TextNormalizer::new(5);
        assert_eq!(n.normalize("åäöåäöå"), "åäöåä...");
        assert_eq!(n.normalize("åäöåä"), "åäöåä");
    }

    #[test]
    fn test_extract_image_from_html() {
        let html = r#"<p><img class="x" src="https://img.se/a.jpg" /></p><img src='b.png'>"#;
        assert_eq!(
            extract_image_from_html(html),
            Some("https://img.se/a.jpg".to_string())
        );
        assert_eq!(extract_image_from_html("<p>ingen bild</p>"), None);
    }
}
