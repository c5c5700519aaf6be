//! Source information derived from article URLs

/// Lower-cased host of a URL, `None` if it does not parse
pub fn host_of(link: &str) -> Option<String> {
    url::Url::parse(link.trim())
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_lowercase()))
}

/// Display name of the site publishing `link` (`www.svt.se` -> `Svt`)
pub fn source_name(link: &str) -> String {
    let host = host_of(link).unwrap_or_else(|| "unknown".to_string());

    let name = host
        .strip_prefix("www.")
        .unwrap_or(host.as_str())
        .split('.')
        .next()
        .unwrap_or(host.as_str())
        .to_string();

    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => name,
    }
}
