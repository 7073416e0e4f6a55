//! Indicator extraction from message bodies.
//!
//! Three extractors feed one [`IndicatorSet`]:
//! - text-level URLs ([`urls`]), found on normalized text,
//! - DOM-level URLs ([`html`]), harvested from URL-bearing attributes, which
//!   catches links a text scan never sees,
//! - IP literals ([`ip`]), validated before they are kept.
//!
//! Extraction is infallible: a body that yields nothing produces an empty set.

pub mod html;
pub mod ip;
pub mod text;
pub mod urls;

use std::collections::BTreeSet;

use serde::Serialize;

pub use html::{harvest_attribute_urls, inspect, visible_text, HtmlFacts};
pub use ip::{find_ips, is_reportable_ip};
pub use text::{collapse_whitespace, decode_mime_words, strip_tags};
pub use urls::{find_urls, find_urls_in_bytes, find_urls_with_pattern, UrlMatcher};

/// Deduplicated URLs and IP literals extracted from a body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IndicatorSet {
    urls: BTreeSet<String>,
    ips: BTreeSet<String>,
}

impl IndicatorSet {
    pub fn new(urls: BTreeSet<String>, ips: BTreeSet<String>) -> Self {
        Self { urls, ips }
    }

    pub fn urls(&self) -> &BTreeSet<String> {
        &self.urls
    }

    pub fn ips(&self) -> &BTreeSet<String> {
        &self.ips
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty() && self.ips.is_empty()
    }

    /// Returns a new set holding the indicators of both.
    pub fn union(&self, other: &IndicatorSet) -> IndicatorSet {
        IndicatorSet {
            urls: self.urls.union(&other.urls).cloned().collect(),
            ips: self.ips.union(&other.ips).cloned().collect(),
        }
    }
}

/// Extracts indicators from a decoded body (plain text or HTML).
pub fn extract_indicators(body: &str) -> IndicatorSet {
    if body.trim().is_empty() {
        return IndicatorSet::default();
    }

    let mut urls = find_urls(body);
    if looks_like_markup(body) {
        urls.extend(harvest_attribute_urls(body));
    }

    IndicatorSet::new(urls, find_ips(body))
}

/// Extracts indicators from undecoded body bytes.
///
/// Bytes that are not valid UTF-8 go through the URL pattern fallback; IP
/// matching and attribute harvesting run on the lossily decoded text.
pub fn extract_indicators_from_bytes(raw: &[u8]) -> IndicatorSet {
    let (mut urls, _) = find_urls_in_bytes(raw);
    let text = String::from_utf8_lossy(raw);

    if looks_like_markup(&text) {
        urls.extend(harvest_attribute_urls(&text));
    }

    IndicatorSet::new(urls, find_ips(&text))
}

fn looks_like_markup(body: &str) -> bool {
    body.contains('<') && body.contains('>')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_plain_text() {
        let set = extract_indicators("Reset your password at http://203.0.113.50/reset now");
        assert!(set.urls().contains("http://203.0.113.50/reset"));
        assert!(set.ips().contains("203.0.113.50"));
    }

    #[test]
    fn test_extract_html_union_keeps_attribute_urls() {
        let html = r#"<p>Your account is locked.</p><a href="http://1.2.3.4/x">Unlock</a>"#;
        let set = extract_indicators(html);
        assert!(set.urls().contains("http://1.2.3.4/x"));
        assert!(set.ips().contains("1.2.3.4"));
    }

    #[test]
    fn test_extract_html_attribute_only_link() {
        // The anchor text hides the target; only the attribute carries it.
        let html = r#"<a href="https://evil.example.com/login">Click here</a>"#;
        let set = extract_indicators(html);
        assert!(set.urls().contains("https://evil.example.com/login"));
    }

    #[test]
    fn test_extract_empty_body() {
        assert!(extract_indicators("").is_empty());
        assert!(extract_indicators("   \n ").is_empty());
        assert!(extract_indicators_from_bytes(b"").is_empty());
    }

    #[test]
    fn test_extract_from_invalid_utf8() {
        let raw = b"Pay \xff\xfe at http://198.51.100.7/pay today";
        let set = extract_indicators_from_bytes(raw);
        assert!(set.urls().contains("http://198.51.100.7/pay"), "got {:?}", set);
        assert!(set.ips().contains("198.51.100.7"));
    }

    #[test]
    fn test_union_is_set_union() {
        let a = IndicatorSet::new(
            BTreeSet::from(["http://a.test/".to_string()]),
            BTreeSet::from(["1.2.3.4".to_string()]),
        );
        let b = IndicatorSet::new(
            BTreeSet::from(["http://a.test/".to_string(), "http://b.test/".to_string()]),
            BTreeSet::new(),
        );
        let merged = a.union(&b);
        assert_eq!(merged.urls().len(), 2);
        assert_eq!(merged.ips().len(), 1);
        assert_eq!(merged, b.union(&a));
    }
}
