//! URL matching over message text.
//!
//! The primary matcher is `linkify`, run on whitespace-collapsed, tag-stripped
//! text. Bodies that are not valid UTF-8 cannot go through it and fall back to
//! a hand-written pattern applied to the lossily decoded raw text.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use linkify::{LinkFinder, LinkKind};
use regex::Regex;

use super::text::normalize_for_matching;

/// Liberal URL pattern (scheme URLs, `www.` hosts and bare `host.tld/` paths)
/// with balanced-parenthesis handling and trailing punctuation excluded.
static URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)\b((?:[a-z][\w\-]+:(?:/{1,3}|[a-z0-9%])|www\d{0,3}[.]|[a-z0-9.\-]+[.][a-z]{2,4}/)(?:[^\s()<>]|\((?:[^\s()<>]|(?:\([^\s()<>]+\)))*\))+(?:\((?:[^\s()<>]|(?:\([^\s()<>]+\)))*\)|[^\s`!()\[\]{};:'".,<>?«»“”‘’]))"#,
    )
    .expect("url pattern is valid")
});

/// Which matcher produced a set of URLs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlMatcher {
    /// `linkify` over normalized text.
    Finder,
    /// Regex fallback over lossily decoded text.
    Pattern,
}

/// Finds URLs in already-decoded text using the primary matcher.
pub fn find_urls(text: &str) -> BTreeSet<String> {
    let normalized = normalize_for_matching(text);

    let mut finder = LinkFinder::new();
    finder.kinds(&[LinkKind::Url]);
    finder.url_must_have_scheme(false);

    finder
        .links(&normalized)
        .map(|link| link.as_str().trim().to_string())
        .filter(|url| !url.is_empty())
        .collect()
}

/// Finds URLs with the fallback pattern.
pub fn find_urls_with_pattern(text: &str) -> BTreeSet<String> {
    URL_RE
        .find_iter(text)
        .map(|m| m.as_str().trim().to_string())
        .filter(|url| !url.is_empty())
        .collect()
}

/// Finds URLs in raw body bytes.
///
/// Valid UTF-8 goes through [`find_urls`]; anything else is decoded lossily
/// and matched with the fallback pattern.
pub fn find_urls_in_bytes(raw: &[u8]) -> (BTreeSet<String>, UrlMatcher) {
    match std::str::from_utf8(raw) {
        Ok(text) => (find_urls(text), UrlMatcher::Finder),
        Err(e) => {
            log::debug!(
                "Body is not valid UTF-8 (at byte {}), using URL pattern fallback",
                e.valid_up_to()
            );
            let text = String::from_utf8_lossy(raw);
            (find_urls_with_pattern(&text), UrlMatcher::Pattern)
        }
    }
}
