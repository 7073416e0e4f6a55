//! Text normalization shared by the extractors and the message normalizer.

use std::sync::LazyLock;

use mail_parser::MessageParser;
use regex::Regex;

/// Matches markup tags, comments and declarations.
///
/// A tag must start with a letter right after `<` (or `</`) and the name must be
/// followed by whitespace, `/` or `>`. Angle-bracketed autolinks such as
/// `<https://example.com/>` therefore survive stripping.
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<!--.*?-->|<![^<>]*>|</?[a-zA-Z][a-zA-Z0-9-]*(?:\s[^<>]*)?/?>")
        .expect("tag pattern is valid")
});

/// Encoded word that omits its charset, as in `=??Q?...?=`.
static EMPTY_CHARSET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"=\?\?([BbQq])\?").expect("charset pattern is valid"));

/// Collapses every whitespace run (spaces, tabs, newlines) into a single space
/// and trims both ends.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Replaces every tag span with a single space, then collapses whitespace.
///
/// Replacing rather than deleting keeps `foo<br>bar` from turning into `foobar`.
pub fn strip_tags(text: &str) -> String {
    collapse_whitespace(&TAG_RE.replace_all(text, " "))
}

/// Whitespace-collapsed and tag-stripped form used by the URL matchers.
pub fn normalize_for_matching(text: &str) -> String {
    strip_tags(&collapse_whitespace(text))
}

/// Decodes RFC 2047 encoded words (`=?charset?B?...?=`) into plain text.
///
/// Charset handling is delegated to `mail-parser`; words without a declared
/// charset are read as UTF-8. Input that cannot be decoded is returned as-is.
pub fn decode_mime_words(text: &str) -> String {
    if !text.contains("=?") {
        return text.to_string();
    }

    // Unfold first so a header cannot smuggle a second header line.
    let unfolded = collapse_whitespace(text);
    let unfolded = EMPTY_CHARSET_RE.replace_all(&unfolded, "=?utf-8?${1}?");
    let synthetic = format!("Subject: {}\r\n\r\n", unfolded);

    MessageParser::default()
        .parse(synthetic.as_bytes())
        .and_then(|message| message.subject().map(str::to_string))
        .unwrap_or_else(|| text.to_string())
}

/// Removes the quoted-printable `3D` artefact and surrounding quotes that
/// often remain on attribute values of badly re-encoded HTML.
pub fn clean_attribute_value(value: &str) -> String {
    let value = value.trim();
    let value = value.strip_prefix("3D").unwrap_or(value);
    value.trim_matches('"').trim().to_string()
}
