//! HTML inspection: attribute URL harvesting, visible text and content flags.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};
use url::{Host, Url};

use super::ip::{ip_candidates, is_reportable_ip};
use super::text::{clean_attribute_value, collapse_whitespace};

/// Attributes that can carry a URL, including legacy ones still honoured by
/// some mail clients.
pub const URL_ATTRIBUTES: &[&str] = &[
    "action",
    "archive",
    "background",
    "cite",
    "classid",
    "codebase",
    "data",
    "dsync",
    "dynsrc",
    "formaction",
    "href",
    "icon",
    "longdesc",
    "lowsrc",
    "manifest",
    "poster",
    "profile",
    "src",
    "usemap",
];

/// Tags commonly allowed by webmail clients; seeing any of them marks a body
/// as real HTML rather than text with stray angle brackets.
const EMAIL_HTML_TAGS: &[&str] = &[
    "a", "abbr", "acronym", "address", "area", "b", "bdo", "big", "blockquote", "body", "br",
    "button", "caption", "center", "cite", "code", "col", "colgroup", "dd", "del", "dfn", "dir",
    "div", "dl", "dt", "em", "fieldset", "font", "form", "h1", "h2", "h3", "h4", "h5", "h6",
    "head", "hr", "html", "i", "img", "input", "ins", "kbd", "label", "legend", "li", "link",
    "map", "menu", "meta", "ol", "optgroup", "option", "p", "pre", "q", "s", "samp", "select",
    "small", "span", "strike", "strong", "style", "sub", "sup", "table", "tbody", "td",
    "textarea", "tfoot", "th", "thead", "title", "tr", "tt", "u", "ul", "var",
];

const IMAGE_EXTENSIONS: &[&str] = &[
    ".apng", ".avif", ".gif", ".jpg", ".jpeg", ".jfif", ".pjpeg", ".pjp", ".png", ".svg",
    ".webp", ".bmp", ".ico", ".cur", ".tif", ".tiff",
];

static START_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<([a-zA-Z][a-zA-Z0-9]*)[\s/>]").expect("start tag pattern"));

/// Content flags derived from an HTML body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HtmlFacts {
    pub is_html: bool,
    pub has_script: bool,
    pub has_css: bool,
    pub embedded_images: Vec<String>,
}

/// Collects URL-bearing attribute values from every element.
///
/// In-page fragments (`#top`) are skipped. `href` values are dropped when the
/// IP literal they point at is not reportable; other attributes are kept as
/// written.
pub fn harvest_attribute_urls(html: &str) -> BTreeSet<String> {
    let document = Html::parse_document(html);
    let mut urls = BTreeSet::new();

    for attr in URL_ATTRIBUTES {
        let Ok(selector) = Selector::parse(&format!("[{}]", attr)) else {
            continue;
        };

        for element in document.select(&selector) {
            let Some(raw) = element.value().attr(attr) else {
                continue;
            };
            let value = clean_attribute_value(raw);
            if value.is_empty() || value.starts_with('#') {
                continue;
            }
            if *attr == "href" && !href_host_is_reportable(&value) {
                log::debug!("Dropping href with unreportable IP host: {}", value);
                continue;
            }
            urls.insert(value);
        }
    }

    urls
}

/// Checks the IP literal an `href` points at, if it has one.
///
/// Parsable URLs are judged by their host (which also normalizes obfuscated
/// forms such as `http://0x7f.1/`); anything else by every IP literal found in
/// the value.
fn href_host_is_reportable(value: &str) -> bool {
    if let Ok(url) = Url::parse(value) {
        return match url.host() {
            Some(Host::Ipv4(addr)) => is_reportable_ip(&addr.to_string()),
            Some(Host::Ipv6(addr)) => is_reportable_ip(&addr.to_string()),
            _ => true,
        };
    }

    ip_candidates(value).all(is_reportable_ip)
}

/// Visible text of an HTML document: text nodes outside `head`, `script` and
/// `style`, whitespace collapsed.
pub fn visible_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut parts: Vec<&str> = Vec::new();

    for node in document.root_element().descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node
            .ancestors()
            .filter_map(|ancestor| ancestor.value().as_element())
            .any(|el| matches!(el.name(), "head" | "script" | "style" | "title"));
        if !hidden {
            parts.push(text);
        }
    }

    collapse_whitespace(&parts.join(" "))
}

/// Derives content flags from an HTML body.
pub fn inspect(html: &str) -> HtmlFacts {
    let is_html = START_TAG_RE.captures_iter(html).any(|cap| {
        let name = cap[1].to_ascii_lowercase();
        EMAIL_HTML_TAGS.contains(&name.as_str())
    });

    let document = Html::parse_document(html);
    let has_match = |css: &str| {
        Selector::parse(css)
            .map(|selector| document.select(&selector).next().is_some())
            .unwrap_or(false)
    };

    let has_script = has_match("script, [type=\"text/javascript\"]");
    let has_css = has_match("style, [type=\"text/css\"]");

    let mut embedded_images = Vec::new();
    if let Ok(selector) = Selector::parse("img, source") {
        for element in document.select(&selector) {
            for attr in ["src", "srcset"] {
                if let Some(value) = element.value().attr(attr) {
                    let lower = value.to_ascii_lowercase();
                    if IMAGE_EXTENSIONS.iter().any(|ext| lower.ends_with(ext)) {
                        embedded_images.push(value.to_string());
                    }
                }
            }
        }
    }

    HtmlFacts {
        is_html,
        has_script,
        has_css,
        embedded_images,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_harvest_href_with_ip_host() {
        let urls = harvest_attribute_urls(r#"<a href="http://1.2.3.4/x">click</a>"#);
        assert_eq!(urls.len(), 1);
        assert!(urls.contains("http://1.2.3.4/x"));
    }

    #[test]
    fn test_harvest_drops_low_range_ip_href() {
        let urls = harvest_attribute_urls(r#"<a href="http://0.0.0.1/">x</a>"#);
        assert!(urls.is_empty(), "got {:?}", urls);
    }

    #[test]
    fn test_harvest_skips_fragments() {
        let urls = harvest_attribute_urls(
            r##"<a href="#top">top</a><a href="https://example.com/">ok</a>"##,
        );
        assert_eq!(urls.len(), 1);
        assert!(urls.contains("https://example.com/"));
    }

    #[test]
    fn test_harvest_hidden_attributes() {
        let html = r#"
            <table background="http://cdn.example.net/bg.png">
              <tr><td><img src="https://track.example.org/p.gif"></td></tr>
            </table>
            <form action="https://collect.example.io/post"><button formaction="/local">go</button></form>
        "#;
        let urls = harvest_attribute_urls(html);
        assert!(urls.contains("http://cdn.example.net/bg.png"));
        assert!(urls.contains("https://track.example.org/p.gif"));
        assert!(urls.contains("https://collect.example.io/post"));
        assert!(urls.contains("/local"));
    }

    #[test]
    fn test_harvest_cleans_qp_artifact() {
        let urls = harvest_attribute_urls(r#"<a href='3D"https://phish.example.com/"'>x</a>"#);
        assert!(urls.contains("https://phish.example.com/"), "got {:?}", urls);
    }

    #[test]
    fn test_visible_text_skips_script_and_head() {
        let html = "<html><head><title>T</title><style>p{}</style></head>\
                    <body><p>Dear  customer,</p><script>var x=1;</script><p>pay now</p></body></html>";
        assert_eq!(visible_text(html), "Dear customer, pay now");
    }

    #[test]
    fn test_inspect_flags() {
        let facts = inspect(
            r#"<div><script type="text/javascript">x()</script><img src="logo.PNG"></div>"#,
        );
        assert!(facts.is_html);
        assert!(facts.has_script);
        assert!(!facts.has_css);
        assert_eq!(facts.embedded_images, vec!["logo.PNG".to_string()]);
    }

    #[test]
    fn test_inspect_plain_text() {
        let facts = inspect("just words, 1 < 2");
        assert!(!facts.is_html);
        assert!(!facts.has_script);
        assert!(facts.embedded_images.is_empty());
    }
}
