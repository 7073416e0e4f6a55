//! IP-literal matching and validation.

use std::collections::BTreeSet;
use std::net::IpAddr;
use std::sync::LazyLock;

use regex::Regex;

use super::text::collapse_whitespace;

/// IPv4 literals whose integer value is below this cutoff are not reported.
pub const IPV4_LOW_RANGE_CUTOFF: u32 = 8192;

/// IPv6 literals whose integer value is below this cutoff are not reported.
pub const IPV6_LOW_RANGE_CUTOFF: u128 = 1024;

const IPV4: &str = r"(?:(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)\.){3}(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)";

// The regex engine is leftmost-first: at a given position the first matching
// alternative wins even if a later one would match more. Forms with an
// embedded IPv4 tail or a zone id go first, then compressed forms ordered by
// how many groups they allow after `::`, and the bare `x:y::` prefix form last.
const IPV6: &str = concat!(
    r"(?:",
    r"(?:[0-9a-fA-F]{1,4}:){7}[0-9a-fA-F]{1,4}",
    r"|::(?:ffff(?::0{1,4})?:)?(?:(?:25[0-5]|(?:2[0-4]|1?[0-9])?[0-9])\.){3}(?:25[0-5]|(?:2[0-4]|1?[0-9])?[0-9])",
    r"|(?:[0-9a-fA-F]{1,4}:){1,4}:(?:(?:25[0-5]|(?:2[0-4]|1?[0-9])?[0-9])\.){3}(?:25[0-5]|(?:2[0-4]|1?[0-9])?[0-9])",
    r"|fe80:(?::[0-9a-fA-F]{0,4}){0,4}%[0-9a-zA-Z]+",
    r"|[0-9a-fA-F]{1,4}:(?::[0-9a-fA-F]{1,4}){1,6}",
    r"|(?:[0-9a-fA-F]{1,4}:){1,2}(?::[0-9a-fA-F]{1,4}){1,5}",
    r"|(?:[0-9a-fA-F]{1,4}:){1,3}(?::[0-9a-fA-F]{1,4}){1,4}",
    r"|(?:[0-9a-fA-F]{1,4}:){1,4}(?::[0-9a-fA-F]{1,4}){1,3}",
    r"|(?:[0-9a-fA-F]{1,4}:){1,5}(?::[0-9a-fA-F]{1,4}){1,2}",
    r"|(?:[0-9a-fA-F]{1,4}:){1,6}:[0-9a-fA-F]{1,4}",
    r"|:(?:(?::[0-9a-fA-F]{1,4}){1,7}|:)",
    r"|(?:[0-9a-fA-F]{1,4}:){1,7}:",
    r")"
);

static IP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!("(?i){}|{}", IPV4, IPV6)).expect("ip pattern is valid"));

/// Returns whether an IP-literal candidate should be reported.
///
/// The candidate must parse as an IPv4 or IPv6 address (a `%zone` suffix is
/// ignored for parsing) and its integer value must be at or above the
/// low-range cutoff for its family. Anything else, including syntactically
/// invalid input, is rejected.
pub fn is_reportable_ip(candidate: &str) -> bool {
    let address = candidate.split('%').next().unwrap_or_default();
    match address.parse::<IpAddr>() {
        Ok(IpAddr::V4(v4)) => u32::from(v4) >= IPV4_LOW_RANGE_CUTOFF,
        Ok(IpAddr::V6(v6)) => u128::from(v6) >= IPV6_LOW_RANGE_CUTOFF,
        Err(_) => false,
    }
}

/// Yields every syntactic IP-literal match in `text`, unvalidated.
pub fn ip_candidates(text: &str) -> impl Iterator<Item = &str> {
    IP_RE
        .find_iter(text)
        .map(|m| m.as_str())
        .filter(|s| !s.is_empty())
}

/// Finds the reportable IP literals in `text`.
pub fn find_ips(text: &str) -> BTreeSet<String> {
    let text = collapse_whitespace(text);
    ip_candidates(&text)
        .filter(|candidate| is_reportable_ip(candidate))
        .map(str::to_string)
        .collect()
}
