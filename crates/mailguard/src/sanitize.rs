//! Helpers for sanitizing data before it enters log lines and span fields.
//!
//! Triage logs are meant to be shareable; account names and local paths are
//! reduced to what is needed for correlation.

use std::path::Path;

/// Masks the local part of an account address, keeping its first character
/// and the domain.
///
/// - `alice@example.com` → `a***@example.com`
/// - `alice` → `a***`
/// - `""` → `<unknown>`
pub fn redact_address(address: &str) -> String {
    let address = address.trim();
    let (local, domain) = match address.rsplit_once('@') {
        Some((local, domain)) => (local, Some(domain)),
        None => (address, None),
    };

    let Some(first) = local.chars().next() else {
        return "<unknown>".to_string();
    };

    match domain {
        Some(domain) => format!("{}***@{}", first, domain),
        None => format!("{}***", first),
    }
}

/// Returns only the filename component of a path (no directory).
pub fn redact_path(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("<unknown>")
        .to_string()
}
