//! Choosing which folders to scan and where to quarantine.

/// Picks scan folders and the quarantine folder from the account's folder tree.
///
/// Implementations may prompt a user or read configuration; the controller
/// only relies on this contract.
pub trait FolderSelector: Send + Sync {
    /// Folders to scan, chosen from `tree`.
    fn select_folders(&self, tree: &[String]) -> Vec<String>;

    /// Quarantine folder, chosen from `tree`. `None` when nothing fits.
    fn select_spam_folder(&self, tree: &[String]) -> Option<String>;
}

/// Non-interactive selector matching folder names.
///
/// Scan folders default to the inbox; the quarantine folder is the first
/// folder whose name contains `spam`. Both comparisons ignore case.
#[derive(Debug, Clone)]
pub struct NameMatchSelector {
    scan_name: String,
    spam_marker: String,
}

impl Default for NameMatchSelector {
    fn default() -> Self {
        Self {
            scan_name: "INBOX".to_string(),
            spam_marker: "spam".to_string(),
        }
    }
}

impl NameMatchSelector {
    pub fn new(scan_name: impl Into<String>, spam_marker: impl Into<String>) -> Self {
        Self {
            scan_name: scan_name.into(),
            spam_marker: spam_marker.into().to_lowercase(),
        }
    }
}

impl FolderSelector for NameMatchSelector {
    fn select_folders(&self, tree: &[String]) -> Vec<String> {
        tree.iter()
            .find(|name| name.eq_ignore_ascii_case(&self.scan_name))
            .cloned()
            .into_iter()
            .collect()
    }

    fn select_spam_folder(&self, tree: &[String]) -> Option<String> {
        tree.iter()
            .find(|name| name.to_lowercase().contains(&self.spam_marker))
            .cloned()
    }
}
