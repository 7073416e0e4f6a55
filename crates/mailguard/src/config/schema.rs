use serde::{Deserialize, Serialize};

/// Default probability at or above which a message is treated as malicious.
pub const DEFAULT_PHISHY_THRESHOLD: f64 = 0.7;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    pub version: String,
    pub mailbox: MailboxConfig,
    #[serde(default)]
    pub triage: TriageConfig,
    pub classifier: ClassifierConfig,
}

/// Connection settings for the IMAP account being triaged.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MailboxConfig {
    /// IMAP server hostname (e.g., "imap.gmail.com").
    pub host: String,

    /// IMAP server port (default: 993 for IMAPS).
    #[serde(default = "default_imap_port")]
    pub port: u16,

    /// Whether to use TLS (required for security).
    #[serde(default = "default_true")]
    pub use_tls: bool,

    /// Account username (typically the email address).
    pub username: String,

    /// Password sources.
    #[serde(default)]
    pub auth: MailboxAuthSettings,
}

/// Password sources, resolved in order: direct value, file, environment variable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MailboxAuthSettings {
    /// Environment variable containing the password.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_env_var: Option<String>,

    /// Direct password value (for local development).
    /// WARNING: Storing passwords directly in config files is insecure.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        rename = "passwordInsecure",
        alias = "password"
    )]
    pub password_insecure: Option<String>,

    /// Path to file containing the password (for Docker secrets).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_file: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriageConfig {
    /// Folders to scan. Empty means "ask the folder selector".
    #[serde(default)]
    pub folders: Vec<String>,

    /// Quarantine folder. Unset means "ask the folder selector".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spam_folder: Option<String>,

    #[serde(default = "default_phishy_threshold")]
    pub phishy_threshold: f64,

    /// Classify and report without moving anything.
    #[serde(default)]
    pub dry_run: bool,
}

impl Default for TriageConfig {
    fn default() -> Self {
        Self {
            folders: Vec::new(),
            spam_folder: None,
            phishy_threshold: DEFAULT_PHISHY_THRESHOLD,
            dry_run: false,
        }
    }
}

/// External classifier process.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifierConfig {
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
}

fn default_imap_port() -> u16 {
    993
}

fn default_true() -> bool {
    true
}

fn default_phishy_threshold() -> f64 {
    DEFAULT_PHISHY_THRESHOLD
}
