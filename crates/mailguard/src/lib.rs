pub mod classifier;
pub mod config;
pub mod error;
pub mod indicators;
pub mod mailbox;
pub mod message;
pub mod sanitize;
pub mod secrets;
pub mod triage;

pub use classifier::{Classifier, ClassifierError, FeatureRow, ProcessClassifier};
pub use config::{load_config, load_config_from_str, Config};
pub use error::{ConfigError, MailguardError, Result};
pub use indicators::{extract_indicators, extract_indicators_from_bytes, IndicatorSet};
pub use mailbox::{FolderSelector, ImapClient, MailboxError, MailboxSession, NameMatchSelector};
pub use message::{MessageNormalizer, MessageRecord, RawMessage};
pub use secrets::{resolve_secret, SecretError};
pub use triage::{RunOutcome, ScanBatch, TriageController, TriageError, TriageReport};
