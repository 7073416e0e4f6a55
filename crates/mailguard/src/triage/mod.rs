//! Mailbox scan and triage.
//!
//! One run scans the chosen folders for unseen messages, builds a single
//! [`ScanBatch`], classifies it in one call and moves every malicious message
//! to the quarantine folder (copy, flag deleted, then one expunge per folder).

pub mod batch;
pub mod controller;
pub mod report;

use thiserror::Error;

use crate::classifier::ClassifierError;
use crate::mailbox::MailboxError;

pub use batch::{BatchError, Decision, RowId, ScanBatch};
pub use controller::TriageController;
pub use report::{
    FolderWarning, RelocationOutcome, RelocationResult, ReportLine, RunOutcome, TriageReport,
};

/// Failures that abort a run. Folder, message and relocation problems are
/// reported in the [`RunOutcome`] instead.
#[derive(Error, Debug)]
pub enum TriageError {
    #[error("Failed to connect to mailbox: {0}")]
    Connect(#[source] MailboxError),

    #[error("Failed to list folders: {0}")]
    FolderListing(#[source] MailboxError),

    #[error("No quarantine folder configured or found on the server")]
    NoSpamFolder,

    #[error("Classifier failed: {0}")]
    Classifier(#[from] ClassifierError),

    #[error("Classifier output does not match the scan batch: {0}")]
    BatchMismatch(#[from] BatchError),

    #[error("Expunge failed in folder '{folder}': {source}")]
    Expunge {
        folder: String,
        #[source]
        source: MailboxError,
    },
}

pub type Result<T> = std::result::Result<T, TriageError>;
