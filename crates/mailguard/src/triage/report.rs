//! Per-message report lines and run results.

use std::fmt;

use crate::mailbox::Uid;

use super::batch::{Decision, RowId};

/// Subjects longer than this are cut for display.
pub const SUBJECT_DISPLAY_LIMIT: usize = 60;

/// What happened when a malicious message was moved to quarantine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelocationOutcome {
    /// Copied to quarantine and flagged deleted in its folder.
    Moved,
    /// Copy was rejected; the message was left untouched.
    CopyFailed(String),
    /// Copied, but the original could not be flagged: it now exists twice.
    FlagFailed(String),
    /// No relocation was tried.
    NotAttempted(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelocationResult {
    pub uid: Option<Uid>,
    pub folder: String,
    pub destination: String,
    pub outcome: RelocationOutcome,
}

impl RelocationResult {
    pub fn succeeded(&self) -> bool {
        matches!(self.outcome, RelocationOutcome::Moved)
    }

    fn describe(&self) -> String {
        match &self.outcome {
            RelocationOutcome::Moved => format!(
                "For security reasons, email was moved to {} folder.",
                self.destination
            ),
            RelocationOutcome::CopyFailed(reason) => {
                format!("Moving email to {} failed: {}", self.destination, reason)
            }
            RelocationOutcome::FlagFailed(reason) => format!(
                "Email was copied to {} but could not be removed from {}: {}",
                self.destination, self.folder, reason
            ),
            RelocationOutcome::NotAttempted(reason) => {
                format!("Email was not moved ({}).", reason)
            }
        }
    }
}

/// One console line per triaged message.
#[derive(Debug, Clone)]
pub struct ReportLine {
    pub row: RowId,
    pub uid: Option<Uid>,
    pub probability: f64,
    pub subject: String,
    pub sender: String,
    pub folder: String,
    pub is_malicious: bool,
    /// Set for malicious messages only.
    pub relocation: Option<RelocationResult>,
}

impl ReportLine {
    pub fn new(decision: &Decision, relocation: Option<RelocationResult>) -> Self {
        Self {
            row: decision.row,
            uid: decision.record.uid,
            probability: decision.probability,
            subject: truncate_subject(decision.record.display_subject()),
            sender: decision.record.display_sender().to_string(),
            folder: decision.record.folder.clone(),
            is_malicious: decision.is_malicious,
            relocation,
        }
    }

    pub fn label(&self) -> &'static str {
        if self.is_malicious {
            "malicious"
        } else {
            "safe"
        }
    }
}

impl fmt::Display for ReportLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let icon = if self.is_malicious { "❌" } else { "✔️ " };
        write!(
            f,
            " {} [{}] [{:6.2} %] Message '{}' from {} in {} is {}.",
            icon,
            self.row,
            self.probability * 100.0,
            self.subject,
            self.sender,
            self.folder,
            self.label()
        )?;
        if let Some(relocation) = &self.relocation {
            write!(f, " {}", relocation.describe())?;
        }
        Ok(())
    }
}

/// A folder that was skipped during the scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderWarning {
    pub folder: String,
    pub reason: String,
}

impl fmt::Display for FolderWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Skipped folder {}: {}", self.folder, self.reason)
    }
}

/// Result of a completed triage run.
#[derive(Debug, Clone)]
pub enum RunOutcome {
    /// No unseen messages were found; the classifier was not called.
    NothingToScan { warnings: Vec<FolderWarning> },
    Completed(TriageReport),
}

impl RunOutcome {
    pub fn warnings(&self) -> &[FolderWarning] {
        match self {
            RunOutcome::NothingToScan { warnings } => warnings,
            RunOutcome::Completed(report) => &report.warnings,
        }
    }

    pub fn report(&self) -> Option<&TriageReport> {
        match self {
            RunOutcome::NothingToScan { .. } => None,
            RunOutcome::Completed(report) => Some(report),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TriageReport {
    /// One line per record, in batch order.
    pub lines: Vec<ReportLine>,
    pub warnings: Vec<FolderWarning>,
    /// Folders that were expunged, in expunge order.
    pub expunged: Vec<String>,
}

impl TriageReport {
    pub fn malicious_count(&self) -> usize {
        self.lines.iter().filter(|line| line.is_malicious).count()
    }

    pub fn moved_count(&self) -> usize {
        self.relocations().filter(|r| r.succeeded()).count()
    }

    pub fn relocations(&self) -> impl Iterator<Item = &RelocationResult> {
        self.lines.iter().filter_map(|line| line.relocation.as_ref())
    }
}

/// Cuts `subject` to [`SUBJECT_DISPLAY_LIMIT`] characters, marking the cut.
pub fn truncate_subject(subject: &str) -> String {
    if subject.chars().count() <= SUBJECT_DISPLAY_LIMIT {
        return subject.to_string();
    }
    let mut cut: String = subject.chars().take(SUBJECT_DISPLAY_LIMIT - 3).collect();
    cut.push_str("...");
    cut
}
