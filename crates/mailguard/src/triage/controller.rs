//! Scan-classify-relocate workflow over one mailbox session.

use std::collections::HashSet;

use tracing::{debug, error, info, info_span, warn, Instrument};

use crate::classifier::Classifier;
use crate::config::schema::TriageConfig;
use crate::mailbox::{FolderSelector, MailboxSession};
use crate::message::{MessageNormalizer, RawMessage};

use super::batch::{Decision, ScanBatch};
use super::report::{
    FolderWarning, RelocationOutcome, RelocationResult, ReportLine, RunOutcome, TriageReport,
};
use super::{Result, TriageError};

/// Drives a triage run: scan folders, classify the batch once, quarantine
/// malicious messages, report.
pub struct TriageController<C, S> {
    config: TriageConfig,
    classifier: C,
    selector: S,
    normalizer: MessageNormalizer,
}

impl<C, S> TriageController<C, S>
where
    C: Classifier,
    S: FolderSelector,
{
    pub fn new(config: TriageConfig, classifier: C, selector: S) -> Self {
        Self {
            config,
            classifier,
            selector,
            normalizer: MessageNormalizer::new(),
        }
    }

    /// Runs one triage pass. The session is logged out before returning,
    /// whatever the result.
    pub async fn run<M: MailboxSession>(&self, mut session: M) -> Result<RunOutcome> {
        let span = info_span!("triage_run", dry_run = self.config.dry_run);
        async move {
            let result = self.triage(&mut session).await;
            if let Err(e) = session.logout().await {
                warn!("Logout failed: {}", e);
            }
            match &result {
                Ok(RunOutcome::Completed(report)) => info!(
                    "Triage complete: {} messages, {} malicious, {} moved",
                    report.lines.len(),
                    report.malicious_count(),
                    report.moved_count()
                ),
                Ok(RunOutcome::NothingToScan { .. }) => info!("No unseen emails to scan"),
                Err(e) => error!("Triage aborted: {}", e),
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn triage<M: MailboxSession>(&self, session: &mut M) -> Result<RunOutcome> {
        let (folders, spam_folder) = self.resolve_folders(session).await?;
        info!(
            "Scanning {} folder(s), quarantine folder is '{}'",
            folders.len(),
            spam_folder
        );

        let mut batch = ScanBatch::new();
        let mut warnings = Vec::new();
        for folder in &folders {
            let span = info_span!("scan_folder", folder = %folder);
            if let Err(warning) = self
                .scan_folder(session, folder, &mut batch)
                .instrument(span)
                .await
            {
                warnings.push(warning);
            }
        }

        if batch.is_empty() {
            return Ok(RunOutcome::NothingToScan { warnings });
        }

        info!("Classifying {} messages", batch.len());
        let probabilities = self.classifier.classify(&batch.feature_rows()).await?;
        let decisions = batch.decide(&probabilities, self.config.phishy_threshold)?;

        let mut relocations: Vec<Option<RelocationResult>> = vec![None; decisions.len()];
        let mut expunged = Vec::new();

        if self.config.dry_run {
            for decision in decisions.iter().filter(|d| d.is_malicious) {
                relocations[decision.row.index()] = Some(not_attempted(
                    decision,
                    &spam_folder,
                    "dry run",
                ));
            }
        } else {
            for folder in malicious_folders(&decisions) {
                let targets: Vec<&Decision> = decisions
                    .iter()
                    .filter(|d| d.is_malicious && d.record.folder == folder)
                    .collect();

                let flagged = self
                    .relocate_folder(session, folder, &spam_folder, &targets, &mut relocations)
                    .await;

                if flagged > 0 {
                    session
                        .expunge()
                        .await
                        .map_err(|source| TriageError::Expunge {
                            folder: folder.to_string(),
                            source,
                        })?;
                    debug!("Expunged {} message(s) from '{}'", flagged, folder);
                    expunged.push(folder.to_string());
                }
            }
        }

        let lines = decisions
            .iter()
            .zip(relocations)
            .map(|(decision, relocation)| ReportLine::new(decision, relocation))
            .collect();

        Ok(RunOutcome::Completed(TriageReport {
            lines,
            warnings,
            expunged,
        }))
    }

    /// Configured folders win; otherwise the selector picks from the server's
    /// folder tree, which is only listed when needed.
    async fn resolve_folders<M: MailboxSession>(
        &self,
        session: &mut M,
    ) -> Result<(Vec<String>, String)> {
        let needs_tree = self.config.folders.is_empty() || self.config.spam_folder.is_none();
        let tree = if needs_tree {
            session
                .list_folders()
                .await
                .map_err(TriageError::FolderListing)?
        } else {
            Vec::new()
        };

        let mut folders = if self.config.folders.is_empty() {
            self.selector.select_folders(&tree)
        } else {
            self.config.folders.clone()
        };
        let mut seen = HashSet::new();
        folders.retain(|folder| seen.insert(folder.clone()));
        if folders.is_empty() {
            warn!("No folders selected for scanning");
        }

        let spam_folder = self
            .config
            .spam_folder
            .clone()
            .or_else(|| self.selector.select_spam_folder(&tree))
            .ok_or(TriageError::NoSpamFolder)?;

        Ok((folders, spam_folder))
    }

    /// Adds every unseen message of `folder` to the batch. A folder that
    /// cannot be selected or searched is skipped.
    async fn scan_folder<M: MailboxSession>(
        &self,
        session: &mut M,
        folder: &str,
        batch: &mut ScanBatch,
    ) -> std::result::Result<(), FolderWarning> {
        let skip = |reason: String| {
            warn!("Skipping folder '{}': {}", folder, reason);
            FolderWarning {
                folder: folder.to_string(),
                reason,
            }
        };

        session
            .select(folder)
            .await
            .map_err(|e| skip(e.to_string()))?;
        let seqs = session
            .search_unseen()
            .await
            .map_err(|e| skip(e.to_string()))?;

        if seqs.is_empty() {
            info!("Unseen messages not found in {}", folder);
            return Ok(());
        }
        info!("Found {} unseen messages in {}", seqs.len(), folder);

        for seq in seqs {
            let uid = match session.fetch_uid(seq).await {
                Ok(uid) => Some(uid),
                Err(e) => {
                    warn!("Failed to fetch UID of message {} in '{}': {}", seq, folder, e);
                    None
                }
            };
            let bytes = match session.fetch_raw(seq).await {
                Ok(bytes) => bytes,
                Err(e) => {
                    warn!("Failed to fetch message {} in '{}': {}", seq, folder, e);
                    Vec::new()
                }
            };

            let raw = RawMessage {
                seq,
                uid,
                folder: folder.to_string(),
                bytes,
            };
            let row = batch.push(self.normalizer.normalize(&raw));
            debug!("Message {} (UID {:?}) is row {}", seq, uid, row);
        }
        Ok(())
    }

    /// Copies each target to quarantine and flags it deleted. Returns how many
    /// messages were flagged.
    async fn relocate_folder<M: MailboxSession>(
        &self,
        session: &mut M,
        folder: &str,
        spam_folder: &str,
        targets: &[&Decision],
        relocations: &mut [Option<RelocationResult>],
    ) -> usize {
        if folder == spam_folder {
            for decision in targets {
                relocations[decision.row.index()] = Some(not_attempted(
                    decision,
                    spam_folder,
                    "already in quarantine folder",
                ));
            }
            return 0;
        }

        if let Err(e) = session.select(folder).await {
            error!("Cannot select '{}' for relocation: {}", folder, e);
            let reason = format!("could not select {}: {}", folder, e);
            for decision in targets {
                relocations[decision.row.index()] =
                    Some(not_attempted(decision, spam_folder, &reason));
            }
            return 0;
        }

        let mut flagged = 0;
        for decision in targets {
            let Some(uid) = decision.record.uid else {
                relocations[decision.row.index()] =
                    Some(not_attempted(decision, spam_folder, "UID unknown"));
                continue;
            };

            let outcome = match session.copy(uid, spam_folder).await {
                Err(e) => {
                    error!("Copy of UID {} to '{}' failed: {}", uid, spam_folder, e);
                    RelocationOutcome::CopyFailed(e.to_string())
                }
                Ok(()) => match session.flag_deleted(uid).await {
                    Ok(()) => {
                        flagged += 1;
                        info!("Moved UID {} from '{}' to '{}'", uid, folder, spam_folder);
                        RelocationOutcome::Moved
                    }
                    Err(e) => {
                        error!(
                            "UID {} was copied to '{}' but not flagged in '{}': {}",
                            uid, spam_folder, folder, e
                        );
                        RelocationOutcome::FlagFailed(e.to_string())
                    }
                },
            };

            relocations[decision.row.index()] = Some(RelocationResult {
                uid: Some(uid),
                folder: folder.to_string(),
                destination: spam_folder.to_string(),
                outcome,
            });
        }
        flagged
    }
}

/// Folders holding at least one malicious message, in first-appearance order.
fn malicious_folders(decisions: &[Decision]) -> Vec<&str> {
    let mut folders: Vec<&str> = Vec::new();
    for decision in decisions.iter().filter(|d| d.is_malicious) {
        if !folders.contains(&decision.record.folder.as_str()) {
            folders.push(&decision.record.folder);
        }
    }
    folders
}

fn not_attempted(decision: &Decision, spam_folder: &str, reason: &str) -> RelocationResult {
    RelocationResult {
        uid: decision.record.uid,
        folder: decision.record.folder.clone(),
        destination: spam_folder.to_string(),
        outcome: RelocationOutcome::NotAttempted(reason.to_string()),
    }
}
