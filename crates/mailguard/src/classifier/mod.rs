//! Phishing classifier interface.
//!
//! The controller hands the whole scan batch to a [`Classifier`] in one call
//! and expects one phishing probability per row, in row order.

pub mod process;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::message::MessageRecord;
use crate::triage::RowId;

pub use process::ProcessClassifier;

/// One classifier input row: the record's features tagged with its batch row.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct FeatureRow<'a> {
    pub row: RowId,
    #[serde(flatten)]
    pub record: &'a MessageRecord,
}

#[derive(Error, Debug)]
pub enum ClassifierError {
    #[error("Failed to start classifier '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Classifier I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode feature rows: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("Classifier exited with {status}: {stderr}")]
    Exited { status: String, stderr: String },

    #[error("Classifier output is not a probability list: {0}")]
    MalformedOutput(#[source] serde_json::Error),

    #[error("Classifier returned {actual} probabilities for {expected} rows")]
    CountMismatch { expected: usize, actual: usize },

    #[error("Classifier returned invalid probability {value} at index {index}")]
    InvalidProbability { index: usize, value: f64 },
}

pub type Result<T> = std::result::Result<T, ClassifierError>;

/// Scores a batch of messages.
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Returns the phishing probability of each row, in input order.
    async fn classify(&self, rows: &[FeatureRow<'_>]) -> Result<Vec<f64>>;
}

/// Checks that `probabilities` holds exactly one value in `[0, 1]` per row.
pub fn check_probabilities(probabilities: &[f64], expected: usize) -> Result<()> {
    if probabilities.len() != expected {
        return Err(ClassifierError::CountMismatch {
            expected,
            actual: probabilities.len(),
        });
    }
    match probabilities
        .iter()
        .position(|p| !(0.0..=1.0).contains(p))
    {
        Some(index) => Err(ClassifierError::InvalidProbability {
            index,
            value: probabilities[index],
        }),
        None => Ok(()),
    }
}
