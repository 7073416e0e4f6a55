//! The scan batch and the per-row classification decision.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::classifier::FeatureRow;
use crate::message::MessageRecord;

/// Position of a record in its [`ScanBatch`], assigned on insertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct RowId(usize);

impl RowId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum BatchError {
    #[error("Got {actual} probabilities for a batch of {expected} records")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("Probability {value} for row {row} is outside [0, 1]")]
    InvalidProbability { row: RowId, value: f64 },
}

/// Classification outcome of one batch row.
#[derive(Debug, Clone)]
pub struct Decision {
    pub row: RowId,
    pub record: MessageRecord,
    pub probability: f64,
    pub is_malicious: bool,
}

impl Decision {
    /// Probability as a percentage, for display.
    pub fn percent(&self) -> f64 {
        self.probability * 100.0
    }
}

/// Records collected across all scanned folders, in scan order.
#[derive(Debug, Clone, Default)]
pub struct ScanBatch {
    records: Vec<MessageRecord>,
}

impl ScanBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a record and returns the row it occupies.
    pub fn push(&mut self, record: MessageRecord) -> RowId {
        let row = RowId::new(self.records.len());
        self.records.push(record);
        row
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, row: RowId) -> Option<&MessageRecord> {
        self.records.get(row.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (RowId, &MessageRecord)> {
        self.records
            .iter()
            .enumerate()
            .map(|(i, record)| (RowId::new(i), record))
    }

    /// Classifier input rows, in row order.
    pub fn feature_rows(&self) -> Vec<FeatureRow<'_>> {
        self.iter()
            .map(|(row, record)| FeatureRow { row, record })
            .collect()
    }

    /// Pairs probability `i` with row `i` and applies `threshold`.
    ///
    /// A probability vector of the wrong length is rejected as a whole rather
    /// than zipped against the rows.
    pub fn decide(
        self,
        probabilities: &[f64],
        threshold: f64,
    ) -> Result<Vec<Decision>, BatchError> {
        if probabilities.len() != self.records.len() {
            return Err(BatchError::LengthMismatch {
                expected: self.records.len(),
                actual: probabilities.len(),
            });
        }
        if let Some(index) = probabilities
            .iter()
            .position(|p| !(0.0..=1.0).contains(p))
        {
            return Err(BatchError::InvalidProbability {
                row: RowId::new(index),
                value: probabilities[index],
            });
        }

        Ok(self
            .records
            .into_iter()
            .zip(probabilities)
            .enumerate()
            .map(|(i, (record, &probability))| Decision {
                row: RowId::new(i),
                record,
                probability,
                is_malicious: probability >= threshold,
            })
            .collect())
    }
}
