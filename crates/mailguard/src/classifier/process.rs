//! Classifier backed by an external command.
//!
//! The command receives the feature rows as a JSON array on stdin and prints
//! either a flat array of probabilities (`[0.93, 0.12]`) or predict-proba
//! pairs (`[[0.07, 0.93], [0.88, 0.12]]`, phishing column last) on stdout.

use std::process::Stdio;

use async_trait::async_trait;
use log::debug;
use serde::Deserialize;
use tokio::io::AsyncWriteExt;
use tokio::process::Command as TokioCommand;

use crate::config::schema::ClassifierConfig;

use super::{check_probabilities, Classifier, ClassifierError, FeatureRow, Result};

#[derive(Deserialize)]
#[serde(untagged)]
enum ClassifierOutput {
    Flat(Vec<f64>),
    Pairs(Vec<[f64; 2]>),
}

impl ClassifierOutput {
    fn into_probabilities(self) -> Vec<f64> {
        match self {
            ClassifierOutput::Flat(values) => values,
            ClassifierOutput::Pairs(pairs) => pairs.into_iter().map(|[_, phish]| phish).collect(),
        }
    }
}

/// Runs the configured command once per batch.
#[derive(Debug, Clone)]
pub struct ProcessClassifier {
    command: String,
    args: Vec<String>,
}

impl ProcessClassifier {
    pub fn new(command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            args,
        }
    }

    pub fn from_config(config: &ClassifierConfig) -> Self {
        Self::new(config.command.clone(), config.args.clone())
    }
}

#[async_trait]
impl Classifier for ProcessClassifier {
    async fn classify(&self, rows: &[FeatureRow<'_>]) -> Result<Vec<f64>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let payload = serde_json::to_vec(rows).map_err(ClassifierError::Encode)?;
        debug!(
            "Running classifier '{}' on {} rows ({} bytes)",
            self.command,
            rows.len(),
            payload.len()
        );

        let mut child = TokioCommand::new(&self.command)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ClassifierError::Spawn {
                command: self.command.clone(),
                source,
            })?;

        let mut stdin = child.stdin.take().ok_or_else(|| {
            ClassifierError::Io(std::io::Error::other("classifier stdin unavailable"))
        })?;

        // Feed stdin while draining stdout so neither pipe can fill up.
        let write = async move {
            stdin.write_all(&payload).await?;
            stdin.shutdown().await
        };
        let (written, output) = tokio::join!(write, child.wait_with_output());
        let output = output?;

        if !output.status.success() {
            return Err(ClassifierError::Exited {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        written?;

        let probabilities = serde_json::from_slice::<ClassifierOutput>(&output.stdout)
            .map_err(ClassifierError::MalformedOutput)?
            .into_probabilities();

        check_probabilities(&probabilities, rows.len())?;
        Ok(probabilities)
    }
}
