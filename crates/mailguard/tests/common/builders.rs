//! Builders for raw messages, classifiers and triage settings.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use mailguard::classifier::{Classifier, ClassifierError, FeatureRow};
use mailguard::config::TriageConfig;
use mailguard::mailbox::Uid;

/// Builder for RFC 822 test messages.
pub struct MessageBuilder {
    from: String,
    subject: Option<String>,
    plain: Option<String>,
    html: Option<String>,
}

impl MessageBuilder {
    pub fn new() -> Self {
        Self {
            from: "sender@example.com".to_string(),
            subject: None,
            plain: None,
            html: None,
        }
    }

    pub fn from(mut self, from: &str) -> Self {
        self.from = from.to_string();
        self
    }

    pub fn subject(mut self, subject: &str) -> Self {
        self.subject = Some(subject.to_string());
        self
    }

    pub fn plain(mut self, body: &str) -> Self {
        self.plain = Some(body.to_string());
        self
    }

    pub fn html(mut self, body: &str) -> Self {
        self.html = Some(body.to_string());
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut out = format!("From: {}\r\nTo: me@example.com\r\n", self.from);
        if let Some(subject) = &self.subject {
            out.push_str(&format!("Subject: {}\r\n", subject));
        }
        out.push_str("MIME-Version: 1.0\r\n");

        match (&self.plain, &self.html) {
            (Some(plain), Some(html)) => {
                out.push_str("Content-Type: multipart/alternative; boundary=\"b1\"\r\n\r\n");
                out.push_str(&format!(
                    "--b1\r\nContent-Type: text/plain; charset=utf-8\r\n\r\n{}\r\n",
                    plain
                ));
                out.push_str(&format!(
                    "--b1\r\nContent-Type: text/html; charset=utf-8\r\n\r\n{}\r\n",
                    html
                ));
                out.push_str("--b1--\r\n");
            }
            (None, Some(html)) => {
                out.push_str("Content-Type: text/html; charset=utf-8\r\n\r\n");
                out.push_str(html);
                out.push_str("\r\n");
            }
            (plain, None) => {
                out.push_str("Content-Type: text/plain; charset=utf-8\r\n\r\n");
                out.push_str(plain.as_deref().unwrap_or(""));
                out.push_str("\r\n");
            }
        }
        out.into_bytes()
    }
}

impl Default for MessageBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A plain-text message with the given subject.
pub fn simple_message(subject: &str) -> Vec<u8> {
    MessageBuilder::new()
        .subject(subject)
        .plain("Hello, see you tomorrow.")
        .build()
}

/// Builder for `TriageConfig` instances.
pub struct TriageConfigBuilder {
    config: TriageConfig,
}

impl TriageConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: TriageConfig::default(),
        }
    }

    pub fn folders(mut self, folders: &[&str]) -> Self {
        self.config.folders = folders.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn spam_folder(mut self, folder: &str) -> Self {
        self.config.spam_folder = Some(folder.to_string());
        self
    }

    pub fn threshold(mut self, threshold: f64) -> Self {
        self.config.phishy_threshold = threshold;
        self
    }

    pub fn dry_run(mut self) -> Self {
        self.config.dry_run = true;
        self
    }

    pub fn build(self) -> TriageConfig {
        self.config
    }
}

impl Default for TriageConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

enum Script {
    Fixed(Vec<f64>),
    PerRow(Box<dyn Fn(&FeatureRow<'_>) -> f64 + Send + Sync>),
    Fail,
}

/// Rows seen by each `classify` call, as UIDs.
pub type ClassifierLog = Arc<Mutex<Vec<Vec<Option<Uid>>>>>;

/// Classifier returning canned probabilities and recording its input.
pub struct ScriptedClassifier {
    script: Script,
    log: ClassifierLog,
}

impl ScriptedClassifier {
    /// Always answers with `probabilities`, whatever the batch size.
    pub fn fixed(probabilities: &[f64]) -> Self {
        Self::with_script(Script::Fixed(probabilities.to_vec()))
    }

    /// Computes each row's probability with `f`.
    pub fn per_row(f: impl Fn(&FeatureRow<'_>) -> f64 + Send + Sync + 'static) -> Self {
        Self::with_script(Script::PerRow(Box::new(f)))
    }

    /// Fails every call, as a crashed model process would.
    pub fn failing() -> Self {
        Self::with_script(Script::Fail)
    }

    fn with_script(script: Script) -> Self {
        Self {
            script,
            log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn log(&self) -> ClassifierLog {
        Arc::clone(&self.log)
    }
}

#[async_trait]
impl Classifier for ScriptedClassifier {
    async fn classify(&self, rows: &[FeatureRow<'_>]) -> Result<Vec<f64>, ClassifierError> {
        self.log
            .lock()
            .unwrap()
            .push(rows.iter().map(|row| row.record.uid).collect());

        match &self.script {
            Script::Fixed(values) => Ok(values.clone()),
            Script::PerRow(f) => Ok(rows.iter().map(|row| f(row)).collect()),
            Script::Fail => Err(ClassifierError::Exited {
                status: "exit status: 1".to_string(),
                stderr: "model file missing".to_string(),
            }),
        }
    }
}
