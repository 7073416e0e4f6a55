use std::path::PathBuf;
use thiserror::Error;

use crate::mailbox::MailboxError;
use crate::secrets::SecretError;
use crate::triage::TriageError;

#[derive(Error, Debug)]
pub enum MailguardError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Mailbox error: {0}")]
    Mailbox(#[from] MailboxError),

    #[error("Secret error: {0}")]
    Secret(#[from] SecretError),

    #[error("Triage failed: {0}")]
    Triage(#[from] TriageError),
}

impl MailguardError {
    /// Process exit status: 2 for configuration problems, 1 otherwise.
    pub fn exit_code(&self) -> u8 {
        match self {
            MailguardError::Config(_) => 2,
            _ => 1,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Config validation failed: {message}")]
    Validation { message: String },

    #[error("Schema validation failed: {errors}")]
    SchemaValidation { errors: String },
}

pub type Result<T> = std::result::Result<T, MailguardError>;
