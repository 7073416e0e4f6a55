//! Mailbox session error types.

use thiserror::Error;

/// Errors that can occur while talking to the mailbox server.
#[derive(Error, Debug)]
pub enum MailboxError {
    /// Failed to connect to the IMAP server.
    #[error("IMAP connection failed: {0}")]
    ConnectionFailed(String),

    /// TLS/SSL error during connection.
    #[error("TLS error: {0}")]
    TlsError(String),

    /// Authentication failed.
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Failed to resolve the account password.
    #[error("Credentials not found: {0}")]
    CredentialsNotFound(String),

    /// IMAP protocol error.
    #[error("IMAP protocol error: {0}")]
    ProtocolError(String),

    /// The server answered a command with a non-OK status.
    #[error("{command} failed: {reason}")]
    CommandFailed { command: &'static str, reason: String },

    /// A fetch returned no data for the message.
    #[error("Message {0} not found")]
    MessageNotFound(u32),

    /// Folder not found.
    #[error("IMAP folder '{0}' not found")]
    FolderNotFound(String),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    ConfigError(String),
}

impl MailboxError {
    /// Wraps a server-side command failure.
    pub fn command(command: &'static str, reason: impl std::fmt::Display) -> Self {
        MailboxError::CommandFailed {
            command,
            reason: reason.to_string(),
        }
    }
}

impl From<async_native_tls::Error> for MailboxError {
    fn from(err: async_native_tls::Error) -> Self {
        MailboxError::TlsError(err.to_string())
    }
}

/// Result type for mailbox operations.
pub type Result<T> = std::result::Result<T, MailboxError>;
