//! Mailbox protocol adapter.
//!
//! [`MailboxSession`] is the capability set the triage controller needs from a
//! remote mailbox. [`ImapClient`] implements it over IMAP with TLS; tests use
//! an in-memory double.

pub mod client;
pub mod error;
pub mod selector;
pub mod session;

pub use client::ImapClient;
pub use error::MailboxError;
pub use selector::{FolderSelector, NameMatchSelector};
pub use session::{MailboxSession, SeqNum, Uid};
