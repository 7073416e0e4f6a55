//! The mailbox session contract the triage controller drives.

use async_trait::async_trait;

use super::error::Result;

/// Sequence number of a message within the currently selected folder.
///
/// Only valid for the session and folder selection that produced it.
pub type SeqNum = u32;

/// Server-assigned identifier that stays stable across sessions.
pub type Uid = u32;

/// An authenticated, stateful mailbox session.
///
/// Commands are session-sequential: every method takes `&mut self`, so a
/// session can never be driven by two callers at once. Message-level commands
/// apply to the folder chosen by the most recent [`select`](Self::select).
#[async_trait]
pub trait MailboxSession: Send {
    /// Lists every folder name on the account, in server order.
    async fn list_folders(&mut self) -> Result<Vec<String>>;

    /// Selects a folder read-write and returns its message count.
    async fn select(&mut self, folder: &str) -> Result<u32>;

    /// Returns the sequence numbers of unseen messages in the selected folder.
    async fn search_unseen(&mut self) -> Result<Vec<SeqNum>>;

    /// Fetches the UID of a message.
    async fn fetch_uid(&mut self, seq: SeqNum) -> Result<Uid>;

    /// Fetches the full RFC 822 content of a message.
    async fn fetch_raw(&mut self, seq: SeqNum) -> Result<Vec<u8>>;

    /// Copies a message into `destination`.
    async fn copy(&mut self, uid: Uid, destination: &str) -> Result<()>;

    /// Adds the `\Deleted` flag to a message.
    async fn flag_deleted(&mut self, uid: Uid) -> Result<()>;

    /// Permanently removes messages flagged `\Deleted` from the selected folder.
    async fn expunge(&mut self) -> Result<()>;

    /// Ends the session.
    async fn logout(&mut self) -> Result<()>;
}
